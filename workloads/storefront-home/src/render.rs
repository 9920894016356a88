//! Streams the home page: shell and critical sections first, then the
//! recommended products patch once the deferred load settles.

use std::fmt::Display;
use std::future::Future;
use std::pin::pin;

use edge_core::{LoadPhase, Locale, PageLifecycle, RequestContext};
use edge_observability::{MetricsCollector, StructuredLogger};
use edge_streaming::{HeadContent, Shell, StreamingSink};
use futures::future::{self, Either};
use futures::Sink;

use crate::loader::{LoadError, PageData};
use crate::sections::{
    recommended_products_boundary, render_featured_collection, render_recommended_products,
    render_recommended_section,
};

const HOME_STYLES: &str = "/assets/home.css";

/// Per-request state the renderer reports into.
#[derive(Debug)]
pub struct PageTrace {
    pub lifecycle: PageLifecycle,
    pub metrics: MetricsCollector,
    pub logger: StructuredLogger,
}

impl PageTrace {
    /// Start tracing a request in `Pending`.
    pub fn new(ctx: &RequestContext) -> Self {
        let mut metrics = MetricsCollector::new(ctx.request_id.clone());
        metrics.set_route(&ctx.path);

        Self {
            lifecycle: PageLifecycle::new(ctx.timing.clone()),
            metrics,
            logger: StructuredLogger::new(ctx.request_id.clone())
                .with_workload("storefront-home")
                .with_route(&ctx.path),
        }
    }

    /// Critical data is in; the initial response may go out.
    pub fn critical_resolved(&mut self) -> Result<(), LoadError> {
        self.lifecycle.advance(LoadPhase::CriticalResolved)?;
        self.metrics.record_critical_resolved();
        self.logger.debug("Critical data resolved");
        Ok(())
    }

    /// Critical data failed; the request ends with an error page.
    pub fn critical_failed(&mut self, err: &LoadError) {
        if let Err(e) = self.lifecycle.advance(LoadPhase::CriticalFailed) {
            self.logger.warn(&e.to_string());
        }
        self.logger
            .error_builder("Critical data failed")
            .field("error", err.to_string())
            .field_i64("status", i64::from(err.status_code()))
            .emit();
    }

    /// Log the request's timing summary.
    ///
    /// `status_code` is `None` for a response that was abandoned part way.
    pub fn finish(self, status_code: Option<u16>) {
        let report = self.metrics.finalize(status_code);
        self.logger
            .debug_builder("Request metrics")
            .field("summary", report.to_summary())
            .field_bool("completed", status_code.is_some())
            .emit();
    }
}

/// How a streamed response ended.
#[derive(Debug)]
pub enum StreamOutcome {
    /// The document was closed.
    Completed,
    /// The client stopped reading before the document was closed.
    Disconnected,
    /// Rendering failed after the status line went out.
    Failed(LoadError),
}

impl StreamOutcome {
    /// Status to report for the request, if the response finished.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Completed => Some(200),
            Self::Disconnected | Self::Failed(_) => None,
        }
    }
}

/// Document frame for the home page in the given locale.
pub fn home_shell(locale: &Locale) -> Shell {
    Shell::new(
        HeadContent::new("Home | Storefront")
            .with_meta("viewport", "width=device-width, initial-scale=1")
            .with_meta(
                "description",
                "Featured collections and hand-picked products.",
            )
            .with_stylesheet(HOME_STYLES),
    )
    .with_lang(locale.language.to_ascii_lowercase())
    .with_body_start(format!(
        r#"<body>
<header class="site-header"><a href="{home}">Home</a> <a href="/collections">Collections</a></header>
<main class="home">
"#,
        home = if *locale == Locale::default() {
            "/".to_string()
        } else {
            locale.path_prefix()
        }
    ))
}

/// Stream the page into `sink`.
///
/// Shell, featured collection and the recommended products fallback are
/// written before the deferred load is awaited. The patch follows once it
/// settles, whether with products or as the empty state. The lifecycle must
/// be in `CriticalResolved`.
pub async fn render_page<S, E>(
    page: PageData,
    shell: &Shell,
    sink: &mut StreamingSink<S, E>,
    trace: &mut PageTrace,
) -> Result<(), LoadError>
where
    S: Sink<Vec<u8>, Error = E> + Unpin,
    E: Display,
{
    // 1) Initial response, flushed chunk by chunk
    sink.send_shell(&shell.render_opening()).await?;
    trace.metrics.record_shell_sent();

    if let Some(html) = render_featured_collection(page.featured_collection.as_ref()) {
        sink.send_section("featured-collection", &html).await?;
    }

    let boundary = recommended_products_boundary();
    sink.send_section("recommended-products", &render_recommended_section(&boundary))
        .await?;
    trace.logger.debug("Initial response sent");

    // 2) Deferred patch
    let products = page.recommended_products.await;
    let unavailable = products.is_unavailable();

    let data = serde_json::to_string(&products.as_ref().ready())
        .unwrap_or_else(|_| "null".to_string());
    let mut patch = boundary.render_patch(&render_recommended_products(products.as_ref()));
    patch.push_str(&boundary.render_data(&data));
    sink.send_patch(boundary.id(), &patch).await?;

    trace.metrics.record_boundary_patched(boundary.id(), unavailable);
    trace.lifecycle.advance(if unavailable {
        LoadPhase::DeferredUnavailable
    } else {
        LoadPhase::DeferredResolved
    })?;

    // 3) Close the document
    sink.complete(&shell.render_closing()).await?;

    trace
        .logger
        .info_builder("Page streamed")
        .field("phase", trace.lifecycle.phase().name())
        .field_bool("recommendations_unavailable", unavailable)
        .emit();

    Ok(())
}

/// Stream the page until it completes or `closed` resolves.
///
/// `closed` resolves once nobody reads the response any more. The render is
/// then dropped in place, and the pending deferred load with it, instead of
/// waiting for the next write to fail.
pub async fn stream_page<S, E, C>(
    page: PageData,
    shell: &Shell,
    sink: &mut StreamingSink<S, E>,
    trace: &mut PageTrace,
    closed: C,
) -> StreamOutcome
where
    S: Sink<Vec<u8>, Error = E> + Unpin,
    E: Display,
    C: Future<Output = ()>,
{
    let render = pin!(render_page(page, shell, sink, trace));
    let closed = pin!(closed);

    match future::select(render, closed).await {
        Either::Left((Ok(()), _)) => StreamOutcome::Completed,
        Either::Left((Err(LoadError::Stream(e)), _)) if e.is_disconnect() => {
            StreamOutcome::Disconnected
        }
        Either::Left((Err(e), _)) => StreamOutcome::Failed(e),
        Either::Right(((), _)) => StreamOutcome::Disconnected,
    }
}
