//! HTTP surface: `GET /` and `GET /{locale}`.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use edge_core::{Locale, RequestContext, RequestId};
use edge_data::{QueryClient, QueryContext};
use edge_streaming::StreamingSink;
use futures::channel::{mpsc, oneshot};
use futures::{Stream, StreamExt};
use http::{header, HeaderMap, HeaderValue, StatusCode};
use tracing::Instrument;

use crate::loader::{loader, LoadError};
use crate::render::{home_shell, stream_page, PageTrace, StreamOutcome};

/// Chunks buffered between the renderer and the response body.
const BODY_CHANNEL_CAPACITY: usize = 16;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID that is reused as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Clone)]
struct AppState {
    client: Arc<dyn QueryClient>,
}

/// Build the router for the home page.
pub fn router(client: Arc<dyn QueryClient>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/{locale}", get(home_localized))
        .with_state(AppState { client })
}

async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
    respond(state, request_context("/".to_string(), &headers)).await
}

async fn home_localized(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    headers: HeaderMap,
) -> Response {
    match Locale::from_path_segment(&segment) {
        Some(locale) => {
            let ctx = request_context(format!("/{}", segment), &headers).with_locale(locale);
            respond(state, ctx).await
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Context for a new request, keeping the caller's `x-request-id` if it sent
/// a usable one.
fn request_context(path: String, headers: &HeaderMap) -> RequestContext {
    let ctx = RequestContext::new(path);
    match upstream_request_id(headers) {
        Some(id) => ctx.with_request_id(id),
        None => ctx,
    }
}

fn upstream_request_id(headers: &HeaderMap) -> Option<RequestId> {
    let id = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let usable = !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
    usable.then(|| RequestId::from_string(id))
}

async fn respond(state: AppState, ctx: RequestContext) -> Response {
    let span = tracing::info_span!(
        "request",
        request_id = %ctx.request_id,
        path = %ctx.path,
        locale = %ctx.locale.path_prefix(),
    );

    async move {
        let mut trace = PageTrace::new(&ctx);
        let query_ctx = QueryContext::from_request(&ctx);

        let page = match loader(&state.client, &query_ctx).await {
            Ok(page) => page,
            Err(err) => {
                trace.critical_failed(&err);
                trace.finish(Some(err.status_code()));
                return error_response(&err, &ctx.request_id);
            }
        };
        if let Err(err) = trace.critical_resolved() {
            trace.finish(Some(err.status_code()));
            return error_response(&err, &ctx.request_id);
        }

        let (tx, rx) = mpsc::channel::<Vec<u8>>(BODY_CHANNEL_CAPACITY);
        let (mut reader, reader_guard) = oneshot::channel::<()>();
        let shell = home_shell(&ctx.locale);
        let timing = ctx.timing.clone();

        tokio::spawn(
            async move {
                let mut sink = StreamingSink::new(tx, timing);
                let outcome =
                    stream_page(page, &shell, &mut sink, &mut trace, reader.cancellation()).await;
                match &outcome {
                    StreamOutcome::Completed => {}
                    StreamOutcome::Disconnected => {
                        trace.logger.debug("Client disconnected, response abandoned");
                    }
                    StreamOutcome::Failed(e) => {
                        trace
                            .logger
                            .error_builder("Streaming failed")
                            .field("error", e.to_string())
                            .emit();
                    }
                }
                trace.finish(outcome.status_code());
            }
            .in_current_span(),
        );

        let body = BodyStream {
            chunks: rx,
            _reader: reader_guard,
        };
        let mut response = Response::new(Body::from_stream(body));
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        if let Ok(value) = HeaderValue::from_str(ctx.request_id.as_str()) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

/// Response body fed by the render task.
///
/// Hyper drops the body when the connection goes away, which drops
/// `_reader` and resolves the render task's `cancellation()`.
struct BodyStream {
    chunks: mpsc::Receiver<Vec<u8>>,
    _reader: oneshot::Receiver<()>,
}

impl Stream for BodyStream {
    type Item = Result<Vec<u8>, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.chunks.poll_next_unpin(cx).map(|chunk| chunk.map(Ok))
    }
}

/// Whole-page error for a request whose critical data failed.
fn error_response(err: &LoadError, request_id: &RequestId) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Something went wrong</title></head>
<body>
<main class="page-error">
    <h1>{code} {reason}</h1>
    <p>The page could not be loaded. Please try again.</p>
    <p class="request-info">Request ID: {request_id}</p>
</main>
</body>
</html>"#,
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Error"),
        request_id = request_id
    );
    (status, Html(body)).into_response()
}
