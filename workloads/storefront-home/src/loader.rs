//! Page data loading.
//!
//! The home page splits its data in two: the featured collection is awaited
//! before anything is sent, recommended products load in the background and
//! are streamed in after the initial response.

use std::sync::Arc;

use edge_core::{TransitionError, WorkloadError};
use edge_data::{FetchError, QueryClient, QueryContext};
use edge_executor::{defer, Deferred};

use crate::data::{FeaturedCollection, FeaturedCollectionResponse, RecommendedProducts};
use crate::queries;

/// Error type for page loading and rendering.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Critical data could not be loaded; the page cannot render.
    #[error("Critical query {query} failed: {source}")]
    Critical {
        query: &'static str,
        #[source]
        source: FetchError,
    },

    /// The response stream failed after it started.
    #[error(transparent)]
    Stream(#[from] WorkloadError),

    #[error(transparent)]
    Lifecycle(#[from] TransitionError),
}

impl LoadError {
    /// HTTP status for a page that failed before streaming started.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Critical { source, .. } if source.is_unreachable() => 502,
            _ => 500,
        }
    }
}

/// Data required before the initial response.
#[derive(Debug, Clone, Default)]
pub struct CriticalData {
    /// Most recently updated collection, `None` if the store has none.
    pub featured_collection: Option<FeaturedCollection>,
}

/// Data streamed in after the initial response.
#[derive(Debug)]
pub struct DeferredData {
    pub recommended_products: Deferred<RecommendedProducts>,
}

/// Everything the home page renders.
///
/// Critical fields are resolved; `recommended_products` may still be in
/// flight. Dropping the page abandons the deferred load.
#[derive(Debug)]
pub struct PageData {
    pub featured_collection: Option<FeaturedCollection>,
    pub recommended_products: Deferred<RecommendedProducts>,
}

/// Load the above-the-fold data. Any failure fails the page.
pub async fn load_critical_data(
    client: &Arc<dyn QueryClient>,
    ctx: &QueryContext,
) -> Result<CriticalData, LoadError> {
    let featured = queries::featured_collection();

    // Further critical queries join this fan-out.
    let (collections,) = futures::try_join!(async {
        client
            .query::<FeaturedCollectionResponse>(&featured, ctx)
            .await
            .map_err(|source| LoadError::Critical {
                query: featured.name(),
                source,
            })
    })?;

    Ok(CriticalData {
        featured_collection: collections.into_first(),
    })
}

/// Start the below-the-fold loads and return without waiting for them.
///
/// Failures are logged and resolve to `Unavailable`; they never reach the
/// caller as errors.
pub fn load_deferred_data(client: &Arc<dyn QueryClient>, ctx: &QueryContext) -> DeferredData {
    let client = Arc::clone(client);
    let ctx = ctx.clone();

    let recommended_products = defer("recommended_products", async move {
        let query = queries::recommended_products();
        client.query::<RecommendedProducts>(&query, &ctx).await
    });

    DeferredData {
        recommended_products,
    }
}

/// Load the home page: deferred loads are started first, then the critical
/// data is awaited.
pub async fn loader(
    client: &Arc<dyn QueryClient>,
    ctx: &QueryContext,
) -> Result<PageData, LoadError> {
    let deferred = load_deferred_data(client, ctx);
    let critical = load_critical_data(client, ctx).await?;

    Ok(PageData {
        featured_collection: critical.featured_collection,
        recommended_products: deferred.recommended_products,
    })
}
