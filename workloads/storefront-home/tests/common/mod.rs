//! Scripted backend shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use edge_core::{Locale, RequestId};
use edge_data::{FetchError, Query, QueryClient, QueryContext};
use serde_json::{json, Value};
use tokio::sync::oneshot;

pub const FEATURED: &str = "FeaturedCollection";
pub const RECOMMENDED: &str = "RecommendedProducts";

/// How the backend answers one query.
pub enum Reply {
    /// Same payload on every call.
    Data(Value),
    /// Fail on every call.
    Error(fn() -> FetchError),
    /// Answer once the test sends the result.
    Gated(Option<oneshot::Receiver<Result<Value, FetchError>>>),
    /// Never answer. The sender is dropped together with the request future.
    Hang(Option<oneshot::Sender<()>>),
    /// Panic inside the request.
    Panic,
}

impl Reply {
    pub fn gated() -> (Self, oneshot::Sender<Result<Value, FetchError>>) {
        let (tx, rx) = oneshot::channel();
        (Self::Gated(Some(rx)), tx)
    }

    pub fn hang() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self::Hang(Some(tx)), rx)
    }
}

enum Step {
    Ready(Result<Value, FetchError>),
    Gated(oneshot::Receiver<Result<Value, FetchError>>),
    Hang(Option<oneshot::Sender<()>>),
    Panic,
}

/// In-memory `QueryClient` answering by query name.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<HashMap<&'static str, Reply>>,
    calls: Mutex<Vec<(&'static str, QueryContext)>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, query: &'static str, reply: Reply) -> Self {
        self.replies.lock().unwrap().insert(query, reply);
        self
    }

    pub fn into_client(self) -> (Arc<ScriptedClient>, Arc<dyn QueryClient>) {
        let scripted = Arc::new(self);
        let client: Arc<dyn QueryClient> = scripted.clone();
        (scripted, client)
    }

    /// Query names in the order they were issued, with their contexts.
    pub fn calls(&self) -> Vec<(&'static str, QueryContext)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, query: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| *name == query)
            .count()
    }
}

#[async_trait]
impl QueryClient for ScriptedClient {
    async fn execute(&self, query: &Query, ctx: &QueryContext) -> Result<Value, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.name(), ctx.clone()));

        let step = {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(query.name()) {
                None => Step::Ready(Err(FetchError::Request(format!(
                    "no reply scripted for {}",
                    query.name()
                )))),
                Some(Reply::Data(value)) => Step::Ready(Ok(value.clone())),
                Some(Reply::Error(make)) => Step::Ready(Err(make())),
                Some(Reply::Gated(rx)) => match rx.take() {
                    Some(rx) => Step::Gated(rx),
                    None => Step::Ready(Err(FetchError::Request("gate already used".to_string()))),
                },
                Some(Reply::Hang(tx)) => Step::Hang(tx.take()),
                Some(Reply::Panic) => Step::Panic,
            }
        };

        match step {
            Step::Ready(result) => result,
            Step::Gated(rx) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Connection("gate dropped".to_string()))),
            Step::Hang(_guard) => std::future::pending().await,
            Step::Panic => panic!("scripted panic in {}", query.name()),
        }
    }
}

pub fn query_ctx() -> QueryContext {
    QueryContext::new(RequestId::from_string("test-request"), Locale::default())
}

pub fn collection_json(id: &str, title: &str) -> Value {
    json!({
        "collections": { "nodes": [{
            "id": id,
            "title": title,
            "handle": title.to_lowercase(),
            "image": null
        }]}
    })
}

pub fn no_collections_json() -> Value {
    json!({ "collections": { "nodes": [] } })
}

pub fn products_json(ids: &[&str]) -> Value {
    let nodes: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "title": format!("Product {}", id),
                "handle": id,
                "priceRange": { "minVariantPrice": { "amount": "10.0", "currencyCode": "USD" } },
                "featuredImage": null
            })
        })
        .collect();
    json!({ "products": { "nodes": nodes } })
}

pub fn graphql_error() -> FetchError {
    FetchError::GraphQl {
        query: FEATURED.to_string(),
        message: "Access denied".to_string(),
    }
}

pub fn timeout_error() -> FetchError {
    FetchError::Timeout("deadline elapsed".to_string())
}
