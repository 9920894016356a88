//! Query descriptors and the GraphQL response envelope.

use edge_core::{Locale, RequestContext, RequestId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::FetchError;

/// An opaque request descriptor: operation name, document and variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    name: &'static str,
    document: &'static str,
    variables: Map<String, Value>,
}

impl Query {
    /// Create a query from an operation name and its GraphQL document.
    pub fn new(name: &'static str, document: &'static str) -> Self {
        Self {
            name,
            document,
            variables: Map::new(),
        }
    }

    /// Add a variable.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Operation name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// GraphQL document.
    pub fn document(&self) -> &'static str {
        self.document
    }

    /// Explicit variables (without context variables).
    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// Build the wire body for this query in the given context.
    ///
    /// Context variables (`country`, `language`) are added first so an
    /// explicit variable of the same name wins.
    pub fn to_request_body(&self, ctx: &QueryContext) -> GraphQlRequest<'_> {
        let mut variables = ctx.variables();
        for (key, value) in &self.variables {
            variables.insert(key.clone(), value.clone());
        }
        GraphQlRequest {
            query: self.document,
            operation_name: self.name,
            variables,
        }
    }
}

/// Per-request context every query runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    /// Request ID forwarded to the backend for correlation.
    pub request_id: RequestId,
    /// Locale bound through `@inContext`.
    pub locale: Locale,
}

impl QueryContext {
    /// Create a query context.
    pub fn new(request_id: RequestId, locale: Locale) -> Self {
        Self { request_id, locale }
    }

    /// Derive a query context from the request.
    pub fn from_request(ctx: &RequestContext) -> Self {
        Self::new(ctx.request_id.clone(), ctx.locale.clone())
    }

    /// Variables every query receives.
    pub fn variables(&self) -> Map<String, Value> {
        let mut vars = Map::new();
        vars.insert("country".to_string(), Value::from(self.locale.country.clone()));
        vars.insert(
            "language".to_string(),
            Value::from(self.locale.language.clone()),
        );
        vars
    }
}

/// Wire format of a GraphQL request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub operation_name: &'a str,
    pub variables: Map<String, Value>,
}

/// Wire format of a GraphQL response.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// A single GraphQL error entry.
#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

impl GraphQlResponse {
    /// Extract `data`, turning any reported errors into a failure.
    pub fn into_data(self, query: &str) -> Result<Value, FetchError> {
        if !self.errors.is_empty() {
            let messages: Vec<String> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(FetchError::GraphQl {
                query: query.to_string(),
                message: messages.join("; "),
            });
        }
        match self.data {
            Some(Value::Null) | None => Err(FetchError::Deserialization {
                query: query.to_string(),
                message: "response has no data".to_string(),
            }),
            Some(data) => Ok(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ctx() -> QueryContext {
        QueryContext::new(RequestId::from_string("req-1"), Locale::new("fr", "ca"))
    }

    #[test]
    fn test_request_body_carries_context() {
        let query = Query::new("FeaturedCollection", "query FeaturedCollection { x }");
        let body = serde_json::to_value(query.to_request_body(&ctx())).unwrap();
        assert_eq!(body["operationName"], "FeaturedCollection");
        assert_eq!(body["query"], "query FeaturedCollection { x }");
        assert_eq!(body["variables"], json!({"country": "CA", "language": "FR"}));
    }

    #[test]
    fn test_explicit_variable_wins_over_context() {
        let query = Query::new("Q", "query Q { x }")
            .with_variable("country", "US")
            .with_variable("first", 4);
        let body = query.to_request_body(&ctx());
        assert_eq!(body.variables["country"], "US");
        assert_eq!(body.variables["language"], "FR");
        assert_eq!(body.variables["first"], 4);
    }

    #[test]
    fn test_envelope_with_data() {
        let envelope: GraphQlResponse =
            serde_json::from_value(json!({"data": {"collections": {"nodes": []}}})).unwrap();
        let data = envelope.into_data("Q").unwrap();
        assert_eq!(data, json!({"collections": {"nodes": []}}));
    }

    #[test]
    fn test_envelope_with_errors() {
        let envelope: GraphQlResponse = serde_json::from_value(json!({
            "data": null,
            "errors": [{"message": "throttled"}, {"message": "bad field"}]
        }))
        .unwrap();
        let err = envelope.into_data("Q").unwrap_err();
        assert!(matches!(err, FetchError::GraphQl { ref message, .. } if message == "throttled; bad field"));
    }

    #[test]
    fn test_envelope_without_data() {
        let envelope: GraphQlResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            envelope.into_data("Q"),
            Err(FetchError::Deserialization { .. })
        ));
    }
}
