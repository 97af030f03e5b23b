//! Alpha Vantage HTTP client
//!
//! Issues `GET <base>/query?function=...&apikey=...` requests and turns every
//! failure mode, including error bodies served with a 200 status, into a
//! `RemoteError`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{ApiRequest, RemoteClient};
use crate::config::Config;
use crate::error::RemoteError;

/// Key that only serves sample data for IBM
const DEMO_API_KEY: &str = "demo";
const DEMO_SYMBOL: &str = "IBM";

/// Body fields the API uses to report errors and rate limiting
const IN_BAND_ERROR_FIELDS: [&str; 3] = ["Error Message", "Note", "Information"];

/// Client for the Alpha Vantage query API
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Create a client around an existing HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        Self::new(
            config.api_base_url.clone(),
            config.api_key.clone(),
            Duration::from_millis(config.api_timeout_ms),
        )
    }

    /// Full query string for `request`, API key included.
    ///
    /// The demo key only serves IBM, so any `symbol` is rewritten to it.
    pub fn query_params(&self, request: &ApiRequest) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(request.params.len() + 2);
        query.push(("function".to_string(), request.function.clone()));

        for (name, value) in &request.params {
            let value = if self.api_key == DEMO_API_KEY && name == "symbol" {
                DEMO_SYMBOL.to_string()
            } else {
                value.clone()
            };
            query.push((name.clone(), value));
        }

        query.push(("apikey".to_string(), self.api_key.clone()));
        query
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RemoteClient for AlphaVantageClient {
    async fn invoke(&self, request: &ApiRequest) -> Result<Value, RemoteError> {
        debug!("Fetching {} from API: {:?}", request.function, request.params);

        let response = self
            .client
            .get(self.query_url())
            .query(&self.query_params(request))
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        check_in_band_error(&body)?;
        Ok(body)
    }
}

/// Rejects bodies that carry an API error instead of data.
fn check_in_band_error(body: &Value) -> Result<(), RemoteError> {
    let Some(object) = body.as_object() else {
        return Err(RemoteError::Malformed(format!(
            "expected a JSON object, got {}",
            body
        )));
    };

    for field in IN_BAND_ERROR_FIELDS {
        if let Some(message) = object.get(field) {
            let message = message
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| message.to_string());
            return Err(RemoteError::Api(message));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Query,
        http::StatusCode,
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn echo_router() -> Router {
        Router::new().route(
            "/query",
            get(|Query(q): Query<HashMap<String, String>>| async move { Json(json!({ "echo": q })) }),
        )
    }

    fn client(base_url: &str, key: &str) -> AlphaVantageClient {
        AlphaVantageClient::new(base_url, key, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_query_params_layout() {
        let client = client("http://localhost", "secret");
        let request = ApiRequest::new("OVERVIEW").param("symbol", "AAPL");

        let query = client.query_params(&request);

        assert_eq!(query[0], ("function".to_string(), "OVERVIEW".to_string()));
        assert!(query.contains(&("symbol".to_string(), "AAPL".to_string())));
        assert_eq!(query.last().unwrap(), &("apikey".to_string(), "secret".to_string()));
    }

    #[test]
    fn test_demo_key_forces_ibm() {
        let client = client("http://localhost", "demo");
        let request = ApiRequest::new("OVERVIEW").param("symbol", "AAPL");

        let query = client.query_params(&request);
        assert!(query.contains(&("symbol".to_string(), "IBM".to_string())));
    }

    #[test]
    fn test_demo_key_leaves_other_params() {
        let client = client("http://localhost", "demo");
        let request = ApiRequest::new("SYMBOL_SEARCH").param("keywords", "tesla");

        let query = client.query_params(&request);
        assert!(query.contains(&("keywords".to_string(), "tesla".to_string())));
    }

    #[test]
    fn test_in_band_errors() {
        assert!(check_in_band_error(&json!({"Symbol": "IBM"})).is_ok());
        assert!(matches!(
            check_in_band_error(&json!({"Note": "Thank you for using Alpha Vantage!"})),
            Err(RemoteError::Api(msg)) if msg.starts_with("Thank you")
        ));
        assert!(matches!(
            check_in_band_error(&json!({"Error Message": "Invalid API call."})),
            Err(RemoteError::Api(_))
        ));
        assert!(matches!(
            check_in_band_error(&json!({"Information": "rate limit"})),
            Err(RemoteError::Api(_))
        ));
        assert!(matches!(
            check_in_band_error(&json!([1, 2, 3])),
            Err(RemoteError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_invoke_sends_query() {
        let base = serve(echo_router()).await;
        let client = client(&base, "k");

        let body = client
            .invoke(&ApiRequest::new("TIME_SERIES_INTRADAY").param("symbol", "MSFT").param("interval", "5min"))
            .await
            .unwrap();

        assert_eq!(body["echo"]["function"], "TIME_SERIES_INTRADAY");
        assert_eq!(body["echo"]["symbol"], "MSFT");
        assert_eq!(body["echo"]["interval"], "5min");
        assert_eq!(body["echo"]["apikey"], "k");
    }

    #[tokio::test]
    async fn test_invoke_non_success_status() {
        let router = Router::new().route(
            "/query",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = serve(router).await;

        let result = client(&base, "k").invoke(&ApiRequest::new("OVERVIEW")).await;
        assert!(matches!(result, Err(RemoteError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_invoke_malformed_body() {
        let router = Router::new().route("/query", get(|| async { "<html>nope</html>" }));
        let base = serve(router).await;

        let result = client(&base, "k").invoke(&ApiRequest::new("OVERVIEW")).await;
        assert!(matches!(result, Err(RemoteError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_invoke_rate_limited_body() {
        let router = Router::new().route(
            "/query",
            get(|| async { Json(json!({"Information": "standard API rate limit is 25 requests per day"})) }),
        );
        let base = serve(router).await;

        let result = client(&base, "k").invoke(&ApiRequest::new("TOP_GAINERS_LOSERS")).await;
        assert!(matches!(result, Err(RemoteError::Api(_))));
    }

    #[tokio::test]
    async fn test_invoke_timeout_is_transport_error() {
        let router = Router::new().route(
            "/query",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Json(json!({}))
            }),
        );
        let base = serve(router).await;
        let client = AlphaVantageClient::new(base, "k", Duration::from_millis(50)).unwrap();

        let result = client.invoke(&ApiRequest::new("OVERVIEW")).await;
        assert!(matches!(result, Err(RemoteError::Transport(_))));
    }

    #[tokio::test]
    async fn test_invoke_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client(&format!("http://{}", addr), "k")
            .invoke(&ApiRequest::new("OVERVIEW"))
            .await;
        assert!(matches!(result, Err(RemoteError::Transport(_))));
    }
}
