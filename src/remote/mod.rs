//! Remote Client Module
//!
//! Narrow interface to the remote market data API. The data service only
//! ever issues a function name plus a flat parameter map.

mod alpha_vantage;

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::Params;
use crate::error::RemoteError;

pub use alpha_vantage::AlphaVantageClient;

// == API Request ==
/// Request descriptor for one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Remote function name (e.g. `OVERVIEW`)
    pub function: String,
    /// Query parameters besides the function name and API key
    pub params: Params,
}

impl ApiRequest {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            params: Params::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

// == Remote Client ==
/// Performs remote calls.
///
/// Failures (transport, non-2xx, malformed or in-band API errors) are
/// returned as `Err`, never as an `Ok` payload.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn invoke(&self, request: &ApiRequest) -> Result<Value, RemoteError>;
}
