//! Stock Data Service
//!
//! Cache-first access to the remote market data API. Every data operation
//! follows the same policy:
//! 1. Fresh cache entry: return it, no network call.
//! 2. Miss: call the remote client, normalize, cache, return.
//! 3. Remote failure: fall back to the stale cache entry, or propagate the
//!    remote error unchanged if there is none.

pub mod transform;

use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::cache::{params, CacheStats, ExpiringCache, IndexEntry, Params};
use crate::error::{RemoteError, Result};
use crate::models::{
    ChartPoint, ChartRange, CompanyOverview, MarketMovers, RawDailySeries, RawIntradaySeries,
    RawMarketMovers, SymbolSearchResults,
};
use crate::remote::{ApiRequest, RemoteClient};

const INTRADAY_INTERVAL: &str = "5min";
const DAILY_OUTPUT_SIZE: &str = "full";

// == Endpoint ==
/// Logical endpoint identifiers, used as cache namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SymbolSearch,
    CompanyOverview,
    TopGainersLosers,
    TimeSeriesIntraday,
    TimeSeriesDaily,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::SymbolSearch,
        Endpoint::CompanyOverview,
        Endpoint::TopGainersLosers,
        Endpoint::TimeSeriesIntraday,
        Endpoint::TimeSeriesDaily,
    ];

    /// Identifier stored in cache keys and index entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::SymbolSearch => "SYMBOL_SEARCH",
            Endpoint::CompanyOverview => "COMPANY_OVERVIEW",
            Endpoint::TopGainersLosers => "TOP_GAINERS_LOSERS",
            Endpoint::TimeSeriesIntraday => "TIME_SERIES_INTRADAY",
            Endpoint::TimeSeriesDaily => "TIME_SERIES_DAILY",
        }
    }

    /// Remote function name.
    pub fn function(&self) -> &'static str {
        match self {
            Endpoint::CompanyOverview => "OVERVIEW",
            other => other.as_str(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Fetched ==
/// Where a returned value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    /// Fresh cache hit
    Cache,
    /// Live remote fetch
    Network,
    /// Expired cache entry served after a remote failure
    Stale,
}

/// A data operation result tagged with its origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fetched<T> {
    pub data: T,
    pub origin: DataOrigin,
}

impl<T> Fetched<T> {
    fn new(data: T, origin: DataOrigin) -> Self {
        Self { data, origin }
    }

    pub fn is_stale(&self) -> bool {
        self.origin == DataOrigin::Stale
    }
}

// == Stock Data Service ==
/// Market data facade over the expiring cache and a remote client.
#[derive(Clone)]
pub struct StockDataService {
    cache: Arc<ExpiringCache>,
    client: Arc<dyn RemoteClient>,
}

impl StockDataService {
    pub fn new(cache: Arc<ExpiringCache>, client: Arc<dyn RemoteClient>) -> Self {
        Self { cache, client }
    }

    pub fn cache(&self) -> &ExpiringCache {
        &self.cache
    }

    // == Data Operations ==

    pub async fn search_symbols(&self, keywords: &str) -> Result<Fetched<SymbolSearchResults>, RemoteError> {
        let (params, request) = search_request(keywords);
        self.fetch_through(Endpoint::SymbolSearch, &params, request, decode_raw)
            .await
    }

    pub async fn get_company_overview(&self, symbol: &str) -> Result<Fetched<CompanyOverview>, RemoteError> {
        let (params, request) = overview_request(symbol);
        self.fetch_through(Endpoint::CompanyOverview, &params, request, decode_raw)
            .await
    }

    pub async fn get_top_gainers_losers(&self) -> Result<Fetched<MarketMovers>, RemoteError> {
        let (params, request) = movers_request();
        self.fetch_through(Endpoint::TopGainersLosers, &params, request, |raw| {
            decode_raw::<RawMarketMovers>(raw).map(transform::market_movers)
        })
        .await
    }

    pub async fn get_intraday_data(&self, symbol: &str) -> Result<Fetched<Vec<ChartPoint>>, RemoteError> {
        let (params, request) = intraday_request(symbol);
        self.fetch_through(Endpoint::TimeSeriesIntraday, &params, request, |raw| {
            decode_raw::<RawIntradaySeries>(raw).map(transform::intraday_points)
        })
        .await
    }

    pub async fn get_daily_data(
        &self,
        symbol: &str,
        range: ChartRange,
    ) -> Result<Fetched<Vec<ChartPoint>>, RemoteError> {
        let (params, request) = daily_request(symbol, range);
        self.fetch_through(Endpoint::TimeSeriesDaily, &params, request, move |raw| {
            decode_raw::<RawDailySeries>(raw).map(|series| transform::daily_points(series, range))
        })
        .await
    }

    // == Refresh Operations ==

    pub async fn refresh_symbol_search(&self, keywords: &str) -> Result<Fetched<SymbolSearchResults>, RemoteError> {
        let (params, _) = search_request(keywords);
        self.invalidate(Endpoint::SymbolSearch, &params).await;
        self.search_symbols(keywords).await
    }

    pub async fn refresh_company_overview(&self, symbol: &str) -> Result<Fetched<CompanyOverview>, RemoteError> {
        let (params, _) = overview_request(symbol);
        self.invalidate(Endpoint::CompanyOverview, &params).await;
        self.get_company_overview(symbol).await
    }

    /// Drops every movers entry before refetching.
    pub async fn refresh_top_gainers_losers(&self) -> Result<Fetched<MarketMovers>, RemoteError> {
        if let Err(e) = self.cache.clear_endpoint(Endpoint::TopGainersLosers.as_str()).await {
            warn!("Failed to clear {} before refresh: {}", Endpoint::TopGainersLosers, e);
        }
        self.get_top_gainers_losers().await
    }

    pub async fn refresh_intraday_data(&self, symbol: &str) -> Result<Fetched<Vec<ChartPoint>>, RemoteError> {
        let (params, _) = intraday_request(symbol);
        self.invalidate(Endpoint::TimeSeriesIntraday, &params).await;
        self.get_intraday_data(symbol).await
    }

    pub async fn refresh_daily_data(
        &self,
        symbol: &str,
        range: ChartRange,
    ) -> Result<Fetched<Vec<ChartPoint>>, RemoteError> {
        let (params, _) = daily_request(symbol, range);
        self.invalidate(Endpoint::TimeSeriesDaily, &params).await;
        self.get_daily_data(symbol, range).await
    }

    // == Maintenance ==

    pub async fn get_cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub async fn cache_entries(&self) -> Vec<IndexEntry> {
        self.cache.entries().await
    }

    /// Sweeps expired entries; returns how many were removed.
    pub async fn clean_expired_cache(&self) -> Result<usize> {
        self.cache.remove_expired().await
    }

    pub async fn clear_all_cache(&self) -> Result<usize> {
        self.cache.clear_all().await
    }

    pub async fn clear_endpoint_cache(&self, endpoint: &str) -> Result<usize> {
        self.cache.clear_endpoint(endpoint).await
    }

    // == Internals ==

    async fn fetch_through<T, F>(
        &self,
        endpoint: Endpoint,
        params: &Params,
        request: ApiRequest,
        normalize: F,
    ) -> Result<Fetched<T>, RemoteError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Value) -> Result<T, RemoteError>,
    {
        if let Some(data) = self.cache.get::<T>(endpoint.as_str(), params).await {
            return Ok(Fetched::new(data, DataOrigin::Cache));
        }

        let fetched = match self.client.invoke(&request).await {
            Ok(raw) => normalize(raw),
            Err(e) => Err(e),
        };

        match fetched {
            Ok(data) => {
                if let Err(e) = self.cache.set(endpoint.as_str(), params, &data).await {
                    warn!("Failed to cache {} response: {}", endpoint, e);
                }
                Ok(Fetched::new(data, DataOrigin::Network))
            }
            Err(e) => match self.cache.get_stale::<T>(endpoint.as_str(), params).await {
                Some(data) => {
                    warn!("Serving stale {} data after remote failure: {}", endpoint, e);
                    Ok(Fetched::new(data, DataOrigin::Stale))
                }
                None => Err(e),
            },
        }
    }

    async fn invalidate(&self, endpoint: Endpoint, params: &Params) {
        match self.cache.remove(endpoint.as_str(), params).await {
            Ok(()) => info!("Refreshing {}: {:?}", endpoint, params),
            Err(e) => warn!("Failed to invalidate {} before refresh: {}", endpoint, e),
        }
    }
}

// == Request Mapping ==
// Cache params and remote request for each operation

fn search_request(keywords: &str) -> (Params, ApiRequest) {
    (
        params([("keywords", keywords)]),
        ApiRequest::new(Endpoint::SymbolSearch.function()).param("keywords", keywords),
    )
}

fn overview_request(symbol: &str) -> (Params, ApiRequest) {
    (
        params([("symbol", symbol)]),
        ApiRequest::new(Endpoint::CompanyOverview.function()).param("symbol", symbol),
    )
}

fn movers_request() -> (Params, ApiRequest) {
    (
        Params::new(),
        ApiRequest::new(Endpoint::TopGainersLosers.function()),
    )
}

fn intraday_request(symbol: &str) -> (Params, ApiRequest) {
    (
        params([("symbol", symbol), ("interval", INTRADAY_INTERVAL)]),
        ApiRequest::new(Endpoint::TimeSeriesIntraday.function())
            .param("symbol", symbol)
            .param("interval", INTRADAY_INTERVAL),
    )
}

/// Cached per range, but always fetched with the full history.
fn daily_request(symbol: &str, range: ChartRange) -> (Params, ApiRequest) {
    (
        params([("symbol", symbol), ("range", range.as_str())]),
        ApiRequest::new(Endpoint::TimeSeriesDaily.function())
            .param("symbol", symbol)
            .param("outputsize", DAILY_OUTPUT_SIZE),
    )
}

fn decode_raw<T: DeserializeOwned>(raw: Value) -> Result<T, RemoteError> {
    serde_json::from_value(raw).map_err(|e| RemoteError::Malformed(e.to_string()))
}
