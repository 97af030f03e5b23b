//! API Handlers
//!
//! HTTP request handlers exposing the stock data service.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::{ExpiringCache, FileStore, KeyValueStore};
use crate::config::Config;
use crate::error::{ApiError, RemoteError};
use crate::models::{
    validate_symbol, ChartPoint, ClearResponse, CompanyOverview, EntriesResponse, HealthResponse,
    MarketMovers, RangeQuery, SearchQuery, StatsResponse, SymbolSearchResults,
};
use crate::remote::{AlphaVantageClient, RemoteClient};
use crate::service::{Endpoint, Fetched, StockDataService};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: StockDataService,
}

impl AppState {
    pub fn new(service: StockDataService) -> Self {
        Self { service }
    }

    /// Wires a service over `store` and `client` with the configured policy.
    pub fn with_parts(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        client: Arc<dyn RemoteClient>,
    ) -> Self {
        let cache = ExpiringCache::new(store, config.cache_config());
        Self::new(StockDataService::new(Arc::new(cache), client))
    }

    /// File-backed cache and the Alpha Vantage client.
    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        let store = Arc::new(FileStore::new(config.store_path.clone()));
        let client = Arc::new(AlphaVantageClient::from_config(config)?);
        Ok(Self::with_parts(config, store, client))
    }
}

fn symbol_param(symbol: &str) -> Result<String, ApiError> {
    validate_symbol(symbol).map_err(ApiError::InvalidRequest)
}

// == Data Handlers ==

/// Handler for GET /search?keywords=
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Fetched<SymbolSearchResults>> {
    let keywords = query.validate().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.service.search_symbols(keywords).await?))
}

/// Handler for GET /overview/:symbol
pub async fn overview_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Fetched<CompanyOverview>> {
    let symbol = symbol_param(&symbol)?;
    Ok(Json(state.service.get_company_overview(&symbol).await?))
}

/// Handler for GET /movers
pub async fn movers_handler(State(state): State<AppState>) -> ApiResult<Fetched<MarketMovers>> {
    Ok(Json(state.service.get_top_gainers_losers().await?))
}

/// Handler for GET /intraday/:symbol
pub async fn intraday_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Fetched<Vec<ChartPoint>>> {
    let symbol = symbol_param(&symbol)?;
    Ok(Json(state.service.get_intraday_data(&symbol).await?))
}

/// Handler for GET /daily/:symbol?range=
pub async fn daily_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Fetched<Vec<ChartPoint>>> {
    let symbol = symbol_param(&symbol)?;
    let range = query.chart_range();
    Ok(Json(state.service.get_daily_data(&symbol, range).await?))
}

// == Refresh Handlers ==

pub async fn refresh_search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Fetched<SymbolSearchResults>> {
    let keywords = query.validate().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.service.refresh_symbol_search(keywords).await?))
}

pub async fn refresh_overview_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Fetched<CompanyOverview>> {
    let symbol = symbol_param(&symbol)?;
    Ok(Json(state.service.refresh_company_overview(&symbol).await?))
}

pub async fn refresh_movers_handler(
    State(state): State<AppState>,
) -> ApiResult<Fetched<MarketMovers>> {
    Ok(Json(state.service.refresh_top_gainers_losers().await?))
}

pub async fn refresh_intraday_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Fetched<Vec<ChartPoint>>> {
    let symbol = symbol_param(&symbol)?;
    Ok(Json(state.service.refresh_intraday_data(&symbol).await?))
}

pub async fn refresh_daily_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Fetched<Vec<ChartPoint>>> {
    let symbol = symbol_param(&symbol)?;
    let range = query.chart_range();
    Ok(Json(state.service.refresh_daily_data(&symbol, range).await?))
}

// == Cache Maintenance Handlers ==

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.service.get_cache_stats().await.into())
}

/// Handler for GET /cache/entries
pub async fn entries_handler(State(state): State<AppState>) -> Json<EntriesResponse> {
    Json(EntriesResponse::new(state.service.cache_entries().await))
}

/// Handler for POST /cache/clean
pub async fn clean_handler(State(state): State<AppState>) -> ApiResult<ClearResponse> {
    let removed = state.service.clean_expired_cache().await?;
    Ok(Json(ClearResponse::cleaned(removed)))
}

/// Handler for DELETE /cache
pub async fn clear_all_handler(State(state): State<AppState>) -> ApiResult<ClearResponse> {
    let removed = state.service.clear_all_cache().await?;
    Ok(Json(ClearResponse::cleared(removed)))
}

/// Handler for DELETE /cache/:endpoint
///
/// Only the service's own endpoint identifiers are accepted.
pub async fn clear_endpoint_handler(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
) -> ApiResult<ClearResponse> {
    let endpoint = Endpoint::parse(&endpoint.to_ascii_uppercase())
        .ok_or_else(|| ApiError::InvalidRequest(format!("Unknown endpoint '{}'", endpoint)))?;

    let removed = state.service.clear_endpoint_cache(endpoint.as_str()).await?;
    Ok(Json(ClearResponse::cleared_endpoint(endpoint.as_str(), removed)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
