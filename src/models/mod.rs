//! Market data shapes and HTTP DTOs

pub mod market;
pub mod requests;
pub mod responses;

pub use market::{
    ChartPoint, ChartRange, CompanyOverview, MarketMovers, RawBar, RawDailySeries,
    RawIntradaySeries, RawMarketMovers, RawMover, StockRecord, SymbolMatch, SymbolSearchResults,
};
pub use requests::{validate_symbol, RangeQuery, SearchQuery};
pub use responses::{ClearResponse, EntriesResponse, ErrorResponse, HealthResponse, StatsResponse};
