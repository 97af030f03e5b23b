//! Stockwatch Cache - cache-first market data service
//!
//! Persistent response cache with per-endpoint TTLs and size-bounded
//! retention, in front of a remote stock market data API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::{DataOrigin, Endpoint, Fetched, StockDataService};
pub use tasks::{initialize, spawn_cleanup_task};
