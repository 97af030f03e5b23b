//! API Module
//!
//! HTTP handlers and routing for the stock data service.
//!
//! # Endpoints
//! - `GET /search`, `/overview/:symbol`, `/movers`, `/intraday/:symbol`,
//!   `/daily/:symbol` - Cache-first market data
//! - `POST /refresh/...` - Same data, bypassing fresh cache entries
//! - `GET /cache/stats`, `GET /cache/entries`, `POST /cache/clean`,
//!   `DELETE /cache`, `DELETE /cache/:endpoint` - Cache maintenance
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
