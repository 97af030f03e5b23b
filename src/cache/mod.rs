//! Cache Module
//!
//! Persistent response cache with per-endpoint TTL expiry and a size-bounded
//! entry index.

mod clock;
mod entry;
mod expiring;
mod index;
mod key;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use expiring::ExpiringCache;
pub use index::{CacheIndex, IndexEntry};
pub use key::{params, CacheKey, Params};
pub use stats::CacheStats;
pub use store::{FileStore, KeyValueStore, MemoryStore};

// == Public Constants ==
/// Namespace prefix shared by every record this cache writes
pub const CACHE_PREFIX: &str = "@stockwatch_cache_";

/// Store key of the serialized index
pub const INDEX_KEY: &str = "@stockwatch_cache_index";
