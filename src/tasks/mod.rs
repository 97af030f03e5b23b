//! Background Tasks Module
//!
//! Cache maintenance run at startup and periodically while the server is up.

mod cleanup;

pub use cleanup::{initialize, spawn_cleanup_task};
