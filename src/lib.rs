//! TrekDesk
//!
//! Booking core for a trekking agency: tourists, guides and attractions,
//! festival pricing with a guide commission, the guide assignment ledger,
//! the booking lifecycle and flat-file persistence of every collection.

pub mod config;
pub mod services;
pub mod models;
pub mod storage;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{TrekError, Result};

// Re-export main components for easy access
pub use services::TrekDesk;
pub use state::TrekRegistry;
pub use storage::StorageService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
