//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging
//! helpers for booking, ledger and storage events.

use tracing::{info, warn, debug, error};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use crate::config::LoggingConfig;
use crate::models::BookingId;
use crate::storage::LoadDiagnostic;
use crate::utils::errors::{Result, TrekError};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for as long as the process logs.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| TrekError::Config(format!("Invalid log filter: {}", e)))?;

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let (file_layer, guard) = match &config.file_path {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "trekdesk.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| TrekError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log booking lifecycle actions
pub fn log_booking_action(booking_id: BookingId, action: &str, tourist: &str, details: Option<&str>) {
    info!(
        booking_id = %booking_id,
        action = action,
        tourist = tourist,
        details = details,
        "Booking action performed"
    );
}

/// Log a guide ledger change
pub fn log_guide_ledger(guide: &str, booking_id: BookingId, change: &str, earnings: f64) {
    info!(
        guide = guide,
        booking_id = %booking_id,
        change = change,
        earnings = earnings,
        "Guide ledger updated"
    );
}

/// Log a rejected operation
pub fn log_rejection(operation: &str, error: &TrekError) {
    warn!(
        operation = operation,
        kind = ?error.kind(),
        error = %error,
        "Operation rejected"
    );
}

/// Log storage operations
pub fn log_store_operation(operation: &str, collection: &str, records: usize, success: bool) {
    if success {
        debug!(
            operation = operation,
            collection = collection,
            records = records,
            "Storage operation completed"
        );
    } else {
        error!(
            operation = operation,
            collection = collection,
            records = records,
            "Storage operation failed"
        );
    }
}

/// Log a record skipped or altered during a load
pub fn log_load_diagnostic(collection: &str, diagnostic: &LoadDiagnostic) {
    warn!(
        collection = collection,
        line = diagnostic.line,
        kind = ?diagnostic.kind,
        "{}",
        diagnostic.message
    );
}
