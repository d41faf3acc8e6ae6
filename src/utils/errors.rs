//! Error handling for TrekDesk
//!
//! This module defines the main error type used throughout the crate
//! and the coarse taxonomy callers use to decide what to show or retry.

use std::path::PathBuf;
use thiserror::Error;
use chrono::NaiveDate;
use crate::models::{BookingId, BookingStatus};

/// Main error type for TrekDesk operations
#[derive(Error, Debug)]
pub enum TrekError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Username already exists: {username}")]
    DuplicateUsername { username: String },

    #[error("Attraction is fully booked: {name}")]
    AttractionFull { name: String },

    #[error("Guide cannot take more bookings: {username}")]
    GuideUnavailable { username: String },

    #[error("Booking {booking_id} cannot {action} while {status}")]
    InvalidStateTransition {
        booking_id: BookingId,
        status: BookingStatus,
        action: &'static str,
    },

    #[error("Booking {booking_id} can no longer be cancelled (trek date {trek_date})")]
    CancellationWindowClosed { booking_id: BookingId, trek_date: NaiveDate },

    #[error("Booking {booking_id} can no longer be modified (trek date {trek_date})")]
    ModificationWindowClosed { booking_id: BookingId, trek_date: NaiveDate },

    #[error("Tourist not found: {username}")]
    TouristNotFound { username: String },

    #[error("Guide not found: {username}")]
    GuideNotFound { username: String },

    #[error("Attraction not found: {name}")]
    AttractionNotFound { name: String },

    #[error("Booking not found: {booking_id}")]
    BookingNotFound { booking_id: BookingId },

    #[error("Storage error on {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for TrekDesk operations
pub type Result<T> = std::result::Result<T, TrekError>;

/// Coarse error categories exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input, or an operation the current state rejects
    Validation,
    /// A referenced tourist, guide, attraction or booking is missing
    NotFound,
    /// Reading or writing a data file failed
    Persistence,
    Config,
}

impl TrekError {
    /// Shorthand for an [`TrekError::InvalidInput`]
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        TrekError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error with the file it happened on
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrekError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrekError::InvalidInput { .. }
            | TrekError::DuplicateUsername { .. }
            | TrekError::AttractionFull { .. }
            | TrekError::GuideUnavailable { .. }
            | TrekError::InvalidStateTransition { .. }
            | TrekError::CancellationWindowClosed { .. }
            | TrekError::ModificationWindowClosed { .. } => ErrorKind::Validation,
            TrekError::TouristNotFound { .. }
            | TrekError::GuideNotFound { .. }
            | TrekError::AttractionNotFound { .. }
            | TrekError::BookingNotFound { .. } => ErrorKind::NotFound,
            TrekError::Persistence { .. } => ErrorKind::Persistence,
            TrekError::Config(_) => ErrorKind::Config,
        }
    }

    /// Check if retrying the same call could succeed
    pub fn is_recoverable(&self) -> bool {
        match self.kind() {
            ErrorKind::Persistence => true,
            ErrorKind::Validation | ErrorKind::NotFound | ErrorKind::Config => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self.kind() {
            ErrorKind::Validation => ErrorSeverity::Info,
            ErrorKind::NotFound => ErrorSeverity::Warning,
            ErrorKind::Persistence => ErrorSeverity::Error,
            ErrorKind::Config => ErrorSeverity::Critical,
        }
    }
}

impl From<config::ConfigError> for TrekError {
    fn from(err: config::ConfigError) -> Self {
        TrekError::Config(err.to_string())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
