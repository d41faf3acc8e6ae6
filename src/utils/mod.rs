//! Utility modules
//!
//! This module contains common utilities used throughout the crate,
//! including error handling, logging setup, input validation and helpers.

pub mod errors;
pub mod logging;
pub mod helpers;
pub mod validation;

pub use errors::{TrekError, Result};
pub use helpers::{Clock, SystemClock, FixedClock};
