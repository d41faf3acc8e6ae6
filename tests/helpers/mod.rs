//! Test helpers module
//!
//! This module provides a temporary data directory with a pinned clock and
//! builders for the records the tests work with.

#![allow(dead_code)]

pub mod test_context;
pub mod test_data;

pub use test_context::*;
pub use test_data::*;
