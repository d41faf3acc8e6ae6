//! State management module
//!
//! This module holds the in-memory registry that owns every entity
//! collection and applies booking transitions.

pub mod registry;

pub use registry::{TrekRegistry, Transition, NewBooking, BookingUpdate, GuideChange};
