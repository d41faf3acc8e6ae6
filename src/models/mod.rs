//! Data models module
//!
//! This module contains the booking domain entities and the rules that
//! only need the entity itself.

pub mod person;
pub mod tourist;
pub mod guide;
pub mod attraction;
pub mod booking;

// Re-export commonly used models
pub use person::{Identity, Person, Role};
pub use tourist::Tourist;
pub use guide::{Guide, AssignOutcome, RemoveOutcome, MAX_ACTIVE_BOOKINGS};
pub use attraction::{Attraction, AltitudeLevel, Difficulty};
pub use booking::{Booking, BookingId, BookingStatus};
