//! Services module
//!
//! This module contains the pricing rules and the desk the user interface
//! calls into: bookings, accounts and guide profiles.

pub mod pricing;
pub mod desk;
pub mod account;

// Re-export commonly used services
pub use desk::{BookingChange, TrekDesk};
pub use account::{GuideProfileUpdate, Registration};
pub use pricing::PriceQuote;
