//! Tourist model

use serde::{Deserialize, Serialize};
use crate::models::{BookingId, Identity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tourist {
    pub identity: Identity,
    pub nationality: String,
    /// Bookings made by this tourist; rebuilt from the bookings file on load
    pub booking_ids: Vec<BookingId>,
}

impl Tourist {
    pub fn new(identity: Identity, nationality: &str) -> Self {
        Self {
            identity,
            nationality: nationality.to_string(),
            booking_ids: Vec::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.identity.username
    }

    /// Record a booking id, ignoring repeats
    pub fn add_booking(&mut self, booking_id: BookingId) {
        if !self.booking_ids.contains(&booking_id) {
            self.booking_ids.push(booking_id);
        }
    }
}
