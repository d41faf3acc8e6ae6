//! Guide model and its booking ledger
//!
//! A guide keeps the ids of the bookings assigned to it and a running
//! earnings figure. Earnings only move through [`Guide::assign`] and
//! [`Guide::remove`], each adjusting by the commission of the booking's
//! current total price.

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::models::{Booking, BookingId, Identity};
use crate::services::pricing;

/// Maximum number of bookings a guide can hold at once
pub const MAX_ACTIVE_BOOKINGS: usize = 5;

pub const DEFAULT_BIO: &str = "Tell us something about yourself!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub identity: Identity,
    pub languages: Vec<String>,
    pub experience_years: u32,
    pub specializations: Vec<String>,
    earnings: f64,
    assigned_bookings: Vec<BookingId>,
    pub available: bool,
    pub bio: String,
    pub profile_image: Option<String>,
}

/// Result of [`Guide::assign`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    Assigned,
    AlreadyAssigned,
}

/// Result of [`Guide::remove`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotAssigned,
}

impl Guide {
    pub fn new(identity: Identity, languages: Vec<String>, experience_years: u32) -> Self {
        Self {
            identity,
            languages,
            experience_years,
            specializations: Vec::new(),
            earnings: 0.0,
            assigned_bookings: Vec::new(),
            available: true,
            bio: DEFAULT_BIO.to_string(),
            profile_image: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.identity.username
    }

    pub fn full_name(&self) -> &str {
        &self.identity.full_name
    }

    pub fn earnings(&self) -> f64 {
        self.earnings
    }

    pub fn assigned_bookings(&self) -> &[BookingId] {
        &self.assigned_bookings
    }

    pub fn is_assigned(&self, booking_id: BookingId) -> bool {
        self.assigned_bookings.contains(&booking_id)
    }

    pub fn can_take_booking(&self) -> bool {
        self.available && self.assigned_bookings.len() < MAX_ACTIVE_BOOKINGS
    }

    /// Attach a booking and credit its commission
    pub fn assign(&mut self, booking: &Booking) -> AssignOutcome {
        if self.is_assigned(booking.id) {
            return AssignOutcome::AlreadyAssigned;
        }

        let commission = pricing::guide_commission(booking.total_price);
        self.assigned_bookings.push(booking.id);
        self.earnings += commission;
        debug!(
            guide = %self.identity.username,
            booking_id = %booking.id,
            commission = commission,
            earnings = self.earnings,
            "Booking assigned to guide"
        );
        AssignOutcome::Assigned
    }

    /// Detach a booking and reverse its commission, never going below zero
    pub fn remove(&mut self, booking: &Booking) -> RemoveOutcome {
        let Some(position) = self.assigned_bookings.iter().position(|id| *id == booking.id) else {
            return RemoveOutcome::NotAssigned;
        };

        let commission = pricing::guide_commission(booking.total_price);
        self.assigned_bookings.remove(position);
        self.earnings = (self.earnings - commission).max(0.0);
        debug!(
            guide = %self.identity.username,
            booking_id = %booking.id,
            commission = commission,
            earnings = self.earnings,
            "Booking removed from guide"
        );
        RemoveOutcome::Removed
    }

    /// Drop every assignment; used before rebuilding the ledger from bookings
    pub fn clear_ledger(&mut self) {
        self.assigned_bookings.clear();
        self.earnings = 0.0;
    }

    pub fn add_language(&mut self, language: &str) {
        let language = language.trim();
        if !language.is_empty() && !self.languages.iter().any(|l| l == language) {
            self.languages.push(language.to_string());
        }
    }

    pub fn add_specialization(&mut self, specialization: &str) {
        let specialization = specialization.trim();
        if !specialization.is_empty() && !self.specializations.iter().any(|s| s == specialization) {
            self.specializations.push(specialization.to_string());
        }
    }

    /// Set the bio; blank text restores the default prompt
    pub fn set_bio(&mut self, bio: &str) {
        self.bio = if bio.trim().is_empty() {
            DEFAULT_BIO.to_string()
        } else {
            bio.to_string()
        };
    }

    pub fn languages_string(&self) -> String {
        self.languages.join(", ")
    }

    pub fn primary_specialization(&self) -> &str {
        self.specializations.first().map(String::as_str).unwrap_or("General Guide")
    }
}
