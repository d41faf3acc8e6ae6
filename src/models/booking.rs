//! Booking model
//!
//! Bookings reference their guide and attraction by key. The transitions
//! that also touch those entities live in [`crate::state::TrekRegistry`];
//! this module only holds the booking's own data and predicates.

use std::str::FromStr;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use crate::models::Attraction;
use crate::services::pricing;

/// Bookings inside this many days of the trek cannot be cancelled
pub const CANCELLATION_WINDOW_DAYS: i64 = 7;

/// Bookings inside this many days of the trek cannot be modified
pub const MODIFICATION_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub u32);

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Pending and Confirmed bookings are active
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub tourist_username: String,
    pub guide_username: Option<String>,
    pub attraction_name: String,
    pub booking_date: NaiveDate,
    pub trek_date: NaiveDate,
    pub status: BookingStatus,
    pub total_price: f64,
    pub festival_discount_applied: bool,
    pub notes: String,
}

impl Booking {
    /// Create a pending booking with its price derived from the inputs
    pub fn new(
        id: BookingId,
        tourist_username: &str,
        guide_username: Option<&str>,
        attraction: &Attraction,
        trek_date: NaiveDate,
        booking_date: NaiveDate,
    ) -> Self {
        let mut booking = Self {
            id,
            tourist_username: tourist_username.to_string(),
            guide_username: guide_username.map(str::to_string),
            attraction_name: attraction.name.clone(),
            booking_date,
            trek_date,
            status: BookingStatus::Pending,
            total_price: 0.0,
            festival_discount_applied: false,
            notes: String::new(),
        };
        booking.reprice(attraction);
        booking
    }

    /// Recompute the festival flag and total price from the current trek date and guide
    pub fn reprice(&mut self, attraction: &Attraction) {
        self.festival_discount_applied = pricing::is_festival_season(self.trek_date);
        self.total_price = pricing::booking_total(attraction, self.has_guide(), self.trek_date);
    }

    pub fn has_guide(&self) -> bool {
        self.guide_username.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.trek_date > today && self.is_active()
    }

    pub fn can_be_cancelled(&self, today: NaiveDate) -> bool {
        self.trek_date > today + Duration::days(CANCELLATION_WINDOW_DAYS) && self.is_active()
    }

    pub fn can_be_modified(&self, today: NaiveDate) -> bool {
        self.trek_date > today + Duration::days(MODIFICATION_WINDOW_DAYS) && self.is_active()
    }

    pub fn festival_discount_message(&self) -> &'static str {
        if self.festival_discount_applied {
            "Festival Discount Applied! (Dashain & Tihar Season - 20% OFF)"
        } else {
            ""
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "Pending"),
            BookingStatus::Confirmed => write!(f, "Confirmed"),
            BookingStatus::Cancelled => write!(f, "Cancelled"),
            BookingStatus::Completed => write!(f, "Completed"),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            "Completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}
