//! Attraction model

use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::services::pricing;

/// Default number of confirmed bookings an attraction accepts
pub const DEFAULT_CAPACITY: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltitudeLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    pub location: String,
    pub altitude_level: AltitudeLevel,
    pub difficulty: Difficulty,
    pub base_price: f64,
    /// Occupancy: number of currently confirmed bookings
    pub booking_count: u32,
    pub capacity: u32,
}

impl Attraction {
    pub fn new(
        name: &str,
        location: &str,
        altitude_level: AltitudeLevel,
        difficulty: Difficulty,
        base_price: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            location: location.to_string(),
            altitude_level,
            difficulty,
            base_price: base_price.max(0.0),
            booking_count: 0,
            capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Price for one trek, with the festival discount when requested
    pub fn calculate_price(&self, festival: bool) -> f64 {
        pricing::attraction_price(self, festival)
    }

    pub fn is_available(&self) -> bool {
        self.booking_count < self.capacity
    }

    pub fn is_high_altitude(&self) -> bool {
        self.altitude_level == AltitudeLevel::High
    }

    pub fn spots_left(&self) -> u32 {
        self.capacity.saturating_sub(self.booking_count)
    }

    /// Returns false when the attraction is already at capacity
    pub fn increment_bookings(&mut self) -> bool {
        if !self.is_available() {
            return false;
        }
        self.booking_count += 1;
        true
    }

    pub fn decrement_bookings(&mut self) {
        self.booking_count = self.booking_count.saturating_sub(1);
    }
}

impl std::fmt::Display for AltitudeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AltitudeLevel::Low => write!(f, "Low"),
            AltitudeLevel::Medium => write!(f, "Medium"),
            AltitudeLevel::High => write!(f, "High"),
        }
    }
}

impl FromStr for AltitudeLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(AltitudeLevel::Low),
            "Medium" => Ok(AltitudeLevel::Medium),
            "High" => Ok(AltitudeLevel::High),
            other => Err(format!("unknown altitude level '{}'", other)),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}
