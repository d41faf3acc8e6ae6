//! Attraction records
//!
//! `name, location, altitudeLevel, difficulty, basePrice` followed by the
//! optional `bookingCount, capacity`.

use crate::models::Attraction;
use crate::storage::codec::{parse_amount, parse_field, DecodeContext, Record};

impl Record for Attraction {
    const COLLECTION: &'static str = "attractions";
    const FIELD_COUNTS: &'static [usize] = &[5, 7];

    fn key(&self) -> String {
        self.name.clone()
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.location.clone(),
            self.altitude_level.to_string(),
            self.difficulty.to_string(),
            self.base_price.to_string(),
            self.booking_count.to_string(),
            self.capacity.to_string(),
        ]
    }

    fn from_fields(fields: &[&str], ctx: &DecodeContext) -> Result<Self, String> {
        if fields[0].is_empty() {
            return Err("empty attraction name".to_string());
        }
        let mut attraction = Attraction::new(
            fields[0],
            fields[1],
            parse_field("altitude level", fields[2])?,
            parse_field("difficulty", fields[3])?,
            parse_amount("base price", fields[4])?,
        )
        .with_capacity(ctx.default_capacity);

        if fields.len() == 7 {
            attraction.booking_count = parse_field("booking count", fields[5])?;
            attraction.capacity = parse_field("capacity", fields[6])?;
            if attraction.booking_count > attraction.capacity {
                return Err(format!(
                    "booking count {} exceeds capacity {}",
                    attraction.booking_count, attraction.capacity
                ));
            }
        }
        Ok(attraction)
    }
}
