//! Booking records
//!
//! `bookingId, touristUsername, guideUsername, attractionName, trekDate,
//! status, totalPrice, festivalDiscountApplied` followed by the optional
//! `bookingDate, notes`. The guide field is empty when no guide is set.
//! Guide and attraction are stored by key and resolved after loading.

use crate::models::{Booking, BookingId};
use crate::storage::codec::{format_date, parse_amount, parse_date, parse_field, DecodeContext, Record};

impl Record for Booking {
    const COLLECTION: &'static str = "bookings";
    const FIELD_COUNTS: &'static [usize] = &[8, 10];

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.tourist_username.clone(),
            self.guide_username.clone().unwrap_or_default(),
            self.attraction_name.clone(),
            format_date(self.trek_date),
            self.status.to_string(),
            self.total_price.to_string(),
            self.festival_discount_applied.to_string(),
            format_date(self.booking_date),
            self.notes.clone(),
        ]
    }

    fn from_fields(fields: &[&str], _ctx: &DecodeContext) -> Result<Self, String> {
        let id = BookingId(parse_field("booking id", fields[0])?);
        if fields[1].is_empty() {
            return Err("empty tourist username".to_string());
        }
        if fields[3].is_empty() {
            return Err("empty attraction name".to_string());
        }
        let trek_date = parse_date("trek date", fields[4])?;
        let (booking_date, notes) = if fields.len() == 10 {
            (parse_date("booking date", fields[8])?, fields[9].to_string())
        } else {
            // older lines carry no creation date
            (trek_date, String::new())
        };

        Ok(Booking {
            id,
            tourist_username: fields[1].to_string(),
            guide_username: Some(fields[2].to_string()).filter(|g| !g.is_empty()),
            attraction_name: fields[3].to_string(),
            booking_date,
            trek_date,
            status: parse_field("status", fields[5])?,
            total_price: parse_amount("total price", fields[6])?,
            festival_discount_applied: parse_field("festival flag", fields[7])?,
            notes,
        })
    }
}
