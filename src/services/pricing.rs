//! Trek pricing and guide commission
//!
//! Pure functions. The festival discount takes 20% off the attraction's
//! base price; an attached guide adds a 30% commission on top of that,
//! and the same 30% of the booking total is credited to the guide.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use crate::models::Attraction;

/// Fraction taken off the base price during festival season
pub const FESTIVAL_DISCOUNT_RATE: f64 = 0.20;

/// Guide commission as a fraction of the price
pub const GUIDE_COMMISSION_RATE: f64 = 0.30;

/// Festival season runs August through October
pub fn is_festival_season(date: NaiveDate) -> bool {
    matches!(date.month(), 8..=10)
}

pub fn attraction_price(attraction: &Attraction, festival: bool) -> f64 {
    let base = attraction.base_price.max(0.0);
    if festival {
        base * (1.0 - FESTIVAL_DISCOUNT_RATE)
    } else {
        base
    }
}

pub fn guide_commission(total_price: f64) -> f64 {
    total_price.max(0.0) * GUIDE_COMMISSION_RATE
}

/// Total charged to the tourist for a trek on `date`
pub fn booking_total(attraction: &Attraction, has_guide: bool, date: NaiveDate) -> f64 {
    let price = attraction_price(attraction, is_festival_season(date));
    if has_guide {
        price + guide_commission(price)
    } else {
        price
    }
}

/// Price breakdown shown before a booking is created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub attraction_price: f64,
    pub guide_fee: f64,
    pub total: f64,
    pub festival_discount: bool,
}

/// Preview of [`booking_total`], split into its parts
pub fn quote(attraction: &Attraction, has_guide: bool, date: NaiveDate) -> PriceQuote {
    let festival_discount = is_festival_season(date);
    let attraction_price = attraction_price(attraction, festival_discount);
    let guide_fee = if has_guide { guide_commission(attraction_price) } else { 0.0 };

    PriceQuote {
        attraction_price,
        guide_fee,
        total: booking_total(attraction, has_guide, date),
        festival_discount,
    }
}
