//! Test data helpers for creating requests and registrations

use chrono::NaiveDate;
use trekdesk::services::{Registration, TrekDesk};
use trekdesk::state::NewBooking;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn create_test_registration(username: &str) -> Registration {
    Registration {
        username: username.to_string(),
        password: "Namaste@2024".to_string(),
        full_name: "Test Trekker".to_string(),
        email: format!("{}@example.com", username),
        phone: "9801234567".to_string(),
    }
}

pub fn create_test_tourist(desk: &mut TrekDesk, username: &str) {
    desk.register_tourist(create_test_registration(username), "British")
        .expect("register tourist");
}

pub fn booking_request(tourist: &str, attraction: &str, guide: Option<&str>, trek_date: NaiveDate) -> NewBooking {
    NewBooking {
        tourist: tourist.to_string(),
        attraction: attraction.to_string(),
        guide: guide.map(str::to_string),
        trek_date,
    }
}
