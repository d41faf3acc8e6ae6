//! Default data written into an empty data directory

use crate::models::{AltitudeLevel, Attraction, Difficulty, Guide, Identity};

pub fn default_attractions(capacity: u32) -> Vec<Attraction> {
    vec![
        Attraction::new("Everest Base Camp", "Khumbu", AltitudeLevel::High, Difficulty::Hard, 1200.0),
        Attraction::new("Annapurna Circuit", "Annapurna", AltitudeLevel::High, Difficulty::Medium, 800.0),
        Attraction::new("Pokhara Sightseeing", "Pokhara", AltitudeLevel::Low, Difficulty::Easy, 150.0),
    ]
    .into_iter()
    .map(|attraction| attraction.with_capacity(capacity))
    .collect()
}

pub fn default_guides() -> Vec<Guide> {
    vec![
        guide("guide1", "Ram Sharma", "ram@guide.com", "1234567890", &["English", "Nepali"], 5),
        guide("guide2", "Sita Gurung", "sita@guide.com", "9876543210", &["English", "Hindi"], 3),
    ]
}

fn guide(username: &str, full_name: &str, email: &str, phone: &str, languages: &[&str], years: u32) -> Guide {
    let identity = Identity {
        username: username.to_string(),
        password: "password".to_string(),
        full_name: full_name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
    };
    Guide::new(identity, languages.iter().map(|l| l.to_string()).collect(), years)
}
