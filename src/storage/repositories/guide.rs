//! Guide records
//!
//! `username, password, fullName, email, phone, languages, experienceYears`
//! followed by the optional `specializations, available, bio, profileImage`.
//! Lists are comma-joined. Earnings and assignments are not stored; they
//! are rebuilt from confirmed bookings after a load.

use crate::models::{Guide, Identity};
use crate::storage::codec::{parse_field, DecodeContext, Record};
use crate::utils::helpers::parse_comma_list;

impl Record for Guide {
    const COLLECTION: &'static str = "guides";
    const FIELD_COUNTS: &'static [usize] = &[7, 11];

    fn key(&self) -> String {
        self.identity.username.clone()
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.identity.username.clone(),
            self.identity.password.clone(),
            self.identity.full_name.clone(),
            self.identity.email.clone(),
            self.identity.phone.clone(),
            self.languages.join(","),
            self.experience_years.to_string(),
            self.specializations.join(","),
            self.available.to_string(),
            self.bio.clone(),
            self.profile_image.clone().unwrap_or_default(),
        ]
    }

    fn from_fields(fields: &[&str], _ctx: &DecodeContext) -> Result<Self, String> {
        if fields[0].is_empty() {
            return Err("empty username".to_string());
        }
        let identity = Identity {
            username: fields[0].to_string(),
            password: fields[1].to_string(),
            full_name: fields[2].to_string(),
            email: fields[3].to_string(),
            phone: fields[4].to_string(),
        };
        let experience_years: u32 = parse_field("experience years", fields[6])?;
        let mut guide = Guide::new(identity, parse_comma_list(fields[5]), experience_years);

        if fields.len() == 11 {
            guide.specializations = parse_comma_list(fields[7]);
            guide.available = parse_field("availability", fields[8])?;
            guide.bio = fields[9].to_string();
            guide.profile_image = Some(fields[10].to_string()).filter(|path| !path.is_empty());
        }
        Ok(guide)
    }
}
