//! Tourist records
//!
//! `username, password, fullName, email, phone, nationality`. Booking ids
//! are not stored here; they are rebuilt from the bookings file.

use crate::models::{Identity, Tourist};
use crate::storage::codec::{DecodeContext, Record};

impl Record for Tourist {
    const COLLECTION: &'static str = "tourists";
    const FIELD_COUNTS: &'static [usize] = &[6];

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
            self.nationality.clone(),
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
        Ok(Tourist::new(identity, fields[5]))
    }
}
