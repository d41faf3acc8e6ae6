//! Shared account identity and the role-tagged person union

use serde::{Deserialize, Serialize};
use crate::models::{Guide, Tourist};

/// Identity fields common to every account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Tourist,
    Guide,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Tourist => write!(f, "Tourist"),
            Role::Guide => write!(f, "Guide"),
        }
    }
}

/// An account of either role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum Person {
    Tourist(Tourist),
    Guide(Guide),
}

impl Person {
    pub fn role(&self) -> Role {
        match self {
            Person::Tourist(_) => Role::Tourist,
            Person::Guide(_) => Role::Guide,
        }
    }

    pub fn identity(&self) -> &Identity {
        match self {
            Person::Tourist(tourist) => &tourist.identity,
            Person::Guide(guide) => &guide.identity,
        }
    }

    pub fn username(&self) -> &str {
        &self.identity().username
    }

    /// Check a login attempt against the stored credentials
    pub fn verify_password(&self, password: &str) -> bool {
        self.identity().password == password
    }
}

impl From<Tourist> for Person {
    fn from(tourist: Tourist) -> Self {
        Person::Tourist(tourist)
    }
}

impl From<Guide> for Person {
    fn from(guide: Guide) -> Self {
        Person::Guide(guide)
    }
}
