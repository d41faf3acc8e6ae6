//! Account service
//!
//! Registration of tourists and guides, sign-in, and guide profile
//! maintenance. Every field is checked with the rules in
//! [`crate::utils::validation`] before anything is added to the registry.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::models::{Guide, Identity, Person, Tourist};
use crate::services::desk::TrekDesk;
use crate::storage::Collection;
use crate::utils::errors::{Result, TrekError};
use crate::utils::logging;
use crate::utils::validation;

/// Identity fields entered on the registration form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

impl Registration {
    fn validate(&self) -> Result<()> {
        validation::validate_username(&self.username)?;
        validation::validate_password(&self.password)?;
        validation::validate_full_name(&self.full_name)?;
        validation::validate_email(&self.email)?;
        validation::validate_phone(&self.phone)?;
        Ok(())
    }

    fn into_identity(self) -> Identity {
        Identity {
            username: self.username,
            password: self.password,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
        }
    }
}

/// Changes to a guide's profile; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideProfileUpdate {
    pub bio: Option<String>,
    /// `Some("")` clears the image
    pub profile_image: Option<String>,
    pub available: Option<bool>,
    pub add_languages: Vec<String>,
    pub add_specializations: Vec<String>,
    pub experience_years: Option<u32>,
}

impl TrekDesk {
    pub fn register_tourist(&mut self, registration: Registration, nationality: &str) -> Result<Tourist> {
        let result = self.try_register_tourist(registration, nationality);
        if let Err(e) = &result {
            logging::log_rejection("register_tourist", e);
        }
        result
    }

    fn try_register_tourist(&mut self, registration: Registration, nationality: &str) -> Result<Tourist> {
        registration.validate()?;
        validation::validate_nationality(nationality)?;

        let tourist = Tourist::new(registration.into_identity(), nationality);
        let tourist = self.registry_mut().add_tourist(tourist)?.clone();
        self.auto_persist(&[Collection::Tourists])?;

        info!(username = %tourist.username(), nationality = %tourist.nationality, "Tourist registered");
        Ok(tourist)
    }

    pub fn register_guide(
        &mut self,
        registration: Registration,
        languages: Vec<String>,
        experience_years: u32,
    ) -> Result<Guide> {
        let result = self.try_register_guide(registration, languages, experience_years);
        if let Err(e) = &result {
            logging::log_rejection("register_guide", e);
        }
        result
    }

    fn try_register_guide(
        &mut self,
        registration: Registration,
        languages: Vec<String>,
        experience_years: u32,
    ) -> Result<Guide> {
        registration.validate()?;
        let languages: Vec<String> = languages.into_iter().map(|l| l.trim().to_string()).collect();
        validation::validate_languages(&languages)?;
        validation::validate_experience(experience_years)?;

        let guide = Guide::new(registration.into_identity(), languages, experience_years);
        let guide = self.registry_mut().add_guide(guide)?.clone();
        self.auto_persist(&[Collection::Guides])?;

        info!(
            username = %guide.username(),
            languages = %guide.languages_string(),
            experience_years = guide.experience_years,
            "Guide registered"
        );
        Ok(guide)
    }

    /// Look up an account of either role
    pub fn find_person(&self, username: &str) -> Option<Person> {
        let registry = self.registry();
        registry
            .tourist(username)
            .cloned()
            .map(Person::from)
            .or_else(|| registry.guide(username).cloned().map(Person::from))
    }

    /// Check credentials and return the matching account
    ///
    /// Unknown usernames and wrong passwords are reported the same way.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Person> {
        match self.find_person(username) {
            Some(person) if person.verify_password(password) => {
                debug!(username = username, role = %person.role(), "Sign-in accepted");
                Ok(person)
            }
            _ => {
                warn!(username = username, "Sign-in rejected");
                Err(TrekError::invalid("credentials", "Invalid username or password"))
            }
        }
    }

    pub fn update_guide_profile(&mut self, username: &str, update: GuideProfileUpdate) -> Result<Guide> {
        let result = self.try_update_guide_profile(username, update);
        if let Err(e) = &result {
            logging::log_rejection("update_guide_profile", e);
        }
        result
    }

    fn try_update_guide_profile(&mut self, username: &str, update: GuideProfileUpdate) -> Result<Guide> {
        if let Some(bio) = &update.bio {
            validation::validate_free_text("bio", bio)?;
        }
        if let Some(image) = &update.profile_image {
            validation::validate_free_text("profile_image", image)?;
        }
        for language in &update.add_languages {
            validation::validate_list_item("languages", language.trim())?;
        }
        for specialization in &update.add_specializations {
            validation::validate_list_item("specializations", specialization.trim())?;
        }
        if let Some(years) = update.experience_years {
            validation::validate_experience(years)?;
        }

        let guide = self.registry_mut().guide_mut(username)?;
        if let Some(bio) = &update.bio {
            guide.set_bio(bio);
        }
        if let Some(image) = update.profile_image {
            guide.profile_image = if image.trim().is_empty() { None } else { Some(image) };
        }
        if let Some(available) = update.available {
            guide.available = available;
        }
        for language in &update.add_languages {
            guide.add_language(language);
        }
        for specialization in &update.add_specializations {
            guide.add_specialization(specialization);
        }
        if let Some(years) = update.experience_years {
            guide.experience_years = years;
        }
        let guide = guide.clone();
        self.auto_persist(&[Collection::Guides])?;

        info!(username = username, available = guide.available, "Guide profile updated");
        Ok(guide)
    }
}
