//! Booking desk service
//!
//! [`TrekDesk`] is the entry point the user interface talks to. It owns the
//! registry and the storage service, supplies "today" from its clock, logs
//! rejected operations and, when enabled, writes the affected collections
//! back to disk after every successful change.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};
use crate::config::Settings;
use crate::models::{Attraction, Booking, BookingId, Guide};
use crate::services::pricing::{self, PriceQuote};
use crate::state::{BookingUpdate, NewBooking, Transition, TrekRegistry};
use crate::storage::{Collection, LoadReport, StorageService};
use crate::utils::errors::{Result, TrekError};
use crate::utils::helpers::{Clock, SystemClock};
use crate::utils::logging;

/// A booking after a transition, and whether the transition did anything
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingChange {
    pub booking: Booking,
    #[serde(skip)]
    pub transition: Transition,
}

impl BookingChange {
    pub fn applied(&self) -> bool {
        self.transition == Transition::Applied
    }
}

pub struct TrekDesk {
    storage: StorageService,
    registry: TrekRegistry,
    clock: Box<dyn Clock>,
    auto_persist: bool,
    load_report: LoadReport,
}

impl TrekDesk {
    /// Load the registry from `storage` and wrap it in a desk
    pub fn open(storage: StorageService, clock: impl Clock + 'static, auto_persist: bool) -> Result<Self> {
        let (registry, load_report) = storage.load_registry()?;
        info!(
            data_dir = %storage.data_dir().display(),
            auto_persist = auto_persist,
            "Trek desk opened"
        );
        Ok(Self {
            storage,
            registry,
            clock: Box::new(clock),
            auto_persist,
            load_report,
        })
    }

    /// Open the desk described by `settings`, seeding default data first if enabled
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let storage = StorageService::from_settings(settings);
        if settings.storage.seed_defaults {
            storage.initialize_data_files()?;
        }
        Self::open(storage, SystemClock, settings.features.auto_persist)
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn registry(&self) -> &TrekRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut TrekRegistry {
        &mut self.registry
    }

    pub fn storage(&self) -> &StorageService {
        &self.storage
    }

    /// Diagnostics from the most recent load
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    // ----- listings -----

    pub fn list_attractions(&self) -> Vec<Attraction> {
        self.registry.attractions().to_vec()
    }

    pub fn list_guides(&self) -> Vec<Guide> {
        self.registry.guides().to_vec()
    }

    /// Guides that can take another booking right now
    pub fn available_guides(&self) -> Vec<Guide> {
        self.registry
            .guides()
            .iter()
            .filter(|g| g.can_take_booking())
            .cloned()
            .collect()
    }

    pub fn quote(&self, attraction: &str, with_guide: bool, trek_date: NaiveDate) -> Result<PriceQuote> {
        let attraction = self
            .registry
            .attraction(attraction)
            .ok_or_else(|| TrekError::AttractionNotFound { name: attraction.to_string() })?;
        Ok(pricing::quote(attraction, with_guide, trek_date))
    }

    /// All bookings made by a tourist, in id order
    pub fn load_bookings_for(&self, tourist: &str) -> Result<Vec<Booking>> {
        if self.registry.tourist(tourist).is_none() {
            return Err(TrekError::TouristNotFound { username: tourist.to_string() });
        }
        Ok(self.registry.bookings_for_tourist(tourist).into_iter().cloned().collect())
    }

    /// All bookings naming a guide, whatever their status
    pub fn bookings_for_guide(&self, guide: &str) -> Result<Vec<Booking>> {
        if self.registry.guide(guide).is_none() {
            return Err(TrekError::GuideNotFound { username: guide.to_string() });
        }
        Ok(self.registry.bookings_for_guide(guide).into_iter().cloned().collect())
    }

    // ----- booking lifecycle -----

    pub fn create_booking(&mut self, request: NewBooking) -> Result<Booking> {
        self.mutate("create_booking", &[Collection::Bookings], |registry, today| {
            registry.create_booking(request, today).cloned()
        })
    }

    pub fn confirm_booking(&mut self, id: BookingId) -> Result<BookingChange> {
        self.transition("confirm_booking", id, |registry, _| registry.confirm_booking(id))
    }

    pub fn cancel_booking(&mut self, id: BookingId) -> Result<BookingChange> {
        self.transition("cancel_booking", id, |registry, today| registry.cancel_booking(id, today))
    }

    pub fn complete_booking(&mut self, id: BookingId) -> Result<BookingChange> {
        self.transition("complete_booking", id, |registry, _| registry.complete_booking(id))
    }

    pub fn update_booking(&mut self, id: BookingId, update: BookingUpdate) -> Result<BookingChange> {
        self.transition("update_booking", id, |registry, today| registry.update_booking(id, update, today))
    }

    pub fn set_booking_notes(&mut self, id: BookingId, notes: &str) -> Result<Booking> {
        self.mutate("set_booking_notes", &[Collection::Bookings], |registry, _| {
            registry.set_notes(id, notes).cloned()
        })
    }

    // ----- persistence -----

    pub fn persist(&self, collection: Collection) -> Result<usize> {
        self.storage.save(&self.registry, collection)
    }

    pub fn persist_all(&self) -> Result<()> {
        self.storage.save_all(&self.registry)
    }

    /// Replace the in-memory state with what is on disk
    pub fn reload(&mut self) -> Result<&LoadReport> {
        let (registry, report) = self.storage.load_registry()?;
        self.registry = registry;
        self.load_report = report;
        Ok(&self.load_report)
    }

    pub(crate) fn auto_persist(&self, collections: &[Collection]) -> Result<()> {
        if !self.auto_persist {
            return Ok(());
        }
        for collection in collections {
            self.persist(*collection)?;
        }
        debug!(collections = ?collections, "Changes persisted");
        Ok(())
    }

    fn mutate<T>(
        &mut self,
        operation: &str,
        touched: &[Collection],
        apply: impl FnOnce(&mut TrekRegistry, NaiveDate) -> Result<T>,
    ) -> Result<T> {
        let today = self.clock.today();
        let value = apply(&mut self.registry, today).inspect_err(|e| logging::log_rejection(operation, e))?;
        self.auto_persist(touched)?;
        Ok(value)
    }

    /// Run a status transition; occupancy lives in the attractions file, so
    /// an applied transition rewrites it along with the bookings
    fn transition(
        &mut self,
        operation: &str,
        id: BookingId,
        apply: impl FnOnce(&mut TrekRegistry, NaiveDate) -> Result<Transition>,
    ) -> Result<BookingChange> {
        let today = self.clock.today();
        let transition = apply(&mut self.registry, today).inspect_err(|e| logging::log_rejection(operation, e))?;
        if transition == Transition::Applied {
            self.auto_persist(&[Collection::Bookings, Collection::Attractions])?;
        }

        let booking = self
            .registry
            .booking(id)
            .cloned()
            .ok_or(TrekError::BookingNotFound { booking_id: id })?;
        Ok(BookingChange { booking, transition })
    }
}

impl std::fmt::Debug for TrekDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrekDesk")
            .field("data_dir", &self.storage.data_dir())
            .field("today", &self.today())
            .field("auto_persist", &self.auto_persist)
            .field("bookings", &self.registry.booking_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::models::BookingStatus;
    use crate::storage::DecodeContext;
    use crate::utils::FixedClock;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 3, 1).unwrap()
    }

    fn open(dir: &std::path::Path, auto_persist: bool) -> TrekDesk {
        let storage = StorageService::new(dir, DecodeContext::default());
        storage.initialize_data_files().unwrap();
        TrekDesk::open(storage, FixedClock(today()), auto_persist).unwrap()
    }

    #[test]
    fn test_seeded_listings() {
        let dir = tempfile::tempdir().unwrap();
        let desk = open(dir.path(), false);
        assert_eq!(desk.list_attractions().len(), 3);
        assert_eq!(desk.list_guides().len(), 2);
        assert_eq!(desk.available_guides().len(), 2);
        assert!(desk.load_report().is_clean());
    }

    #[test]
    fn test_quote_matches_booking_total() {
        let dir = tempfile::tempdir().unwrap();
        let desk = open(dir.path(), false);
        let date = NaiveDate::from_ymd_opt(2030, 10, 2).unwrap();

        let quote = desk.quote("Everest Base Camp", true, date).unwrap();
        assert!((quote.attraction_price - 960.0).abs() < 1e-9);
        assert!((quote.guide_fee - 288.0).abs() < 1e-9);
        assert!((quote.total - 1248.0).abs() < 1e-9);
        assert!(quote.festival_discount);

        assert_matches!(desk.quote("K2", false, date), Err(TrekError::AttractionNotFound { .. }));
    }

    #[test]
    fn test_transitions_report_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut desk = open(dir.path(), true);
        let tourist = crate::models::Tourist::new(
            crate::models::Identity {
                username: "alice".to_string(),
                password: "Namaste@2024".to_string(),
                full_name: "Alice Walker".to_string(),
                email: "alice@mail.com".to_string(),
                phone: "9801234567".to_string(),
            },
            "British",
        );
        desk.registry_mut().add_tourist(tourist).unwrap();

        let booking = desk
            .create_booking(NewBooking {
                tourist: "alice".to_string(),
                attraction: "Pokhara Sightseeing".to_string(),
                guide: None,
                trek_date: NaiveDate::from_ymd_opt(2030, 5, 1).unwrap(),
            })
            .unwrap();

        let change = desk.confirm_booking(booking.id).unwrap();
        assert!(change.applied());
        assert_eq!(change.booking.status, BookingStatus::Confirmed);
        assert!(!desk.confirm_booking(booking.id).unwrap().applied());

        let change = desk.cancel_booking(booking.id).unwrap();
        assert_eq!(change.booking.status, BookingStatus::Cancelled);
        assert_matches!(
            desk.complete_booking(booking.id),
            Err(TrekError::InvalidStateTransition { .. })
        );
        assert_matches!(desk.cancel_booking(BookingId(42)), Err(TrekError::BookingNotFound { .. }));

        assert_eq!(desk.load_bookings_for("alice").unwrap().len(), 1);
        assert_matches!(desk.load_bookings_for("nobody"), Err(TrekError::TouristNotFound { .. }));
        assert!(desk.bookings_for_guide("guide1").unwrap().is_empty());
    }

    #[test]
    fn test_reload_discards_unsaved_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut desk = open(dir.path(), false);
        desk.update_guide_profile(
            "guide2",
            crate::services::account::GuideProfileUpdate { available: Some(false), ..Default::default() },
        )
        .unwrap();
        assert_eq!(desk.available_guides().len(), 1);

        let report = desk.reload().unwrap();
        assert!(report.is_clean());
        assert_eq!(desk.available_guides().len(), 2);

        desk.update_guide_profile(
            "guide2",
            crate::services::account::GuideProfileUpdate { available: Some(false), ..Default::default() },
        )
        .unwrap();
        desk.persist(Collection::Guides).unwrap();
        desk.reload().unwrap();
        assert_eq!(desk.available_guides().len(), 1);
    }
}
