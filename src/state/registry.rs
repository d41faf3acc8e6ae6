//! In-memory registry of all entities
//!
//! The registry owns every collection. Bookings point at guides and
//! attractions by key, and every transition that touches more than one
//! entity is implemented here so both ends of a relationship change in the
//! same call. Each transition checks everything that can fail before it
//! mutates anything, so a rejected call leaves the registry untouched.

use std::collections::BTreeMap;
use chrono::NaiveDate;
use tracing::{debug, info};
use crate::models::{
    AssignOutcome, Attraction, Booking, BookingId, BookingStatus, Guide, RemoveOutcome, Tourist,
};
use crate::utils::errors::{Result, TrekError};
use crate::utils::logging;
use crate::utils::validation;

/// Whether a transition changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The booking was already in the requested state
    Unchanged,
}

/// Input for [`TrekRegistry::create_booking`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub tourist: String,
    pub attraction: String,
    pub guide: Option<String>,
    pub trek_date: NaiveDate,
}

/// Requested change of a booking's guide
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GuideChange {
    #[default]
    Keep,
    Set(String),
    Clear,
}

/// Input for [`TrekRegistry::update_booking`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingUpdate {
    pub trek_date: Option<NaiveDate>,
    pub guide: GuideChange,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TrekRegistry {
    tourists: Vec<Tourist>,
    guides: Vec<Guide>,
    attractions: Vec<Attraction>,
    bookings: BTreeMap<BookingId, Booking>,
    next_booking_id: u32,
}

impl TrekRegistry {
    pub fn new() -> Self {
        Self {
            tourists: Vec::new(),
            guides: Vec::new(),
            attractions: Vec::new(),
            bookings: BTreeMap::new(),
            next_booking_id: 1,
        }
    }

    /// Assemble a registry from loaded collections and rebuild derived state
    ///
    /// Guide ledgers are rebuilt by assigning every confirmed booking to its
    /// guide in booking id order. Attraction occupancy is recounted from the
    /// confirmed bookings, tourists' booking lists are rebuilt from the
    /// bookings, and the id sequence continues after the highest id.
    pub fn from_parts(
        tourists: Vec<Tourist>,
        guides: Vec<Guide>,
        attractions: Vec<Attraction>,
        bookings: Vec<Booking>,
    ) -> Self {
        let mut registry = Self {
            tourists,
            guides,
            attractions,
            bookings: bookings.into_iter().map(|b| (b.id, b)).collect(),
            next_booking_id: 1,
        };
        registry.rebuild_derived();
        registry
    }

    fn rebuild_derived(&mut self) {
        for guide in &mut self.guides {
            guide.clear_ledger();
        }
        for tourist in &mut self.tourists {
            tourist.booking_ids.clear();
        }
        for attraction in &mut self.attractions {
            attraction.booking_count = 0;
        }

        for booking in self.bookings.values() {
            if let Some(tourist) = find_mut(&mut self.tourists, &booking.tourist_username, Tourist::username) {
                tourist.add_booking(booking.id);
            }
            if booking.status != BookingStatus::Confirmed {
                continue;
            }
            // a file may hold more confirmed bookings than the capacity allows
            if let Some(attraction) = find_mut(&mut self.attractions, &booking.attraction_name, |a| a.name.as_str()) {
                attraction.booking_count += 1;
            }
            if let Some(username) = &booking.guide_username {
                if let Some(guide) = find_mut(&mut self.guides, username, Guide::username) {
                    guide.assign(booking);
                }
            }
        }

        self.next_booking_id = self
            .bookings
            .keys()
            .next_back()
            .map(|id| id.0 + 1)
            .unwrap_or(1)
            .max(self.next_booking_id);
        debug!(
            bookings = self.bookings.len(),
            next_booking_id = self.next_booking_id,
            "Derived state rebuilt"
        );
    }

    // ----- lookups -----

    pub fn tourists(&self) -> &[Tourist] {
        &self.tourists
    }

    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    pub fn attractions(&self) -> &[Attraction] {
        &self.attractions
    }

    /// Bookings in id order
    pub fn bookings(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.values()
    }

    /// Never hand out `id` or anything below it
    ///
    /// Used after a load so ids of records that were dropped, but are still
    /// in the data file, are not issued again.
    pub fn reserve_booking_ids_through(&mut self, id: BookingId) {
        self.next_booking_id = self.next_booking_id.max(id.0.saturating_add(1));
    }

    pub fn booking_count(&self) -> usize {
        self.bookings.len()
    }

    pub fn next_booking_id(&self) -> BookingId {
        BookingId(self.next_booking_id)
    }

    pub fn tourist(&self, username: &str) -> Option<&Tourist> {
        self.tourists.iter().find(|t| t.username() == username)
    }

    pub fn guide(&self, username: &str) -> Option<&Guide> {
        self.guides.iter().find(|g| g.username() == username)
    }

    pub fn attraction(&self, name: &str) -> Option<&Attraction> {
        self.attractions.iter().find(|a| a.name == name)
    }

    pub fn booking(&self, id: BookingId) -> Option<&Booking> {
        self.bookings.get(&id)
    }

    pub fn username_taken(&self, username: &str) -> bool {
        self.tourist(username).is_some() || self.guide(username).is_some()
    }

    pub fn bookings_for_tourist(&self, username: &str) -> Vec<&Booking> {
        self.bookings
            .values()
            .filter(|b| b.tourist_username == username)
            .collect()
    }

    pub fn bookings_for_guide(&self, username: &str) -> Vec<&Booking> {
        self.bookings
            .values()
            .filter(|b| b.guide_username.as_deref() == Some(username))
            .collect()
    }

    pub(crate) fn guide_mut(&mut self, username: &str) -> Result<&mut Guide> {
        find_mut(&mut self.guides, username, Guide::username)
            .ok_or_else(|| TrekError::GuideNotFound { username: username.to_string() })
    }

    // ----- entity registration -----

    pub fn add_tourist(&mut self, tourist: Tourist) -> Result<&Tourist> {
        if self.username_taken(tourist.username()) {
            return Err(TrekError::DuplicateUsername { username: tourist.username().to_string() });
        }
        self.tourists.push(tourist);
        Ok(&self.tourists[self.tourists.len() - 1])
    }

    pub fn add_guide(&mut self, guide: Guide) -> Result<&Guide> {
        if self.username_taken(guide.username()) {
            return Err(TrekError::DuplicateUsername { username: guide.username().to_string() });
        }
        self.guides.push(guide);
        Ok(&self.guides[self.guides.len() - 1])
    }

    pub fn add_attraction(&mut self, attraction: Attraction) -> Result<&Attraction> {
        if self.attraction(&attraction.name).is_some() {
            return Err(TrekError::invalid("attraction", format!("'{}' already exists", attraction.name)));
        }
        self.attractions.push(attraction);
        Ok(&self.attractions[self.attractions.len() - 1])
    }

    // ----- booking lifecycle -----

    /// Create a pending booking
    ///
    /// The trek date may not be in the past, the attraction must have
    /// room, and a chosen guide must be able to take another booking.
    pub fn create_booking(&mut self, request: NewBooking, today: NaiveDate) -> Result<&Booking> {
        let tourist_index = index_of(&self.tourists, &request.tourist, Tourist::username)
            .ok_or_else(|| TrekError::TouristNotFound { username: request.tourist.clone() })?;
        let attraction = self
            .attraction(&request.attraction)
            .ok_or_else(|| TrekError::AttractionNotFound { name: request.attraction.clone() })?;

        if request.trek_date < today {
            return Err(TrekError::invalid("trek_date", "Cannot book for past dates"));
        }
        if !attraction.is_available() {
            return Err(TrekError::AttractionFull { name: attraction.name.clone() });
        }
        if let Some(username) = &request.guide {
            let guide = self
                .guide(username)
                .ok_or_else(|| TrekError::GuideNotFound { username: username.clone() })?;
            if !guide.can_take_booking() {
                return Err(TrekError::GuideUnavailable { username: username.clone() });
            }
        }

        let id = BookingId(self.next_booking_id);
        let booking = Booking::new(
            id,
            &request.tourist,
            request.guide.as_deref(),
            attraction,
            request.trek_date,
            today,
        );
        self.next_booking_id += 1;
        self.tourists[tourist_index].add_booking(id);

        logging::log_booking_action(id, "create", &request.tourist, Some(&request.attraction));
        let booking = self.bookings.entry(id).or_insert(booking);
        Ok(&*booking)
    }

    /// Pending → Confirmed: occupy a spot and credit the guide
    pub fn confirm_booking(&mut self, id: BookingId) -> Result<Transition> {
        let booking = self.bookings.get_mut(&id).ok_or(TrekError::BookingNotFound { booking_id: id })?;
        if booking.status != BookingStatus::Pending {
            debug!(booking_id = %id, status = %booking.status, "Confirm ignored, booking not pending");
            return Ok(Transition::Unchanged);
        }

        let attraction_index = index_of(&self.attractions, &booking.attraction_name, |a| a.name.as_str())
            .ok_or_else(|| TrekError::AttractionNotFound { name: booking.attraction_name.clone() })?;
        if !self.attractions[attraction_index].is_available() {
            return Err(TrekError::AttractionFull { name: booking.attraction_name.clone() });
        }
        let guide_index = match &booking.guide_username {
            Some(username) => {
                let index = index_of(&self.guides, username, Guide::username)
                    .ok_or_else(|| TrekError::GuideNotFound { username: username.clone() })?;
                if !self.guides[index].can_take_booking() {
                    return Err(TrekError::GuideUnavailable { username: username.clone() });
                }
                Some(index)
            }
            None => None,
        };

        booking.status = BookingStatus::Confirmed;
        self.attractions[attraction_index].increment_bookings();
        if let Some(index) = guide_index {
            let guide = &mut self.guides[index];
            if guide.assign(booking) == AssignOutcome::Assigned {
                logging::log_guide_ledger(guide.username(), id, "assign", guide.earnings());
            }
        }

        logging::log_booking_action(id, "confirm", &booking.tourist_username, None);
        Ok(Transition::Applied)
    }

    /// Pending/Confirmed → Cancelled, only outside the cancellation window
    ///
    /// Occupancy is released only for a confirmed booking, since a pending
    /// one never took a spot.
    pub fn cancel_booking(&mut self, id: BookingId, today: NaiveDate) -> Result<Transition> {
        let booking = self.bookings.get_mut(&id).ok_or(TrekError::BookingNotFound { booking_id: id })?;
        if !booking.is_active() {
            return Err(TrekError::InvalidStateTransition {
                booking_id: id,
                status: booking.status,
                action: "cancel",
            });
        }
        if !booking.can_be_cancelled(today) {
            return Err(TrekError::CancellationWindowClosed { booking_id: id, trek_date: booking.trek_date });
        }

        let was_confirmed = booking.status == BookingStatus::Confirmed;
        booking.status = BookingStatus::Cancelled;
        if was_confirmed {
            if let Some(attraction) = find_mut(&mut self.attractions, &booking.attraction_name, |a| a.name.as_str()) {
                attraction.decrement_bookings();
            }
        }
        detach_guide(&mut self.guides, booking);

        logging::log_booking_action(id, "cancel", &booking.tourist_username, None);
        Ok(Transition::Applied)
    }

    /// Confirmed → Completed: the trek happened, the booking stops being active
    pub fn complete_booking(&mut self, id: BookingId) -> Result<Transition> {
        let booking = self.bookings.get_mut(&id).ok_or(TrekError::BookingNotFound { booking_id: id })?;
        match booking.status {
            BookingStatus::Completed => return Ok(Transition::Unchanged),
            BookingStatus::Confirmed => {}
            status => {
                return Err(TrekError::InvalidStateTransition { booking_id: id, status, action: "complete" });
            }
        }

        booking.status = BookingStatus::Completed;
        if let Some(attraction) = find_mut(&mut self.attractions, &booking.attraction_name, |a| a.name.as_str()) {
            attraction.decrement_bookings();
        }
        detach_guide(&mut self.guides, booking);

        logging::log_booking_action(id, "complete", &booking.tourist_username, None);
        Ok(Transition::Applied)
    }

    /// Change trek date, guide or notes of an active booking
    ///
    /// The old guide is detached before the change and the new one attached
    /// after the price is recomputed, so the ledger always holds the
    /// commission of the booking's current price.
    pub fn update_booking(&mut self, id: BookingId, update: BookingUpdate, today: NaiveDate) -> Result<Transition> {
        let booking = self.bookings.get(&id).ok_or(TrekError::BookingNotFound { booking_id: id })?;
        if !booking.is_active() {
            return Err(TrekError::InvalidStateTransition { booking_id: id, status: booking.status, action: "update" });
        }
        if !booking.can_be_modified(today) {
            return Err(TrekError::ModificationWindowClosed { booking_id: id, trek_date: booking.trek_date });
        }
        if let Some(date) = update.trek_date {
            if date < today {
                return Err(TrekError::invalid("trek_date", "Cannot update to a past date"));
            }
        }
        if let Some(notes) = &update.notes {
            validation::validate_free_text("notes", notes)?;
        }

        let attraction_index = index_of(&self.attractions, &booking.attraction_name, |a| a.name.as_str())
            .ok_or_else(|| TrekError::AttractionNotFound { name: booking.attraction_name.clone() })?;
        let new_guide = match &update.guide {
            GuideChange::Keep => booking.guide_username.clone(),
            GuideChange::Clear => None,
            GuideChange::Set(username) => {
                let guide = self
                    .guide(username)
                    .ok_or_else(|| TrekError::GuideNotFound { username: username.clone() })?;
                let already_holds = booking.guide_username.as_deref() == Some(username.as_str());
                if !already_holds && !guide.can_take_booking() {
                    return Err(TrekError::GuideUnavailable { username: username.clone() });
                }
                Some(username.clone())
            }
        };

        let Some(booking) = self.bookings.get_mut(&id) else {
            return Err(TrekError::BookingNotFound { booking_id: id });
        };
        detach_guide(&mut self.guides, booking);

        if let Some(date) = update.trek_date {
            booking.trek_date = date;
        }
        booking.guide_username = new_guide;
        if let Some(notes) = update.notes {
            booking.notes = notes;
        }
        booking.reprice(&self.attractions[attraction_index]);

        if booking.status == BookingStatus::Confirmed {
            attach_guide(&mut self.guides, booking);
        }

        info!(
            booking_id = %id,
            trek_date = %booking.trek_date,
            guide = ?booking.guide_username,
            total_price = booking.total_price,
            "Booking updated"
        );
        Ok(Transition::Applied)
    }

    pub fn set_notes(&mut self, id: BookingId, notes: &str) -> Result<&Booking> {
        validation::validate_free_text("notes", notes)?;
        let booking = self.bookings.get_mut(&id).ok_or(TrekError::BookingNotFound { booking_id: id })?;
        booking.notes = notes.to_string();
        debug!(booking_id = %id, "Booking notes updated");
        Ok(&*booking)
    }

    /// Drop a booking from the collection entirely, releasing what it held
    pub fn remove_booking(&mut self, id: BookingId) -> Result<Booking> {
        let booking = self.bookings.remove(&id).ok_or(TrekError::BookingNotFound { booking_id: id })?;
        if booking.status == BookingStatus::Confirmed {
            if let Some(attraction) = find_mut(&mut self.attractions, &booking.attraction_name, |a| a.name.as_str()) {
                attraction.decrement_bookings();
            }
        }
        detach_guide(&mut self.guides, &booking);
        if let Some(tourist) = find_mut(&mut self.tourists, &booking.tourist_username, Tourist::username) {
            tourist.booking_ids.retain(|b| *b != id);
        }
        logging::log_booking_action(id, "remove", &booking.tourist_username, None);
        Ok(booking)
    }
}

impl Default for TrekRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn index_of<T>(items: &[T], key: &str, key_of: impl Fn(&T) -> &str) -> Option<usize> {
    items.iter().position(|item| key_of(item) == key)
}

fn find_mut<'a, T>(items: &'a mut [T], key: &str, key_of: impl Fn(&T) -> &str) -> Option<&'a mut T> {
    items.iter_mut().find(|item| key_of(&**item) == key)
}

fn detach_guide(guides: &mut [Guide], booking: &Booking) {
    let Some(username) = &booking.guide_username else { return };
    if let Some(guide) = find_mut(guides, username, Guide::username) {
        if guide.remove(booking) == RemoveOutcome::Removed {
            logging::log_guide_ledger(guide.username(), booking.id, "remove", guide.earnings());
        }
    }
}

fn attach_guide(guides: &mut [Guide], booking: &Booking) {
    let Some(username) = &booking.guide_username else { return };
    if let Some(guide) = find_mut(guides, username, Guide::username) {
        if guide.assign(booking) == AssignOutcome::Assigned {
            logging::log_guide_ledger(guide.username(), booking.id, "assign", guide.earnings());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::models::Identity;
    use crate::services::pricing;
    use crate::storage::seed;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2030, 3, 1)
    }

    fn tourist(username: &str) -> Tourist {
        Tourist::new(
            Identity {
                username: username.to_string(),
                password: "Namaste@2024".to_string(),
                full_name: "Alice Walker".to_string(),
                email: format!("{}@mail.com", username),
                phone: "9801234567".to_string(),
            },
            "British",
        )
    }

    fn registry() -> TrekRegistry {
        TrekRegistry::from_parts(
            vec![tourist("alice"), tourist("bob")],
            seed::default_guides(),
            seed::default_attractions(20),
            Vec::new(),
        )
    }

    fn request(attraction: &str, guide: Option<&str>, trek_date: NaiveDate) -> NewBooking {
        NewBooking {
            tourist: "alice".to_string(),
            attraction: attraction.to_string(),
            guide: guide.map(str::to_string),
            trek_date,
        }
    }

    fn book(registry: &mut TrekRegistry, guide: Option<&str>, trek_date: NaiveDate) -> BookingId {
        registry
            .create_booking(request("Annapurna Circuit", guide, trek_date), today())
            .unwrap()
            .id
    }

    #[test]
    fn test_festival_booking_with_guide() {
        let mut registry = registry();
        let id = registry
            .create_booking(request("Everest Base Camp", Some("guide1"), date(2030, 9, 15)), today())
            .unwrap()
            .id;

        let booking = registry.booking(id).unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.festival_discount_applied);
        assert!((booking.total_price - 1248.0).abs() < 1e-9);
        assert_eq!(booking.booking_date, today());
        assert_eq!(registry.tourist("alice").unwrap().booking_ids, vec![id]);

        assert_eq!(registry.confirm_booking(id).unwrap(), Transition::Applied);
        assert_eq!(registry.attraction("Everest Base Camp").unwrap().booking_count, 1);
        let guide = registry.guide("guide1").unwrap();
        assert!(guide.is_assigned(id));
        assert!((guide.earnings() - 374.4).abs() < 1e-9);
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut registry = registry();
        let first = book(&mut registry, None, date(2030, 4, 1));
        let second = book(&mut registry, None, date(2030, 4, 2));
        assert_eq!(first, BookingId(1));
        assert_eq!(second, BookingId(2));
        assert_eq!(registry.next_booking_id(), BookingId(3));
    }

    #[test]
    fn test_create_rejections() {
        let mut registry = registry();

        let err = registry.create_booking(request("Everest Base Camp", None, date(2030, 2, 28)), today());
        assert_matches!(err, Err(TrekError::InvalidInput { field, .. }) if field == "trek_date");

        let err = registry.create_booking(request("Nowhere", None, date(2030, 4, 1)), today());
        assert_matches!(err, Err(TrekError::AttractionNotFound { .. }));

        let err = registry.create_booking(request("Everest Base Camp", Some("ghost"), date(2030, 4, 1)), today());
        assert_matches!(err, Err(TrekError::GuideNotFound { .. }));

        let mut stranger = request("Everest Base Camp", None, date(2030, 4, 1));
        stranger.tourist = "carol".to_string();
        assert_matches!(registry.create_booking(stranger, today()), Err(TrekError::TouristNotFound { .. }));

        assert_eq!(registry.booking_count(), 0);
        assert_eq!(registry.next_booking_id(), BookingId(1));
    }

    #[test]
    fn test_booking_on_trek_day_is_allowed() {
        let mut registry = registry();
        assert!(registry.create_booking(request("Annapurna Circuit", None, today()), today()).is_ok());
    }

    #[test]
    fn test_repeated_confirm_is_unchanged() {
        let mut registry = registry();
        let id = book(&mut registry, Some("guide1"), date(2030, 4, 1));

        registry.confirm_booking(id).unwrap();
        let earnings = registry.guide("guide1").unwrap().earnings();
        assert_eq!(registry.confirm_booking(id).unwrap(), Transition::Unchanged);

        assert_eq!(registry.attraction("Annapurna Circuit").unwrap().booking_count, 1);
        assert_eq!(registry.guide("guide1").unwrap().earnings(), earnings);
        assert_eq!(registry.guide("guide1").unwrap().assigned_bookings().len(), 1);
    }

    #[test]
    fn test_confirm_when_full_changes_nothing() {
        let mut registry = TrekRegistry::from_parts(
            vec![tourist("alice")],
            seed::default_guides(),
            seed::default_attractions(1),
            Vec::new(),
        );
        let first = book(&mut registry, None, date(2030, 4, 1));
        let second = book(&mut registry, Some("guide2"), date(2030, 4, 2));
        registry.confirm_booking(first).unwrap();

        assert_matches!(registry.confirm_booking(second), Err(TrekError::AttractionFull { .. }));
        assert_eq!(registry.booking(second).unwrap().status, BookingStatus::Pending);
        assert_eq!(registry.attraction("Annapurna Circuit").unwrap().booking_count, 1);
        assert!(registry.guide("guide2").unwrap().assigned_bookings().is_empty());

        let err = registry.create_booking(request("Annapurna Circuit", None, date(2030, 4, 3)), today());
        assert_matches!(err, Err(TrekError::AttractionFull { .. }));
    }

    #[test]
    fn test_guide_capacity_blocks_new_bookings() {
        let mut registry = registry();
        for day in 1..=5 {
            let id = book(&mut registry, Some("guide1"), date(2030, 5, day));
            registry.confirm_booking(id).unwrap();
        }
        assert!(!registry.guide("guide1").unwrap().can_take_booking());

        let err = registry.create_booking(request("Annapurna Circuit", Some("guide1"), date(2030, 5, 20)), today());
        assert_matches!(err, Err(TrekError::GuideUnavailable { .. }));
    }

    #[test]
    fn test_cancel_window() {
        let mut registry = registry();
        let near = book(&mut registry, Some("guide1"), today() + chrono::Duration::days(7));
        let far = book(&mut registry, Some("guide1"), today() + chrono::Duration::days(8));
        registry.confirm_booking(near).unwrap();
        registry.confirm_booking(far).unwrap();

        assert_matches!(
            registry.cancel_booking(near, today()),
            Err(TrekError::CancellationWindowClosed { .. })
        );
        assert_eq!(registry.booking(near).unwrap().status, BookingStatus::Confirmed);

        assert_eq!(registry.cancel_booking(far, today()).unwrap(), Transition::Applied);
        assert_eq!(registry.booking(far).unwrap().status, BookingStatus::Cancelled);
        assert_eq!(registry.attraction("Annapurna Circuit").unwrap().booking_count, 1);

        let guide = registry.guide("guide1").unwrap();
        assert_eq!(guide.assigned_bookings(), &[near]);
        let near_total = registry.booking(near).unwrap().total_price;
        assert!((guide.earnings() - pricing::guide_commission(near_total)).abs() < 1e-9);

        assert_matches!(
            registry.cancel_booking(far, today()),
            Err(TrekError::InvalidStateTransition { action: "cancel", .. })
        );
    }

    #[test]
    fn test_cancel_pending_keeps_occupancy() {
        let mut registry = registry();
        let confirmed = book(&mut registry, None, date(2030, 6, 1));
        let pending = book(&mut registry, Some("guide2"), date(2030, 6, 2));
        registry.confirm_booking(confirmed).unwrap();

        registry.cancel_booking(pending, today()).unwrap();
        assert_eq!(registry.attraction("Annapurna Circuit").unwrap().booking_count, 1);
        assert_eq!(registry.guide("guide2").unwrap().earnings(), 0.0);
    }

    #[test]
    fn test_complete_releases_guide_and_spot() {
        let mut registry = registry();
        let id = book(&mut registry, Some("guide2"), date(2030, 6, 1));

        assert_matches!(
            registry.complete_booking(id),
            Err(TrekError::InvalidStateTransition { status: BookingStatus::Pending, .. })
        );

        registry.confirm_booking(id).unwrap();
        assert_eq!(registry.complete_booking(id).unwrap(), Transition::Applied);
        assert_eq!(registry.complete_booking(id).unwrap(), Transition::Unchanged);

        assert_eq!(registry.attraction("Annapurna Circuit").unwrap().booking_count, 0);
        let guide = registry.guide("guide2").unwrap();
        assert!(guide.assigned_bookings().is_empty());
        assert_eq!(guide.earnings(), 0.0);
        assert_eq!(registry.bookings_for_guide("guide2").len(), 1);
    }

    #[test]
    fn test_update_moves_guide_and_reprices() {
        let mut registry = registry();
        let id = book(&mut registry, Some("guide1"), date(2030, 6, 1));
        registry.confirm_booking(id).unwrap();

        let update = BookingUpdate {
            trek_date: Some(date(2030, 9, 1)),
            guide: GuideChange::Set("guide2".to_string()),
            notes: Some("Vegetarian meals".to_string()),
        };
        assert_eq!(registry.update_booking(id, update, today()).unwrap(), Transition::Applied);

        let booking = registry.booking(id).unwrap();
        assert!(booking.festival_discount_applied);
        assert!((booking.total_price - (640.0 + 192.0)).abs() < 1e-9);
        assert_eq!(booking.notes, "Vegetarian meals");

        assert_eq!(registry.guide("guide1").unwrap().earnings(), 0.0);
        assert!(registry.guide("guide1").unwrap().assigned_bookings().is_empty());
        let guide2 = registry.guide("guide2").unwrap();
        assert!(guide2.is_assigned(id));
        assert!((guide2.earnings() - pricing::guide_commission(832.0)).abs() < 1e-9);
    }

    #[test]
    fn test_update_same_guide_tracks_new_price() {
        let mut registry = registry();
        let id = book(&mut registry, Some("guide1"), date(2030, 6, 1));
        registry.confirm_booking(id).unwrap();

        let update = BookingUpdate {
            trek_date: Some(date(2030, 10, 5)),
            guide: GuideChange::Set("guide1".to_string()),
            ..Default::default()
        };
        registry.update_booking(id, update, today()).unwrap();

        let total = registry.booking(id).unwrap().total_price;
        let guide = registry.guide("guide1").unwrap();
        assert_eq!(guide.assigned_bookings(), &[id]);
        assert!((guide.earnings() - pricing::guide_commission(total)).abs() < 1e-9);
    }

    #[test]
    fn test_update_clear_guide_on_pending() {
        let mut registry = registry();
        let id = book(&mut registry, Some("guide1"), date(2030, 6, 1));
        let update = BookingUpdate { guide: GuideChange::Clear, ..Default::default() };
        registry.update_booking(id, update, today()).unwrap();

        let booking = registry.booking(id).unwrap();
        assert!(!booking.has_guide());
        assert!((booking.total_price - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_rejections_leave_booking_untouched() {
        let mut registry = registry();
        let near = book(&mut registry, Some("guide1"), today() + chrono::Duration::days(3));
        let far = book(&mut registry, Some("guide1"), date(2030, 6, 1));
        let before = registry.booking(far).unwrap().clone();

        let err = registry.update_booking(near, BookingUpdate::default(), today());
        assert_matches!(err, Err(TrekError::ModificationWindowClosed { .. }));

        let past = BookingUpdate { trek_date: Some(date(2030, 2, 1)), ..Default::default() };
        assert_matches!(registry.update_booking(far, past, today()), Err(TrekError::InvalidInput { .. }));

        let ghost = BookingUpdate { guide: GuideChange::Set("ghost".to_string()), ..Default::default() };
        assert_matches!(registry.update_booking(far, ghost, today()), Err(TrekError::GuideNotFound { .. }));

        let notes = BookingUpdate { notes: Some("a%%%b".to_string()), ..Default::default() };
        assert_matches!(registry.update_booking(far, notes, today()), Err(TrekError::InvalidInput { .. }));

        assert_eq!(registry.booking(far).unwrap(), &before);
    }

    #[test]
    fn test_set_notes() {
        let mut registry = registry();
        let id = book(&mut registry, None, date(2030, 6, 1));
        assert_eq!(registry.set_notes(id, "Arriving late").unwrap().notes, "Arriving late");
        assert!(registry.set_notes(id, "line\nbreak").is_err());
        assert_matches!(registry.set_notes(BookingId(99), "x"), Err(TrekError::BookingNotFound { .. }));
    }

    #[test]
    fn test_remove_booking_releases_everything() {
        let mut registry = registry();
        let id = book(&mut registry, Some("guide1"), date(2030, 6, 1));
        registry.confirm_booking(id).unwrap();

        let removed = registry.remove_booking(id).unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(registry.attraction("Annapurna Circuit").unwrap().booking_count, 0);
        assert_eq!(registry.guide("guide1").unwrap().earnings(), 0.0);
        assert!(registry.tourist("alice").unwrap().booking_ids.is_empty());
    }

    #[test]
    fn test_usernames_unique_across_roles() {
        let mut registry = registry();
        assert_matches!(registry.add_tourist(tourist("guide1")), Err(TrekError::DuplicateUsername { .. }));
        let mut guide = seed::default_guides().remove(0);
        guide.identity.username = "alice".to_string();
        assert_matches!(registry.add_guide(guide), Err(TrekError::DuplicateUsername { .. }));
        assert!(registry.add_tourist(tourist("carol")).is_ok());
    }

    #[test]
    fn test_attraction_names_unique() {
        let mut registry = registry();
        let duplicate = seed::default_attractions(20).remove(0);
        assert_matches!(registry.add_attraction(duplicate), Err(TrekError::InvalidInput { .. }));

        let langtang = Attraction::new(
            "Langtang Valley",
            "Langtang",
            crate::models::AltitudeLevel::Medium,
            crate::models::Difficulty::Medium,
            650.0,
        );
        assert_eq!(registry.add_attraction(langtang).unwrap().spots_left(), 20);
        assert_eq!(registry.attractions().len(), 4);
    }

    #[test]
    fn test_from_parts_rebuilds_ledger() {
        let mut attractions = seed::default_attractions(20);
        attractions[0].booking_count = 7;
        let annapurna = &attractions[1];
        let mut confirmed = Booking::new(BookingId(4), "alice", Some("guide1"), annapurna, date(2030, 6, 1), today());
        confirmed.status = BookingStatus::Confirmed;
        let pending = Booking::new(BookingId(9), "bob", Some("guide1"), annapurna, date(2030, 6, 2), today());

        let registry = TrekRegistry::from_parts(
            vec![tourist("alice"), tourist("bob")],
            seed::default_guides(),
            attractions.clone(),
            vec![pending, confirmed.clone()],
        );

        let guide = registry.guide("guide1").unwrap();
        assert_eq!(guide.assigned_bookings(), &[BookingId(4)]);
        assert!((guide.earnings() - pricing::guide_commission(confirmed.total_price)).abs() < 1e-9);
        assert_eq!(registry.tourist("bob").unwrap().booking_ids, vec![BookingId(9)]);
        assert_eq!(registry.next_booking_id(), BookingId(10));
        let ids: Vec<BookingId> = registry.bookings().map(|b| b.id).collect();
        assert_eq!(ids, vec![BookingId(4), BookingId(9)]);

        assert_eq!(registry.attraction("Everest Base Camp").unwrap().booking_count, 0);
        assert_eq!(registry.attraction("Annapurna Circuit").unwrap().booking_count, 1);
    }

    #[test]
    fn test_reserved_ids_are_skipped() {
        let mut registry = registry();
        registry.reserve_booking_ids_through(BookingId(12));
        registry.reserve_booking_ids_through(BookingId(3));
        assert_eq!(registry.next_booking_id(), BookingId(13));
        assert_eq!(book(&mut registry, None, date(2030, 4, 1)), BookingId(13));
    }

    mod ledger_properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Create { guide: Option<usize>, offset: i64 },
            Confirm(u32),
            Cancel(u32),
            Complete(u32),
            Reassign { id: u32, guide: Option<usize>, offset: i64 },
        }

        const GUIDES: [&str; 2] = ["guide1", "guide2"];

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (proptest::option::of(0..2usize), 0..300i64).prop_map(|(guide, offset)| Op::Create { guide, offset }),
                (1..12u32).prop_map(Op::Confirm),
                (1..12u32).prop_map(Op::Cancel),
                (1..12u32).prop_map(Op::Complete),
                (1..12u32, proptest::option::of(0..2usize), 0..300i64)
                    .prop_map(|(id, guide, offset)| Op::Reassign { id, guide, offset }),
            ]
        }

        fn apply(registry: &mut TrekRegistry, op: Op) {
            let today = today();
            let _ = match op {
                Op::Create { guide, offset } => registry
                    .create_booking(
                        NewBooking {
                            tourist: "alice".to_string(),
                            attraction: "Everest Base Camp".to_string(),
                            guide: guide.map(|g| GUIDES[g].to_string()),
                            trek_date: today + chrono::Duration::days(offset),
                        },
                        today,
                    )
                    .map(|_| Transition::Applied),
                Op::Confirm(id) => registry.confirm_booking(BookingId(id)),
                Op::Cancel(id) => registry.cancel_booking(BookingId(id), today),
                Op::Complete(id) => registry.complete_booking(BookingId(id)),
                Op::Reassign { id, guide, offset } => {
                    let update = BookingUpdate {
                        trek_date: Some(today + chrono::Duration::days(offset)),
                        guide: match guide {
                            Some(g) => GuideChange::Set(GUIDES[g].to_string()),
                            None => GuideChange::Clear,
                        },
                        notes: None,
                    };
                    registry.update_booking(BookingId(id), update, today)
                }
            };
        }

        proptest! {
            #[test]
            fn earnings_match_confirmed_bookings(ops in proptest::collection::vec(op(), 0..40)) {
                let mut registry = registry();
                for op in ops {
                    apply(&mut registry, op);
                }

                for name in GUIDES {
                    let guide = registry.guide(name).unwrap();
                    let mut expected: Vec<BookingId> = registry
                        .bookings()
                        .filter(|b| b.status == BookingStatus::Confirmed && b.guide_username.as_deref() == Some(name))
                        .map(|b| b.id)
                        .collect();
                    let mut assigned = guide.assigned_bookings().to_vec();
                    expected.sort();
                    assigned.sort();
                    prop_assert_eq!(&assigned, &expected);
                    prop_assert!(assigned.len() <= crate::models::MAX_ACTIVE_BOOKINGS);

                    let owed: f64 = expected
                        .iter()
                        .map(|id| pricing::guide_commission(registry.booking(*id).unwrap().total_price))
                        .sum();
                    prop_assert!((guide.earnings() - owed).abs() < 1e-6);
                }

                let confirmed = registry.bookings().filter(|b| b.status == BookingStatus::Confirmed).count();
                let everest = registry.attraction("Everest Base Camp").unwrap();
                prop_assert_eq!(everest.booking_count as usize, confirmed);
            }
        }
    }
}
