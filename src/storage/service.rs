//! Storage service layer
//!
//! This module provides a high-level interface over the four data files:
//! seeding, loading the whole registry with its cross-references resolved,
//! and saving individual collections.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use crate::config::Settings;
use crate::models::{Attraction, Booking, Guide, MAX_ACTIVE_BOOKINGS};
use crate::state::TrekRegistry;
use crate::storage::codec::DecodeContext;
use crate::storage::repositories::{
    AttractionRepository, BookingRepository, DiagnosticKind, GuideRepository, LoadDiagnostic, Loaded,
    TouristRepository,
};
use crate::storage::seed;
use crate::utils::errors::{Result, TrekError};
use crate::utils::logging;

/// One of the persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tourists,
    Guides,
    Attractions,
    Bookings,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Tourists,
        Collection::Guides,
        Collection::Attractions,
        Collection::Bookings,
    ];
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Tourists => write!(f, "tourists"),
            Collection::Guides => write!(f, "guides"),
            Collection::Attractions => write!(f, "attractions"),
            Collection::Bookings => write!(f, "bookings"),
        }
    }
}

/// Diagnostics gathered while loading the registry, per collection
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub tourists: Vec<LoadDiagnostic>,
    pub guides: Vec<LoadDiagnostic>,
    pub attractions: Vec<LoadDiagnostic>,
    pub bookings: Vec<LoadDiagnostic>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> usize {
        self.tourists.len() + self.guides.len() + self.attractions.len() + self.bookings.len()
    }

    /// Number of records that were skipped entirely
    pub fn dropped(&self) -> usize {
        [&self.tourists, &self.guides, &self.attractions, &self.bookings]
            .iter()
            .flat_map(|diagnostics| diagnostics.iter())
            .filter(|d| d.dropped())
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct StorageService {
    data_dir: PathBuf,
    default_capacity: u32,
    pub tourists: TouristRepository,
    pub guides: GuideRepository,
    pub attractions: AttractionRepository,
    pub bookings: BookingRepository,
}

impl StorageService {
    pub fn new(data_dir: impl Into<PathBuf>, ctx: DecodeContext) -> Self {
        let data_dir = data_dir.into();
        Self {
            tourists: TouristRepository::new(&data_dir, ctx),
            guides: GuideRepository::new(&data_dir, ctx),
            attractions: AttractionRepository::new(&data_dir, ctx),
            bookings: BookingRepository::new(&data_dir, ctx),
            default_capacity: ctx.default_capacity,
            data_dir,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.storage.data_dir.clone(),
            DecodeContext { default_capacity: settings.booking.default_capacity },
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the data directory and write default attractions and guides
    /// for whichever of those files does not exist yet
    pub fn initialize_data_files(&self) -> Result<Vec<Collection>> {
        fs::create_dir_all(&self.data_dir).map_err(|e| TrekError::persistence(&self.data_dir, e))?;

        let mut seeded = Vec::new();
        if !self.attractions.exists() {
            self.attractions.save(&seed::default_attractions(self.default_capacity))?;
            seeded.push(Collection::Attractions);
        }
        if !self.guides.exists() {
            self.guides.save(&seed::default_guides())?;
            seeded.push(Collection::Guides);
        }

        if !seeded.is_empty() {
            info!(data_dir = %self.data_dir.display(), seeded = ?seeded, "Default data written");
        }
        Ok(seeded)
    }

    /// Load bookings and resolve their guide and attraction keys
    ///
    /// A booking whose attraction is unknown is dropped; one whose guide is
    /// unknown is kept without a guide.
    pub fn load_bookings(&self, guides: &[Guide], attractions: &[Attraction]) -> Result<Loaded<Booking>> {
        let loaded = self.bookings.load()?;
        Ok(resolve_bookings(loaded, guides, attractions))
    }

    /// Load all four collections into a registry
    ///
    /// Attractions and guides are loaded first so bookings can be resolved
    /// against them. Bad records are reported in the [`LoadReport`]; only an
    /// unreadable file fails the whole load. Occupancy and guide ledgers are
    /// rebuilt from the confirmed bookings, and any disagreement with the
    /// files is reported as well.
    pub fn load_registry(&self) -> Result<(TrekRegistry, LoadReport)> {
        let attractions = self.attractions.load()?;
        let guides = self.guides.load()?;
        let raw_bookings = self.bookings.load()?;
        // Dropped bookings still occupy their id in the file
        let highest_id = raw_bookings.records.iter().map(|b| b.id).max();
        let bookings = resolve_bookings(raw_bookings, &guides.records, &attractions.records);
        let tourists = self.tourists.load()?;

        let stored_occupancy: Vec<(usize, String, u32)> = attractions
            .with_lines()
            .map(|(line, a)| (line, a.name.clone(), a.booking_count))
            .collect();
        let guide_lines: Vec<(usize, String)> = guides
            .with_lines()
            .map(|(line, g)| (line, g.username().to_string()))
            .collect();

        let mut report = LoadReport {
            tourists: tourists.diagnostics,
            guides: guides.diagnostics,
            attractions: attractions.diagnostics,
            bookings: bookings.diagnostics,
        };
        let mut registry = TrekRegistry::from_parts(
            tourists.records,
            guides.records,
            attractions.records,
            bookings.records,
        );
        if let Some(id) = highest_id {
            registry.reserve_booking_ids_through(id);
        }

        for (line, name, stored) in stored_occupancy {
            let Some(attraction) = registry.attraction(&name) else { continue };
            if attraction.booking_count != stored {
                let diagnostic = LoadDiagnostic {
                    line,
                    kind: DiagnosticKind::OccupancyMismatch,
                    message: format!(
                        "attraction '{}' stored {} bookings but {} are confirmed, recounted",
                        name, stored, attraction.booking_count
                    ),
                };
                logging::log_load_diagnostic("attractions", &diagnostic);
                report.attractions.push(diagnostic);
            }
        }

        for (line, username) in guide_lines {
            let Some(guide) = registry.guide(&username) else { continue };
            let held = guide.assigned_bookings().len();
            if held > MAX_ACTIVE_BOOKINGS {
                let diagnostic = LoadDiagnostic {
                    line,
                    kind: DiagnosticKind::GuideOverbooked,
                    message: format!(
                        "guide '{}' holds {} confirmed bookings, limit is {}",
                        username, held, MAX_ACTIVE_BOOKINGS
                    ),
                };
                logging::log_load_diagnostic("guides", &diagnostic);
                report.guides.push(diagnostic);
            }
        }

        if report.is_clean() {
            info!(
                tourists = registry.tourists().len(),
                guides = registry.guides().len(),
                attractions = registry.attractions().len(),
                bookings = registry.booking_count(),
                "Registry loaded"
            );
        } else {
            warn!(
                diagnostics = report.total(),
                dropped = report.dropped(),
                bookings = registry.booking_count(),
                next_booking_id = %registry.next_booking_id(),
                "Registry loaded with problems"
            );
        }
        Ok((registry, report))
    }

    /// Rewrite one collection's file from the registry
    pub fn save(&self, registry: &TrekRegistry, collection: Collection) -> Result<usize> {
        match collection {
            Collection::Tourists => self.tourists.save(registry.tourists()),
            Collection::Guides => self.guides.save(registry.guides()),
            Collection::Attractions => self.attractions.save(registry.attractions()),
            Collection::Bookings => self.bookings.save(registry.bookings()),
        }
    }

    pub fn save_all(&self, registry: &TrekRegistry) -> Result<()> {
        for collection in Collection::ALL {
            self.save(registry, collection)?;
        }
        Ok(())
    }
}

fn resolve_bookings(loaded: Loaded<Booking>, guides: &[Guide], attractions: &[Attraction]) -> Loaded<Booking> {
    let guide_keys: HashSet<&str> = guides.iter().map(Guide::username).collect();
    let attraction_keys: HashSet<&str> = attractions.iter().map(|a| a.name.as_str()).collect();

    let mut resolved = Loaded {
        records: Vec::with_capacity(loaded.records.len()),
        lines: Vec::with_capacity(loaded.lines.len()),
        diagnostics: loaded.diagnostics,
    };

    for (line, mut booking) in loaded.lines.into_iter().zip(loaded.records) {
        if !attraction_keys.contains(booking.attraction_name.as_str()) {
            let diagnostic = LoadDiagnostic {
                line,
                kind: DiagnosticKind::UnresolvedAttraction,
                message: format!(
                    "booking {} references unknown attraction '{}', record dropped",
                    booking.id, booking.attraction_name
                ),
            };
            logging::log_load_diagnostic("bookings", &diagnostic);
            resolved.diagnostics.push(diagnostic);
            continue;
        }

        if let Some(username) = booking.guide_username.take() {
            if guide_keys.contains(username.as_str()) {
                booking.guide_username = Some(username);
            } else {
                let diagnostic = LoadDiagnostic {
                    line,
                    kind: DiagnosticKind::UnresolvedGuide,
                    message: format!(
                        "booking {} references unknown guide '{}', guide cleared",
                        booking.id, username
                    ),
                };
                logging::log_load_diagnostic("bookings", &diagnostic);
                resolved.diagnostics.push(diagnostic);
            }
        }
        resolved.push(line, booking);
    }
    resolved
}
