//! Flat-file storage module
//!
//! This module handles the data directory: the line codec, one repository
//! per collection and the service that loads and saves the whole registry.

pub mod codec;
pub mod repositories;
pub mod service;
pub mod seed;

pub use codec::{DecodeContext, Record, FIELD_DELIMITER};
pub use repositories::{
    AttractionRepository, BookingRepository, DiagnosticKind, GuideRepository, LoadDiagnostic, Loaded,
    TouristRepository,
};
pub use service::{Collection, LoadReport, StorageService};
