//! Flat-file repositories
//!
//! One repository per data file. Loading reads the whole file and decodes
//! it line by line; bad lines are reported and skipped. Saving regenerates
//! the whole file from the given records.

pub mod tourist;
pub mod guide;
pub mod attraction;
pub mod booking;

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;
use crate::storage::codec::{self, DecodeContext, Record};
use crate::utils::errors::{Result, TrekError};
use crate::utils::logging;

pub type TouristRepository = FlatFileRepository<crate::models::Tourist>;
pub type GuideRepository = FlatFileRepository<crate::models::Guide>;
pub type AttractionRepository = FlatFileRepository<crate::models::Attraction>;
pub type BookingRepository = FlatFileRepository<crate::models::Booking>;

/// Why a line was skipped or a record altered during a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Wrong field count or an unparsable field
    MalformedRecord,
    /// Key already seen earlier in the same file
    DuplicateKey,
    /// Booking names an attraction that does not exist; record dropped
    UnresolvedAttraction,
    /// Booking names a guide that does not exist; guide cleared
    UnresolvedGuide,
    /// Stored occupancy disagrees with the confirmed bookings; recounted
    OccupancyMismatch,
    /// More confirmed bookings name a guide than the guide may hold; all kept
    GuideOverbooked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadDiagnostic {
    /// 1-based line number in the data file
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl LoadDiagnostic {
    /// Whether the record was dropped rather than loaded with changes
    pub fn dropped(&self) -> bool {
        matches!(
            self.kind,
            DiagnosticKind::MalformedRecord | DiagnosticKind::DuplicateKey | DiagnosticKind::UnresolvedAttraction
        )
    }
}

/// Records decoded from one file plus what went wrong along the way
#[derive(Debug, Clone)]
pub struct Loaded<R> {
    pub records: Vec<R>,
    /// 1-based source line of each record, parallel to `records`
    pub lines: Vec<usize>,
    pub diagnostics: Vec<LoadDiagnostic>,
}

impl<R> Loaded<R> {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            lines: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn push(&mut self, line: usize, record: R) {
        self.lines.push(line);
        self.records.push(record);
    }

    /// Records paired with the line they were read from
    pub fn with_lines(&self) -> impl Iterator<Item = (usize, &R)> {
        self.lines.iter().copied().zip(self.records.iter())
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Repository over one data file holding records of type `R`
#[derive(Debug, Clone)]
pub struct FlatFileRepository<R> {
    path: PathBuf,
    ctx: DecodeContext,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> FlatFileRepository<R> {
    pub fn new(data_dir: &Path, ctx: DecodeContext) -> Self {
        Self {
            path: data_dir.join(format!("{}.dat", R::COLLECTION)),
            ctx,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load every decodable record; a missing file is an empty collection
    pub fn load(&self) -> Result<Loaded<R>> {
        if !self.path.exists() {
            debug!(collection = R::COLLECTION, path = %self.path.display(), "Data file missing, starting empty");
            return Ok(Loaded::empty());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            logging::log_store_operation("load", R::COLLECTION, 0, false);
            TrekError::persistence(&self.path, e)
        })?;

        let mut loaded = Loaded::empty();
        let mut seen = HashSet::new();
        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let diagnostic = match codec::decode_line::<R>(line, &self.ctx) {
                Ok(record) => {
                    let key = record.key();
                    if seen.insert(key.clone()) {
                        loaded.push(index + 1, record);
                        continue;
                    }
                    LoadDiagnostic {
                        line: index + 1,
                        kind: DiagnosticKind::DuplicateKey,
                        message: format!("duplicate key '{}', keeping the first record", key),
                    }
                }
                Err(reason) => LoadDiagnostic {
                    line: index + 1,
                    kind: DiagnosticKind::MalformedRecord,
                    message: reason,
                },
            };
            logging::log_load_diagnostic(R::COLLECTION, &diagnostic);
            loaded.diagnostics.push(diagnostic);
        }

        logging::log_store_operation("load", R::COLLECTION, loaded.records.len(), true);
        Ok(loaded)
    }

    /// Rewrite the whole file from `records`
    ///
    /// Lines are written to a temporary sibling first and renamed over the
    /// target, so a failure leaves the previous contents in place.
    pub fn save<'a, I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a R>,
        R: 'a,
    {
        let mut body = String::new();
        let mut count = 0;
        for record in records {
            body.push_str(&codec::encode_line(record)?);
            body.push('\n');
            count += 1;
        }

        self.write_atomically(body.as_bytes()).map_err(|e| {
            logging::log_store_operation("save", R::COLLECTION, count, false);
            TrekError::persistence(&self.path, e)
        })?;

        logging::log_store_operation("save", R::COLLECTION, count, true);
        Ok(count)
    }

    fn write_atomically(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("dat.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)
    }
}
