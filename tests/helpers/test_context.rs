//! Test context for unified test setup
//!
//! Every context owns a fresh temporary data directory and a fixed "today",
//! so date-window rules behave the same on every run.

use std::fs;
use std::path::PathBuf;
use chrono::NaiveDate;
use tempfile::TempDir;
use trekdesk::config::Settings;
use trekdesk::storage::{DecodeContext, StorageService};
use trekdesk::utils::FixedClock;
use trekdesk::TrekDesk;

/// Test configuration options
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub seed_defaults: bool,
    pub auto_persist: bool,
    pub today: NaiveDate,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
            auto_persist: true,
            today: super::date(2030, 3, 1),
        }
    }
}

pub struct TestContext {
    pub temp_dir: TempDir,
    pub settings: Settings,
    pub config: TestConfig,
}

impl TestContext {
    pub fn new() -> Self {
        Self::new_with_config(TestConfig::default())
    }

    pub fn new_with_config(config: TestConfig) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let mut settings = Settings::default();
        settings.storage.data_dir = temp_dir.path().join("data");
        settings.storage.seed_defaults = config.seed_defaults;
        settings.features.auto_persist = config.auto_persist;

        Self { temp_dir, settings, config }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.settings.storage.data_dir.clone()
    }

    pub fn storage(&self) -> StorageService {
        StorageService::new(
            self.data_dir(),
            DecodeContext { default_capacity: self.settings.booking.default_capacity },
        )
    }

    /// Open a desk over the data directory, seeding it first when configured
    pub fn desk(&self) -> TrekDesk {
        let storage = self.storage();
        if self.config.seed_defaults {
            storage.initialize_data_files().expect("seed data files");
        }
        TrekDesk::open(storage, FixedClock(self.config.today), self.config.auto_persist).expect("open desk")
    }

    pub fn write_data_file(&self, collection: &str, content: &str) {
        fs::create_dir_all(self.data_dir()).expect("create data dir");
        fs::write(self.data_dir().join(format!("{}.dat", collection)), content).expect("write data file");
    }

    pub fn read_data_file(&self, collection: &str) -> String {
        fs::read_to_string(self.data_dir().join(format!("{}.dat", collection))).unwrap_or_default()
    }
}
