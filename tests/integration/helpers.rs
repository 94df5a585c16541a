//! Shared test helpers for integration tests.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use planner_core::config::AppConfig;
use planner_core::traits::clock::FixedClock;
use planner_entity::{CreateOrder, CreateProtocol, CreateVendor, Frequency, OrderStatus};
use planner_service::{PlannerStore, ShareService};

/// One planner installation backed by a temporary data directory.
pub struct TestApp {
    /// Keeps the data directory alive for the test
    pub dir: TempDir,
    /// Application config pointing at `dir`
    pub config: AppConfig,
    /// Clock shared by the store and the share service
    pub clock: FixedClock,
}

impl TestApp {
    /// Create an installation with its own data directory and clock.
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        Self::with_clock(FixedClock::at_millis(start.timestamp_millis()))
    }

    /// Create an installation reading time from `clock`.
    pub fn with_clock(clock: FixedClock) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = AppConfig::default();
        config.storage.provider = "local".into();
        config.storage.data_dir = dir.path().join("data").to_string_lossy().into_owned();
        config.share.origin = "https://planner.example".into();
        Self { dir, config, clock }
    }

    /// Open the record store on this installation's data directory.
    pub async fn store(&self) -> PlannerStore {
        let backend = planner_storage::create_store(&self.config.storage)
            .await
            .expect("Failed to create backend");
        PlannerStore::open_with_clock(backend, Arc::new(self.clock.clone()))
            .await
            .expect("Failed to open store")
    }

    /// Share service using this installation's config and clock.
    pub fn share_service(&self) -> ShareService {
        ShareService::new(&self.config.share, Arc::new(self.clock.clone()))
    }

    /// Data directory path.
    pub fn data_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("data")
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn vendor(name: &str) -> CreateVendor {
    CreateVendor {
        name: name.into(),
        website: Some(format!("https://{}.example", name.to_lowercase().replace(' ', "-"))),
        rating: 4,
        ..Default::default()
    }
}

pub fn order(peptide: &str, quantity: u32, mg_per_vial: f64, status: OrderStatus) -> CreateOrder {
    CreateOrder {
        vendor_id: None,
        vendor_name: "Acme Labs".into(),
        peptide: peptide.into(),
        quantity,
        mg_per_vial,
        price: Some(45.0),
        status,
        ordered_on: date(2026, 2, 20),
        tracking_number: None,
        notes: None,
    }
}

pub fn protocol(peptide: &str, dose_mcg: f64, frequency: Frequency) -> CreateProtocol {
    CreateProtocol {
        name: format!("{peptide} cycle"),
        peptide: peptide.into(),
        dose_mcg,
        frequency,
        start_date: date(2026, 3, 2),
        end_date: None,
        notes: None,
    }
}
