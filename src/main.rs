//! TrekDesk
//!
//! Main application entry point

use anyhow::Context;
use serde_json::json;
use tracing::{info, warn};

use trekdesk::{
    config::Settings,
    services::TrekDesk,
    utils::helpers::{format_price, truncate_text},
    utils::logging,
};

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("loading settings")?;
    settings.validate().context("validating settings")?;

    if std::env::args().nth(1).as_deref() == Some("print-config") {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    // Initialize logging; the guard flushes the log file on exit
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", trekdesk::info());

    let desk = TrekDesk::from_settings(&settings)
        .with_context(|| format!("opening data directory {}", settings.storage.data_dir.display()))?;

    let report = desk.load_report();
    if !report.is_clean() {
        warn!(diagnostics = report.total(), dropped = report.dropped(), "Data files contain problems");
    }

    let attractions: Vec<_> = desk
        .list_attractions()
        .iter()
        .map(|a| {
            json!({
                "name": a.name,
                "location": a.location,
                "altitude": a.altitude_level.to_string(),
                "difficulty": a.difficulty.to_string(),
                "base_price": format_price(a.base_price),
                "high_altitude": a.is_high_altitude(),
                "spots_left": a.spots_left(),
            })
        })
        .collect();
    let guides: Vec<_> = desk
        .list_guides()
        .iter()
        .map(|g| {
            json!({
                "username": g.username(),
                "full_name": g.full_name(),
                "languages": g.languages,
                "experience_years": g.experience_years,
                "bio": truncate_text(&g.bio, 60),
                "available": g.can_take_booking(),
                "earnings": g.earnings(),
            })
        })
        .collect();

    let summary = json!({
        "today": desk.today().to_string(),
        "attractions": attractions,
        "guides": guides,
        "bookings": desk.registry().booking_count(),
        "load_diagnostics": report.total(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    info!("{} finished", trekdesk::NAME);
    Ok(())
}
