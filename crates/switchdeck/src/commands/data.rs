use tracing::info;

use switchdeck_core::Command;

use super::helpers::{dispatch_or_report, open_store};

pub fn handle_clear_data_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store();
    let path = store.theme_store().path().to_path_buf();

    dispatch_or_report(&mut store, Command::ClearAllData, "clear data")?;

    println!("✅ All themes deleted");
    println!("   Removed: {}", path.display());
    info!(event = "cli.clear_data_completed", path = %path.display());
    Ok(())
}
