use clap::ArgMatches;
use tracing::info;

use super::helpers::{open_store, print_json, truncate};

pub fn handle_windows_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");

    info!(event = "cli.windows_started", json_output);

    let store = open_store();
    let windows = store.list_windows();

    if json_output {
        print_json(&windows)?;
    } else if windows.is_empty() {
        println!("No windows found.");
    } else {
        println!("{:>12}  {:>8}  Title", "Handle", "PID");
        for window in &windows {
            println!(
                "{:>12}  {:>8}  {}",
                window.hwnd,
                window.process_id,
                truncate(&window.title, 70)
            );
        }
    }

    info!(event = "cli.windows_completed", count = windows.len());
    Ok(())
}
