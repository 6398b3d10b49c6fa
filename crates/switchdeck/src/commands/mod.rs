use clap::ArgMatches;
use tracing::error;

use switchdeck_core::events;

pub mod helpers;

mod data;
mod focus;
mod processes;
mod themes;
mod windows;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let result = match matches.subcommand() {
        Some(("processes", sub_matches)) => processes::handle_processes_command(sub_matches),
        Some(("windows", sub_matches)) => windows::handle_windows_command(sub_matches),
        Some(("themes", sub_matches)) => themes::handle_themes_command(sub_matches),
        Some(("activate", sub_matches)) => focus::handle_activate_command(sub_matches),
        Some(("show-desktop-except", sub_matches)) => {
            focus::handle_show_desktop_except_command(sub_matches)
        }
        Some(("minimize", sub_matches)) => focus::handle_minimize_command(sub_matches),
        Some(("restore", _)) => focus::handle_restore_command(),
        Some(("clear-data", _)) => data::handle_clear_data_command(),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    events::log_app_shutdown();
    result
}
