use switchdeck_core::init_logging;

mod app;
mod commands;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = app::build_cli();
    let matches = app.get_matches();

    // Structured logs only when asked for; stdout carries command output.
    let quiet = matches.get_flag("quiet") || !matches.get_flag("verbose");
    init_logging(quiet);

    commands::run_command(&matches)?;

    Ok(())
}
