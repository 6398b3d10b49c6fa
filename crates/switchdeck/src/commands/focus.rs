use clap::ArgMatches;
use tracing::info;

use switchdeck_core::{AppRef, Command, Event};

use super::helpers::{dispatch_or_report, open_store};

fn report_minimize(success: bool, fallback_used: bool) {
    match (success, fallback_used) {
        (true, false) => println!("✅ Done"),
        (true, true) => println!("✅ Done (minimized applications one by one)"),
        (false, _) => println!("⚠️  Some windows could not be minimized"),
    }
}

pub fn handle_activate_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let id = matches
        .get_one::<String>("id")
        .ok_or("Theme id is required")?
        .clone();

    info!(event = "cli.activate_started", theme_id = %id);

    let mut store = open_store();
    let emitted = dispatch_or_report(&mut store, Command::ActivateTheme { id }, "activate theme")?;

    for event in emitted {
        if let Event::ThemeActivated {
            id,
            protected,
            success,
            fallback_used,
        } = event
        {
            println!("Theme {}: keeping {} application(s) on screen", id, protected);
            report_minimize(success, fallback_used);
            info!(event = "cli.activate_completed", theme_id = %id, success);
        }
    }
    Ok(())
}

pub fn handle_show_desktop_except_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let pids = matches
        .get_many::<u32>("pids")
        .into_iter()
        .flatten()
        .map(|&pid| AppRef::Process(pid));
    let windows = matches
        .get_many::<u64>("windows")
        .into_iter()
        .flatten()
        .map(|&hwnd| AppRef::Window(hwnd));
    let apps: Vec<AppRef> = windows.chain(pids).collect();

    info!(event = "cli.show_desktop_except_started", protected = apps.len());

    let mut store = open_store();
    let emitted = dispatch_or_report(
        &mut store,
        Command::ShowDesktopExcept { apps },
        "show desktop",
    )?;

    for event in emitted {
        if let Event::DesktopShown {
            success,
            fallback_used,
            ..
        } = event
        {
            report_minimize(success, fallback_used);
        }
    }
    Ok(())
}

pub fn handle_minimize_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let pids: Vec<u32> = matches
        .get_many::<u32>("pids")
        .ok_or("At least one process id is required")?
        .copied()
        .collect();

    let mut store = open_store();
    let emitted = dispatch_or_report(
        &mut store,
        Command::MinimizeProcesses { pids },
        "minimize processes",
    )?;

    for event in emitted {
        if let Event::ProcessesMinimized { count, success } = event {
            if success {
                println!("✅ Minimized {} process(es)", count);
            } else {
                println!("⚠️  Not every process could be minimized");
            }
        }
    }
    Ok(())
}

pub fn handle_restore_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store();
    let emitted = dispatch_or_report(&mut store, Command::RestoreThemes, "restore themes")?;

    for event in emitted {
        match event {
            Event::ThemeRestored { id } => println!("   Updated theme {}", id),
            Event::ThemesRestored { updated } => {
                println!("✅ {} theme(s) updated", updated);
                info!(event = "cli.restore_completed", updated);
            }
            _ => {}
        }
    }
    Ok(())
}
