use clap::ArgMatches;
use tracing::{error, info};

use switchdeck_core::{Command, Event, Theme};

use super::helpers::{dispatch_or_report, open_store, print_json, truncate};

pub fn handle_themes_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("list", sub_matches)) => handle_list(sub_matches),
        Some(("add", sub_matches)) => handle_add(sub_matches),
        Some(("delete", sub_matches)) => handle_delete(sub_matches),
        Some(("add-window", sub_matches)) => handle_add_window(sub_matches),
        Some(("remove-window", sub_matches)) => handle_remove_window(sub_matches),
        Some(("add-process", sub_matches)) => handle_add_process(sub_matches),
        Some(("remove-process", sub_matches)) => handle_remove_process(sub_matches),
        _ => {
            error!(event = "cli.themes.command_unknown");
            Err("Unknown themes command".into())
        }
    }
}

fn theme_id(matches: &ArgMatches) -> Result<String, Box<dyn std::error::Error>> {
    Ok(matches
        .get_one::<String>("id")
        .ok_or("Theme id is required")?
        .clone())
}

fn handle_list(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.themes.list_started", json_output);

    let store = open_store();
    let themes = store.themes();

    if json_output {
        print_json(themes)?;
    } else if themes.is_empty() {
        println!("No themes yet. Create one with 'switchdeck themes add <name>'.");
    } else {
        println!(
            "{:<15}  {:<24}  {:<16}  {:>7}  {:>9}",
            "ID", "Name", "Shortcut", "Windows", "Processes"
        );
        for theme in themes {
            print_row(theme);
        }
    }

    info!(event = "cli.themes.list_completed", count = themes.len());
    Ok(())
}

fn print_row(theme: &Theme) {
    let shortcut = if theme.shortcut.is_empty() {
        "-"
    } else {
        theme.shortcut.as_str()
    };
    println!(
        "{:<15}  {:<24}  {:<16}  {:>7}  {:>9}",
        theme.id,
        truncate(&theme.name, 24),
        truncate(shortcut, 16),
        theme.windows.len(),
        theme.processes.len() + theme.persistent_processes.len()
    );
}

fn handle_add(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let name = matches
        .get_one::<String>("name")
        .ok_or("Theme name is required")?
        .clone();
    let shortcut = matches.get_one::<String>("shortcut").cloned();
    let color = matches.get_one::<String>("color").cloned();

    info!(event = "cli.themes.add_started", name = %name);

    let mut store = open_store();
    let emitted = dispatch_or_report(
        &mut store,
        Command::AddTheme {
            name,
            shortcut,
            color,
        },
        "add theme",
    )?;

    for event in emitted {
        if let Event::ThemeAdded { id, name } = event {
            println!("✅ Theme '{}' created", name);
            println!("   ID: {}", id);
            info!(event = "cli.themes.add_completed", theme_id = %id);
        }
    }
    Ok(())
}

fn handle_delete(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let id = theme_id(matches)?;
    let mut store = open_store();
    dispatch_or_report(&mut store, Command::DeleteTheme { id: id.clone() }, "delete theme")?;

    println!("✅ Theme '{}' deleted", id);
    info!(event = "cli.themes.delete_completed", theme_id = %id);
    Ok(())
}

fn handle_add_window(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let id = theme_id(matches)?;
    let hwnd = *matches
        .get_one::<u64>("hwnd")
        .ok_or("Window handle is required")?;

    let mut store = open_store();
    let Some(window) = store.list_windows().into_iter().find(|w| w.hwnd == hwnd) else {
        eprintln!("❌ Window {} is not open. Run 'switchdeck windows' to list handles.", hwnd);
        error!(event = "cli.themes.window_not_found", hwnd);
        return Err(format!("Window {} not found", hwnd).into());
    };

    let title = window.title.clone();
    let emitted = dispatch_or_report(
        &mut store,
        Command::AddWindowsToTheme {
            id: id.clone(),
            windows: vec![window],
        },
        "add window",
    )?;

    if emitted
        .iter()
        .any(|e| matches!(e, Event::WindowsAdded { changed: true, .. }))
    {
        println!("✅ Added '{}' to theme {}", title, id);
    } else {
        println!("Window '{}' is already in theme {}", title, id);
    }
    Ok(())
}

fn handle_remove_window(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let id = theme_id(matches)?;
    let hwnds: Vec<u64> = matches
        .get_many::<u64>("hwnd")
        .ok_or("At least one window handle is required")?
        .copied()
        .collect();

    let mut store = open_store();
    let emitted = dispatch_or_report(
        &mut store,
        Command::RemoveWindowsFromTheme {
            id: id.clone(),
            hwnds,
        },
        "remove windows",
    )?;

    if emitted
        .iter()
        .any(|e| matches!(e, Event::WindowsRemoved { changed: true, .. }))
    {
        println!("✅ Windows removed from theme {}", id);
    } else {
        println!("No matching windows in theme {}", id);
    }
    Ok(())
}

fn handle_add_process(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let id = theme_id(matches)?;
    let pid = *matches.get_one::<u32>("pid").ok_or("Process id is required")?;

    let mut store = open_store();
    let emitted = dispatch_or_report(
        &mut store,
        Command::AddProcessToTheme { id: id.clone(), pid },
        "add process",
    )?;

    if emitted
        .iter()
        .any(|e| matches!(e, Event::ProcessAdded { changed: true, .. }))
    {
        println!("✅ Process {} added to theme {}", pid, id);
    } else {
        println!("Process {} is already in theme {}", pid, id);
    }
    Ok(())
}

fn handle_remove_process(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let id = theme_id(matches)?;
    let pid = *matches.get_one::<u32>("pid").ok_or("Process id is required")?;

    let mut store = open_store();
    // Forget the executable too when the process is still running.
    let name = store
        .list_processes()
        .into_iter()
        .find(|p| p.id == pid)
        .map(|p| p.name);

    let emitted = dispatch_or_report(
        &mut store,
        Command::RemoveProcessFromTheme {
            id: id.clone(),
            pid,
            name,
        },
        "remove process",
    )?;

    if emitted
        .iter()
        .any(|e| matches!(e, Event::ProcessRemoved { changed: true, .. }))
    {
        println!("✅ Process {} removed from theme {}", pid, id);
    } else {
        println!("Process {} is not in theme {}", pid, id);
    }
    Ok(())
}
