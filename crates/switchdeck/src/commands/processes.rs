use clap::ArgMatches;
use tracing::info;

use switchdeck_core::ProcessInfo;

use super::helpers::{open_store, print_json, truncate};

pub fn handle_processes_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let tree = matches.get_flag("tree");

    info!(event = "cli.processes_started", json_output, tree);

    let store = open_store();
    let processes = if tree {
        store.process_tree()
    } else {
        store.processes_with_windows()
    };

    if json_output {
        print_json(&processes)?;
    } else if processes.is_empty() {
        println!("No desktop applications found.");
    } else if tree {
        for process in &processes {
            print_tree(process, 0);
        }
    } else {
        println!("{:>8}  {:<20}  {:>7}  Title", "PID", "Name", "Windows");
        for process in &processes {
            println!(
                "{:>8}  {:<20}  {:>7}  {}",
                process.id,
                truncate(&process.name, 20),
                process.windows.len(),
                truncate(&process.title, 60)
            );
        }
    }

    info!(event = "cli.processes_completed", count = processes.len());
    Ok(())
}

fn print_tree(process: &ProcessInfo, depth: usize) {
    println!(
        "{}{} ({}) {}",
        "  ".repeat(depth),
        process.name,
        process.id,
        truncate(&process.title, 60)
    );
    for child in &process.children {
        print_tree(child, depth + 1);
    }
}
