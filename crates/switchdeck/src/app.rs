use clap::{Arg, ArgAction, Command, value_parser};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Output in JSON format")
        .action(ArgAction::SetTrue)
}

fn theme_id_arg() -> Arg {
    Arg::new("id")
        .help("Theme id")
        .required(true)
        .index(1)
}

pub fn build_cli() -> Command {
    Command::new("switchdeck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Group windows into themes and focus on one theme at a time")
        .long_about("switchdeck keeps a named group of applications (a theme) on screen and minimizes everything else. Themes remember their applications by executable and window title, so they still work after the applications restart.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("processes")
                .about("List running desktop applications")
                .arg(
                    Arg::new("tree")
                        .long("tree")
                        .help("Show processes nested under their parents")
                        .action(ArgAction::SetTrue)
                )
                .arg(json_flag())
        )
        .subcommand(
            Command::new("windows")
                .about("List visible top-level windows")
                .arg(json_flag())
        )
        .subcommand(
            Command::new("themes")
                .about("Manage themes")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("list")
                        .about("List all themes")
                        .arg(json_flag())
                )
                .subcommand(
                    Command::new("add")
                        .about("Create a theme")
                        .arg(
                            Arg::new("name")
                                .help("Theme name")
                                .required(true)
                                .index(1)
                        )
                        .arg(
                            Arg::new("shortcut")
                                .long("shortcut")
                                .short('s')
                                .help("Key combination that activates the theme, e.g. Ctrl+Alt+1")
                        )
                        .arg(
                            Arg::new("color")
                                .long("color")
                                .short('c')
                                .help("Display color, e.g. #3b82f6")
                        )
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a theme")
                        .arg(theme_id_arg())
                )
                .subcommand(
                    Command::new("add-window")
                        .about("Add a visible window to a theme")
                        .arg(theme_id_arg())
                        .arg(
                            Arg::new("hwnd")
                                .help("Window handle, as shown by 'switchdeck windows'")
                                .required(true)
                                .index(2)
                                .value_parser(value_parser!(u64))
                        )
                )
                .subcommand(
                    Command::new("remove-window")
                        .about("Remove windows from a theme")
                        .arg(theme_id_arg())
                        .arg(
                            Arg::new("hwnd")
                                .help("Window handles to remove")
                                .required(true)
                                .num_args(1..)
                                .index(2)
                                .value_parser(value_parser!(u64))
                        )
                )
                .subcommand(
                    Command::new("add-process")
                        .about("Add a running process to a theme")
                        .arg(theme_id_arg())
                        .arg(
                            Arg::new("pid")
                                .help("Process id, as shown by 'switchdeck processes'")
                                .required(true)
                                .index(2)
                                .value_parser(value_parser!(u32))
                        )
                )
                .subcommand(
                    Command::new("remove-process")
                        .about("Remove a process from a theme")
                        .arg(theme_id_arg())
                        .arg(
                            Arg::new("pid")
                                .help("Process id to remove")
                                .required(true)
                                .index(2)
                                .value_parser(value_parser!(u32))
                        )
                )
        )
        .subcommand(
            Command::new("activate")
                .about("Keep a theme's applications on screen and minimize everything else")
                .arg(theme_id_arg())
        )
        .subcommand(
            Command::new("show-desktop-except")
                .about("Minimize every window except the given processes and windows")
                .arg(
                    Arg::new("pids")
                        .help("Process ids whose windows stay on screen")
                        .num_args(1..)
                        .index(1)
                        .value_parser(value_parser!(u32))
                        .required_unless_present("windows")
                )
                .arg(
                    Arg::new("windows")
                        .long("windows")
                        .short('w')
                        .help("Window handles that stay on screen")
                        .num_args(1..)
                        .value_parser(value_parser!(u64))
                )
        )
        .subcommand(
            Command::new("minimize")
                .about("Minimize the main window of each process")
                .arg(
                    Arg::new("pids")
                        .help("Process ids to minimize")
                        .required(true)
                        .num_args(1..)
                        .index(1)
                        .value_parser(value_parser!(u32))
                )
        )
        .subcommand(
            Command::new("restore")
                .about("Re-resolve every theme against the running applications")
        )
        .subcommand(
            Command::new("clear-data")
                .about("Delete every theme and the themes file")
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_cli_themes_add() {
        let matches = build_cli()
            .try_get_matches_from(vec!["switchdeck", "themes", "add", "Work", "--shortcut", "Ctrl+1"])
            .unwrap();
        let (_, themes) = matches.subcommand().unwrap();
        let (name, add) = themes.subcommand().unwrap();
        assert_eq!(name, "add");
        assert_eq!(add.get_one::<String>("name").unwrap(), "Work");
        assert_eq!(add.get_one::<String>("shortcut").unwrap(), "Ctrl+1");
    }

    #[test]
    fn test_cli_show_desktop_except_requires_targets() {
        assert!(
            build_cli()
                .try_get_matches_from(vec!["switchdeck", "show-desktop-except"])
                .is_err()
        );

        let matches = build_cli()
            .try_get_matches_from(vec![
                "switchdeck",
                "show-desktop-except",
                "--windows",
                "200001",
                "200002",
            ])
            .unwrap();
        let sub = matches.subcommand_matches("show-desktop-except").unwrap();
        let windows: Vec<u64> = sub.get_many::<u64>("windows").unwrap().copied().collect();
        assert_eq!(windows, vec![200_001, 200_002]);
    }

    #[test]
    fn test_cli_rejects_non_numeric_pid() {
        assert!(
            build_cli()
                .try_get_matches_from(vec!["switchdeck", "minimize", "notepad"])
                .is_err()
        );
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        assert!(
            build_cli()
                .try_get_matches_from(vec!["switchdeck", "-q", "-v", "restore"])
                .is_err()
        );
    }
}
