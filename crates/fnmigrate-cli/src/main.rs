use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use fnmigrate_cli::config::DEFAULT_TIMEOUT_SECS;
use fnmigrate_cli::{
    dump_from_server, logging, plan_from_snapshot, plan_json, restore_to_server, MigrateConfig,
    MigrateError,
};
use fnmigrate_model::{LegacyState, DEFAULT_SNAPSHOT_FILE};
use fnmigrate_model::target::DEFAULT_NAMESPACE;
use fnmigrate_remap::RandomPackageNamer;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Exit code when the operator can fix the cause and re-run
const EXIT_RECOVERABLE: u8 = 2;

fn file_arg() -> Arg {
    Arg::new("file")
        .long("file")
        .default_value(DEFAULT_SNAPSHOT_FILE)
        .value_parser(clap::value_parser!(PathBuf))
        .help("Snapshot file")
}

fn cli() -> Command {
    Command::new("fnmigrate")
        .version(fnmigrate_cli::VERSION)
        .about("Migrate legacy function state to the strictly named platform")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("server")
                .long("server")
                .global(true)
                .help("Server URL (defaults to $FN_SERVER_URL)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .global(true)
                .value_parser(clap::value_parser!(u64))
                .help(format!("HTTP timeout in seconds [default: {DEFAULT_TIMEOUT_SECS}]")),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug output"),
        )
        .subcommand(
            Command::new("dump")
                .about("Save legacy state to a snapshot file")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("restore")
                .about("Create the snapshot's entities on the target platform")
                .arg(file_arg())
                .arg(
                    Arg::new("namespace")
                        .long("namespace")
                        .default_value(DEFAULT_NAMESPACE)
                        .help("Namespace for created records"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Print the records instead of creating them"),
                ),
        )
        .subcommand(
            Command::new("names")
                .about("Show the snapshot's name changes")
                .arg(file_arg())
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Include names that did not change"),
                ),
        )
}

fn config_for(args: &ArgMatches) -> MigrateConfig {
    let mut config = MigrateConfig::from_env();
    if let Some(server) = args.get_one::<String>("server") {
        config = config.with_server(server.clone());
    }
    if let Some(file) = args.get_one::<PathBuf>("file") {
        config = config.with_snapshot_path(file.clone());
    }
    if let Some(secs) = args.get_one::<u64>("timeout") {
        config = config.with_timeout(Duration::from_secs(*secs));
    }
    config
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    if let Err(e) = logging::init(matches.get_flag("verbose")) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            let recoverable = e
                .downcast_ref::<MigrateError>()
                .is_some_and(MigrateError::is_operator_recoverable);
            if recoverable {
                eprintln!("fix the problem above and run the command again");
                ExitCode::from(EXIT_RECOVERABLE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("dump", args)) => {
            let config = config_for(args);
            let summary = dump_from_server(&config).context("dump failed")?;
            println!("{summary}");
            println!("snapshot written to {}", summary.path.display());
        }
        Some(("restore", args)) => {
            let mut config = config_for(args).with_dry_run(args.get_flag("dry-run"));
            if let Some(namespace) = args.get_one::<String>("namespace") {
                config = config.with_namespace(namespace.clone());
            }

            if config.dry_run {
                let plan = plan_from_snapshot(&config, &mut RandomPackageNamer)
                    .context("failed to plan restore")?;
                println!("{}", plan_json(&plan)?);
            } else {
                let report = restore_to_server(&config).context("restore failed")?;
                println!("{report}");
            }
        }
        Some(("names", args)) => {
            let config = config_for(args);
            let state = LegacyState::load(&config.snapshot_path)
                .with_context(|| format!("failed to load {}", config.snapshot_path.display()))?;
            let changes: Vec<(&str, &str)> = if args.get_flag("all") {
                state.name_changes.iter().collect()
            } else {
                state.name_changes.renamed().collect()
            };
            for (old, new) in changes {
                println!("{old} -> {new}");
            }
        }
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}
