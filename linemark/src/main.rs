//! # linemark
//!
//! Line-count badges and workspace statistics from the command line.
//!
//! ## Overview
//!
//! linemark is built on top of linemarklib. It plays the host role: it
//! resolves a configuration snapshot, asks the library for decorations and
//! prints them, or runs a workspace scan and prints a per-extension table.
//!
//! ## Usage
//!
//! ```bash
//! # Badge, color and tooltip for some files
//! linemark decorate src/main.rs Cargo.toml
//!
//! # Include SLOC and git changes in the tooltip
//! linemark decorate src/lib.rs --sloc --git
//!
//! # Directory totals
//! linemark decorate src --directory-totals
//!
//! # Workspace statistics as JSON, giving up after 30 seconds
//! linemark stats . --output json --time-limit 30
//!
//! # Load a JSON configuration (camelCase keys)
//! linemark --config linemark.json stats .
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use linemarklib::{
    scan_tree, Config, Decorator, FileIdentity, GitDiffProvider, LinemarkError, LocalFs,
    ScanSummary, Settings, StatsTable,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use render::{render_decorations, render_stats_table, DecoratedPath};

/// JSON shape of the `stats` command
#[derive(Debug, Serialize)]
struct StatsReport {
    roots: Vec<String>,
    summary: ScanSummary,
    table: StatsTable,
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("linemark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Line-count badges, tooltips and workspace statistics")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON configuration file (camelCase keys, all optional)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .global(true)
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Output format"),
        )
        .subcommand(
            Command::new("decorate")
                .about("Show badge, color and tooltip for files or directories")
                .arg(
                    Arg::new("paths")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(PathBuf))
                        .default_value(".")
                        .help("Paths to decorate"),
                )
                .arg(
                    Arg::new("root")
                        .short('r')
                        .long("root")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(PathBuf))
                        .help("Workspace root for relative ignore patterns (can be repeated)"),
                )
                .arg(
                    Arg::new("sloc")
                        .long("sloc")
                        .action(ArgAction::SetTrue)
                        .help("Include source lines (SLOC) in the tooltip"),
                )
                .arg(
                    Arg::new("git")
                        .long("git")
                        .action(ArgAction::SetTrue)
                        .help("Include git added/removed lines in the tooltip"),
                )
                .arg(
                    Arg::new("directory-totals")
                        .short('d')
                        .long("directory-totals")
                        .action(ArgAction::SetTrue)
                        .help("Decorate directories with recursive totals"),
                ),
        )
        .subcommand(
            Command::new("stats")
                .about("Count every file below one or more workspace roots")
                .arg(
                    Arg::new("roots")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(PathBuf))
                        .default_value(".")
                        .help("Workspace roots to scan"),
                )
                .arg(
                    Arg::new("time-limit")
                        .short('t')
                        .long("time-limit")
                        .value_parser(value_parser!(u64))
                        .help("Cancel the scan after this many seconds"),
                ),
        )
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Absolute form of a path without requiring it to exist
fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    })
}

fn paths_arg(matches: &ArgMatches, id: &str) -> Vec<PathBuf> {
    matches
        .get_many::<PathBuf>(id)
        .map(|v| v.map(|p| absolute(p)).collect())
        .unwrap_or_default()
}

/// Load the configuration snapshot from `--config`, or the defaults
fn load_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("cannot load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn is_json(matches: &ArgMatches) -> bool {
    matches
        .get_one::<String>("output")
        .is_some_and(|s| s == "json")
}

/// Handler for the decorate command
fn decorate_handler(matches: &ArgMatches) -> anyhow::Result<ExitCode> {
    let mut config = load_config(matches)?;
    config.show_sloc |= matches.get_flag("sloc");
    config.show_git_changes |= matches.get_flag("git");
    config.show_directory_totals |= matches.get_flag("directory-totals");

    let mut roots = paths_arg(matches, "root");
    if roots.is_empty() {
        roots.push(absolute(Path::new(".")));
    }
    let settings = Settings::new(config, &roots)?;

    let mut decorator = Decorator::new(Arc::new(LocalFs));
    if settings.config().show_git_changes {
        decorator = decorator.with_vcs(Arc::new(GitDiffProvider::new()));
    }

    let decorated: Vec<DecoratedPath> = paths_arg(matches, "paths")
        .into_iter()
        .map(|path| DecoratedPath {
            decoration: decorator.decorate(&FileIdentity::file(&path), &settings),
            path: path.display().to_string(),
        })
        .collect();

    if is_json(matches) {
        println!("{}", serde_json::to_string_pretty(&decorated)?);
    } else {
        print!("{}", render_decorations(&decorated));
    }
    Ok(ExitCode::SUCCESS)
}

/// Handler for the stats command
fn stats_handler(matches: &ArgMatches) -> anyhow::Result<ExitCode> {
    let roots = paths_arg(matches, "roots");
    let settings = Settings::new(load_config(matches)?, &roots)?;
    let identities: Vec<FileIdentity> = roots.iter().map(FileIdentity::file).collect();

    let deadline = matches
        .get_one::<u64>("time-limit")
        .map(|secs| Instant::now() + Duration::from_secs(*secs));
    let is_cancelled = || deadline.is_some_and(|d| Instant::now() >= d);

    let summary = match scan_tree(
        &LocalFs,
        &identities,
        &settings,
        |id, lines| tracing::trace!(file = %id, lines, "counted"),
        is_cancelled,
    ) {
        Ok(summary) => summary,
        Err(LinemarkError::NoWorkspaceRoot) => {
            eprintln!("No workspace root found: nothing to scan.");
            return Ok(ExitCode::SUCCESS);
        }
        Err(LinemarkError::Cancelled) => {
            eprintln!("Scan cancelled; no statistics reported.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    let table = StatsTable::from_summary(&summary);
    if is_json(matches) {
        let report = StatsReport {
            roots: roots.iter().map(|r| r.display().to_string()).collect(),
            summary,
            table,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_stats_table(&table));
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    init_logging();
    let matches = build_command().get_matches();

    let result = match matches.subcommand() {
        Some(("decorate", sub)) => decorate_handler(sub),
        Some(("stats", sub)) => stats_handler(sub),
        _ => Ok(ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
