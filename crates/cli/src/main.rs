mod manifest;
mod report;

use anyhow::{Context, Result};
use argot::{Command, ParserMatches, render};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

use crate::manifest::{DEFAULT_MANIFEST_NAME, load_manifest, write_default_manifest};
use crate::report::{ErrorReport, MatchReport};

#[derive(Parser)]
#[command(name = "argot")]
#[command(version, about = "Parse, check and document command-line interfaces", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter argot.json manifest
    Init(InitArgs),

    /// Parse tokens against the manifest's command tree
    Parse(ParseArgs),

    /// Render help for a command of the manifest
    Help(HelpArgs),

    /// Check that the manifest builds a valid command tree
    Check(CheckArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Root command name (default: directory name)
    #[arg(short, long)]
    name: Option<String>,

    /// Overwrite an existing manifest
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to argot.json manifest
    #[arg(short, long, default_value = DEFAULT_MANIFEST_NAME, value_name = "FILE")]
    manifest: PathBuf,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,

    /// Tokens to parse, passed after `--`
    #[arg(last = true, value_name = "TOKENS")]
    tokens: Vec<String>,
}

#[derive(Parser)]
struct HelpArgs {
    /// Path to argot.json manifest
    #[arg(short, long, default_value = DEFAULT_MANIFEST_NAME, value_name = "FILE")]
    manifest: PathBuf,

    /// Subcommand path below the root, names or aliases
    #[arg(value_name = "COMMAND")]
    path: Vec<String>,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to argot.json manifest
    #[arg(short, long, default_value = DEFAULT_MANIFEST_NAME, value_name = "FILE")]
    manifest: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Parse(args) => parse(args),
        Commands::Help(args) => help(args),
        Commands::Check(args) => check(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    tracing::debug!("executing init command");

    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;
    let path = write_default_manifest(&dir, args.name.as_deref(), args.force)?;

    eprintln!("Created {}", path.display());
    Ok(())
}

fn parse(args: ParseArgs) -> Result<()> {
    tracing::debug!("executing parse command");

    let loaded = load_manifest(&args.manifest)?;
    let app = &loaded.command;

    if args.tokens.is_empty() && app.is_expecting_values() {
        print!("{}", render::help(&[app], app.get_settings()));
        return Ok(());
    }

    let matches = match argot::parse(app, args.tokens.as_slice()) {
        Ok(matches) => matches,
        Err(err) => {
            tracing::debug!(kind = %err.kind(), "parse failed");
            if args.json {
                println!("{}", serde_json::to_string_pretty(&ErrorReport::from(&err))?);
            } else {
                eprint!("{}", render::error(&err));
                if app.get_settings().show_help_on_all_errors {
                    eprintln!();
                    eprint!("{}", render::help(&[app], app.get_settings()));
                }
            }
            std::process::exit(err.exit_code());
        }
    };

    if matches.contains_flag("--help") {
        let path = matched_path(app, &matches)?;
        print!("{}", render::help(&path, app.get_settings()));
        return Ok(());
    }
    if matches.matched_command().is_help_subcommand() {
        let path = help_target(app, &matches)?;
        print!("{}", render::help(&path, app.get_settings()));
        return Ok(());
    }
    if matches.matched_command_index().is_none() && matches.contains_flag("--version") {
        print!("{}", render::version(app));
        return Ok(());
    }

    let report = MatchReport::from(&matches);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }
    Ok(())
}

fn help(args: HelpArgs) -> Result<()> {
    tracing::debug!("executing help command");

    let loaded = load_manifest(&args.manifest)?;
    let app = &loaded.command;
    let path = app
        .find_path(args.path.as_slice())
        .with_context(|| format!("no such command: {} {}", app.name(), args.path.join(" ")))?;

    print!("{}", render::help(&path, app.get_settings()));
    Ok(())
}

fn check(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let loaded = load_manifest(&args.manifest)?;
    eprintln!(
        "OK: {} (format {}) declares {} command(s)",
        loaded.path.display(),
        loaded.manifest.format_version,
        count_commands(&loaded.command)
    );
    Ok(())
}

/// Commands from the root to the one `matches` resolved.
fn matched_path<'a>(app: &'a Command, matches: &ParserMatches) -> Result<Vec<&'a Command>> {
    let below_root = matches.command_path().get(1..).unwrap_or_default();
    app.find_path(below_root)
        .context("matched command is missing from the command tree")
}

/// Commands from the root to the sibling a `help <COMMAND>` invocation names.
fn help_target<'a>(app: &'a Command, matches: &ParserMatches) -> Result<Vec<&'a Command>> {
    let target = matches.get_arg_value("COMMAND")?;
    let mut below_root: Vec<&str> = matches
        .command_path()
        .iter()
        .skip(1)
        .map(String::as_str)
        .collect();
    below_root.pop();
    below_root.push(target);
    app.find_path(&below_root)
        .with_context(|| format!("no such command: {target}"))
}

fn count_commands(cmd: &Command) -> usize {
    1 + cmd.get_subcommands().iter().map(count_commands).sum::<usize>()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
