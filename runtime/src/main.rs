// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use svitlo_runtime::cli;
use svitlo_runtime::config::Settings;

#[derive(Parser)]
#[command(
    name = "svitlo",
    about = "Svitlo: watches the outage schedule page and posts changes to Telegram",
    version,
    after_help = "Run 'svitlo <command> --help' for details on each command.\nRun 'svitlo' with no command to run a single cycle."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// State file (overrides SVITLO_STATE_FILE)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one fetch-compare-notify cycle
    Once {
        /// Log messages instead of sending them; state is not written
        #[arg(long)]
        dry_run: bool,
    },
    /// Poll repeatedly until the runtime budget is spent or Ctrl-C
    Watch {
        /// Seconds between cycles (overrides SVITLO_POLL_SECS)
        #[arg(long)]
        interval: Option<u64>,
        /// Stop after this many seconds, 0 for no limit (overrides SVITLO_MAX_RUNTIME_SECS)
        #[arg(long)]
        max_runtime: Option<u64>,
        /// Log messages instead of sending them; state is not written
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the schedule blocks found on the page, without notifying
    Extract {
        /// Read HTML or a JSON page dump from a file instead of fetching
        #[arg(long)]
        file: Option<PathBuf>,
        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Inspect or reset the last delivered schedules
    State {
        #[command(subcommand)]
        action: StateAction,
    },
    /// Check configuration and page reachability
    Doctor {
        /// Skip the live page fetch
        #[arg(long)]
        offline: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum StateAction {
    /// Print the stored schedules
    Show,
    /// Delete the state file so the next schedule is delivered again
    Clear,
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(command: Option<Commands>, state: Option<&Path>) -> Result<()> {
    let settings = Settings::from_env()?;
    match command {
        None => cli::run_cmd::run_once(&settings, state, false).await,
        Some(Commands::Once { dry_run }) => cli::run_cmd::run_once(&settings, state, dry_run).await,
        Some(Commands::Watch {
            interval,
            max_runtime,
            dry_run,
        }) => cli::run_cmd::run_watch_cmd(&settings, state, dry_run, interval, max_runtime).await,
        Some(Commands::Extract { file, date }) => {
            cli::extract_cmd::run(&settings, file.as_deref(), date).await
        }
        Some(Commands::State { action }) => match action {
            StateAction::Show => cli::state_cmd::show(&settings, state),
            StateAction::Clear => cli::state_cmd::clear(&settings, state),
        },
        Some(Commands::Doctor { offline }) => cli::doctor::run(&settings, state, offline).await,
        Some(Commands::Completions { .. }) => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    cli::output::init(cli.json, cli.quiet);
    init_tracing(cli.verbose, cli.log_format);

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "svitlo", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli.command, cli.state.as_deref()).await;

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
