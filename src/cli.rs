//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvEventAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report::TextReportAdapter;
use crate::domain::config_validation::build_replay_config;
use crate::domain::error::TradecoreError;
use crate::domain::replay::{Replay, ReplayConfig, ReplaySummary, StrategyEvent};
use crate::ports::event_port::EventSource;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradecore", about = "Replay strategy events through positions and indicators")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay an event file and report positions and indicator values
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        events: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Replay {
            config,
            events,
            output,
            dry_run,
        } => run_replay(&config, &events, output.as_ref(), dry_run),
        Command::Validate { config } => run_validate(&config),
    }
}

/// Load and validate a config file into a replay configuration.
pub fn read_replay_config(path: &Path) -> Result<ReplayConfig, TradecoreError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    build_replay_config(&adapter)
}

/// Replay events through the standard indicator and measure set.
pub fn replay_events(
    config: &ReplayConfig,
    events: &[StrategyEvent],
) -> Result<ReplaySummary, TradecoreError> {
    let mut replay = Replay::standard(config)?;
    replay.run(events);
    Ok(replay.summary())
}

fn load_replay_config(path: &PathBuf) -> Result<ReplayConfig, ExitCode> {
    eprintln!("Loading config from {}", path.display());
    read_replay_config(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn describe(config: &ReplayConfig) {
    match &config.period {
        Some(period) => eprintln!(
            "  Period: {} ms from {} ({})",
            period.length.num_milliseconds(),
            period.epoch,
            period.time_zone
        ),
        None => eprintln!("  Period: none"),
    }
    eprintln!("  Collect periodic: {}", config.collect_periodic);
    eprintln!("  Moving average periods: {}", config.moving_average_periods);
}

fn run_replay(
    config_path: &PathBuf,
    events_path: &PathBuf,
    output_path: Option<&PathBuf>,
    dry_run: bool,
) -> ExitCode {
    // Stage 1: config
    let config = match load_replay_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    eprintln!("Config validated successfully");

    // Stage 2: events
    eprintln!("Reading events from {}", events_path.display());
    let events = match CsvEventAdapter::new(events_path.clone()).events() {
        Ok(events) => events,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if dry_run {
        return match Replay::standard(&config) {
            Ok(replay) => {
                print_dry_run(&config, &replay, &events);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                (&e).into()
            }
        };
    }

    // Stage 3: replay and report
    let summary = match replay_events(&config, &events) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let result = match output_path {
        Some(path) => write_report_file(&summary, path),
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            TextReportAdapter::new().write(&summary, &mut out)
        }
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Some(path) = output_path {
        eprintln!("Report written to {}", path.display());
    }
    ExitCode::SUCCESS
}

pub fn write_report_file(summary: &ReplaySummary, path: &Path) -> Result<(), TradecoreError> {
    let mut out = BufWriter::new(File::create(path)?);
    TextReportAdapter::new().write(summary, &mut out)?;
    out.flush()?;
    Ok(())
}

fn print_dry_run(config: &ReplayConfig, replay: &Replay, events: &[StrategyEvent]) {
    eprintln!("\nConfiguration:");
    describe(config);

    eprintln!("\nIndicators (dispatch order):");
    for title in replay.measures().indicators().titles() {
        eprintln!("  {title}");
    }

    let (mut trades, mut quotes, mut fills, mut updates) = (0, 0, 0, 0);
    for event in events {
        match event {
            StrategyEvent::Trade(_) => trades += 1,
            StrategyEvent::Quote(_) => quotes += 1,
            StrategyEvent::Executed(_) => fills += 1,
            StrategyEvent::Updated(_) => updates += 1,
        }
    }
    eprintln!(
        "\nEvents: {} ({trades} trades, {quotes} quotes, {fills} fills, {updates} updates)",
        events.len()
    );
    eprintln!("\nDry run complete. No events replayed.");
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let config = match load_replay_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    describe(&config);
    eprintln!("Config is valid");
    ExitCode::SUCCESS
}
