//! `focussessions` command-line front end over the timer, store and stats.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{
    models::{Config, ConfigInput, Session},
    stats::{report, GoalProgress, StatsAggregator},
    storage::Storage,
    timer::{
        commands, SessionTimer, TimerCommand, TimerDriver, TimerEvent, TimerOptions,
        TimerSnapshot,
    },
};

const ENABLE_LOGS: bool = true;

/// Focus session timer with daily goals and statistics.
#[derive(Parser, Debug)]
#[command(name = "focussessions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a focus session in the foreground (Ctrl-C pauses and exits)
    Start {
        /// Session length; defaults to the configured duration
        #[arg(short, long)]
        minutes: Option<u32>,
    },
    /// Show the active session and today's progress
    Status,
    Pause,
    /// Continue the paused session in the foreground
    Resume,
    Cancel,
    /// Print a statistics rollup for the current period as JSON
    Stats {
        #[arg(value_enum)]
        period: StatsPeriod,
    },
    /// Write the plain-text report to the downloads directory
    Export,
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Delete every session and the config
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum StatsPeriod {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    Set(ConfigUpdate),
}

#[derive(Args, Debug)]
struct ConfigUpdate {
    /// Session duration in minutes (1-180)
    #[arg(long)]
    duration: Option<String>,
    /// Daily session goal (1-24)
    #[arg(long)]
    goal: Option<String>,
    /// Work day start hour (0-23)
    #[arg(long)]
    start_hour: Option<String>,
    /// Work day end hour (0-23, after the start hour)
    #[arg(long)]
    end_hour: Option<String>,
}

impl ConfigUpdate {
    /// Overlays the given fields on `config` and parses the result.
    fn apply_to(self, config: &Config) -> Result<Config> {
        let current = ConfigInput::from_config(config);
        ConfigInput {
            session_duration: self.duration.unwrap_or(current.session_duration),
            daily_session_goal: self.goal.unwrap_or(current.daily_session_goal),
            work_start_hour: self.start_hour.unwrap_or(current.work_start_hour),
            work_end_hour: self.end_hour.unwrap_or(current.work_end_hour),
        }
        .parse()
    }
}

pub fn execute(cli: Cli) -> Result<()> {
    let storage = Storage::open_default()?;
    let options = TimerOptions::from_env();

    if storage.is_first_run() {
        let config = storage.get_config()?;
        println!(
            "Welcome to focussessions! Defaults: {} minute sessions, {} sessions per day. \
             Change them with `focussessions config set`.",
            config.session_duration_minutes, config.daily_session_goal
        );
    }

    match cli.command {
        Command::Start { minutes } => {
            run_foreground(&storage, commands::start_or_recover(&storage, options, minutes)?)
        }
        Command::Status => print_status(&storage, options),
        Command::Pause => {
            print_snapshot(&commands::pause_active(&storage, options)?);
            Ok(())
        }
        Command::Resume => run_foreground(&storage, commands::resume_live(&storage, options)?),
        Command::Cancel => {
            let session = commands::cancel_active(&storage, options)?;
            println!(
                "Cancelled session {} after {}",
                session.id,
                clock(session.elapsed_seconds)
            );
            Ok(())
        }
        Command::Stats { period } => print_stats(&StatsAggregator::new(storage), period),
        Command::Export => {
            let path = report::export_report(&StatsAggregator::new(storage))?;
            println!("Statistics exported to {}", path.display());
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => print_json(&storage.get_config()?),
        Command::Config(ConfigCommand::Set(update)) => {
            let config = update.apply_to(&storage.get_config()?)?;
            storage.save_config(&config)?;
            crate::log_info!("Config updated: {config:?}");
            print_json(&config)
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("refusing to delete all data without --yes");
            }
            storage.reset_all()?;
            println!("All data removed from {}", storage.data_dir().display());
            Ok(())
        }
    }
}

/// Drives a running timer until it completes, is cancelled or Ctrl-C
/// leaves it paused.
fn run_foreground(storage: &Storage, timer: SessionTimer) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    runtime.block_on(async {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        let printer_storage = storage.clone();
        let printer = tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                print_event(&printer_storage, &event);
            }
        });

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = command_tx.send(TimerCommand::Exit);
            }
        });

        let timer = TimerDriver::new(timer, command_rx, event_tx).run().await?;
        // The driver dropped its sender, so the printer drains and stops.
        if let Err(err) = printer.await {
            crate::log_warn!("Event printer stopped abnormally: {err}");
        }

        if timer.status().is_live() {
            println!("Session paused. Run `focussessions start` or `resume` to continue.");
        }
        Ok::<(), anyhow::Error>(())
    })
}

fn print_event(storage: &Storage, event: &TimerEvent) {
    match event {
        TimerEvent::StateChanged { snapshot } => print_snapshot(snapshot),
        TimerEvent::Heartbeat { snapshot } => println!(
            "  {} elapsed, {} remaining",
            clock(snapshot.elapsed_seconds),
            clock(snapshot.remaining_seconds)
        ),
        TimerEvent::Completed { session } => print_completion(storage, session),
    }
}

fn print_completion(storage: &Storage, session: &Session) {
    println!("Session complete: {} minutes of focus.", session.actual_minutes());

    let progress = StatsAggregator::new(storage.clone())
        .today()
        .and_then(|day| Ok(GoalProgress::for_day(&day, &storage.get_config()?)));
    match progress {
        Ok(progress) if progress.met => println!(
            "Daily goal achieved: {}/{} sessions today.",
            progress.completed, progress.goal
        ),
        Ok(progress) => println!(
            "{}/{} sessions today, {} to go.",
            progress.completed, progress.goal, progress.remaining
        ),
        Err(err) => crate::log_error!("Could not compute daily progress: {err:#}"),
    }
}

fn print_status(storage: &Storage, options: TimerOptions) -> Result<()> {
    let snapshot = commands::get_timer_state(storage, options)?;
    print_snapshot(&snapshot);

    let day = StatsAggregator::new(storage.clone()).today()?;
    let progress = GoalProgress::for_day(&day, &storage.get_config()?);
    println!(
        "Today: {}/{} sessions ({}), goal {} ({:.0}%)",
        progress.completed,
        progress.goal,
        report::format_minutes(day.total_minutes),
        if progress.met { "met" } else { "not met yet" },
        progress.ratio() * 100.0
    );
    Ok(())
}

fn print_snapshot(snapshot: &TimerSnapshot) {
    match &snapshot.session_id {
        Some(id) => println!(
            "{} [{}] {} / {} ({:.0}%)",
            snapshot.status,
            id,
            clock(snapshot.elapsed_seconds),
            clock(snapshot.target_seconds),
            snapshot.progress * 100.0
        ),
        None => println!("{}: no active session", snapshot.status),
    }
}

fn print_stats(stats: &StatsAggregator, period: StatsPeriod) -> Result<()> {
    match period {
        StatsPeriod::Day => print_json(&stats.today()?),
        StatsPeriod::Week => print_json(&stats.current_week()?),
        StatsPeriod::Month => print_json(&stats.current_month()?),
        StatsPeriod::Year => print_json(&stats.current_year()?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `mm:ss`, with hours prepended once past the hour.
fn clock(seconds: u64) -> String {
    let (hours, minutes, secs) = (seconds / 3600, seconds / 60 % 60, seconds % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}
