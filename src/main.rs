// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::future::Future;
use std::io;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::sync::Notify;
use tracing::{info, warn, Level};

use toneseq::session::{duration_preset, format_clock, TimerState};
use toneseq::{
    DriverConfig, EndReason, PresetTable, SessionDriver, SessionObserver, SessionPlan,
    SessionStatus, Sequencer,
};

fn print_usage() {
    println!("toneseq - Timed frequency listening sessions");
    println!();
    println!("Usage: toneseq [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --presets [FILE]          List frequency presets (built-in or from a TOML file)");
    println!("  --single <SECONDS> <HZ>   Run a single-frequency session (SECONDS may be 1m, 3m, 5m, 10m)");
    println!("  --plan <FILE> [PRESETS]   Run a session from a YAML plan");
    println!("  --validate <FILE>         Check a plan and print its timeline");
    println!("  --verbose                 Log every tick and transition");
    println!("  --help                    Show this help message");
}

/// Stand-in for the tone engine: reports what it would play
struct ConsoleTone {
    frequency: f64,
    total_secs: u64,
    done: Arc<Notify>,
}

impl SessionObserver for ConsoleTone {
    fn on_frequency_change(&mut self, frequency: f64) {
        self.frequency = frequency;
        println!("  -> {:.1} Hz", frequency);
    }

    fn on_session_start(&mut self) {
        println!("Tone on at {:.1} Hz ({})", self.frequency, format_clock(self.total_secs));
    }

    fn on_session_end(&mut self, reason: EndReason) {
        match reason {
            EndReason::Completed => println!("Session complete"),
            EndReason::Stopped => println!("Session stopped"),
        }
        self.done.notify_one();
    }

    fn on_status_change(&mut self, status: SessionStatus) {
        info!(ready = status.is_ready, "session status");
    }

    fn on_tick(&mut self, timer: TimerState) {
        if timer.elapsed_secs % 10 == 0 {
            let remaining = self.total_secs.saturating_sub(timer.elapsed_secs);
            println!("  {} remaining", format_clock(remaining));
        }
    }
}

fn load_presets(path: Option<&String>) -> Result<PresetTable> {
    match path {
        Some(path) => PresetTable::load(path),
        None => Ok(PresetTable::default()),
    }
}

fn list_presets(path: Option<&String>) -> Result<()> {
    let table = load_presets(path)?;
    for category in table.categories() {
        println!("{}:", category);
        for preset in table.by_category(category) {
            match &preset.description {
                Some(desc) => println!("  {:>6}  {:>8.1} Hz  {}", preset.label, preset.frequency, desc),
                None => println!("  {:>6}  {:>8.1} Hz", preset.label, preset.frequency),
            }
        }
    }
    Ok(())
}

fn print_timeline(sequencer: &Sequencer) {
    println!("{}", sequencer.summary());
    for (index, entry) in sequencer.timeline().iter().enumerate() {
        let duration = sequencer.segments()[index].duration_secs;
        println!(
            "  {:>2}. {:<8} {:>8.1} Hz  {}  {:5.1}% @ {:5.1}%",
            index + 1,
            entry.frequency_label,
            entry.frequency,
            format_clock(duration as u64),
            entry.width_percent,
            entry.start_percent,
        );
    }
}

fn validate_plan(path: &str, presets: Option<&String>) -> Result<()> {
    let plan = SessionPlan::load(path)?;
    let sequencer = plan.build(&load_presets(presets)?)?;
    println!("Plan {:?} is valid", plan.session.name);
    print_timeline(&sequencer);
    Ok(())
}

/// Wait for the session to end on its own or for an interrupt.
///
/// Returns true when interrupted. A failed signal handler is logged and
/// the wait continues until the session ends.
async fn wait_for_end<F>(done: &Notify, interrupt: F) -> bool
where
    F: Future<Output = io::Result<()>>,
{
    tokio::select! {
        _ = done.notified() => false,
        signal = interrupt => match signal {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, "Ctrl+C handler unavailable, running to completion");
                done.notified().await;
                false
            }
        },
    }
}

/// Drive a configured sequencer to completion or Ctrl+C
async fn run_session(sequencer: Sequencer, initial_hz: f64, config: DriverConfig) -> Result<()> {
    let done = Arc::new(Notify::new());
    let observer = ConsoleTone {
        frequency: initial_hz,
        total_secs: sequencer.effective_duration(),
        done: Arc::clone(&done),
    };

    let (handle, join) = SessionDriver::spawn_with(sequencer, observer, config);
    handle.start().await?;

    if wait_for_end(&done, tokio::signal::ctrl_c()).await {
        handle.stop().await?;
    }

    handle.shutdown();
    join.await.context("Session driver task failed")?;
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, what: &str) -> Result<T> {
    let raw = args
        .get(index)
        .ok_or_else(|| anyhow!("Missing {}", what))?;
    raw.parse()
        .map_err(|_| anyhow!("Invalid {}: {}", what, raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().collect();

    let verbose = args.iter().any(|a| a == "--verbose");
    args.retain(|a| a != "--verbose");

    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .init();

    if args.len() < 2 {
        println!("toneseq - Timed frequency listening sessions");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--presets" => {
            list_presets(args.get(2))?;
        }
        "--single" => {
            let seconds = match args.get(2).and_then(|a| duration_preset(a)) {
                Some(seconds) => seconds,
                None => parse_arg(&args, 2, "duration in seconds")?,
            };
            let hz: f64 = parse_arg(&args, 3, "frequency")?;
            let mut sequencer = Sequencer::new();
            sequencer.set_single_duration(seconds)?;
            run_session(sequencer, hz, DriverConfig::default()).await?;
        }
        "--plan" => {
            let path = args
                .get(2)
                .ok_or_else(|| anyhow!("--plan requires a plan file"))?;
            let plan = SessionPlan::load(path)?;
            let sequencer = plan.build(&load_presets(args.get(3))?)?;
            print_timeline(&sequencer);
            run_session(sequencer, plan.session.frequency, plan.driver_config()).await?;
        }
        "--validate" => {
            let path = args
                .get(2)
                .ok_or_else(|| anyhow!("--validate requires a plan file"))?;
            validate_plan(path, args.get(3))?;
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
