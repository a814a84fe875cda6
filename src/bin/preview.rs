// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! curve-preview: inspect control profiles from the command line.
//!
//! `sweep` evaluates a profile across its input domain and prints the raw
//! (pre-smoothing, unclamped) outputs; `watch` runs the engine's tick loop
//! against values fed on stdin, one reading per line.

use clap::{Parser, Subcommand};
use control_curves::compose::{evaluate_mix, evaluate_offset};
use control_curves::config::{self, ControlProfile, ProfileBehavior};
use control_curves::{Engine, StaticFeed};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, Duration};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "curve-preview", about = "Control curve profile preview")]
struct Cli {
    /// Path to the profile configuration file.
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured profiles.
    List,

    /// Evaluate a profile across its input domain.
    Sweep {
        /// Profile name.
        profile: String,

        /// Number of evaluation steps across the domain.
        #[arg(long, default_value_t = 20)]
        steps: usize,

        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Tick the engine against readings fed on stdin (one value per line).
    Watch {
        /// Profile name.
        profile: String,

        /// Override the engine tick interval in milliseconds.
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

#[derive(Debug, Serialize)]
struct SweepRow {
    x: f64,
    value: f64,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = config::resolve_config_path(Some(&cli.config));
    let cfg = config::load_config(&config_path)?;

    match cli.command {
        Command::List => {
            for profile in &cfg.profiles {
                println!("{}  [{}]", profile.name, behavior_label(&profile.behavior));
            }
            Ok(())
        }
        Command::Sweep {
            profile,
            steps,
            json,
        } => {
            let profile = find_profile(&cfg.profiles, &profile)?;
            run_sweep(profile, steps.max(1), json)
        }
        Command::Watch {
            profile,
            interval_ms,
        } => {
            let mut cfg = cfg;
            if let Some(ms) = interval_ms {
                cfg.engine.tick_interval_ms = ms;
            }
            let name = find_profile(&cfg.profiles, &profile)?.name.clone();
            run_watch(cfg, name).await
        }
    }
}

fn find_profile<'a>(
    profiles: &'a [ControlProfile],
    name: &str,
) -> anyhow::Result<&'a ControlProfile> {
    profiles
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| anyhow::anyhow!("Unknown profile: {name}"))
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

fn run_sweep(profile: &ControlProfile, steps: usize, json: bool) -> anyhow::Result<()> {
    let (x_min, x_max) = input_span(&profile.behavior);
    let rows: Vec<SweepRow> = (0..=steps)
        .map(|i| {
            let x = x_min + (x_max - x_min) * i as f64 / steps as f64;
            SweepRow {
                x,
                value: evaluate_at(&profile.behavior, x),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{:>10}  {:>10}", "input", "output");
        for row in &rows {
            println!("{:>10.2}  {:>10.2}", row.x, row.value);
        }
    }
    Ok(())
}

/// The input range a sweep walks: the x domain of the profile's primary
/// curve(s). Mix members may track different sources, so the sweep feeds
/// the same value to every member and spans the union of their domains.
fn input_span(behavior: &ProfileBehavior) -> (f64, f64) {
    match behavior {
        ProfileBehavior::Graph { curve, .. } => (curve.domain.x_min, curve.domain.x_max),
        ProfileBehavior::Offset { base, .. } => (base.domain.x_min, base.domain.x_max),
        ProfileBehavior::Mix { members, .. } => members.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), m| (lo.min(m.curve.domain.x_min), hi.max(m.curve.domain.x_max)),
        ),
    }
}

fn evaluate_at(behavior: &ProfileBehavior, x: f64) -> f64 {
    match behavior {
        ProfileBehavior::Graph { curve, .. } => curve.evaluate(x),
        ProfileBehavior::Offset { base, offset, .. } => evaluate_offset(base, offset, x),
        ProfileBehavior::Mix { reducer, members } => {
            let mut feed = StaticFeed::new();
            for m in members {
                feed.set(m.source_id.clone(), x);
            }
            evaluate_mix(*reducer, members, &feed).0
        }
    }
}

fn behavior_label(behavior: &ProfileBehavior) -> &'static str {
    match behavior {
        ProfileBehavior::Graph { .. } => "graph",
        ProfileBehavior::Mix { .. } => "mix",
        ProfileBehavior::Offset { .. } => "offset",
    }
}

// ---------------------------------------------------------------------------
// Watch
// ---------------------------------------------------------------------------

async fn run_watch(cfg: config::Config, name: String) -> anyhow::Result<()> {
    let source_ids: Vec<String> = cfg
        .profiles
        .iter()
        .find(|p| p.name == name)
        .map(|p| sources_of(&p.behavior))
        .unwrap_or_default();

    let tick_ms = cfg.engine.tick_interval_ms;
    let mut engine = Engine::new(&cfg);
    let mut feed = StaticFeed::new();

    log::info!("Watching profile '{name}' (tick every {tick_ms} ms, readings from stdin)");

    let mut interval = time::interval(Duration::from_millis(tick_ms));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                engine.tick(&feed);
                if let Some(out) = engine.output(&name) {
                    let marker = if out.live { "" } else { "  (no live value)" };
                    println!("{:.2}{marker}", out.value);
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(text) => {
                        let text = text.trim();
                        if text.is_empty() {
                            continue;
                        }
                        match text.parse::<f64>() {
                            Ok(value) => {
                                for id in &source_ids {
                                    feed.set(id.clone(), value);
                                }
                            }
                            Err(_) => log::warn!("Ignoring unparsable reading: {text}"),
                        }
                    }
                    None => break, // stdin closed
                }
            }
        }
    }

    Ok(())
}

fn sources_of(behavior: &ProfileBehavior) -> Vec<String> {
    match behavior {
        ProfileBehavior::Graph { source_id, .. } | ProfileBehavior::Offset { source_id, .. } => {
            vec![source_id.clone()]
        }
        ProfileBehavior::Mix { members, .. } => {
            members.iter().map(|m| m.source_id.clone()).collect()
        }
    }
}
