#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the Ballcube sequence engine.

mod palette_file;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use ballcube_controller::{self as controller, query, Controller};
use ballcube_core::{Command, Event, Palette, DEFAULT_SEED_TEXT};
use ballcube_system_seeding::{normalize_seed_text, random_seed_text, SeedAdjustment};
use clap::{ArgAction, Parser, Subcommand};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::report::WalkReport;

#[derive(Debug, Parser)]
#[command(
    name = "ballcube",
    about = "Replays the deterministic recolouring sequence of the 26-ball cube"
)]
struct Cli {
    /// Free-form seed text hashed into the base seed.
    #[arg(long, default_value = DEFAULT_SEED_TEXT)]
    seed: String,

    /// Pad or truncate the seed to 32 characters before hashing.
    #[arg(long)]
    normalize_seed: bool,

    /// TOML palette file; defaults to the built-in six-colour palette.
    #[arg(long, conflicts_with = "palette_size")]
    palette: Option<PathBuf>,

    /// Use a contiguous palette with this many colours instead of a file.
    #[arg(long)]
    palette_size: Option<usize>,

    /// Print reports as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Print the whole precomputed selection sequence.
    Sequence,
    /// Print the cube at one iteration.
    State {
        /// Iteration to reconstruct; 0 is the initial state.
        #[arg(long)]
        iteration: usize,
    },
    /// Step forward, then optionally back, reporting every selection.
    Walk {
        /// Number of forward steps to attempt.
        #[arg(long, default_value_t = 10)]
        steps: usize,
        /// Number of backward steps taken after walking forward.
        #[arg(long, default_value_t = 0)]
        back: usize,
    },
    /// Print freshly generated seed text.
    Seed {
        /// Derive the seed from this number instead of system entropy.
        #[arg(long)]
        from: Option<u64>,
    },
}

/// Entry point for the Ballcube command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = match cli.mode {
        Mode::Seed { from } => match from {
            Some(value) => random_seed_text(&mut ChaCha8Rng::seed_from_u64(value)),
            None => random_seed_text(&mut rand::thread_rng()),
        },
        Mode::Sequence => {
            let controller = build_controller(&cli)?;
            let summary = query::summary(&controller);
            if cli.json {
                report::to_json(&summary)?
            } else {
                report::summary_text(&summary)
            }
        }
        Mode::State { iteration } => {
            let controller = build_controller(&cli)?;
            let state = controller.state_at(iteration).with_context(|| {
                format!(
                    "iteration {iteration} is outside the sequence (0..={})",
                    query::sequence_len(&controller)
                )
            })?;
            if cli.json {
                report::to_json(&state)?
            } else {
                report::state_text(iteration, &state)
            }
        }
        Mode::Walk { steps, back } => {
            let mut controller = build_controller(&cli)?;
            let report = walk(&mut controller, steps, back);
            if cli.json {
                report::to_json(&report)?
            } else {
                report::walk_text(&report)
            }
        }
    };

    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn build_controller(cli: &Cli) -> Result<Controller> {
    let seed_text = resolve_seed(cli);
    let palette = resolve_palette(cli)?;
    let mut controller = Controller::default();
    let mut events = Vec::new();
    controller::apply(
        &mut controller,
        Command::Initialize { seed_text, palette },
        &mut events,
    );
    log_events(&events);
    Ok(controller)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn resolve_seed(cli: &Cli) -> String {
    if !cli.normalize_seed {
        return cli.seed.clone();
    }

    let normalized = normalize_seed_text(&cli.seed);
    match normalized.adjustment() {
        SeedAdjustment::Unchanged => {}
        SeedAdjustment::Padded => warn!("seed padded to 32 characters"),
        SeedAdjustment::Truncated => warn!("seed truncated to 32 characters"),
    }
    normalized.into_text()
}

fn resolve_palette(cli: &Cli) -> Result<Palette> {
    if let Some(path) = &cli.palette {
        let palette = palette_file::load_palette(path)?;
        debug!("loaded {} colours from {}", palette.len(), path.display());
        return Ok(palette);
    }
    Ok(cli
        .palette_size
        .map_or_else(Palette::default, Palette::with_size))
}

fn walk(controller: &mut Controller, steps: usize, back: usize) -> WalkReport {
    let mut selections = Vec::new();
    let mut reached_end = false;
    let mut events = Vec::new();

    for _ in 0..steps {
        events.clear();
        controller::apply(controller, Command::StepForward, &mut events);
        log_events(&events);
        match events.first() {
            Some(Event::SteppedForward { selected, .. }) => selections.push(*selected),
            _ => {
                reached_end = true;
                break;
            }
        }
    }

    for _ in 0..back {
        events.clear();
        controller::apply(controller, Command::StepBackward, &mut events);
        log_events(&events);
        if events.first() == Some(&Event::BackwardRejected) {
            break;
        }
    }

    WalkReport {
        selections,
        reached_end,
        current: controller.current_state(),
        color_counts: query::color_counts(controller),
    }
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::Initialized {
                base_seed,
                sequence_len,
                max_color_index,
            } => info!(
                "sequence ready: base seed {base_seed}, {sequence_len} selections, max colour {max_color_index}"
            ),
            Event::SteppedForward {
                iteration,
                selected,
            } => debug!("iteration {iteration}: selected {selected}"),
            Event::SequenceFinished { iteration } => {
                info!("sequence finished at iteration {iteration}")
            }
            Event::SteppedBackward { iteration } => debug!("stepped back to iteration {iteration}"),
            Event::BackwardRejected => info!("already at the initial state"),
            Event::PaletteChanged { max_color_index } => {
                debug!("palette changed, max colour {max_color_index}")
            }
            Event::PaletteEditRejected { reason } => warn!("palette edit rejected: {reason}"),
        }
    }
}
