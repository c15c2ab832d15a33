//! Text and JSON renderings of controller snapshots.

use std::{collections::BTreeMap, fmt::Write as _};

use anyhow::{Context, Result};
use ballcube_core::{Coordinate, CurrentState, SequenceSummary, StateAt, GRID_EDGE};
use serde::Serialize;

/// Outcome of walking the controller forward and back.
#[derive(Debug, Serialize)]
pub(crate) struct WalkReport {
    /// Balls selected by each successful forward step.
    pub(crate) selections: Vec<Coordinate>,
    /// Whether the walk ran into the end of the sequence.
    pub(crate) reached_end: bool,
    /// Controller view once the walk completed.
    pub(crate) current: CurrentState,
    /// Number of balls per colour index once the walk completed.
    pub(crate) color_counts: BTreeMap<u32, usize>,
}

/// Serialises any snapshot as pretty JSON.
pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialise report as json")
}

pub(crate) fn summary_text(summary: &SequenceSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "base seed: {}", summary.base_seed);
    let _ = writeln!(out, "max colour index: {}", summary.max_color_index);
    let _ = writeln!(out, "selections: {}", summary.sequence.len());
    for (index, coordinate) in summary.sequence.iter().enumerate() {
        let _ = writeln!(out, "{:>4}: {coordinate}", index + 1);
    }
    out.push_str(&counts_text(&summary.final_color_counts));
    out
}

pub(crate) fn state_text(iteration: usize, state: &StateAt) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "iteration: {iteration}");
    match state.last_selected {
        Some(coordinate) => {
            let _ = writeln!(out, "last selected: {coordinate}");
        }
        None => out.push_str("last selected: none\n"),
    }
    for z in 1..=GRID_EDGE {
        let _ = writeln!(out, "layer {z}:");
        for (coordinate, index) in state.ball_states.iter().filter(|(c, _)| c.z() == z) {
            let level = state.progression_levels.level(coordinate);
            let _ = writeln!(out, "  {coordinate}  colour {index}  selected {level}x");
        }
    }
    out
}

pub(crate) fn walk_text(report: &WalkReport) -> String {
    let mut out = String::new();
    for (offset, coordinate) in report.selections.iter().enumerate() {
        let _ = writeln!(out, "step {:>3}: {coordinate}", offset + 1);
    }
    if report.reached_end {
        out.push_str("sequence finished\n");
    }
    let _ = writeln!(out, "iteration: {}", report.current.iteration);
    out.push_str(&counts_text(&report.color_counts));
    out
}

fn counts_text(counts: &BTreeMap<u32, usize>) -> String {
    let mut out = String::from("colour counts:\n");
    for (index, count) in counts {
        let _ = writeln!(out, "  {index}: {count}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballcube_core::{BallState, ProgressionLevels};

    #[test]
    fn state_text_lists_every_layer() {
        let state = StateAt {
            ball_states: BallState::initial(),
            progression_levels: ProgressionLevels::zeroed_for(&BallState::initial()),
            last_selected: None,
        };
        let text = state_text(0, &state);
        assert!(text.contains("last selected: none"));
        assert!(text.contains("layer 3:"));
        assert_eq!(text.matches("colour 0").count(), 26);
    }

    #[test]
    fn summary_json_uses_coordinate_strings() {
        let summary = SequenceSummary {
            base_seed: 1,
            max_color_index: 1,
            sequence: vec!["1,3,2".parse().expect("valid coordinate")],
            final_color_counts: BTreeMap::from([(0, 25), (1, 1)]),
        };
        let json = to_json(&summary).expect("serialises");
        assert!(json.contains("\"1,3,2\""));
    }
}
