#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic sequence engine that precomputes every ball selection.
//!
//! A run is computed once, synchronously, and kept immutable. Every step
//! seeds its own generator from a fingerprint of the history that led to it,
//! so any iteration can be reconstructed from the stored snapshots without
//! replaying generator state.

use ballcube_core::{BallState, Coordinate, ProgressionLevels, SequenceSummary, StateAt};
use ballcube_system_probability::{probabilities, select};
use ballcube_system_seeding::{hash_to_base_seed, step_fingerprint, SeededRandom};

/// Precomputed selection order together with a state snapshot per iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceEngine {
    base_seed: u32,
    max_color_index: u32,
    sequence: Vec<Coordinate>,
    states: Vec<BallState>,
}

impl SequenceEngine {
    /// Creates an empty engine anchored at the provided base seed.
    #[must_use]
    pub const fn new(base_seed: u32) -> Self {
        Self {
            base_seed,
            max_color_index: 0,
            sequence: Vec::new(),
            states: Vec::new(),
        }
    }

    /// Creates an empty engine whose base seed is hashed from seed text.
    #[must_use]
    pub fn from_seed_text(seed_text: &str) -> Self {
        Self::new(hash_to_base_seed(seed_text))
    }

    /// Base seed anchoring every step fingerprint.
    #[must_use]
    pub const fn base_seed(&self) -> u32 {
        self.base_seed
    }

    /// Maximum colour index of the last precomputation.
    #[must_use]
    pub const fn max_color_index(&self) -> u32 {
        self.max_color_index
    }

    /// Reports whether a sequence has been precomputed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.states.is_empty()
    }

    /// Selections in order; index 0 is the first selection.
    #[must_use]
    pub fn sequence(&self) -> &[Coordinate] {
        &self.sequence
    }

    /// State snapshots; `states()[0]` is the initial state.
    #[must_use]
    pub fn states(&self) -> &[BallState] {
        &self.states
    }

    /// Number of selections in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Reports whether the sequence holds no selections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Computes the full sequence from `initial_state`, replacing any previous run.
    ///
    /// The run ends as soon as any ball reaches `max_color_index`, or when no
    /// ball remains eligible.
    pub fn precompute(&mut self, initial_state: BallState, max_color_index: u32) {
        let mut progression = ProgressionLevels::zeroed_for(&initial_state);
        let mut state = initial_state;
        let mut sequence = Vec::new();
        let mut states = vec![state.clone()];

        while !state.any_at_or_above(max_color_index) {
            let iteration = sequence.len();
            let fingerprint = step_fingerprint(self.base_seed, iteration, &state, &progression);
            let mut rng = SeededRandom::new(u64::from(fingerprint));

            let probabilities = probabilities(&state, &progression, max_color_index);
            if probabilities.is_empty() {
                break;
            }
            let Some(selected) = select(&probabilities, rng.draw()) else {
                break;
            };

            state = state.advanced(selected);
            progression.record(selected);
            sequence.push(selected);
            states.push(state.clone());
        }

        self.max_color_index = max_color_index;
        self.sequence = sequence;
        self.states = states;
    }

    /// Stored ball state at the iteration.
    #[must_use]
    pub fn ball_state_at(&self, iteration: usize) -> Option<&BallState> {
        self.states.get(iteration)
    }

    /// Progression levels at the iteration, replayed from the sequence prefix.
    #[must_use]
    pub fn progression_at(&self, iteration: usize) -> Option<ProgressionLevels> {
        let initial = self.states.first()?;
        if iteration >= self.states.len() {
            return None;
        }

        let mut progression = ProgressionLevels::zeroed_for(initial);
        for &selected in &self.sequence[..iteration] {
            progression.record(selected);
        }
        Some(progression)
    }

    /// Reconstructs the view at the iteration, or `None` when out of range.
    #[must_use]
    pub fn state_at(&self, iteration: usize) -> Option<StateAt> {
        let ball_states = self.ball_state_at(iteration)?.clone();
        let progression_levels = self.progression_at(iteration)?;
        let last_selected = iteration
            .checked_sub(1)
            .and_then(|index| self.sequence.get(index).copied());

        Some(StateAt {
            ball_states,
            progression_levels,
            last_selected,
        })
    }

    /// Summarises the computed run.
    #[must_use]
    pub fn summary(&self) -> SequenceSummary {
        let final_color_counts = self
            .states
            .last()
            .map(BallState::color_counts)
            .unwrap_or_default();

        SequenceSummary {
            base_seed: self.base_seed,
            max_color_index: self.max_color_index,
            sequence: self.sequence.clone(),
            final_color_counts,
        }
    }
}
