#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative navigation state for the Ballcube experience.
//!
//! The controller owns one precomputed [`SequenceEngine`] and an iteration
//! cursor over it. Adapters either call its methods directly or submit
//! [`Command`] values through [`apply`] and react to the reported [`Event`]s.

use ballcube_core::{
    BallState, Command, Coordinate, CurrentState, Event, Palette, StateAt, DEFAULT_SEED_TEXT,
};
use ballcube_system_sequence::SequenceEngine;

/// Iteration cursor over a precomputed sequence.
#[derive(Clone, Debug)]
pub struct Controller {
    seed_text: String,
    palette: Palette,
    max_color_index: u32,
    engine: SequenceEngine,
    iteration: usize,
    finished: bool,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(DEFAULT_SEED_TEXT, Palette::default())
    }
}

impl Controller {
    /// Creates a controller with a fully precomputed sequence.
    #[must_use]
    pub fn new(seed_text: impl Into<String>, palette: Palette) -> Self {
        let seed_text = seed_text.into();
        let mut controller = Self {
            engine: SequenceEngine::from_seed_text(&seed_text),
            seed_text,
            max_color_index: palette.max_color_index(),
            palette,
            iteration: 0,
            finished: false,
        };
        controller.recompute();
        controller
    }

    /// Replaces seed text and palette, recomputes the sequence and rewinds the cursor.
    pub fn initialize(&mut self, seed_text: impl Into<String>, palette: Palette) {
        self.seed_text = seed_text.into();
        self.max_color_index = palette.max_color_index();
        self.palette = palette;
        self.engine = SequenceEngine::from_seed_text(&self.seed_text);
        self.recompute();
    }

    /// Recomputes the sequence from the current seed text and palette.
    pub fn reset(&mut self) {
        self.max_color_index = self.palette.max_color_index();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.engine
            .precompute(BallState::initial(), self.max_color_index);
        self.iteration = 0;
        self.finished = false;
    }

    /// Replaces the palette and re-derives the maximum colour index.
    ///
    /// The precomputed sequence is left untouched until the next
    /// [`Controller::reset`] or [`Controller::initialize`].
    pub fn update_palette(&mut self, palette: Palette) {
        self.max_color_index = palette.max_color_index();
        self.palette = palette;
    }

    /// Advances the cursor by one selection.
    ///
    /// Returns `false` and marks the controller finished when no further
    /// selection exists.
    pub fn step_forward(&mut self) -> bool {
        self.advance().is_some()
    }

    fn advance(&mut self) -> Option<Coordinate> {
        if self.finished {
            return None;
        }

        let next = self.iteration + 1;
        if self.engine.ball_state_at(next).is_none() {
            self.finished = true;
            return None;
        }

        self.iteration = next;
        self.engine.sequence().get(self.iteration - 1).copied()
    }

    /// Moves the cursor back by one selection; returns `false` at iteration 0.
    pub fn step_backward(&mut self) -> bool {
        if self.iteration == 0 {
            return false;
        }

        self.iteration -= 1;
        self.finished = false;
        true
    }

    /// Reconstructs the view at any iteration of the current sequence.
    #[must_use]
    pub fn state_at(&self, iteration: usize) -> Option<StateAt> {
        self.engine.state_at(iteration)
    }

    /// View of the cube at the cursor.
    #[must_use]
    pub fn current_state(&self) -> CurrentState {
        let prefix = &self.engine.sequence()[..self.iteration];
        CurrentState {
            iteration: self.iteration,
            sequence_prefix: prefix.to_vec(),
            ball_states: self.current_ball_state().clone(),
            finished: self.is_finished(),
            last_selected: prefix.last().copied(),
        }
    }

    fn current_ball_state(&self) -> &BallState {
        // The cursor never leaves [0, len], and a recomputed engine always
        // holds the initial snapshot.
        &self.engine.states()[self.iteration]
    }

    /// Number of selections applied so far.
    #[must_use]
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Whether no selection exists past the cursor.
    ///
    /// This is also true before any failed forward step once the cursor
    /// sits on the last snapshot, including the empty sequence of a
    /// degenerate palette.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished || self.iteration >= self.engine.len()
    }

    /// Seed text the sequence was computed from.
    #[must_use]
    pub fn seed_text(&self) -> &str {
        &self.seed_text
    }

    /// Current palette snapshot.
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Maximum colour index derived from the current palette.
    #[must_use]
    pub const fn max_color_index(&self) -> u32 {
        self.max_color_index
    }

    /// Read-only access to the precomputed sequence.
    #[must_use]
    pub const fn engine(&self) -> &SequenceEngine {
        &self.engine
    }
}

/// Applies the command to the controller and reports what happened.
pub fn apply(controller: &mut Controller, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Initialize { seed_text, palette } => {
            controller.initialize(seed_text, palette);
            out_events.push(initialized(controller));
        }
        Command::Reset => {
            controller.reset();
            out_events.push(initialized(controller));
        }
        Command::StepForward => match controller.advance() {
            Some(selected) => out_events.push(Event::SteppedForward {
                iteration: controller.iteration,
                selected,
            }),
            None => out_events.push(Event::SequenceFinished {
                iteration: controller.iteration,
            }),
        },
        Command::StepBackward => {
            if controller.step_backward() {
                out_events.push(Event::SteppedBackward {
                    iteration: controller.iteration,
                });
            } else {
                out_events.push(Event::BackwardRejected);
            }
        }
        Command::SetPaletteColor { index, color } => {
            let palette = controller.palette.with_color(index, color);
            controller.update_palette(palette);
            out_events.push(palette_changed(controller));
        }
        Command::AddPaletteColor { color } => {
            let (palette, _) = controller.palette.add_color(color);
            controller.update_palette(palette);
            out_events.push(palette_changed(controller));
        }
        Command::RemovePaletteColor { index } => match controller.palette.remove_color(index) {
            Ok(palette) => {
                controller.update_palette(palette);
                out_events.push(palette_changed(controller));
            }
            Err(reason) => out_events.push(Event::PaletteEditRejected { reason }),
        },
    }
}

fn initialized(controller: &Controller) -> Event {
    Event::Initialized {
        base_seed: controller.engine.base_seed(),
        sequence_len: controller.engine.len(),
        max_color_index: controller.engine.max_color_index(),
    }
}

fn palette_changed(controller: &Controller) -> Event {
    Event::PaletteChanged {
        max_color_index: controller.max_color_index,
    }
}

/// Read-only queries for presentation layers.
pub mod query {
    use std::collections::BTreeMap;

    use ballcube_core::{Coordinate, SequenceSummary};

    use super::Controller;

    /// Number of balls per colour index at the cursor.
    #[must_use]
    pub fn color_counts(controller: &Controller) -> BTreeMap<u32, usize> {
        controller.current_ball_state().color_counts()
    }

    /// Colour index of every ball in the z-layer at the cursor, in ascending order.
    #[must_use]
    pub fn layer(controller: &Controller, z: u8) -> Vec<(Coordinate, u32)> {
        controller
            .current_ball_state()
            .iter()
            .filter(|(coordinate, _)| coordinate.z() == z)
            .collect()
    }

    /// Overview of the whole precomputed run.
    #[must_use]
    pub fn summary(controller: &Controller) -> SequenceSummary {
        controller.engine.summary()
    }

    /// Number of selections in the precomputed run.
    #[must_use]
    pub fn sequence_len(controller: &Controller) -> usize {
        controller.engine.len()
    }
}
