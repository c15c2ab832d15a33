#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Ballcube sequence engine.
//!
//! This crate defines the data model and the message surface that connects
//! adapters, the authoritative controller, and the pure systems. Adapters
//! submit [`Command`] values describing desired navigation or palette edits,
//! the controller executes them via its `apply` entry point, and then reports
//! [`Event`] values describing what changed. Systems operate exclusively on
//! the immutable snapshots defined here.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cells along each edge of the cube.
pub const GRID_EDGE: u8 = 3;

/// Number of addressable balls in the cube (the centre cell is absent).
pub const CELL_COUNT: usize = 26;

/// Seed text used when the caller does not provide one.
pub const DEFAULT_SEED_TEXT: &str =
    "0x55ac31f9309a8a914ab889fca907f350321024a60d39670cbb693c9c14638d94";

/// Colour index reserved for the default, uncoloured ball.
pub const DEFAULT_COLOR_INDEX: u32 = 0;

const CENTRE: u8 = 2;

const DEFAULT_PALETTE_COLORS: [PaletteColor; 6] = [
    PaletteColor::from_rgb(0x52, 0x52, 0x52),
    PaletteColor::from_rgb(0xa8, 0x28, 0x1d),
    PaletteColor::from_rgb(0xfc, 0xba, 0x03),
    PaletteColor::from_rgb(0x13, 0x94, 0x4b),
    PaletteColor::from_rgb(0x13, 0x8b, 0x94),
    PaletteColor::from_rgb(0x17, 0x35, 0x99),
];

/// Commands that express all permissible controller mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the seed and palette, then recomputes the whole sequence.
    Initialize {
        /// Free-form seed text hashed into the base seed.
        seed_text: String,
        /// Palette snapshot that determines the maximum colour index.
        palette: Palette,
    },
    /// Advances the iteration cursor by one selection.
    StepForward,
    /// Moves the iteration cursor back by one selection.
    StepBackward,
    /// Recomputes the sequence from the current seed text and palette.
    Reset,
    /// Replaces or inserts the colour stored at the provided index.
    SetPaletteColor {
        /// Palette index receiving the colour.
        index: u32,
        /// Colour to store at the index.
        color: PaletteColor,
    },
    /// Appends a colour after the highest palette index.
    AddPaletteColor {
        /// Colour to append.
        color: PaletteColor,
    },
    /// Removes the colour stored at the provided index.
    RemovePaletteColor {
        /// Palette index to remove.
        index: u32,
    },
}

/// Events reported by the controller after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new sequence was precomputed.
    Initialized {
        /// Integer seed derived from the seed text.
        base_seed: u32,
        /// Number of selections in the precomputed sequence.
        sequence_len: usize,
        /// Maximum colour index used to compute the sequence.
        max_color_index: u32,
    },
    /// Confirms that the cursor advanced onto a new selection.
    SteppedForward {
        /// Iteration reached after the step.
        iteration: usize,
        /// Ball recoloured by the step.
        selected: Coordinate,
    },
    /// Reports that a forward step was refused because the sequence ended.
    SequenceFinished {
        /// Iteration at which the sequence ended.
        iteration: usize,
    },
    /// Confirms that the cursor moved back by one selection.
    SteppedBackward {
        /// Iteration reached after the step.
        iteration: usize,
    },
    /// Reports that a backward step was refused at the initial state.
    BackwardRejected,
    /// Confirms that the palette changed.
    PaletteChanged {
        /// Maximum colour index derived from the new palette.
        max_color_index: u32,
    },
    /// Reports that a palette edit was rejected.
    PaletteEditRejected {
        /// Specific reason the edit failed.
        reason: PaletteError,
    },
}

/// Identity of one of the 26 balls addressed by `(x, y, z)`.
///
/// Coordinates order lexicographically by their `"x,y,z"` string form. Every
/// component is a single digit, so the derived field ordering is identical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    x: u8,
    y: u8,
    z: u8,
}

impl Coordinate {
    /// All addressable coordinates in ascending order.
    pub const ALL: [Coordinate; CELL_COUNT] = all_coordinates();

    /// Creates a coordinate, rejecting components outside `1..=3` and the centre.
    pub fn new(x: u8, y: u8, z: u8) -> Result<Self, CoordinateError> {
        let in_range = |value: u8| (1..=GRID_EDGE).contains(&value);
        if !(in_range(x) && in_range(y) && in_range(z)) {
            return Err(CoordinateError::OutOfRange { x, y, z });
        }
        if x == CENTRE && y == CENTRE && z == CENTRE {
            return Err(CoordinateError::Centre);
        }
        Ok(Self { x, y, z })
    }

    /// Column of the ball, 1 being the left.
    #[must_use]
    pub const fn x(&self) -> u8 {
        self.x
    }

    /// Row of the ball, 1 being the bottom.
    #[must_use]
    pub const fn y(&self) -> u8 {
        self.y
    }

    /// Layer of the ball, 1 being the front.
    #[must_use]
    pub const fn z(&self) -> u8 {
        self.z
    }

    /// Coordinates that lie in the requested z-layer, in ascending order.
    #[must_use]
    pub fn layer(z: u8) -> Vec<Coordinate> {
        Self::ALL
            .iter()
            .copied()
            .filter(|coordinate| coordinate.z == z)
            .collect()
    }
}

const fn all_coordinates() -> [Coordinate; CELL_COUNT] {
    let mut cells = [Coordinate { x: 1, y: 1, z: 1 }; CELL_COUNT];
    let mut index = 0;
    let mut x = 1;
    while x <= GRID_EDGE {
        let mut y = 1;
        while y <= GRID_EDGE {
            let mut z = 1;
            while z <= GRID_EDGE {
                if !(x == CENTRE && y == CENTRE && z == CENTRE) {
                    cells[index] = Coordinate { x, y, z };
                    index += 1;
                }
                z += 1;
            }
            y += 1;
        }
        x += 1;
    }
    cells
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || CoordinateError::Malformed(value.to_owned());
        let mut parts = value.trim().split(',');
        let mut component = || -> Result<u8, CoordinateError> {
            parts
                .next()
                .ok_or_else(malformed)?
                .trim()
                .parse::<u8>()
                .map_err(|_| malformed())
        };
        let x = component()?;
        let y = component()?;
        let z = component()?;
        if parts.next().is_some() {
            return Err(malformed());
        }
        Self::new(x, y, z)
    }
}

impl TryFrom<String> for Coordinate {
    type Error = CoordinateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Coordinate> for String {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.to_string()
    }
}

/// Reasons a coordinate could not be constructed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoordinateError {
    /// The text was not three comma separated integers.
    #[error("coordinate '{0}' is not of the form x,y,z")]
    Malformed(String),
    /// A component fell outside `1..=3`.
    #[error("coordinate {x},{y},{z} lies outside the cube")]
    OutOfRange {
        /// Requested column.
        x: u8,
        /// Requested row.
        y: u8,
        /// Requested layer.
        z: u8,
    },
    /// The centre cell holds no ball.
    #[error("the centre cell 2,2,2 holds no ball")]
    Centre,
}

/// Colour index of every ball, keyed in ascending coordinate order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BallState(BTreeMap<Coordinate, u32>);

impl BallState {
    /// State in which all 26 balls carry the default colour.
    #[must_use]
    pub fn initial() -> Self {
        Self::from_entries(
            Coordinate::ALL
                .iter()
                .map(|&coordinate| (coordinate, DEFAULT_COLOR_INDEX)),
        )
    }

    /// Builds a state from explicit `(coordinate, colour index)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (Coordinate, u32)>) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Colour index of the ball, if the coordinate is part of the state.
    #[must_use]
    pub fn color_index(&self, coordinate: Coordinate) -> Option<u32> {
        self.0.get(&coordinate).copied()
    }

    /// Iterates over `(coordinate, colour index)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, u32)> + '_ {
        self.0.iter().map(|(&coordinate, &index)| (coordinate, index))
    }

    /// Coordinates tracked by the state in ascending order.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.0.keys().copied()
    }

    /// Number of balls tracked by the state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reports whether the state tracks no balls at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reports whether any ball reached or exceeded the provided colour index.
    #[must_use]
    pub fn any_at_or_above(&self, max_color_index: u32) -> bool {
        self.0.values().any(|&index| index >= max_color_index)
    }

    /// Returns a copy of the state with the selected ball advanced by one colour.
    #[must_use]
    pub fn advanced(&self, selected: Coordinate) -> Self {
        let mut next = self.clone();
        if let Some(index) = next.0.get_mut(&selected) {
            *index += 1;
        }
        next
    }

    /// Number of balls per colour index, in ascending index order.
    #[must_use]
    pub fn color_counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for &index in self.0.values() {
            *counts.entry(index).or_insert(0) += 1;
        }
        counts
    }
}

/// Number of times each ball has been selected so far.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressionLevels(BTreeMap<Coordinate, u32>);

impl ProgressionLevels {
    /// Zero progression for every ball tracked by the provided state.
    #[must_use]
    pub fn zeroed_for(state: &BallState) -> Self {
        Self(state.coordinates().map(|coordinate| (coordinate, 0)).collect())
    }

    /// Selection count of the ball; untracked balls count as zero.
    #[must_use]
    pub fn level(&self, coordinate: Coordinate) -> u32 {
        self.0.get(&coordinate).copied().unwrap_or(0)
    }

    /// Iterates over `(coordinate, level)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, u32)> + '_ {
        self.0.iter().map(|(&coordinate, &level)| (coordinate, level))
    }

    /// Records one more selection of the ball.
    pub fn record(&mut self, selected: Coordinate) {
        *self.0.entry(selected).or_insert(0) += 1;
    }

    /// Returns a copy with one more selection of the ball recorded.
    #[must_use]
    pub fn advanced(&self, selected: Coordinate) -> Self {
        let mut next = self.clone();
        next.record(selected);
        next
    }
}

/// Opaque RGB colour stored in a palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaletteColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl PaletteColor {
    /// Creates a new palette colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Perceived brightness in `[0, 255]`, used to pick readable label colours.
    #[must_use]
    pub fn brightness(&self) -> f64 {
        let red = f64::from(self.red);
        let green = f64::from(self.green);
        let blue = f64::from(self.blue);
        (0.299 * red * red + 0.587 * green * green + 0.114 * blue * blue).sqrt()
    }
}

impl fmt::Display for PaletteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl FromStr for PaletteColor {
    type Err = ColorParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorParseError(value.to_owned());
        let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for PaletteColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaletteColor> for String {
    fn from(color: PaletteColor) -> Self {
        color.to_string()
    }
}

/// Raised when a colour is not written as `#RRGGBB`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid colour '{0}', expected #RRGGBB")]
pub struct ColorParseError(String);

/// Immutable mapping from colour index to colour.
///
/// Only the indices matter to the sequence engine; the colours travel along
/// for presentation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(BTreeMap<u32, PaletteColor>);

impl Default for Palette {
    fn default() -> Self {
        Self::with_size(DEFAULT_PALETTE_COLORS.len())
    }
}

impl Palette {
    /// Builds a palette from explicit `(index, colour)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (u32, PaletteColor)>) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Builds a contiguous palette with indices `0..size`, cycling the default colours.
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self::from_entries(
            (0..size)
                .zip(DEFAULT_PALETTE_COLORS.iter().cycle())
                .map(|(index, &color)| (index as u32, color)),
        )
    }

    /// Number of colours in the palette.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reports whether the palette contains no colours.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Colour stored at the index, if any.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<PaletteColor> {
        self.0.get(&index).copied()
    }

    /// Iterates over `(index, colour)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, PaletteColor)> + '_ {
        self.0.iter().map(|(&index, &color)| (index, color))
    }

    /// Highest colour index a ball may reach.
    ///
    /// This is the largest index present once the palette holds more than one
    /// colour. A palette with zero or one colour yields 0, which leaves no
    /// ball eligible for selection.
    #[must_use]
    pub fn max_color_index(&self) -> u32 {
        if self.0.len() > 1 {
            self.0.keys().next_back().copied().unwrap_or(0)
        } else {
            0
        }
    }

    /// Returns a copy with the colour at `index` replaced or inserted.
    #[must_use]
    pub fn with_color(&self, index: u32, color: PaletteColor) -> Self {
        let mut next = self.clone();
        let _ = next.0.insert(index, color);
        next
    }

    /// Returns a copy with the colour appended after the highest index, and that index.
    #[must_use]
    pub fn add_color(&self, color: PaletteColor) -> (Self, u32) {
        let index = self
            .0
            .keys()
            .next_back()
            .map_or(1, |highest| highest.saturating_add(1));
        (self.with_color(index, color), index)
    }

    /// Returns a copy without the colour at `index`.
    pub fn remove_color(&self, index: u32) -> Result<Self, PaletteError> {
        if index == DEFAULT_COLOR_INDEX {
            return Err(PaletteError::ReservedIndex);
        }
        let mut next = self.clone();
        match next.0.remove(&index) {
            Some(_) => Ok(next),
            None => Err(PaletteError::MissingIndex { index }),
        }
    }
}

/// Reasons a palette edit may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PaletteError {
    /// Index 0 holds the default colour and cannot be removed.
    #[error("the default colour at index 0 cannot be removed")]
    ReservedIndex,
    /// No colour is stored at the requested index.
    #[error("no colour is stored at index {index}")]
    MissingIndex {
        /// Index that was requested.
        index: u32,
    },
}

/// Reconstructed view of the cube at one iteration of a sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAt {
    /// Colour index of every ball.
    pub ball_states: BallState,
    /// Selection count of every ball, replayed from the sequence prefix.
    pub progression_levels: ProgressionLevels,
    /// Ball selected by the step that led to this iteration.
    pub last_selected: Option<Coordinate>,
}

/// Controller view of the current cursor position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentState {
    /// Number of selections applied so far.
    pub iteration: usize,
    /// Selections applied so far, oldest first.
    pub sequence_prefix: Vec<Coordinate>,
    /// Colour index of every ball.
    pub ball_states: BallState,
    /// Whether no further selection exists past the cursor.
    pub finished: bool,
    /// Ball selected by the step that led to this iteration.
    pub last_selected: Option<Coordinate>,
}

/// Overview of a fully precomputed run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSummary {
    /// Integer seed derived from the seed text.
    pub base_seed: u32,
    /// Maximum colour index the run was computed with.
    pub max_color_index: u32,
    /// Every selection of the run, oldest first.
    pub sequence: Vec<Coordinate>,
    /// Number of balls per colour index once the run has ended.
    pub final_color_counts: BTreeMap<u32, usize>,
}
