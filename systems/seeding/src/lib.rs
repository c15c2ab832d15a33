#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic seeding primitives for the Ballcube sequence engine.
//!
//! The generator is a Park–Miller multiplicative LCG and every hash folds its
//! input with fixed-width 32-bit wrapping arithmetic, so results are
//! bit-identical on every platform.

use ballcube_core::{BallState, ProgressionLevels};
use rand::Rng;

/// Modulus of the Park–Miller generator, the Mersenne prime `2^31 - 1`.
pub const MODULUS: u64 = 2_147_483_647;

/// Multiplier of the Park–Miller generator.
pub const MULTIPLIER: u64 = 48_271;

/// Length that user-entered seed text is normalised to.
pub const SEED_TEXT_LENGTH: usize = 32;

const SEED_ALPHABET: &[u8; 16] = b"abcdef0123456789";
const PAD_FALLBACK: char = '0';

/// Minimal reproducible pseudo-random source.
///
/// Two generators constructed from the same seed yield identical output
/// forever.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    /// Creates a generator, folding the seed into `[1, MODULUS - 1]`.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        let state = seed % MODULUS;
        let state = if state == 0 { MODULUS - 1 } else { state };
        Self { state }
    }

    /// Advances the generator and returns the new state in `[1, MODULUS - 1]`.
    pub fn next_u32(&mut self) -> u32 {
        // state < 2^31 and MULTIPLIER < 2^16, so the product fits in 47 bits.
        self.state = (self.state * MULTIPLIER) % MODULUS;
        self.state as u32
    }

    /// Draws a uniform value in `[0, 1)`.
    pub fn draw(&mut self) -> f64 {
        let value = self.next_u32();
        f64::from(value - 1) / (MODULUS - 1) as f64
    }
}

/// Derives the base seed of a run from free-form seed text.
///
/// Each UTF-16 code unit is folded as `acc * 31 + unit` with 32-bit signed
/// wrapping, and the absolute value of the accumulator is returned. Empty
/// text yields 0.
#[must_use]
pub fn hash_to_base_seed(seed_text: &str) -> u32 {
    seed_text
        .encode_utf16()
        .fold(0i32, |acc, unit| {
            acc.wrapping_mul(31).wrapping_add(i32::from(unit))
        })
        .unsigned_abs()
}

/// Fingerprints one step of a run.
///
/// The fingerprint depends only on the base seed, the step index, and the
/// state and progression observed before the step, never on generator state
/// carried over from earlier steps.
#[must_use]
pub fn step_fingerprint(
    base_seed: u32,
    iteration: usize,
    state: &BallState,
    progression: &ProgressionLevels,
) -> u32 {
    rolling_hash(&canonical_step_text(
        base_seed,
        iteration,
        state,
        progression,
    ))
}

/// Canonical text hashed by [`step_fingerprint`].
///
/// Both maps are rendered as `coord:value` pairs joined with commas in
/// ascending coordinate order.
#[must_use]
pub fn canonical_step_text(
    base_seed: u32,
    iteration: usize,
    state: &BallState,
    progression: &ProgressionLevels,
) -> String {
    let state_text = join_entries(state.iter());
    let progression_text = join_entries(progression.iter());
    format!("{base_seed}:{iteration}:{state_text}:{progression_text}")
}

fn join_entries<T: std::fmt::Display>(entries: impl Iterator<Item = (T, u32)>) -> String {
    entries
        .map(|(key, value)| format!("{key}:{value}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn rolling_hash(text: &str) -> u32 {
    text.encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        })
        .unsigned_abs()
}

/// Adjustment applied while normalising seed text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedAdjustment {
    /// The trimmed text already had the expected length.
    Unchanged,
    /// Short text was padded by repeating its first character.
    Padded,
    /// Long text was truncated.
    Truncated,
}

/// Seed text normalised to [`SEED_TEXT_LENGTH`] characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedSeed {
    text: String,
    adjustment: SeedAdjustment,
}

impl NormalizedSeed {
    /// Normalised seed text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Adjustment that produced the text.
    #[must_use]
    pub const fn adjustment(&self) -> SeedAdjustment {
        self.adjustment
    }

    /// Consumes the wrapper and returns the seed text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Trims seed text and pads or truncates it to [`SEED_TEXT_LENGTH`] characters.
///
/// Padding repeats the first character, or `0` when the text is empty.
#[must_use]
pub fn normalize_seed_text(seed_text: &str) -> NormalizedSeed {
    let trimmed = seed_text.trim();
    let length = trimmed.chars().count();

    if length == SEED_TEXT_LENGTH {
        return NormalizedSeed {
            text: trimmed.to_owned(),
            adjustment: SeedAdjustment::Unchanged,
        };
    }

    if length < SEED_TEXT_LENGTH {
        let pad = trimmed.chars().next().unwrap_or(PAD_FALLBACK);
        let mut text = String::with_capacity(SEED_TEXT_LENGTH);
        text.push_str(trimmed);
        text.extend(std::iter::repeat(pad).take(SEED_TEXT_LENGTH - length));
        return NormalizedSeed {
            text,
            adjustment: SeedAdjustment::Padded,
        };
    }

    NormalizedSeed {
        text: trimmed.chars().take(SEED_TEXT_LENGTH).collect(),
        adjustment: SeedAdjustment::Truncated,
    }
}

/// Generates fresh hexadecimal seed text of [`SEED_TEXT_LENGTH`] characters.
pub fn random_seed_text<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SEED_TEXT_LENGTH)
        .map(|_| char::from(SEED_ALPHABET[rng.gen_range(0..SEED_ALPHABET.len())]))
        .collect()
}
