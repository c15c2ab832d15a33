#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted ball selection for the Ballcube sequence engine.
//!
//! Balls that were selected less often receive proportionally more weight,
//! which biases the process towards spreading colour across the cube. Every
//! traversal walks coordinates in ascending order; the accumulation order
//! decides which interval of `[0, 1)` each ball occupies, so it is part of
//! the reproducible contract.

use std::collections::BTreeMap;

use ballcube_core::{BallState, Coordinate, ProgressionLevels};

/// Tolerance applied when comparing a draw against the running sum.
pub const SELECTION_EPSILON: f64 = 1e-10;

/// Unnormalised selection weight of every eligible ball.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Weights(BTreeMap<Coordinate, f64>);

impl Weights {
    /// Weight of the ball, absent when the ball is not eligible.
    #[must_use]
    pub fn get(&self, coordinate: Coordinate) -> Option<f64> {
        self.0.get(&coordinate).copied()
    }

    /// Iterates over `(coordinate, weight)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, f64)> + '_ {
        self.0.iter().map(|(&coordinate, &weight)| (coordinate, weight))
    }

    /// Number of eligible balls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reports whether no ball is eligible, meaning selection is impossible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all weights, accumulated in ascending coordinate order.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

/// Normalised selection probability of every eligible ball.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Probabilities(BTreeMap<Coordinate, f64>);

impl Probabilities {
    /// Probability of the ball, absent when the ball is not eligible.
    #[must_use]
    pub fn get(&self, coordinate: Coordinate) -> Option<f64> {
        self.0.get(&coordinate).copied()
    }

    /// Iterates over `(coordinate, probability)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, f64)> + '_ {
        self.0
            .iter()
            .map(|(&coordinate, &probability)| (coordinate, probability))
    }

    /// Number of eligible balls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reports whether no ball is eligible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all probabilities.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

/// Computes `1 / (level + 1)` for every ball whose colour index is below the cap.
///
/// Balls at or above `max_color_index` are left out entirely rather than
/// given zero weight.
#[must_use]
pub fn weights(
    state: &BallState,
    progression: &ProgressionLevels,
    max_color_index: u32,
) -> Weights {
    Weights(
        state
            .iter()
            .filter(|&(_, color_index)| color_index < max_color_index)
            .map(|(coordinate, _)| {
                let level = f64::from(progression.level(coordinate));
                (coordinate, 1.0 / (level + 1.0))
            })
            .collect(),
    )
}

/// Divides every weight by the total weight.
#[must_use]
pub fn normalize(weights: &Weights) -> Probabilities {
    let total = weights.total();
    if weights.is_empty() || total <= 0.0 {
        return Probabilities::default();
    }

    Probabilities(
        weights
            .iter()
            .map(|(coordinate, weight)| (coordinate, weight / total))
            .collect(),
    )
}

/// Convenience for [`normalize`] applied to [`weights`].
#[must_use]
pub fn probabilities(
    state: &BallState,
    progression: &ProgressionLevels,
    max_color_index: u32,
) -> Probabilities {
    normalize(&weights(state, progression, max_color_index))
}

/// Picks the ball whose cumulative interval contains `draw`.
///
/// When rounding leaves the running sum short of `draw`, the first ball in
/// coordinate order is returned. Returns `None` only for an empty set.
#[must_use]
pub fn select(probabilities: &Probabilities, draw: f64) -> Option<Coordinate> {
    let mut cumulative = 0.0;
    for (coordinate, probability) in probabilities.iter() {
        cumulative += probability;
        if draw <= cumulative || (draw - cumulative).abs() < SELECTION_EPSILON {
            return Some(coordinate);
        }
    }

    probabilities.iter().next().map(|(coordinate, _)| coordinate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(x: u8, y: u8, z: u8) -> Coordinate {
        Coordinate::new(x, y, z).expect("valid coordinate")
    }

    fn fresh() -> (BallState, ProgressionLevels) {
        let state = BallState::initial();
        let progression = ProgressionLevels::zeroed_for(&state);
        (state, progression)
    }

    #[test]
    fn fresh_cube_is_uniform() {
        let (state, progression) = fresh();
        let probabilities = probabilities(&state, &progression, 2);
        assert_eq!(probabilities.len(), 26);
        for (_, probability) in probabilities.iter() {
            assert!((probability - 1.0 / 26.0).abs() < 1e-12);
        }
    }

    #[test]
    fn capped_balls_are_excluded() {
        let (state, progression) = fresh();
        let capped = coord(1, 1, 1);
        let state = state.advanced(capped).advanced(capped);
        let weights = weights(&state, &progression, 2);
        assert_eq!(weights.len(), 25);
        assert_eq!(weights.get(capped), None);
    }

    #[test]
    fn progression_lowers_weight() {
        let (state, progression) = fresh();
        let busy = coord(3, 3, 3);
        let progression = progression.advanced(busy).advanced(busy);
        let weights = weights(&state, &progression, 5);
        assert_eq!(weights.get(busy), Some(1.0 / 3.0));
        assert_eq!(weights.get(coord(1, 1, 1)), Some(1.0));
    }

    #[test]
    fn zero_cap_leaves_nothing_eligible() {
        let (state, progression) = fresh();
        let weights = weights(&state, &progression, 0);
        assert!(weights.is_empty());
        assert!(normalize(&weights).is_empty());
        assert_eq!(select(&normalize(&weights), 0.5), None);
    }

    #[test]
    fn select_walks_intervals_in_coordinate_order() {
        let (state, progression) = fresh();
        let probabilities = probabilities(&state, &progression, 1);
        assert_eq!(select(&probabilities, 0.0), Some(coord(1, 1, 1)));
        assert_eq!(select(&probabilities, 1.0 / 26.0), Some(coord(1, 1, 1)));
        assert_eq!(select(&probabilities, 1.5 / 26.0), Some(coord(1, 1, 2)));
        assert_eq!(select(&probabilities, 0.999_999), Some(coord(3, 3, 3)));
    }

    #[test]
    fn undershoot_falls_back_to_first_coordinate() {
        let (state, progression) = fresh();
        let probabilities = probabilities(&state, &progression, 1);
        assert_eq!(select(&probabilities, 1.5), Some(coord(1, 1, 1)));
    }

    #[test]
    fn first_abc_draw_selects_reference_ball() {
        let (state, progression) = fresh();
        let probabilities = probabilities(&state, &progression, 2);
        assert_eq!(
            select(&probabilities, 0.296_844_942_306_024),
            Some(coord(1, 3, 2))
        );
    }

    mod proptests {
        use super::*;
        use proptest::collection::vec;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn probability_mass_sums_to_one(
                colors in vec(0u32..4, 26),
                levels in vec(0u32..40, 26),
                max_color_index in 1u32..5,
            ) {
                let state = BallState::from_entries(
                    Coordinate::ALL.iter().copied().zip(colors.iter().copied()),
                );
                let mut progression = ProgressionLevels::zeroed_for(&state);
                for (coordinate, &level) in Coordinate::ALL.iter().zip(levels.iter()) {
                    for _ in 0..level {
                        progression.record(*coordinate);
                    }
                }

                let weights = weights(&state, &progression, max_color_index);
                prop_assume!(!weights.is_empty());
                let probabilities = normalize(&weights);
                prop_assert!((probabilities.total() - 1.0).abs() < 1e-9);
                prop_assert_eq!(probabilities.len(), weights.len());
            }

            #[test]
            fn selection_is_always_eligible(draw in 0.0f64..1.0, max_color_index in 1u32..4) {
                let (state, progression) = fresh();
                let capped = coord(2, 1, 3);
                let mut state = state;
                for _ in 0..max_color_index {
                    state = state.advanced(capped);
                }
                let probabilities = probabilities(&state, &progression, max_color_index);
                let selected = select(&probabilities, draw).expect("non-empty set");
                prop_assert_ne!(selected, capped);
            }
        }
    }
}
