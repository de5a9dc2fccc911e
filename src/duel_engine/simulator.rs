//! Stochastic answers for the synthetic opponent.
//!
//! All draws go through the caller's RNG so a seeded generator reproduces a
//! whole duel. The modifiers are session-wide knobs, never part of the
//! opponent definition.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::duel_engine::models::Opponent;

/// Global difficulty knobs applied to every simulated answer in a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Added to the drawn accuracy, in percentage points.
    pub accuracy_modifier: f64,
    /// Divides the drawn latency; above 1.0 the opponent answers faster.
    pub speed_multiplier: f64,
}

impl Default for Modifiers {
    fn default() -> Self {
        Modifiers { accuracy_modifier: 0.0, speed_multiplier: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedAnswer {
    pub answer_index: usize,
    pub is_correct: bool,
    pub latency_ms: u64,
}

/// Clamp a drawn accuracy plus modifier into `[0, 100]`.
pub fn effective_accuracy(base_accuracy: f64, accuracy_modifier: f64) -> f64 {
    (base_accuracy + accuracy_modifier).clamp(0.0, 100.0)
}

/// Draw one opponent answer.
///
/// `option_count` must be at least 2 and `correct_index < option_count`;
/// questions are validated before a session starts.
pub fn simulate<R: Rng + ?Sized>(
    rng: &mut R,
    opponent: &Opponent,
    correct_index: usize,
    option_count: usize,
    modifiers: Modifiers,
) -> SimulatedAnswer {
    debug_assert!(option_count >= 2 && correct_index < option_count);

    let base_accuracy = rng.gen_range(
        f64::from(opponent.accuracy_min)..=f64::from(opponent.accuracy_max),
    );
    let accuracy = effective_accuracy(base_accuracy, modifiers.accuracy_modifier);
    let roll: f64 = rng.gen_range(0.0..100.0);
    let is_correct = roll < accuracy;

    let answer_index = if is_correct {
        correct_index
    } else {
        // Pick among the other options, skipping over the correct slot.
        let k = rng.gen_range(0..option_count.saturating_sub(1).max(1));
        if k >= correct_index { k + 1 } else { k }
    };

    let base_latency = rng.gen_range(
        f64::from(opponent.latency_min_ms)..=f64::from(opponent.latency_max_ms),
    );
    let latency_ms = (base_latency / modifiers.speed_multiplier).round() as u64;

    SimulatedAnswer { answer_index, is_correct, latency_ms }
}
