//! # quiz_duel
//!
//! A deterministic engine for timed 1-vs-1 quiz duels against synthetic
//! opponents.
//!
//! The engine decides, for every question, who answered first, who answered
//! correctly, who won the round, and how points accrue. It also tracks when a
//! new opponent becomes available as the player's wins grow.
//!
//! ## How it works
//!
//! 1. Build a [`DuelEngine`] with a [`QuestionSupplier`], a
//!    [`ProgressionStore`], a [`Clock`], and an optional RNG seed.
//! 2. Call [`DuelEngine::start_session`] with an opponent id and
//!    [`DuelSettings`]. Locked opponents and undersized question pools are
//!    rejected before any state exists.
//! 3. Forward presentation intents (`submit_answer`, `on_time_expired`,
//!    `advance`) and call [`DuelEngine::poll`] as time passes. Timers for the
//!    countdown, the answer window, and the opponent reply fire from `poll`.
//! 4. After the last reveal, `advance` produces a [`SessionResult`] and writes
//!    the new win/game counters to the store.
//!
//! ## Quick start
//!
//! ```rust
//! use quiz_duel::{
//!     duel_engine::pool::sample_questions, DuelEngine, DuelSettings, EngineConfig,
//!     ManualClock, MemoryProgressionStore, Phase, QuestionPool,
//! };
//!
//! let clock = ManualClock::new();
//! let mut engine = DuelEngine::new(
//!     EngineConfig::default(),
//!     QuestionPool::new(sample_questions(), Some(7)),
//!     MemoryProgressionStore::new(),
//!     clock.clone(),
//!     Some(42),
//! );
//!
//! let settings = DuelSettings { question_count: 3, ..DuelSettings::default() };
//! engine.start_session("rookie", settings).unwrap();
//! assert_eq!(engine.phase(), Some(Phase::Countdown));
//!
//! while engine.phase() != Some(Phase::Finished) {
//!     clock.advance(1000);
//!     engine.poll();
//!     if engine.phase() == Some(Phase::Playing) {
//!         let correct = engine.current_question().unwrap().correct_index;
//!         engine.submit_answer(correct);
//!     }
//!     if engine.phase() == Some(Phase::Revealing) {
//!         engine.advance();
//!     }
//! }
//! println!("winner: {}", engine.result().unwrap().winner);
//! ```

pub mod duel_engine;
pub mod error;

// Convenience re-exports so callers can use `quiz_duel::DuelEngine`
// directly without reaching into `duel_engine::`.
pub use duel_engine::{
    Clock, DuelEngine, DuelEvent, DuelSettings, DuelView, EngineConfig, EventOutcome,
    IgnoreReason, ManualClock, MemoryProgressionStore, Opponent, Phase, ProgressionStore,
    Question, QuestionPool, QuestionSupplier, RoundResult, SessionResult, SystemClock, Tier,
    Winner,
};
pub use error::{DuelError, Result};

#[cfg(test)]
mod tests;
