//! Core duel engine: opponents, answer simulation, round scoring, and the
//! per-session state machine.
//!
//! ## Module overview
//!
//! | Module        | Purpose |
//! |---------------|---------|
//! | `models`      | Shared types: opponents, questions, answers, rounds, results |
//! | `catalog`     | The 27 synthetic opponents and unlock queries |
//! | `simulator`   | Stochastic opponent answers over an injected RNG |
//! | `resolver`    | Points, speed bonus, and round winner |
//! | `timers`      | One-shot timers with cancellable handles |
//! | `clock`       | Manual and wall-clock time sources |
//! | `pool`        | Question supplier trait and a shuffled in-memory pool |
//! | `progression` | Progression store trait and unlock detection |
//! | `config`      | Session settings and TOML engine config |
//! | `session`     | State owned by one active duel |
//! | `engine`      | `DuelEngine`: intents, timer polling, observables |
//! | `view`        | Serializable snapshot for presentation |

pub mod catalog;
pub mod clock;
pub mod config;
pub mod engine;
pub mod models;
pub mod pool;
pub mod progression;
pub mod resolver;
pub mod session;
pub mod simulator;
pub mod timers;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DuelSettings, EngineConfig};
pub use engine::{DuelEngine, DuelEvent, EventOutcome, IgnoreReason};
pub use models::{
    AnswerRecord, Opponent, Phase, ProgressionDelta, ProgressionSnapshot, Question, RoundResult,
    Scoreboard, SessionResult, Tier, UnlockEvent, Winner,
};
pub use pool::{QuestionPool, QuestionSupplier};
pub use progression::{MemoryProgressionStore, ProgressionStore};
pub use view::DuelView;
