use std::fmt;
use serde::{Deserialize, Serialize};

/// Number of candidate answers every duel question carries.
pub const OPTION_COUNT: usize = 4;

// ---------------------------------------------------------------------------
// Tiers and opponents
// ---------------------------------------------------------------------------

/// A difficulty pool with its own independent win/game counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Beginner     => write!(f, "Beginner"),
            Tier::Intermediate => write!(f, "Intermediate"),
            Tier::Advanced     => write!(f, "Advanced"),
        }
    }
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Beginner, Tier::Intermediate, Tier::Advanced];
}

/// Static definition of one synthetic opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Opponent {
    pub id: &'static str,
    pub name: &'static str,
    /// Catalog position, 1-based.
    pub ordinal: u8,
    pub accuracy_min: u8,
    pub accuracy_max: u8,
    pub latency_min_ms: u32,
    pub latency_max_ms: u32,
    /// Cumulative wins (within a tier) needed before this opponent can be picked.
    pub unlock_threshold: u32,
}

impl fmt::Display for Opponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.ordinal, self.name)
    }
}

// ---------------------------------------------------------------------------
// Questions and answers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub time_limit_secs: u32,
    pub points: u32,
    #[serde(default)]
    pub category: String,
}

impl Question {
    pub fn time_limit_ms(&self) -> u64 {
        u64::from(self.time_limit_secs) * 1000
    }
}

/// One side's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    /// `None` when the answer window closed without a submission.
    pub answer_index: Option<usize>,
    pub is_correct: bool,
    pub elapsed_ms: u64,
    pub points: u32,
}

impl AnswerRecord {
    /// A missed answer: no choice, elapsed equal to the time limit, zero points.
    pub fn timed_out(question: &Question) -> Self {
        AnswerRecord {
            question_id: question.id.clone(),
            answer_index: None,
            is_correct: false,
            elapsed_ms: question.time_limit_ms(),
            points: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Player,
    Opponent,
    Tie,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Player   => write!(f, "player"),
            Winner::Opponent => write!(f, "opponent"),
            Winner::Tie      => write!(f, "tie"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub question_id: String,
    pub player: AnswerRecord,
    pub opponent: AnswerRecord,
    pub winner: Winner,
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Countdown,
    Playing,
    Answered,
    Revealing,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Countdown => "countdown",
            Phase::Playing   => "playing",
            Phase::Answered  => "answered",
            Phase::Revealing => "revealing",
            Phase::Finished  => "finished",
        };
        write!(f, "{}", s)
    }
}

/// Running totals for both sides. Streaks track the player only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub player_score: u32,
    pub opponent_score: u32,
    pub player_correct: u32,
    pub opponent_correct: u32,
    pub answered: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub player_time_total_ms: u64,
}

impl Scoreboard {
    pub fn average_answer_ms(&self) -> u64 {
        if self.answered == 0 {
            0
        } else {
            self.player_time_total_ms / u64::from(self.answered)
        }
    }
}

// ---------------------------------------------------------------------------
// Progression and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionSnapshot {
    pub wins: u32,
    pub games: u32,
}

/// Counters to hand back to the progression store after a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionDelta {
    pub tier: Tier,
    pub wins: u32,
    pub games: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnlockEvent {
    pub opponent_id: &'static str,
    pub opponent_name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResult {
    pub winner: Winner,
    pub player_score: u32,
    pub opponent_score: u32,
    pub player_correct: u32,
    pub opponent_correct: u32,
    pub total_questions: u32,
    pub best_streak: u32,
    pub average_answer_ms: u64,
    pub opponent_id: &'static str,
    pub tier: Tier,
    pub progression: ProgressionDelta,
    /// Set when this win moved the player across a new unlock threshold.
    pub unlocked: Option<UnlockEvent>,
}

impl SessionResult {
    pub fn player_won(&self) -> bool {
        self.winner == Winner::Player
    }

    pub fn is_tie(&self) -> bool {
        self.winner == Winner::Tie
    }

    pub fn new_unlock(&self) -> bool {
        self.unlocked.is_some()
    }
}
