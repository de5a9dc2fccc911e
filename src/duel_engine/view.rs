//! Serializable snapshot of a duel for the presentation layer.
//!
//! The correct answer is withheld until the round is revealed.

use serde::Serialize;

use crate::duel_engine::models::{Phase, RoundResult, Scoreboard, SessionResult};
use crate::duel_engine::session::SessionState;

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub category: String,
    pub time_limit_secs: u32,
    pub points: u32,
    /// Only present once the round is being revealed.
    pub correct_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuelView {
    pub phase: Phase,
    pub opponent_id: &'static str,
    pub opponent_name: &'static str,
    pub question_index: usize,
    pub total_questions: usize,
    pub question: Option<QuestionView>,
    pub remaining_ms: Option<u64>,
    pub scoreboard: Scoreboard,
    pub last_round: Option<RoundResult>,
    pub result: Option<SessionResult>,
}

impl DuelView {
    pub fn from_session(session: &SessionState, remaining_ms: Option<u64>) -> Self {
        let question = match session.phase {
            Phase::Playing | Phase::Answered | Phase::Revealing => {
                session.current_question().map(|q| QuestionView {
                    id: q.id.clone(),
                    prompt: q.prompt.clone(),
                    options: q.options.clone(),
                    category: q.category.clone(),
                    time_limit_secs: q.time_limit_secs,
                    points: q.points,
                    correct_index: (session.phase == Phase::Revealing).then_some(q.correct_index),
                })
            }
            Phase::Countdown | Phase::Finished => None,
        };
        let last_round = if session.phase == Phase::Revealing {
            session.rounds.last().cloned()
        } else {
            None
        };

        DuelView {
            phase: session.phase,
            opponent_id: session.opponent.id,
            opponent_name: session.opponent.name,
            question_index: session.index,
            total_questions: session.questions.len(),
            question,
            remaining_ms,
            scoreboard: session.scoreboard,
            last_round,
            result: session.result.clone(),
        }
    }

    /// JSON for a presentation bridge.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
