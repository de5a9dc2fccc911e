//! State owned by one active duel.

use crate::duel_engine::config::DuelSettings;
use crate::duel_engine::models::{
    AnswerRecord, Opponent, Phase, ProgressionSnapshot, Question, RoundResult, Scoreboard,
    SessionResult, Winner,
};
use crate::duel_engine::progression::settle_progression;
use crate::duel_engine::resolver::Resolution;
use crate::duel_engine::timers::TimerHandle;

/// Timers alive for the current phase. A fired or cancelled timer's slot
/// is cleared, so a stray callback can never match it again.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhaseTimers {
    pub countdown: Option<TimerHandle>,
    pub answer_window: Option<TimerHandle>,
    pub opponent_reply: Option<TimerHandle>,
}

impl PhaseTimers {
    pub fn take_all(&mut self) -> impl Iterator<Item = TimerHandle> {
        [
            self.countdown.take(),
            self.answer_window.take(),
            self.opponent_reply.take(),
        ]
        .into_iter()
        .flatten()
    }
}

/// Player's answer waiting for the opponent reply to land.
#[derive(Debug, Clone)]
pub struct PendingRound {
    pub player: AnswerRecord,
    pub opponent: AnswerRecord,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub opponent: &'static Opponent,
    pub settings: DuelSettings,
    pub prior: ProgressionSnapshot,
    pub questions: Vec<Question>,
    pub index: usize,
    pub phase: Phase,
    pub scoreboard: Scoreboard,
    pub rounds: Vec<RoundResult>,
    pub window_opened_at: Option<u64>,
    pub pending: Option<PendingRound>,
    pub timers: PhaseTimers,
    pub result: Option<SessionResult>,
}

impl SessionState {
    pub fn new(
        opponent: &'static Opponent,
        settings: DuelSettings,
        prior: ProgressionSnapshot,
        questions: Vec<Question>,
    ) -> Self {
        SessionState {
            opponent,
            settings,
            prior,
            questions,
            index: 0,
            phase: Phase::Countdown,
            scoreboard: Scoreboard::default(),
            rounds: Vec::new(),
            window_opened_at: None,
            pending: None,
            timers: PhaseTimers::default(),
            result: None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn is_last_question(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    /// Fold a resolved round into the running totals and the log.
    pub fn record_round(&mut self, resolution: Resolution) -> &RoundResult {
        let Resolution { player, opponent, winner } = resolution;
        let board = &mut self.scoreboard;

        board.player_score += player.points;
        board.opponent_score += opponent.points;
        board.answered += 1;
        board.player_time_total_ms += player.elapsed_ms;
        if opponent.is_correct {
            board.opponent_correct += 1;
        }
        if player.is_correct {
            board.player_correct += 1;
            board.streak += 1;
            board.best_streak = board.best_streak.max(board.streak);
        } else {
            board.streak = 0;
        }

        self.rounds.push(RoundResult {
            question_id: player.question_id.clone(),
            player,
            opponent,
            winner,
        });
        &self.rounds[self.rounds.len() - 1]
    }

    /// Final summary plus the progression delta for the store.
    pub fn summarize(&self) -> SessionResult {
        let board = &self.scoreboard;
        let winner = match board.player_score.cmp(&board.opponent_score) {
            std::cmp::Ordering::Greater => Winner::Player,
            std::cmp::Ordering::Less    => Winner::Opponent,
            std::cmp::Ordering::Equal   => Winner::Tie,
        };
        let (progression, unlocked) =
            settle_progression(self.settings.tier, self.prior, winner == Winner::Player);

        SessionResult {
            winner,
            player_score: board.player_score,
            opponent_score: board.opponent_score,
            player_correct: board.player_correct,
            opponent_correct: board.opponent_correct,
            total_questions: self.questions.len() as u32,
            best_streak: board.best_streak,
            average_answer_ms: board.average_answer_ms(),
            opponent_id: self.opponent.id,
            tier: self.settings.tier,
            progression,
            unlocked,
        }
    }
}
