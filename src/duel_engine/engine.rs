//! The duel state machine.
//!
//! One [`DuelEngine`] owns at most one [`SessionState`]. The host forwards
//! presentation intents (`submit_answer`, `on_time_expired`, `advance`, ...)
//! and calls [`DuelEngine::poll`] whenever time passes; timers due by then
//! fire in deadline order before the intent is applied.
//!
//! ```text
//! countdown ──▶ playing ──submit──▶ answered ──reply──▶ revealing ──advance──▶ playing
//!                  │                                        ▲    └──advance (last)──▶ finished
//!                  └──────────────timeout───────────────────┘
//! ```

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::duel_engine::catalog;
use crate::duel_engine::clock::Clock;
use crate::duel_engine::config::{DuelSettings, EngineConfig};
use crate::duel_engine::models::{
    AnswerRecord, Opponent, Phase, Question, RoundResult, Scoreboard, SessionResult, UnlockEvent,
};
use crate::duel_engine::pool::{validate_question, QuestionSupplier};
use crate::duel_engine::progression::ProgressionStore;
use crate::duel_engine::resolver::{resolve, Resolution};
use crate::duel_engine::session::{PendingRound, SessionState};
use crate::duel_engine::simulator::simulate;
use crate::duel_engine::timers::{TimerHandle, TimerKind, TimerQueue};
use crate::duel_engine::view::DuelView;
use crate::error::{DuelError, Result};

/// Whether an intent changed the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Accepted,
    Ignored(IgnoreReason),
}

impl EventOutcome {
    pub fn is_accepted(self) -> bool {
        self == EventOutcome::Accepted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoSession,
    /// The event is not valid in this phase (late, duplicate, or out of order).
    WrongPhase(Phase),
    InvalidChoice(usize),
}

/// Notifications for the presentation layer, drained with [`DuelEngine::take_events`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DuelEvent {
    CountdownStarted { opponent_id: &'static str, questions: usize, ends_at_ms: u64 },
    QuestionOpened { index: usize, question_id: String, deadline_ms: u64 },
    PlayerAnswered { index: usize, answer_index: usize, elapsed_ms: u64, reveal_at_ms: u64 },
    TimeExpired { index: usize },
    RoundRevealed { index: usize, round: RoundResult },
    SessionFinished { result: SessionResult },
    OpponentUnlocked(UnlockEvent),
    ProgressionSaveFailed { message: String },
    SessionReset,
}

pub struct DuelEngine {
    config: EngineConfig,
    supplier: Box<dyn QuestionSupplier>,
    store: Box<dyn ProgressionStore>,
    clock: Box<dyn Clock>,
    rng: Box<dyn RngCore>,
    timers: TimerQueue,
    session: Option<SessionState>,
    events: Vec<DuelEvent>,
}

impl DuelEngine {
    /// Build an engine. `rng_seed: Some(_)` makes every opponent draw reproducible.
    pub fn new(
        config: EngineConfig,
        supplier: impl QuestionSupplier + 'static,
        store: impl ProgressionStore + 'static,
        clock: impl Clock + 'static,
        rng_seed: Option<u64>,
    ) -> Self {
        let rng = match rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None       => ChaCha8Rng::from_entropy(),
        };
        DuelEngine {
            config,
            supplier: Box::new(supplier),
            store: Box::new(store),
            clock: Box::new(clock),
            rng: Box::new(rng),
            timers: TimerQueue::new(),
            session: None,
            events: Vec::new(),
        }
    }

    /// Swap in a different random source for the opponent simulator.
    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    // =========================================================================
    // Intents
    // =========================================================================

    /// Start a duel against `opponent_id`.
    ///
    /// Every precondition is checked before anything changes: on error the
    /// previous session (if any) is left untouched. On success any previous
    /// session is discarded.
    pub fn start_session(&mut self, opponent_id: &str, settings: DuelSettings) -> Result<()> {
        settings.validate()?;
        let opponent = catalog::find(opponent_id)
            .ok_or_else(|| DuelError::UnknownOpponent(opponent_id.to_string()))?;

        let prior = self.store.load(settings.tier)?;
        if !opponent.is_unlocked(prior.wins) {
            return Err(DuelError::OpponentLocked {
                opponent: opponent.id.to_string(),
                wins: prior.wins,
                threshold: opponent.unlock_threshold,
            });
        }

        let mut questions = self.supplier.draw_questions(settings.question_count)?;
        if questions.len() != settings.question_count {
            return Err(DuelError::InsufficientQuestions {
                requested: settings.question_count,
                available: questions.len(),
            });
        }
        for q in &mut questions {
            validate_question(q)?;
            q.time_limit_secs = settings.time_limit_secs;
        }

        self.discard_session();

        let now = self.clock.now_ms();
        let ends_at_ms = now + self.config.countdown_ms;
        let mut session = SessionState::new(opponent, settings, prior, questions);
        session.timers.countdown = Some(self.timers.schedule(TimerKind::Countdown, ends_at_ms));

        tracing::info!(
            opponent = opponent.id,
            tier = %settings.tier,
            questions = settings.question_count,
            wins = prior.wins,
            "duel started"
        );
        self.events.push(DuelEvent::CountdownStarted {
            opponent_id: opponent.id,
            questions: settings.question_count,
            ends_at_ms,
        });
        self.session = Some(session);
        self.fire_due();
        Ok(())
    }

    /// Start a duel with the engine config's `default_settings`.
    pub fn start_with_defaults(&mut self, opponent_id: &str) -> Result<()> {
        let settings = self.config.default_settings;
        self.start_session(opponent_id, settings)
    }

    pub fn submit_answer(&mut self, answer_index: usize) -> EventOutcome {
        self.fire_due();
        let now = self.clock.now_ms();
        let reply_cap_ms = self.config.reply_cap_ms;

        let Some(session) = self.session.as_mut() else {
            return ignored("submit_answer", IgnoreReason::NoSession);
        };
        if session.phase != Phase::Playing {
            return ignored("submit_answer", IgnoreReason::WrongPhase(session.phase));
        }
        let Some(question) = session.questions.get(session.index) else {
            return ignored("submit_answer", IgnoreReason::WrongPhase(session.phase));
        };
        if answer_index >= question.options.len() {
            return ignored("submit_answer", IgnoreReason::InvalidChoice(answer_index));
        }

        if let Some(handle) = session.timers.answer_window.take() {
            self.timers.cancel(handle);
        }
        let elapsed_ms = now.saturating_sub(session.window_opened_at.unwrap_or(now));
        let player = AnswerRecord {
            question_id: question.id.clone(),
            answer_index: Some(answer_index),
            is_correct: answer_index == question.correct_index,
            elapsed_ms,
            points: 0,
        };
        let opponent = opponent_answer(&mut *self.rng, session.opponent, question, session);

        // Pacing only: the recorded opponent latency stays uncapped.
        let wait_ms = opponent.elapsed_ms.saturating_sub(elapsed_ms).min(reply_cap_ms);
        let reveal_at_ms = now + wait_ms;
        session.timers.opponent_reply = Some(self.timers.schedule(
            TimerKind::OpponentReply { question: session.index },
            reveal_at_ms,
        ));
        session.pending = Some(PendingRound { player, opponent });
        session.phase = Phase::Answered;

        tracing::debug!(index = session.index, answer_index, elapsed_ms, wait_ms, "player answered");
        self.events.push(DuelEvent::PlayerAnswered {
            index: session.index,
            answer_index,
            elapsed_ms,
            reveal_at_ms,
        });
        self.fire_due();
        EventOutcome::Accepted
    }

    /// The presentation layer saw the question clock run out.
    pub fn on_time_expired(&mut self) -> EventOutcome {
        self.fire_due();
        match self.session.as_ref().map(|s| s.phase) {
            None => ignored("on_time_expired", IgnoreReason::NoSession),
            Some(Phase::Playing) => {
                self.expire_question();
                EventOutcome::Accepted
            }
            Some(phase) => ignored("on_time_expired", IgnoreReason::WrongPhase(phase)),
        }
    }

    /// Move past a revealed round: next question, or finish the duel.
    pub fn advance(&mut self) -> EventOutcome {
        self.fire_due();
        let Some(session) = self.session.as_mut() else {
            return ignored("advance", IgnoreReason::NoSession);
        };
        if session.phase != Phase::Revealing {
            return ignored("advance", IgnoreReason::WrongPhase(session.phase));
        }

        if session.is_last_question() {
            self.finish();
        } else {
            session.index += 1;
            self.open_window();
        }
        EventOutcome::Accepted
    }

    /// Throw the current session away without producing a result.
    pub fn reset_session(&mut self) -> EventOutcome {
        if self.session.is_none() {
            return ignored("reset_session", IgnoreReason::NoSession);
        }
        self.discard_session();
        self.events.push(DuelEvent::SessionReset);
        tracing::info!("duel reset");
        EventOutcome::Accepted
    }

    /// Start a fresh session with the same opponent and settings as the one
    /// that just finished.
    pub fn rematch(&mut self) -> Result<EventOutcome> {
        let (opponent_id, settings) = match self.session.as_ref() {
            None => return Ok(ignored("rematch", IgnoreReason::NoSession)),
            Some(s) if s.phase != Phase::Finished => {
                return Ok(ignored("rematch", IgnoreReason::WrongPhase(s.phase)))
            }
            Some(s) => (s.opponent.id, s.settings),
        };
        self.start_session(opponent_id, settings)?;
        Ok(EventOutcome::Accepted)
    }

    /// Fire every timer due by now. Returns how many fired.
    pub fn poll(&mut self) -> usize {
        self.fire_due()
    }

    // =========================================================================
    // Observables
    // =========================================================================

    pub fn phase(&self) -> Option<Phase> {
        self.session.as_ref().map(|s| s.phase)
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn opponent(&self) -> Option<&'static Opponent> {
        self.session.as_ref().map(|s| s.opponent)
    }

    pub fn settings(&self) -> Option<&DuelSettings> {
        self.session.as_ref().map(|s| &s.settings)
    }

    pub fn question_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.index)
    }

    /// The question on screen while playing, answered, or revealing.
    pub fn current_question(&self) -> Option<&Question> {
        let session = self.session.as_ref()?;
        match session.phase {
            Phase::Playing | Phase::Answered | Phase::Revealing => session.current_question(),
            Phase::Countdown | Phase::Finished => None,
        }
    }

    pub fn scoreboard(&self) -> Option<Scoreboard> {
        self.session.as_ref().map(|s| s.scoreboard)
    }

    /// The round just resolved, while it is being revealed.
    pub fn last_round(&self) -> Option<&RoundResult> {
        let session = self.session.as_ref()?;
        if session.phase == Phase::Revealing {
            session.rounds.last()
        } else {
            None
        }
    }

    pub fn rounds(&self) -> &[RoundResult] {
        self.session.as_ref().map(|s| s.rounds.as_slice()).unwrap_or(&[])
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.session.as_ref().and_then(|s| s.result.as_ref())
    }

    /// When the next timer is due, for hosts that sleep between polls.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Milliseconds left in the open answer window.
    pub fn remaining_ms(&self) -> Option<u64> {
        let session = self.session.as_ref()?;
        if session.phase != Phase::Playing {
            return None;
        }
        let opened = session.window_opened_at?;
        let limit = session.current_question()?.time_limit_ms();
        Some(limit.saturating_sub(self.clock.now_ms().saturating_sub(opened)))
    }

    pub fn view(&self) -> Option<DuelView> {
        self.session
            .as_ref()
            .map(|s| DuelView::from_session(s, self.remaining_ms()))
    }

    pub fn take_events(&mut self) -> Vec<DuelEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Timer plumbing
    // =========================================================================

    fn fire_due(&mut self) -> usize {
        let mut fired = 0;
        while let Some((handle, kind)) = self.timers.pop_due(self.clock.now_ms()) {
            fired += 1;
            self.on_timer(handle, kind);
        }
        fired
    }

    fn on_timer(&mut self, handle: TimerHandle, kind: TimerKind) {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(?handle, ?kind, "timer fired with no session");
            return;
        };
        let slot = match kind {
            TimerKind::Countdown => &mut session.timers.countdown,
            TimerKind::AnswerWindow { .. } => &mut session.timers.answer_window,
            TimerKind::OpponentReply { .. } => &mut session.timers.opponent_reply,
        };
        if *slot != Some(handle) {
            tracing::debug!(?handle, ?kind, "stale timer dropped");
            return;
        }
        *slot = None;

        match kind {
            TimerKind::Countdown => self.open_window(),
            TimerKind::AnswerWindow { .. } => self.expire_question(),
            TimerKind::OpponentReply { .. } => self.land_reply(),
        }
    }

    /// Open the answer window for the current question.
    fn open_window(&mut self) {
        let now = self.clock.now_ms();
        let Some(session) = self.session.as_mut() else { return };
        let Some(question) = session.questions.get(session.index) else { return };

        let deadline_ms = now + question.time_limit_ms();
        let question_id = question.id.clone();
        session.window_opened_at = Some(now);
        session.phase = Phase::Playing;
        session.timers.answer_window = Some(self.timers.schedule(
            TimerKind::AnswerWindow { question: session.index },
            deadline_ms,
        ));
        self.events.push(DuelEvent::QuestionOpened {
            index: session.index,
            question_id,
            deadline_ms,
        });
    }

    /// No answer arrived in time: score the round against a missed answer.
    fn expire_question(&mut self) {
        let points_bonus = self.config.speed_bonus_points;
        let Some(session) = self.session.as_mut() else { return };
        let Some(question) = session.questions.get(session.index) else { return };

        let player = AnswerRecord::timed_out(question);
        let opponent = opponent_answer(&mut *self.rng, session.opponent, question, session);
        let points = question.points;
        let index = session.index;

        self.events.push(DuelEvent::TimeExpired { index });
        self.reveal(resolve(player, opponent, points, points_bonus));
    }

    fn land_reply(&mut self) {
        let points_bonus = self.config.speed_bonus_points;
        let Some(session) = self.session.as_mut() else { return };
        let Some(PendingRound { player, opponent }) = session.pending.take() else { return };
        let Some(points) = session.current_question().map(|q| q.points) else { return };
        self.reveal(resolve(player, opponent, points, points_bonus));
    }

    fn reveal(&mut self, resolution: Resolution) {
        let Some(session) = self.session.as_mut() else { return };
        for handle in session.timers.take_all() {
            self.timers.cancel(handle);
        }
        session.window_opened_at = None;
        session.phase = Phase::Revealing;

        let index = session.index;
        let round = session.record_round(resolution).clone();
        tracing::debug!(
            index,
            winner = %round.winner,
            player_points = round.player.points,
            opponent_points = round.opponent.points,
            "round resolved"
        );
        self.events.push(DuelEvent::RoundRevealed { index, round });
    }

    fn finish(&mut self) {
        let Some(session) = self.session.as_mut() else { return };
        for handle in session.timers.take_all() {
            self.timers.cancel(handle);
        }
        let result = session.summarize();
        session.phase = Phase::Finished;
        session.result = Some(result.clone());

        tracing::info!(
            opponent = result.opponent_id,
            winner = %result.winner,
            player_score = result.player_score,
            opponent_score = result.opponent_score,
            "duel finished"
        );

        let delta = result.progression;
        if let Err(e) = self.store.save(delta.tier, delta.wins, delta.games) {
            tracing::warn!(tier = %delta.tier, error = %e, "failed to save progression");
            self.events.push(DuelEvent::ProgressionSaveFailed { message: e.to_string() });
        }
        if let Some(unlock) = result.unlocked {
            tracing::info!(opponent = unlock.opponent_id, "new opponent unlocked");
            self.events.push(DuelEvent::OpponentUnlocked(unlock));
        }
        self.events.push(DuelEvent::SessionFinished { result });
    }

    fn discard_session(&mut self) {
        if let Some(mut old) = self.session.take() {
            for handle in old.timers.take_all() {
                self.timers.cancel(handle);
            }
        }
        self.timers.cancel_all();
    }
}

fn opponent_answer(
    rng: &mut dyn RngCore,
    opponent: &Opponent,
    question: &Question,
    session: &SessionState,
) -> AnswerRecord {
    let sim = simulate(
        rng,
        opponent,
        question.correct_index,
        question.options.len(),
        session.settings.modifiers(),
    );
    AnswerRecord {
        question_id: question.id.clone(),
        answer_index: Some(sim.answer_index),
        is_correct: sim.is_correct,
        elapsed_ms: sim.latency_ms,
        points: 0,
    }
}

fn ignored(intent: &'static str, reason: IgnoreReason) -> EventOutcome {
    tracing::debug!(intent, ?reason, "event ignored");
    EventOutcome::Ignored(reason)
}
