//! End-to-end duel scenarios for the `quiz_duel` crate.
//!
//! Included from `lib.rs` under `#[cfg(test)]`.
//!
//! | Group | What is tested |
//! |-------|----------------|
//! | Scenarios | Fast correct win with bonus; timeouts; unlocks; rematch |
//! | Lifecycle | N questions give N rounds; countdown; phase observables |
//! | Stray events | Late, duplicate, and out-of-phase intents are ignored |
//! | Timers | Reply pacing cap; reset never leaks callbacks into a new session |
//! | Rejections | Locked opponents, small pools, bad settings leave no session |
//! | Persistence | Store failures still expose the result |
//! | Determinism | Same seed gives the same duel |

use crate::duel_engine::catalog;
use crate::duel_engine::models::ProgressionSnapshot;
use crate::duel_engine::pool::sample_questions;
use crate::error::StoreError;
use crate::{
    DuelEngine, DuelError, DuelEvent, DuelSettings, EngineConfig, EventOutcome, IgnoreReason,
    ManualClock, MemoryProgressionStore, Phase, ProgressionStore, QuestionPool, Tier, Winner,
};

// ── helpers ──────────────────────────────────────────────────────────────────

const COUNTDOWN_MS: u64 = 3000;

fn settings(question_count: usize) -> DuelSettings {
    DuelSettings {
        tier: Tier::Beginner,
        question_count,
        time_limit_secs: 15,
        accuracy_modifier: 0.0,
        speed_multiplier: 1.0,
    }
}

/// Engine over the sample pool with `wins` prior Beginner wins.
fn engine_with(wins: u32, seed: u64) -> (DuelEngine, ManualClock, MemoryProgressionStore) {
    let clock = ManualClock::new();
    let store = MemoryProgressionStore::with_snapshot(
        Tier::Beginner,
        ProgressionSnapshot { wins, games: wins },
    );
    let engine = DuelEngine::new(
        EngineConfig::default(),
        QuestionPool::new(sample_questions(), Some(seed)),
        store.clone(),
        clock.clone(),
        Some(seed),
    );
    (engine, clock, store)
}

/// Run the countdown so the first answer window is open.
fn finish_countdown(engine: &mut DuelEngine, clock: &ManualClock) {
    clock.advance(COUNTDOWN_MS);
    engine.poll();
    assert_eq!(engine.phase(), Some(Phase::Playing));
}

fn correct_index(engine: &DuelEngine) -> usize {
    engine.current_question().expect("question on screen").correct_index
}

fn wrong_index(engine: &DuelEngine) -> usize {
    (correct_index(engine) + 1) % 4
}

/// Wait long enough for any opponent reply to land.
fn wait_for_reveal(engine: &mut DuelEngine, clock: &ManualClock) {
    clock.advance(2000);
    engine.poll();
    assert_eq!(engine.phase(), Some(Phase::Revealing));
}

// ── scenarios ────────────────────────────────────────────────────────────────

#[test]
fn fast_correct_answer_against_hobbled_quick_wins_with_bonus() {
    let quick = catalog::find("quick").unwrap();
    let (mut engine, clock, store) = engine_with(quick.unlock_threshold, 1);
    let s = DuelSettings { accuracy_modifier: -100.0, ..settings(1) };
    engine.start_session("quick", s).unwrap();
    finish_countdown(&mut engine, &clock);

    clock.advance(2000);
    let answer = correct_index(&engine);
    assert_eq!(engine.submit_answer(answer), EventOutcome::Accepted);
    assert_eq!(engine.phase(), Some(Phase::Answered));
    wait_for_reveal(&mut engine, &clock);

    let round = engine.last_round().unwrap().clone();
    assert_eq!(round.winner, Winner::Player);
    assert_eq!(round.player.elapsed_ms, 2000);
    assert!(!round.opponent.is_correct);
    assert!(round.opponent.elapsed_ms >= 6000);
    assert_eq!(round.player.points, 100 + 50);

    assert!(engine.advance().is_accepted());
    let result = engine.result().unwrap();
    assert_eq!(result.winner, Winner::Player);
    assert_eq!(result.player_score, 150);
    assert_eq!(result.opponent_score, 0);
    assert_eq!(result.total_questions, 1);
    assert_eq!(result.average_answer_ms, 2000);
    assert_eq!(result.opponent_id, "quick");
    assert_eq!(store.snapshot(Tier::Beginner), ProgressionSnapshot { wins: 6, games: 6 });
}

#[test]
fn missed_question_scores_nothing_and_breaks_the_streak() {
    for seed in [1u64, 2, 3, 4, 5, 6, 7, 8] {
        let (mut engine, clock, _) = engine_with(0, seed);
        engine.start_session("rookie", settings(2)).unwrap();
        finish_countdown(&mut engine, &clock);

        engine.submit_answer(correct_index(&engine));
        wait_for_reveal(&mut engine, &clock);
        assert_eq!(engine.scoreboard().unwrap().streak, 1);
        engine.advance();

        clock.advance(15_000);
        engine.poll();
        assert_eq!(engine.phase(), Some(Phase::Revealing));

        let round = engine.last_round().unwrap();
        assert_eq!(round.player.answer_index, None);
        assert_eq!(round.player.points, 0);
        assert_eq!(round.player.elapsed_ms, 15_000);
        assert!(!round.player.is_correct);
        assert_ne!(round.winner, Winner::Player, "seed={seed}");
        assert!(round.opponent.answer_index.is_some());

        let board = engine.scoreboard().unwrap();
        assert_eq!(board.streak, 0);
        assert_eq!(board.best_streak, 1);
    }
}

#[test]
fn timeout_simulates_opponent_with_session_modifiers() {
    let rookie = catalog::find("rookie").unwrap();
    let (min_ms, max_ms) = (u64::from(rookie.latency_min_ms) / 2, u64::from(rookie.latency_max_ms) / 2);
    for seed in 0..20u64 {
        let (mut engine, clock, _) = engine_with(0, seed);
        let s = DuelSettings { accuracy_modifier: 100.0, speed_multiplier: 2.0, ..settings(1) };
        engine.start_session("rookie", s).unwrap();
        finish_countdown(&mut engine, &clock);

        clock.advance(15_000);
        engine.poll();
        assert_eq!(engine.phase(), Some(Phase::Revealing));

        let round = engine.last_round().unwrap();
        assert_eq!(round.player.answer_index, None);
        assert!(round.opponent.is_correct, "seed={seed}");
        assert_eq!(round.winner, Winner::Opponent, "seed={seed}");
        assert!(
            (min_ms..=max_ms).contains(&round.opponent.elapsed_ms),
            "seed={seed} latency={}",
            round.opponent.elapsed_ms
        );
    }
}

#[test]
fn win_at_maximum_counters_still_finishes() {
    let (mut engine, clock, store) = engine_with(u32::MAX, 3);
    let s = DuelSettings { accuracy_modifier: -100.0, ..settings(1) };
    engine.start_session("rookie", s).unwrap();
    finish_countdown(&mut engine, &clock);

    engine.submit_answer(correct_index(&engine));
    wait_for_reveal(&mut engine, &clock);
    assert!(engine.advance().is_accepted());

    let result = engine.result().unwrap();
    assert_eq!(result.winner, Winner::Player);
    assert_eq!(result.progression.wins, u32::MAX);
    assert_eq!(
        store.snapshot(Tier::Beginner),
        ProgressionSnapshot { wins: u32::MAX, games: u32::MAX }
    );
}

#[test]
fn presentation_timeout_matches_timer_timeout() {
    let (mut engine, clock, _) = engine_with(0, 11);
    engine.start_session("rookie", settings(1)).unwrap();
    finish_countdown(&mut engine, &clock);

    clock.advance(14_900);
    assert_eq!(engine.on_time_expired(), EventOutcome::Accepted);
    assert_eq!(engine.phase(), Some(Phase::Revealing));
    let round = engine.last_round().unwrap();
    assert_eq!(round.player.answer_index, None);
    assert_eq!(round.player.elapsed_ms, 15_000);

    // The answer window timer was cancelled with the reveal.
    clock.advance(1_000);
    assert_eq!(engine.poll(), 0);
    assert_eq!(engine.rounds().len(), 1);
}

#[test]
fn winning_at_threshold_minus_one_unlocks_the_next_opponent() {
    let quick = catalog::find("quick").unwrap();
    let (mut engine, clock, store) = engine_with(quick.unlock_threshold - 1, 5);
    let s = DuelSettings { accuracy_modifier: -100.0, ..settings(1) };
    engine.start_session("rookie", s).unwrap();
    finish_countdown(&mut engine, &clock);

    engine.submit_answer(correct_index(&engine));
    wait_for_reveal(&mut engine, &clock);
    engine.take_events();
    engine.advance();

    let result = engine.result().unwrap();
    assert!(result.player_won());
    let unlock = result.unlocked.expect("unlock event");
    assert_eq!(unlock.opponent_id, "quick");
    assert_eq!(result.progression.wins, quick.unlock_threshold);
    assert!(catalog::is_unlocked("quick", store.snapshot(Tier::Beginner).wins));

    let events = engine.take_events();
    assert!(events.iter().any(|e| matches!(e, DuelEvent::OpponentUnlocked(u) if u.opponent_id == "quick")));
    assert!(matches!(events.last(), Some(DuelEvent::SessionFinished { .. })));
}

#[test]
fn losing_at_threshold_minus_one_unlocks_nothing() {
    let (mut engine, clock, store) = engine_with(4, 5);
    let s = DuelSettings { accuracy_modifier: 100.0, ..settings(1) };
    engine.start_session("rookie", s).unwrap();
    finish_countdown(&mut engine, &clock);

    engine.submit_answer(wrong_index(&engine));
    wait_for_reveal(&mut engine, &clock);
    engine.advance();

    let result = engine.result().unwrap();
    assert_eq!(result.winner, Winner::Opponent);
    assert!(!result.new_unlock());
    assert_eq!(store.snapshot(Tier::Beginner), ProgressionSnapshot { wins: 4, games: 5 });
}

#[test]
fn rematch_starts_a_fresh_duel_against_the_same_opponent() {
    let (mut engine, clock, store) = engine_with(0, 21);
    engine.start_session("rookie", settings(2)).unwrap();
    finish_countdown(&mut engine, &clock);
    for _ in 0..2 {
        engine.submit_answer(correct_index(&engine));
        wait_for_reveal(&mut engine, &clock);
        engine.advance();
    }
    assert_eq!(engine.phase(), Some(Phase::Finished));
    let games_after_first = store.snapshot(Tier::Beginner).games;

    assert_eq!(engine.rematch().unwrap(), EventOutcome::Accepted);
    assert_eq!(engine.phase(), Some(Phase::Countdown));
    assert_eq!(engine.opponent().map(|o| o.id), Some("rookie"));
    assert_eq!(engine.question_index(), Some(0));
    assert_eq!(engine.scoreboard().unwrap(), Default::default());
    assert!(engine.rounds().is_empty());
    assert!(engine.result().is_none());
    assert_eq!(engine.settings().map(|s| s.question_count), Some(2));
    assert_eq!(games_after_first, 1);
}

#[test]
fn rematch_before_finish_is_ignored() {
    let (mut engine, clock, _) = engine_with(0, 3);
    assert_eq!(engine.rematch().unwrap(), EventOutcome::Ignored(IgnoreReason::NoSession));
    engine.start_session("rookie", settings(1)).unwrap();
    finish_countdown(&mut engine, &clock);
    assert_eq!(
        engine.rematch().unwrap(),
        EventOutcome::Ignored(IgnoreReason::WrongPhase(Phase::Playing))
    );
}

// ── lifecycle ────────────────────────────────────────────────────────────────

#[test]
fn n_questions_produce_n_rounds() {
    for n in [1usize, 4, 12] {
        let (mut engine, clock, _) = engine_with(0, n as u64);
        engine.start_session("rookie", settings(n)).unwrap();
        finish_countdown(&mut engine, &clock);

        let mut last_index = 0;
        for i in 0..n {
            assert_eq!(engine.question_index(), Some(i));
            last_index = i;
            if i % 3 == 2 {
                clock.advance(15_000);
                engine.poll();
            } else {
                engine.submit_answer(correct_index(&engine));
                wait_for_reveal(&mut engine, &clock);
            }
            assert_eq!(engine.rounds().len(), i + 1);
            engine.advance();
        }
        assert_eq!(last_index, n - 1);
        assert_eq!(engine.phase(), Some(Phase::Finished));
        assert_eq!(engine.rounds().len(), n);
        assert_eq!(engine.result().unwrap().total_questions as usize, n);
        assert!(engine.current_question().is_none());
    }
}

#[test]
fn countdown_holds_the_first_question_back() {
    let (mut engine, clock, _) = engine_with(0, 8);
    engine.start_session("rookie", settings(1)).unwrap();
    assert_eq!(engine.phase(), Some(Phase::Countdown));
    assert!(engine.current_question().is_none());

    clock.advance(COUNTDOWN_MS - 1);
    engine.poll();
    assert_eq!(engine.phase(), Some(Phase::Countdown));
    assert_eq!(
        engine.submit_answer(0),
        EventOutcome::Ignored(IgnoreReason::WrongPhase(Phase::Countdown))
    );

    clock.advance(1);
    engine.poll();
    assert_eq!(engine.phase(), Some(Phase::Playing));
    assert_eq!(engine.remaining_ms(), Some(15_000));
}

#[test]
fn settings_time_limit_applies_to_every_question() {
    let (mut engine, clock, _) = engine_with(0, 8);
    let s = DuelSettings { time_limit_secs: 5, ..settings(2) };
    engine.start_session("rookie", s).unwrap();
    finish_countdown(&mut engine, &clock);
    assert_eq!(engine.current_question().unwrap().time_limit_secs, 5);

    clock.advance(5_000);
    engine.poll();
    assert_eq!(engine.phase(), Some(Phase::Revealing));
    assert_eq!(engine.last_round().unwrap().player.elapsed_ms, 5_000);
}

#[test]
fn start_with_defaults_uses_configured_settings() {
    let clock = ManualClock::new();
    let config = EngineConfig::from_toml_str(
        "countdown_ms = 1000\n[default_settings]\nquestion_count = 3\ntime_limit_secs = 6\n",
    )
    .unwrap();
    let expected = config.default_settings;
    let mut engine = DuelEngine::new(
        config,
        QuestionPool::new(sample_questions(), Some(4)),
        MemoryProgressionStore::new(),
        clock.clone(),
        Some(4),
    );
    engine.start_with_defaults("rookie").unwrap();
    assert_eq!(engine.settings(), Some(&expected));

    clock.advance(1000);
    engine.poll();
    assert_eq!(engine.phase(), Some(Phase::Playing));
    assert_eq!(engine.current_question().unwrap().time_limit_secs, 6);
    assert_eq!(engine.remaining_ms(), Some(6_000));

    for _ in 0..3 {
        clock.advance(6_000);
        engine.poll();
        assert_eq!(engine.phase(), Some(Phase::Revealing));
        engine.advance();
    }
    assert_eq!(engine.result().unwrap().total_questions, 3);
}

#[test]
fn view_withholds_the_answer_until_reveal() {
    let (mut engine, clock, _) = engine_with(0, 9);
    engine.start_session("rookie", settings(1)).unwrap();
    finish_countdown(&mut engine, &clock);

    let view = engine.view().unwrap();
    assert_eq!(view.phase, Phase::Playing);
    assert_eq!(view.question.as_ref().unwrap().correct_index, None);
    assert!(view.last_round.is_none());

    engine.submit_answer(correct_index(&engine));
    wait_for_reveal(&mut engine, &clock);
    let view = engine.view().unwrap();
    assert!(view.question.as_ref().unwrap().correct_index.is_some());
    assert!(view.last_round.is_some());

    let json: serde_json::Value = serde_json::from_str(&view.to_json()).unwrap();
    assert_eq!(json["phase"], "revealing");
    assert_eq!(json["opponent_id"], "rookie");
}

// ── stray events ─────────────────────────────────────────────────────────────

#[test]
fn duplicate_and_late_events_are_ignored() {
    let (mut engine, clock, _) = engine_with(0, 13);
    assert_eq!(engine.submit_answer(0), EventOutcome::Ignored(IgnoreReason::NoSession));
    assert_eq!(engine.advance(), EventOutcome::Ignored(IgnoreReason::NoSession));

    engine.start_session("rookie", settings(2)).unwrap();
    finish_countdown(&mut engine, &clock);
    assert_eq!(
        engine.advance(),
        EventOutcome::Ignored(IgnoreReason::WrongPhase(Phase::Playing))
    );
    assert_eq!(engine.submit_answer(7), EventOutcome::Ignored(IgnoreReason::InvalidChoice(7)));

    assert!(engine.submit_answer(correct_index(&engine)).is_accepted());
    assert_eq!(
        engine.submit_answer(0),
        EventOutcome::Ignored(IgnoreReason::WrongPhase(Phase::Answered))
    );
    assert_eq!(
        engine.on_time_expired(),
        EventOutcome::Ignored(IgnoreReason::WrongPhase(Phase::Answered))
    );

    wait_for_reveal(&mut engine, &clock);
    assert_eq!(
        engine.on_time_expired(),
        EventOutcome::Ignored(IgnoreReason::WrongPhase(Phase::Revealing))
    );
    assert!(engine.advance().is_accepted());

    // Window for question 2 closes; a submission afterwards is late.
    clock.advance(20_000);
    assert_eq!(
        engine.submit_answer(correct_index(&engine)),
        EventOutcome::Ignored(IgnoreReason::WrongPhase(Phase::Revealing))
    );
    assert_eq!(engine.rounds().len(), 2);
    assert_eq!(engine.rounds()[1].player.answer_index, None);

    engine.advance();
    assert_eq!(engine.advance(), EventOutcome::Ignored(IgnoreReason::WrongPhase(Phase::Finished)));
    assert_eq!(engine.submit_answer(0), EventOutcome::Ignored(IgnoreReason::WrongPhase(Phase::Finished)));
}

// ── timers ───────────────────────────────────────────────────────────────────

#[test]
fn opponent_reply_wait_is_capped_but_latency_is_recorded_in_full() {
    let quick = catalog::find("quick").unwrap();
    let (mut engine, clock, _) = engine_with(quick.unlock_threshold, 17);
    engine.start_session("quick", settings(1)).unwrap();
    finish_countdown(&mut engine, &clock);

    let submitted_at = 3000;
    engine.submit_answer(correct_index(&engine));
    let reveal_at = engine.take_events().into_iter().find_map(|e| match e {
        DuelEvent::PlayerAnswered { reveal_at_ms, .. } => Some(reveal_at_ms),
        _ => None,
    });
    assert_eq!(reveal_at, Some(submitted_at + 2000));

    clock.advance(1999);
    engine.poll();
    assert_eq!(engine.phase(), Some(Phase::Answered));
    clock.advance(1);
    engine.poll();
    assert_eq!(engine.phase(), Some(Phase::Revealing));

    let round = engine.last_round().unwrap();
    assert!((6000..=9000).contains(&round.opponent.elapsed_ms));
    assert_eq!(round.player.elapsed_ms, 0);
}

#[test]
fn reset_cancels_pending_timers() {
    let (mut engine, clock, store) = engine_with(0, 19);
    engine.start_session("rookie", settings(2)).unwrap();
    finish_countdown(&mut engine, &clock);
    engine.submit_answer(correct_index(&engine));
    assert_eq!(engine.phase(), Some(Phase::Answered));

    assert!(engine.reset_session().is_accepted());
    assert!(!engine.has_session());
    assert_eq!(engine.next_deadline_ms(), None);
    assert_eq!(engine.reset_session(), EventOutcome::Ignored(IgnoreReason::NoSession));

    engine.start_session("rookie", settings(2)).unwrap();
    // The old reply would have landed here; the new duel must be untouched.
    clock.advance(2000);
    assert_eq!(engine.poll(), 0);
    assert_eq!(engine.phase(), Some(Phase::Countdown));
    assert!(engine.rounds().is_empty());

    clock.advance(1000);
    engine.poll();
    assert_eq!(engine.phase(), Some(Phase::Playing));
    assert_eq!(engine.question_index(), Some(0));
    // Reset produces no result and writes nothing.
    assert_eq!(store.snapshot(Tier::Beginner).games, 0);
}

// ── rejections ───────────────────────────────────────────────────────────────

#[test]
fn locked_opponent_is_rejected_before_any_state() {
    let (mut engine, _, _) = engine_with(0, 1);
    let err = engine.start_session("quick", settings(1)).unwrap_err();
    assert!(matches!(err, DuelError::OpponentLocked { wins: 0, threshold: 5, .. }));
    assert!(!engine.has_session());
    assert!(engine.take_events().is_empty());

    assert!(matches!(
        engine.start_session("nobody", settings(1)),
        Err(DuelError::UnknownOpponent(_))
    ));
}

#[test]
fn undersized_pool_is_rejected_and_keeps_the_old_session() {
    let (mut engine, clock, _) = engine_with(0, 1);
    engine.start_session("rookie", settings(2)).unwrap();
    finish_countdown(&mut engine, &clock);

    let err = engine.start_session("rookie", settings(13)).unwrap_err();
    assert!(matches!(err, DuelError::InsufficientQuestions { requested: 13, available: 12 }));
    assert_eq!(engine.phase(), Some(Phase::Playing));
    assert_eq!(engine.settings().map(|s| s.question_count), Some(2));
}

#[test]
fn out_of_range_settings_are_rejected() {
    let (mut engine, _, _) = engine_with(0, 1);
    let bad = DuelSettings { speed_multiplier: 4.0, ..settings(1) };
    assert!(matches!(engine.start_session("rookie", bad), Err(DuelError::InvalidSettings(_))));
    assert!(!engine.has_session());
}

// ── persistence ──────────────────────────────────────────────────────────────

struct BrokenStore;

impl ProgressionStore for BrokenStore {
    fn load(&self, _tier: Tier) -> Result<ProgressionSnapshot, StoreError> {
        Ok(ProgressionSnapshot::default())
    }

    fn save(&mut self, tier: Tier, _wins: u32, _games: u32) -> Result<(), StoreError> {
        Err(StoreError::SaveFailed { tier, message: "disk full".into() })
    }
}

struct UnreadableStore;

impl ProgressionStore for UnreadableStore {
    fn load(&self, tier: Tier) -> Result<ProgressionSnapshot, StoreError> {
        Err(StoreError::Unavailable(tier))
    }

    fn save(&mut self, _tier: Tier, _wins: u32, _games: u32) -> Result<(), StoreError> {
        Ok(())
    }
}

#[test]
fn failed_save_still_exposes_the_result() {
    let clock = ManualClock::new();
    let mut engine = DuelEngine::new(
        EngineConfig::default(),
        QuestionPool::new(sample_questions(), Some(1)),
        BrokenStore,
        clock.clone(),
        Some(1),
    );
    engine.start_session("rookie", settings(1)).unwrap();
    finish_countdown(&mut engine, &clock);
    engine.submit_answer(correct_index(&engine));
    wait_for_reveal(&mut engine, &clock);
    engine.advance();

    assert_eq!(engine.phase(), Some(Phase::Finished));
    assert!(engine.result().is_some());
    let events = engine.take_events();
    assert!(events.iter().any(|e| matches!(e, DuelEvent::ProgressionSaveFailed { .. })));
    assert!(events.iter().any(|e| matches!(e, DuelEvent::SessionFinished { .. })));
}

#[test]
fn unreadable_progression_rejects_the_start() {
    let mut engine = DuelEngine::new(
        EngineConfig::default(),
        QuestionPool::new(sample_questions(), Some(1)),
        UnreadableStore,
        ManualClock::new(),
        Some(1),
    );
    assert!(matches!(
        engine.start_session("rookie", settings(1)),
        Err(DuelError::Progression(StoreError::Unavailable(Tier::Beginner)))
    ));
    assert!(!engine.has_session());
}

// ── determinism ──────────────────────────────────────────────────────────────

fn play_scripted(seed: u64) -> Vec<crate::RoundResult> {
    let (mut engine, clock, _) = engine_with(0, seed);
    engine.start_session("rookie", settings(5)).unwrap();
    finish_countdown(&mut engine, &clock);
    for i in 0..5 {
        clock.advance(1000 * i as u64);
        engine.submit_answer(correct_index(&engine));
        wait_for_reveal(&mut engine, &clock);
        engine.advance();
    }
    engine.rounds().to_vec()
}

#[test]
fn same_seed_replays_the_same_duel() {
    assert_eq!(play_scripted(77), play_scripted(77));
    assert_ne!(play_scripted(77), play_scripted(78));
}
