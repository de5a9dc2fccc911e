use crate::duel_engine::models::{AnswerRecord, Winner};

/// Both answers with points filled in, plus the round winner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub player: AnswerRecord,
    pub opponent: AnswerRecord,
    pub winner: Winner,
}

/// Score one round.
///
/// A correct answer earns `points_correct`; the player also earns
/// `points_bonus` when strictly faster than the opponent. Exactly one correct
/// side wins outright, two correct sides are split by latency, two misses tie.
pub fn resolve(
    player: AnswerRecord,
    opponent: AnswerRecord,
    points_correct: u32,
    points_bonus: u32,
) -> Resolution {
    let player_faster = player.elapsed_ms < opponent.elapsed_ms;

    let mut player_points = if player.is_correct { points_correct } else { 0 };
    if player.is_correct && player_faster {
        player_points += points_bonus;
    }
    let opponent_points = if opponent.is_correct { points_correct } else { 0 };

    let winner = match (player.is_correct, opponent.is_correct) {
        (true, false) => Winner::Player,
        (false, true) => Winner::Opponent,
        (false, false) => Winner::Tie,
        (true, true) => match player.elapsed_ms.cmp(&opponent.elapsed_ms) {
            std::cmp::Ordering::Less    => Winner::Player,
            std::cmp::Ordering::Greater => Winner::Opponent,
            std::cmp::Ordering::Equal   => Winner::Tie,
        },
    };

    Resolution {
        player: AnswerRecord { points: player_points, ..player },
        opponent: AnswerRecord { points: opponent_points, ..opponent },
        winner,
    }
}
