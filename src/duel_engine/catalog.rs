//! Static registry of synthetic opponents.
//!
//! Opponents are listed in unlock order: thresholds are strictly increasing
//! and the first entry is always available (threshold 0). Faster, more
//! accurate opponents sit further down the list.

use crate::duel_engine::models::Opponent;

const fn opponent(
    ordinal: u8, id: &'static str, name: &'static str,
    accuracy: (u8, u8), latency_ms: (u32, u32), unlock_threshold: u32,
) -> Opponent {
    Opponent {
        id,
        name,
        ordinal,
        accuracy_min: accuracy.0,
        accuracy_max: accuracy.1,
        latency_min_ms: latency_ms.0,
        latency_max_ms: latency_ms.1,
        unlock_threshold,
    }
}

pub static OPPONENTS: [Opponent; 27] = [
    opponent(1,  "rookie",     "Rookie",     (30, 45), (9000, 13000), 0),
    opponent(2,  "drowsy",     "Drowsy",     (35, 50), (8500, 12500), 1),
    opponent(3,  "steady",     "Steady",     (40, 55), (8000, 12000), 2),
    opponent(4,  "curious",    "Curious",    (45, 58), (7500, 11000), 3),
    opponent(5,  "eager",      "Eager",      (50, 62), (7000, 10000), 4),
    opponent(6,  "quick",      "Quick",      (57, 67), (6000, 9000),  5),
    opponent(7,  "clever",     "Clever",     (60, 70), (6000, 8500),  7),
    opponent(8,  "sharp",      "Sharp",      (62, 72), (5500, 8000),  9),
    opponent(9,  "bright",     "Bright",     (64, 74), (5000, 7500),  11),
    opponent(10, "nimble",     "Nimble",     (66, 76), (4500, 7000),  13),
    opponent(11, "keen",       "Keen",       (68, 78), (4500, 6500),  15),
    opponent(12, "scholar",    "Scholar",    (70, 80), (4000, 6500),  18),
    opponent(13, "sage",       "Sage",       (72, 82), (4000, 6000),  21),
    opponent(14, "swift",      "Swift",      (72, 84), (3500, 5500),  24),
    opponent(15, "tactician",  "Tactician",  (74, 85), (3500, 5500),  27),
    opponent(16, "mentor",     "Mentor",     (76, 86), (3200, 5000),  30),
    opponent(17, "professor",  "Professor",  (78, 88), (3000, 4800),  34),
    opponent(18, "strategist", "Strategist", (80, 89), (2800, 4500),  38),
    opponent(19, "virtuoso",   "Virtuoso",   (81, 90), (2600, 4200),  42),
    opponent(20, "maestro",    "Maestro",    (82, 91), (2400, 4000),  46),
    opponent(21, "prodigy",    "Prodigy",    (84, 92), (2200, 3800),  50),
    opponent(22, "oracle",     "Oracle",     (85, 93), (2000, 3500),  55),
    opponent(23, "titan",      "Titan",      (86, 94), (1800, 3200),  60),
    opponent(24, "phantom",    "Phantom",    (88, 95), (1600, 3000),  65),
    opponent(25, "legend",     "Legend",     (90, 96), (1400, 2800),  70),
    opponent(26, "mastermind", "Mastermind", (92, 97), (1200, 2500),  80),
    opponent(27, "omniscient", "Omniscient", (94, 99), (1000, 2200),  100),
];

/// All opponents in unlock order.
pub fn all() -> &'static [Opponent] {
    &OPPONENTS
}

/// Look up an opponent by its stable id.
pub fn find(id: &str) -> Option<&'static Opponent> {
    OPPONENTS.iter().find(|o| o.id == id)
}

/// Case-insensitive lookup by display name.
pub fn find_by_name(name: &str) -> Option<&'static Opponent> {
    OPPONENTS.iter().find(|o| o.name.eq_ignore_ascii_case(name))
}

impl Opponent {
    pub fn is_unlocked(&self, cumulative_wins: u32) -> bool {
        cumulative_wins >= self.unlock_threshold
    }
}

/// True iff the opponent exists and `cumulative_wins` reaches its threshold.
pub fn is_unlocked(opponent_id: &str, cumulative_wins: u32) -> bool {
    find(opponent_id).is_some_and(|o| o.is_unlocked(cumulative_wins))
}

/// The first opponent still out of reach, or `None` once everything is unlocked.
pub fn next_locked(cumulative_wins: u32) -> Option<&'static Opponent> {
    OPPONENTS.iter().find(|o| o.unlock_threshold > cumulative_wins)
}

/// Every opponent selectable with `cumulative_wins`.
pub fn unlocked_opponents(cumulative_wins: u32) -> impl Iterator<Item = &'static Opponent> {
    OPPONENTS.iter().take_while(move |o| o.is_unlocked(cumulative_wins))
}
