use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::duel_engine::catalog;
use crate::duel_engine::models::{ProgressionDelta, ProgressionSnapshot, Tier, UnlockEvent};
use crate::error::StoreError;

/// Durable per-tier win/game counters, owned outside the engine.
pub trait ProgressionStore {
    fn load(&self, tier: Tier) -> Result<ProgressionSnapshot, StoreError>;
    fn save(&mut self, tier: Tier, wins: u32, games: u32) -> Result<(), StoreError>;
}

/// In-process store. Clones share their counters, so a caller can keep a
/// handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressionStore {
    tiers: Rc<RefCell<HashMap<Tier, ProgressionSnapshot>>>,
}

impl MemoryProgressionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing counters for one tier.
    pub fn with_snapshot(tier: Tier, snapshot: ProgressionSnapshot) -> Self {
        let store = Self::new();
        store.tiers.borrow_mut().insert(tier, snapshot);
        store
    }

    pub fn snapshot(&self, tier: Tier) -> ProgressionSnapshot {
        self.tiers.borrow().get(&tier).copied().unwrap_or_default()
    }
}

impl ProgressionStore for MemoryProgressionStore {
    fn load(&self, tier: Tier) -> Result<ProgressionSnapshot, StoreError> {
        Ok(self.snapshot(tier))
    }

    fn save(&mut self, tier: Tier, wins: u32, games: u32) -> Result<(), StoreError> {
        self.tiers
            .borrow_mut()
            .insert(tier, ProgressionSnapshot { wins, games });
        Ok(())
    }
}

/// Apply one finished game to the prior counters and detect a new unlock.
///
/// The unlock names whichever opponent was next in line before the win,
/// and only fires when the player actually won.
pub fn settle_progression(
    tier: Tier,
    prior: ProgressionSnapshot,
    player_won: bool,
) -> (ProgressionDelta, Option<UnlockEvent>) {
    let wins = if player_won { prior.wins.saturating_add(1) } else { prior.wins };
    let delta = ProgressionDelta { tier, wins, games: prior.games.saturating_add(1) };

    let before = catalog::next_locked(prior.wins);
    let after = catalog::next_locked(wins);
    let unlocked = match before {
        Some(o) if player_won && before.map(|b| b.id) != after.map(|a| a.id) => Some(UnlockEvent {
            opponent_id: o.id,
            opponent_name: o.name,
        }),
        _ => None,
    };

    (delta, unlocked)
}
