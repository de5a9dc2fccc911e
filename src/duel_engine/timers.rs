//! One-shot timers with cancellable handles.
//!
//! Handles are never reused for the lifetime of a queue, so a handle kept
//! from an earlier question or an earlier session can never match a timer
//! scheduled later.

use serde::Serialize;

/// Opaque identifier of one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimerHandle(u64);

/// What a timer means when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimerKind {
    /// Lead-in before the first answer window opens.
    Countdown,
    /// The answer window for `question` ran out.
    AnswerWindow { question: usize },
    /// The opponent's reply for `question` lands.
    OpponentReply { question: usize },
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    handle: TimerHandle,
    due_at_ms: u64,
    kind: TimerKind,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    pending: Vec<Pending>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, kind: TimerKind, due_at_ms: u64) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        tracing::trace!(?handle, ?kind, due_at_ms, "timer scheduled");
        self.pending.push(Pending { handle, due_at_ms, kind });
        handle
    }

    /// Remove a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        let removed = self.pending.len() != before;
        if removed {
            tracing::trace!(?handle, "timer cancelled");
        }
        removed
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Pop the earliest timer due at or before `now_ms`. Ties fire in schedule order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerHandle, TimerKind)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_at_ms <= now_ms)
            .min_by_key(|(_, p)| (p.due_at_ms, p.handle.0))
            .map(|(i, _)| i)?;
        let fired = self.pending.remove(idx);
        Some((fired.handle, fired.kind))
    }

    /// Deadline of the next pending timer, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_at_ms).min()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
