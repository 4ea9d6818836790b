//! Withdrawal Lock: keeper-initiated freeze windows with a cooldown.
//!
//! A window is never closed explicitly: it is active while `blocked_until > now`.
//! A new window may start once `COOLDOWN_PERIOD` has passed since the previous
//! window started (`previous.blocked_until - BLOCK_PERIOD`).

use std::collections::HashMap;

use tipjar_types::{BlockWindow, TipKey, Timestamp, BLOCK_PERIOD, COOLDOWN_PERIOD};

use crate::error::TipJarError;
use crate::state::{Undo, UndoLog};

#[derive(Debug, Default)]
pub struct WithdrawalLock {
    windows: HashMap<TipKey, BlockWindow>,
}

impl WithdrawalLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window(&self, key: &TipKey) -> Option<BlockWindow> {
        self.windows.get(key).copied()
    }

    pub fn blocked_until(&self, key: &TipKey) -> Option<Timestamp> {
        self.window(key).map(|window| window.blocked_until)
    }

    pub fn is_blocked(&self, key: &TipKey, now: Timestamp) -> bool {
        self.window(key)
            .map(|window| window.is_active(now))
            .unwrap_or(false)
    }

    /// Earliest time the next window may start. `None` if the key was never blocked.
    pub fn cooldown_ends(&self, key: &TipKey) -> Option<Timestamp> {
        self.blocked_until(key)
            .map(|until| until.minus(BLOCK_PERIOD).plus(COOLDOWN_PERIOD))
    }

    pub fn ensure_open(&self, key: &TipKey, now: Timestamp) -> Result<(), TipJarError> {
        match self.window(key) {
            Some(window) if window.is_active(now) => Err(TipJarError::WindowBlocked {
                key: key.clone(),
                until: window.blocked_until,
            }),
            _ => Ok(()),
        }
    }

    pub fn ensure_cooled_down(&self, key: &TipKey, now: Timestamp) -> Result<(), TipJarError> {
        match self.cooldown_ends(key) {
            Some(ready_at) if now < ready_at => Err(TipJarError::CooldownPending {
                key: key.clone(),
                ready_at,
            }),
            _ => Ok(()),
        }
    }

    /// Start a window at `now`. Returns its end.
    pub(crate) fn block(&mut self, key: &TipKey, now: Timestamp, undo: &mut UndoLog) -> Timestamp {
        let blocked_until = now.plus(BLOCK_PERIOD);
        let previous = self
            .windows
            .insert(key.clone(), BlockWindow { blocked_until });
        undo.push(Undo::Window(key.clone(), previous));
        blocked_until
    }

    pub(crate) fn restore(&mut self, key: TipKey, previous: Option<BlockWindow>) {
        match previous {
            Some(window) => {
                self.windows.insert(key, window);
            }
            None => {
                self.windows.remove(&key);
            }
        }
    }
}
