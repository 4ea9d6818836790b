use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tipjar_registry::ResourceRegistry;
use tipjar_types::{
    AccountId, Amount, ContentDigest, ContentRecord, ResourceId, SuggestionState, TipJarEvent,
    TipKey, Timestamp,
};
use tracing::{debug, error, info, warn};

use crate::catalog::check_length;
use crate::claim::{check_claimable, ClaimReceipt};
use crate::clock::{Clock, SystemClock};
use crate::error::TipJarError;
use crate::journal::{verify_entries, JournalEntry};
use crate::state::LedgerState;
use crate::transfer::FundsTransfer;

/// The escrow ledger.
///
/// Every public operation runs as one transaction: other threads wait for the
/// whole call, and a failure reverts every change the call made (including
/// changes made by calls that re-entered it from a registry or payout callback).
///
/// Internal state is always updated before the registry or the payout rail is
/// called, so a callback that re-enters the ledger sees the effects already applied.
/// A re-entering call may record suggestions, tips and blocks, but may not pay
/// out (`NestedPayout`). A panic in a collaborator rolls the operation back
/// before the unwind continues.
pub struct TipJar {
    state: ReentrantMutex<RefCell<LedgerState>>,
    registry: Arc<dyn ResourceRegistry>,
    treasury: Arc<dyn FundsTransfer>,
    clock: Arc<dyn Clock>,
}

impl TipJar {
    pub fn new(
        registry: Arc<dyn ResourceRegistry>,
        treasury: Arc<dyn FundsTransfer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(LedgerState::default())),
            registry,
            treasury,
            clock,
        }
    }

    /// Create a ledger driven by the wall clock.
    pub fn with_system_clock(
        registry: Arc<dyn ResourceRegistry>,
        treasury: Arc<dyn FundsTransfer>,
    ) -> Self {
        Self::new(registry, treasury, Arc::new(SystemClock::new()))
    }

    pub fn digest_of(text: &str) -> ContentDigest {
        ContentDigest::of(text)
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // --- Invocation Catalog ---

    /// Record a suggestion for `resource`. A non-zero `attached` amount is tipped
    /// by the caller in the same transaction.
    pub fn suggest(
        &self,
        resource: &ResourceId,
        text: &str,
        caller: &AccountId,
        attached: Amount,
    ) -> Result<ContentDigest, TipJarError> {
        let digest = ContentDigest::of(text);
        self.transact("suggest", |cell, now| {
            cell.borrow().catalog.ensure_unsuggested(&digest)?;

            let max = self.registry.max_content_length(resource)?;
            check_length(resource, text.len(), max)?;

            {
                let mut guard = cell.borrow_mut();
                let state = &mut *guard;
                state.catalog.insert(
                    ContentRecord {
                        digest,
                        text: text.to_string(),
                        suggested_for: resource.clone(),
                        suggested_by: caller.clone(),
                        recorded_at: now,
                    },
                    &mut state.undo,
                )?;
                state.emit(
                    now,
                    TipJarEvent::SuggestionRecorded {
                        resource: resource.clone(),
                        digest,
                        suggester: caller.clone(),
                        text: text.to_string(),
                    },
                );
            }

            if !attached.is_zero() {
                self.apply_tip(cell, now, resource, &digest, attached, caller)?;
            }

            info!(
                resource = %resource,
                digest = %digest.short(),
                suggester = %caller,
                length = text.len(),
                attached = attached.0,
                "Suggestion recorded"
            );
            Ok(digest)
        })
    }

    // --- Tip Ledger ---

    /// Pool `amount` from `tipper` toward `digest` on `resource`. Returns the new pool total.
    pub fn tip(
        &self,
        resource: &ResourceId,
        digest: &ContentDigest,
        amount: Amount,
        tipper: &AccountId,
    ) -> Result<Amount, TipJarError> {
        self.transact("tip", |cell, now| {
            let total = self.apply_tip(cell, now, resource, digest, amount, tipper)?;
            info!(
                resource = %resource,
                digest = %digest.short(),
                tipper = %tipper,
                amount = amount.0,
                total = total.0,
                "Tip recorded"
            );
            Ok(total)
        })
    }

    /// Take back the tipper's whole contribution on one key. Returns the amount paid out.
    pub fn withdraw(
        &self,
        resource: &ResourceId,
        digest: &ContentDigest,
        tipper: &AccountId,
    ) -> Result<Amount, TipJarError> {
        self.transact("withdraw", |cell, now| {
            let key = TipKey::new(resource.clone(), *digest);
            let amount = self.apply_withdraw(cell, now, &key, tipper)?;
            self.pay(cell, tipper, amount)?;

            info!(key = %key, tipper = %tipper, amount = amount.0, "Tip withdrawn");
            Ok(amount)
        })
    }

    /// Withdraw from several keys at once. Either every withdrawal applies and
    /// the sum is paid out in a single transfer, or nothing happens.
    pub fn batch_withdraw(
        &self,
        pairs: &[(ResourceId, ContentDigest)],
        tipper: &AccountId,
    ) -> Result<Amount, TipJarError> {
        self.transact("batch_withdraw", |cell, now| {
            let mut total = Amount::ZERO;
            for (resource, digest) in pairs {
                let key = TipKey::new(resource.clone(), *digest);
                let amount = self.apply_withdraw(cell, now, &key, tipper)?;
                total = total.checked_add(amount)?;
            }

            if !total.is_zero() {
                self.pay(cell, tipper, total)?;
            }

            info!(
                tipper = %tipper,
                keys = pairs.len(),
                amount = total.0,
                "Batch withdrawal completed"
            );
            Ok(total)
        })
    }

    // --- Claim Gate ---

    /// Release the whole pool on a key to the resource's current keeper, once the
    /// registry confirms the suggestion was acted upon at `invocation_index`.
    ///
    /// Anyone may call this; the payout always goes to whoever controls the
    /// resource at the time of the call.
    pub fn claim(
        &self,
        resource: &ResourceId,
        digest: &ContentDigest,
        invocation_index: u64,
        minimum: Amount,
        caller: &AccountId,
    ) -> Result<ClaimReceipt, TipJarError> {
        self.transact("claim", |cell, now| {
            let key = TipKey::new(resource.clone(), *digest);
            let amount = {
                let mut guard = cell.borrow_mut();
                let state = &mut *guard;
                let amount = check_claimable(&state.tips, &state.locks, &key, minimum, now)?;
                state.tips.mark_claimed(&key, &mut state.undo);
                amount
            };

            if !self
                .registry
                .was_invoked(resource, invocation_index, digest)?
            {
                return Err(TipJarError::NotSuggested {
                    resource: resource.clone(),
                    digest: *digest,
                    index: invocation_index,
                });
            }

            let keeper = self.registry.current_keeper(resource)?;
            cell.borrow_mut().emit(
                now,
                TipJarEvent::TipsClaimed {
                    resource: resource.clone(),
                    digest: *digest,
                    amount,
                },
            );
            self.pay(cell, &keeper, amount)?;

            info!(
                key = %key,
                keeper = %keeper,
                caller = %caller,
                index = invocation_index,
                amount = amount.0,
                "Tips claimed"
            );
            Ok(ClaimReceipt {
                resource: resource.clone(),
                digest: *digest,
                invocation_index,
                keeper,
                amount,
                claimed_at: now,
            })
        })
    }

    // --- Withdrawal Lock ---

    /// Freeze tipping, withdrawal and claiming on a key for `BLOCK_PERIOD`.
    /// Keeper only; at most one window per `COOLDOWN_PERIOD`. Returns the window end.
    pub fn block(
        &self,
        resource: &ResourceId,
        digest: &ContentDigest,
        minimum: Amount,
        caller: &AccountId,
    ) -> Result<Timestamp, TipJarError> {
        self.transact("block", |cell, now| {
            let keeper = self.registry.current_keeper(resource)?;
            if keeper != *caller {
                return Err(TipJarError::NotKeeper {
                    caller: caller.clone(),
                    resource: resource.clone(),
                });
            }

            let key = TipKey::new(resource.clone(), *digest);
            let mut guard = cell.borrow_mut();
            let state = &mut *guard;
            state.tips.ensure_unclaimed(&key)?;
            state.locks.ensure_cooled_down(&key, now)?;

            let total = state.tips.total(&key);
            if total < minimum {
                return Err(TipJarError::MinimumUnmet { total, minimum });
            }

            let blocked_until = state.locks.block(&key, now, &mut state.undo);
            state.emit(
                now,
                TipJarEvent::WithdrawalsBlocked {
                    resource: resource.clone(),
                    digest: *digest,
                    blocked_until,
                },
            );

            info!(key = %key, keeper = %keeper, until = %blocked_until, "Withdrawals blocked");
            Ok(blocked_until)
        })
    }

    // --- Reads ---

    pub fn content(&self, digest: &ContentDigest) -> Option<ContentRecord> {
        self.read(|state| state.catalog.get(digest).cloned())
    }

    pub fn total(&self, resource: &ResourceId, digest: &ContentDigest) -> Amount {
        let key = TipKey::new(resource.clone(), *digest);
        self.read(|state| state.tips.total(&key))
    }

    pub fn contribution(
        &self,
        tipper: &AccountId,
        resource: &ResourceId,
        digest: &ContentDigest,
    ) -> Amount {
        let key = TipKey::new(resource.clone(), *digest);
        self.read(|state| state.tips.contribution(tipper, &key))
    }

    pub fn is_claimed(&self, resource: &ResourceId, digest: &ContentDigest) -> bool {
        let key = TipKey::new(resource.clone(), *digest);
        self.read(|state| state.tips.is_claimed(&key))
    }

    pub fn blocked_until(&self, resource: &ResourceId, digest: &ContentDigest) -> Option<Timestamp> {
        let key = TipKey::new(resource.clone(), *digest);
        self.read(|state| state.locks.blocked_until(&key))
    }

    pub fn state(&self, resource: &ResourceId, digest: &ContentDigest) -> SuggestionState {
        let key = TipKey::new(resource.clone(), *digest);
        let now = self.clock.now();
        self.read(|state| {
            if state.tips.is_claimed(&key) {
                SuggestionState::Claimed
            } else if !state.catalog.contains(digest) {
                SuggestionState::Unsuggested
            } else {
                match state.locks.blocked_until(&key) {
                    Some(until) if until > now => SuggestionState::Blocked { until },
                    _ => SuggestionState::Active,
                }
            }
        })
    }

    /// Funds currently held for unclaimed pools.
    pub fn custody(&self) -> Result<Amount, TipJarError> {
        self.read(|state| state.tips.custody())
    }

    /// Unclaimed keys whose pool total differs from the sum of their contributions.
    /// Always empty unless the ledger is broken.
    pub fn conservation_violations(&self) -> Vec<TipKey> {
        self.read(|state| {
            let mut broken: Vec<TipKey> = state
                .tips
                .keys()
                .filter(|key| !state.tips.is_claimed(key))
                .filter(|key| state.tips.contributions_on(key) != Ok(state.tips.total(key)))
                .cloned()
                .collect();
            broken.sort();
            broken
        })
    }

    /// Committed audit events, oldest first.
    pub fn events(&self) -> Vec<JournalEntry> {
        self.read(|state| state.journal.entries().to_vec())
    }

    pub fn verify_journal(&self) -> bool {
        self.read(|state| verify_entries(state.journal.entries()))
    }

    // --- Internals ---

    fn transact<T>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&RefCell<LedgerState>, Timestamp) -> Result<T, TipJarError>,
    ) -> Result<T, TipJarError> {
        let guard = self.state.lock();
        let now = self.clock.now();
        let checkpoint = {
            let mut state = guard.borrow_mut();
            let checkpoint = state.begin();
            debug!(operation, now = %now, depth = state.depth(), checkpoint, "Operation started");
            checkpoint
        };

        let result = match panic::catch_unwind(AssertUnwindSafe(|| body(&*guard, now))) {
            Ok(result) => result,
            Err(payload) => {
                guard.borrow_mut().rollback(checkpoint);
                error!(operation, "Operation panicked, rolled back");
                panic::resume_unwind(payload);
            }
        };

        let mut state = guard.borrow_mut();
        match result {
            Ok(value) => {
                state.commit();
                Ok(value)
            }
            Err(err) => {
                state.rollback(checkpoint);
                warn!(operation, kind = ?err.kind(), error = %err, "Operation rejected");
                Err(err)
            }
        }
    }

    fn read<T>(&self, body: impl FnOnce(&LedgerState) -> T) -> T {
        let guard = self.state.lock();
        let state = guard.borrow();
        body(&*state)
    }

    fn apply_tip(
        &self,
        cell: &RefCell<LedgerState>,
        now: Timestamp,
        resource: &ResourceId,
        digest: &ContentDigest,
        amount: Amount,
        tipper: &AccountId,
    ) -> Result<Amount, TipJarError> {
        if digest.is_zero() {
            return Err(TipJarError::ZeroHash);
        }
        if amount.is_zero() {
            return Err(TipJarError::ZeroAmount);
        }

        let (suggested_for, length) = {
            let state = cell.borrow();
            let record = state
                .catalog
                .get(digest)
                .ok_or(TipJarError::ContentNotFound(*digest))?;
            (record.suggested_for.clone(), record.len())
        };

        // Content is shared across resources; it must still fit the one being tipped on.
        if suggested_for != *resource {
            let max = self.registry.max_content_length(resource)?;
            check_length(resource, length, max)?;
        }

        let key = TipKey::new(resource.clone(), *digest);
        let mut guard = cell.borrow_mut();
        let state = &mut *guard;
        state.locks.ensure_open(&key, now)?;
        state.tips.ensure_unclaimed(&key)?;

        let total = state.tips.deposit(&key, tipper, amount, &mut state.undo)?;
        state.emit(
            now,
            TipJarEvent::TipRecorded {
                resource: resource.clone(),
                digest: *digest,
                tipper: tipper.clone(),
                amount,
            },
        );
        Ok(total)
    }

    fn apply_withdraw(
        &self,
        cell: &RefCell<LedgerState>,
        now: Timestamp,
        key: &TipKey,
        tipper: &AccountId,
    ) -> Result<Amount, TipJarError> {
        let mut guard = cell.borrow_mut();
        let state = &mut *guard;
        state.tips.ensure_withdrawable(key, tipper)?;
        state.locks.ensure_open(key, now)?;

        let amount = state.tips.withdraw(key, tipper, &mut state.undo)?;
        state.emit(
            now,
            TipJarEvent::TipWithdrawn {
                resource: key.resource.clone(),
                digest: key.digest,
                tipper: tipper.clone(),
                amount,
            },
        );
        Ok(amount)
    }

    /// Funds leave only from an outermost operation. A payout made by a call
    /// nested in a callback could not be taken back if the enclosing call failed.
    fn pay(
        &self,
        cell: &RefCell<LedgerState>,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TipJarError> {
        let depth = cell.borrow().depth();
        if depth > 1 {
            return Err(TipJarError::NestedPayout { to: to.clone(), amount });
        }
        debug!(to = %to, amount = amount.0, "Paying out");
        self.treasury.transfer(to, amount)?;
        Ok(())
    }
}
