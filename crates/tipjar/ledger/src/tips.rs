//! Tip Ledger: pooled totals and per-tipper contributions per key.
//!
//! While a key is unclaimed its total always equals the sum of its
//! contributions. Deposits and withdrawals compute every new value before
//! writing any of them, so a failed arithmetic check leaves both maps untouched.

use std::collections::HashMap;

use tipjar_types::{AccountId, Amount, TipAccount, TipKey};

use crate::error::TipJarError;
use crate::state::{Undo, UndoLog};

#[derive(Debug, Default)]
pub struct TipLedger {
    accounts: HashMap<TipKey, TipAccount>,
    contributions: HashMap<(AccountId, TipKey), Amount>,
}

impl TipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, key: &TipKey) -> Option<&TipAccount> {
        self.accounts.get(key)
    }

    pub fn total(&self, key: &TipKey) -> Amount {
        self.accounts
            .get(key)
            .map(|account| account.total)
            .unwrap_or_default()
    }

    pub fn is_claimed(&self, key: &TipKey) -> bool {
        self.accounts
            .get(key)
            .map(|account| account.claimed)
            .unwrap_or(false)
    }

    pub fn contribution(&self, tipper: &AccountId, key: &TipKey) -> Amount {
        self.contributions
            .get(&(tipper.clone(), key.clone()))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of every tipper's contribution on `key`.
    pub fn contributions_on(&self, key: &TipKey) -> Result<Amount, TipJarError> {
        Ok(Amount::checked_sum(
            self.contributions
                .iter()
                .filter(|((_, k), _)| k == key)
                .map(|(_, amount)| *amount),
        )?)
    }

    /// Funds held for unclaimed keys.
    pub fn custody(&self) -> Result<Amount, TipJarError> {
        Ok(Amount::checked_sum(
            self.accounts
                .values()
                .filter(|account| !account.claimed)
                .map(|account| account.total),
        )?)
    }

    pub fn keys(&self) -> impl Iterator<Item = &TipKey> {
        self.accounts.keys()
    }

    pub fn ensure_unclaimed(&self, key: &TipKey) -> Result<(), TipJarError> {
        if self.is_claimed(key) {
            return Err(TipJarError::AlreadyClaimed(key.clone()));
        }
        Ok(())
    }

    /// Checks a withdrawal must pass, in order: the tipper has something on
    /// the key, and the key is not claimed. Returns the contribution.
    pub fn ensure_withdrawable(
        &self,
        key: &TipKey,
        tipper: &AccountId,
    ) -> Result<Amount, TipJarError> {
        let contribution = self.contribution(tipper, key);
        if contribution.is_zero() {
            return Err(TipJarError::NoSuchTip {
                tipper: tipper.clone(),
                key: key.clone(),
            });
        }
        self.ensure_unclaimed(key)?;
        Ok(contribution)
    }

    /// Add `amount` to both the pool and the tipper's contribution. Returns the new total.
    pub(crate) fn deposit(
        &mut self,
        key: &TipKey,
        tipper: &AccountId,
        amount: Amount,
        undo: &mut UndoLog,
    ) -> Result<Amount, TipJarError> {
        let previous_account = self.accounts.get(key).cloned();
        let previous_contribution = self
            .contributions
            .get(&(tipper.clone(), key.clone()))
            .copied();

        let total = previous_account
            .as_ref()
            .map(|account| account.total)
            .unwrap_or_default()
            .checked_add(amount)?;
        let contribution = previous_contribution
            .unwrap_or_default()
            .checked_add(amount)?;

        let claimed = previous_account
            .as_ref()
            .map(|account| account.claimed)
            .unwrap_or(false);
        self.accounts
            .insert(key.clone(), TipAccount { total, claimed });
        self.contributions
            .insert((tipper.clone(), key.clone()), contribution);

        undo.push(Undo::Account(key.clone(), previous_account));
        undo.push(Undo::Contribution(
            tipper.clone(),
            key.clone(),
            previous_contribution,
        ));
        Ok(total)
    }

    /// Zero the tipper's contribution and take it out of the pool.
    /// Returns the amount owed to the tipper.
    pub(crate) fn withdraw(
        &mut self,
        key: &TipKey,
        tipper: &AccountId,
        undo: &mut UndoLog,
    ) -> Result<Amount, TipJarError> {
        let contribution = self.ensure_withdrawable(key, tipper)?;
        let previous_account = self.accounts.get(key).cloned();
        let remaining = previous_account
            .as_ref()
            .map(|account| account.total)
            .unwrap_or_default()
            .checked_sub(contribution)?;

        self.accounts.insert(
            key.clone(),
            TipAccount {
                total: remaining,
                claimed: false,
            },
        );
        self.contributions
            .insert((tipper.clone(), key.clone()), Amount::ZERO);

        undo.push(Undo::Account(key.clone(), previous_account));
        undo.push(Undo::Contribution(
            tipper.clone(),
            key.clone(),
            Some(contribution),
        ));
        Ok(contribution)
    }

    /// Flip the key to claimed. Returns the pooled amount now owed to the keeper.
    pub(crate) fn mark_claimed(&mut self, key: &TipKey, undo: &mut UndoLog) -> Amount {
        let previous = self.accounts.get(key).cloned();
        let total = previous
            .as_ref()
            .map(|account| account.total)
            .unwrap_or_default();
        self.accounts.insert(
            key.clone(),
            TipAccount {
                total,
                claimed: true,
            },
        );
        undo.push(Undo::Account(key.clone(), previous));
        total
    }

    pub(crate) fn restore_account(&mut self, key: TipKey, previous: Option<TipAccount>) {
        match previous {
            Some(account) => {
                self.accounts.insert(key, account);
            }
            None => {
                self.accounts.remove(&key);
            }
        }
    }

    pub(crate) fn restore_contribution(
        &mut self,
        tipper: AccountId,
        key: TipKey,
        previous: Option<Amount>,
    ) {
        match previous {
            Some(amount) => {
                self.contributions.insert((tipper, key), amount);
            }
            None => {
                self.contributions.remove(&(tipper, key));
            }
        }
    }
}
