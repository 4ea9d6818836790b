use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tipjar_types::{AccountId, Amount, AmountError};
use tracing::debug;

/// Errors from the external payout rail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("payout of {amount} to {to} rejected: {reason}")]
    Rejected {
        to: AccountId,
        amount: Amount,
        reason: String,
    },

    #[error("payout rail unavailable: {0}")]
    Unavailable(String),
}

/// Outbound funds movement. Called only after the ledger has applied its own
/// state changes, and may call back into the ledger.
pub trait FundsTransfer: Send + Sync {
    fn transfer(&self, to: &AccountId, amount: Amount) -> Result<(), TransferError>;
}

/// One completed payout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub to: AccountId,
    pub amount: Amount,
}

/// In-memory payout rail that credits balances and keeps a payout log.
pub struct InMemoryTreasury {
    balances: Mutex<HashMap<AccountId, Amount>>,
    payouts: Mutex<Vec<Payout>>,
    rejecting: AtomicBool,
}

impl InMemoryTreasury {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            payouts: Mutex::new(Vec::new()),
            rejecting: AtomicBool::new(false),
        }
    }

    /// Make every following payout fail (or succeed again).
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances
            .lock()
            .get(account)
            .copied()
            .unwrap_or_default()
    }

    pub fn payouts(&self) -> Vec<Payout> {
        self.payouts.lock().clone()
    }

    pub fn total_paid(&self) -> Result<Amount, AmountError> {
        Amount::checked_sum(self.payouts.lock().iter().map(|p| p.amount))
    }
}

impl Default for InMemoryTreasury {
    fn default() -> Self {
        Self::new()
    }
}

impl FundsTransfer for InMemoryTreasury {
    fn transfer(&self, to: &AccountId, amount: Amount) -> Result<(), TransferError> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(TransferError::Rejected {
                to: to.clone(),
                amount,
                reason: "treasury is rejecting payouts".into(),
            });
        }

        {
            let mut balances = self.balances.lock();
            let balance = balances.entry(to.clone()).or_default();
            *balance = balance.checked_add(amount).map_err(|err| TransferError::Rejected {
                to: to.clone(),
                amount,
                reason: err.to_string(),
            })?;
        }
        self.payouts.lock().push(Payout {
            to: to.clone(),
            amount,
        });

        debug!(to = %to, amount = amount.0, "Payout credited");
        Ok(())
    }
}
