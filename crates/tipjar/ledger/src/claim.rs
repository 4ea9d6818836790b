//! Claim Gate: one-shot release of a key's pool to the resource's current keeper.

use serde::{Deserialize, Serialize};
use tipjar_types::{AccountId, Amount, ContentDigest, ResourceId, TipKey, Timestamp};
use tracing::debug;

use crate::error::TipJarError;
use crate::lock::WithdrawalLock;
use crate::tips::TipLedger;

/// What a successful claim paid, and to whom.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub resource: ResourceId,
    pub digest: ContentDigest,
    pub invocation_index: u64,
    pub keeper: AccountId,
    pub amount: Amount,
    pub claimed_at: Timestamp,
}

/// Internal checks a claim must pass before any external call, in order:
/// not yet claimed, something pooled, pool at least `minimum`, no active
/// block window. Returns the pooled amount.
pub fn check_claimable(
    tips: &TipLedger,
    locks: &WithdrawalLock,
    key: &TipKey,
    minimum: Amount,
    now: Timestamp,
) -> Result<Amount, TipJarError> {
    tips.ensure_unclaimed(key)?;

    let total = tips.total(key);
    if total.is_zero() {
        return Err(TipJarError::NothingToClaim(key.clone()));
    }
    if total < minimum {
        return Err(TipJarError::MinimumUnmet { total, minimum });
    }

    // A keeper must not be able to freeze withdrawals and claim inside the freeze.
    locks.ensure_open(key, now)?;

    debug!(key = %key, total = total.0, minimum = minimum.0, "Claim checks passed");
    Ok(total)
}
