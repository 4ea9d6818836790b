use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, ContentDigest, ResourceId, Timestamp};

/// Ledger key: one suggested content pooled against one resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TipKey {
    pub resource: ResourceId,
    pub digest: ContentDigest,
}

impl TipKey {
    pub fn new(resource: ResourceId, digest: ContentDigest) -> Self {
        Self { resource, digest }
    }
}

impl std::fmt::Display for TipKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.resource, self.digest.short())
    }
}

/// A suggested text. Write-once: created on first suggestion, never mutated.
///
/// The record is keyed by digest alone. `suggested_for` remembers which
/// resource's length limit the text was validated against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub digest: ContentDigest,
    pub text: String,
    pub suggested_for: ResourceId,
    pub suggested_by: AccountId,
    pub recorded_at: Timestamp,
}

impl ContentRecord {
    /// Length used for max-length checks: UTF-8 byte length.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Pooled tips for one [`TipKey`].
///
/// While `claimed` is false, `total` equals the sum of every contribution on the key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipAccount {
    pub total: Amount,
    pub claimed: bool,
}

/// Keeper-initiated freeze of tipping and withdrawal on one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockWindow {
    pub blocked_until: Timestamp,
}

impl BlockWindow {
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.blocked_until > now
    }
}

/// Lifecycle of a key, derived on read. `Blocked` lapses back to `Active`
/// on its own once `until` has passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionState {
    Unsuggested,
    Active,
    Blocked { until: Timestamp },
    Claimed,
}

impl SuggestionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SuggestionState::Claimed)
    }
}
