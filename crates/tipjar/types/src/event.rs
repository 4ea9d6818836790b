use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, ContentDigest, ResourceId, Timestamp};

/// Audit events. The journal of these is the only history the ledger keeps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TipJarEvent {
    SuggestionRecorded {
        resource: ResourceId,
        digest: ContentDigest,
        suggester: AccountId,
        text: String,
    },
    TipRecorded {
        resource: ResourceId,
        digest: ContentDigest,
        tipper: AccountId,
        amount: Amount,
    },
    TipsClaimed {
        resource: ResourceId,
        digest: ContentDigest,
        amount: Amount,
    },
    TipWithdrawn {
        resource: ResourceId,
        digest: ContentDigest,
        tipper: AccountId,
        amount: Amount,
    },
    WithdrawalsBlocked {
        resource: ResourceId,
        digest: ContentDigest,
        blocked_until: Timestamp,
    },
}

impl TipJarEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TipJarEvent::SuggestionRecorded { .. } => "SuggestionRecorded",
            TipJarEvent::TipRecorded { .. } => "TipRecorded",
            TipJarEvent::TipsClaimed { .. } => "TipsClaimed",
            TipJarEvent::TipWithdrawn { .. } => "TipWithdrawn",
            TipJarEvent::WithdrawalsBlocked { .. } => "WithdrawalsBlocked",
        }
    }

    pub fn resource(&self) -> &ResourceId {
        match self {
            TipJarEvent::SuggestionRecorded { resource, .. }
            | TipJarEvent::TipRecorded { resource, .. }
            | TipJarEvent::TipsClaimed { resource, .. }
            | TipJarEvent::TipWithdrawn { resource, .. }
            | TipJarEvent::WithdrawalsBlocked { resource, .. } => resource,
        }
    }

    pub fn digest(&self) -> &ContentDigest {
        match self {
            TipJarEvent::SuggestionRecorded { digest, .. }
            | TipJarEvent::TipRecorded { digest, .. }
            | TipJarEvent::TipsClaimed { digest, .. }
            | TipJarEvent::TipWithdrawn { digest, .. }
            | TipJarEvent::WithdrawalsBlocked { digest, .. } => digest,
        }
    }
}
