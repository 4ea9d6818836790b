use thiserror::Error;
use tipjar_registry::RegistryError;
use tipjar_types::{AccountId, Amount, AmountError, ContentDigest, ResourceId, TipKey, Timestamp};

use crate::transfer::TransferError;

/// Errors from ledger operations.
///
/// Every operation is all-or-nothing: when one of these is returned, no state
/// change and no event from that call remains.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TipJarError {
    // --- Validation ---
    #[error("content digest must not be the zero sentinel")]
    ZeroHash,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("content too long for {resource}: {length} bytes exceeds limit of {max}")]
    ContentTooLong {
        resource: ResourceId,
        length: usize,
        max: usize,
    },

    #[error("content already suggested: {0}")]
    AlreadySuggested(ContentDigest),

    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] AmountError),

    // --- State ---
    #[error("tips already claimed for {0}")]
    AlreadyClaimed(TipKey),

    #[error("nothing to claim for {0}")]
    NothingToClaim(TipKey),

    #[error("pooled amount {total} is below required minimum {minimum}")]
    MinimumUnmet { total: Amount, minimum: Amount },

    #[error("payout of {amount} to {to} refused: another operation is already paying out")]
    NestedPayout { to: AccountId, amount: Amount },

    // --- Authorization ---
    #[error("{caller} is not the current keeper of {resource}")]
    NotKeeper {
        caller: AccountId,
        resource: ResourceId,
    },

    // --- Timing ---
    #[error("tipping and withdrawal blocked on {key} until {until}")]
    WindowBlocked { key: TipKey, until: Timestamp },

    #[error("block cooldown pending on {key} until {ready_at}")]
    CooldownPending { key: TipKey, ready_at: Timestamp },

    // --- Not found ---
    #[error("no content recorded for digest {0}")]
    ContentNotFound(ContentDigest),

    #[error("no tip from {tipper} on {key}")]
    NoSuchTip { tipper: AccountId, key: TipKey },

    #[error("suggestion {digest} not confirmed at index {index} for {resource}")]
    NotSuggested {
        resource: ResourceId,
        digest: ContentDigest,
        index: u64,
    },

    // --- External collaborators ---
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),
}

/// Coarse classification of [`TipJarError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    State,
    Authorization,
    Timing,
    NotFound,
    External,
}

impl TipJarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TipJarError::ZeroHash
            | TipJarError::ZeroAmount
            | TipJarError::ContentTooLong { .. }
            | TipJarError::AlreadySuggested(_)
            | TipJarError::Arithmetic(_) => ErrorKind::Validation,
            TipJarError::AlreadyClaimed(_)
            | TipJarError::NothingToClaim(_)
            | TipJarError::MinimumUnmet { .. }
            | TipJarError::NestedPayout { .. } => ErrorKind::State,
            TipJarError::NotKeeper { .. } => ErrorKind::Authorization,
            TipJarError::WindowBlocked { .. } | TipJarError::CooldownPending { .. } => {
                ErrorKind::Timing
            }
            TipJarError::ContentNotFound(_)
            | TipJarError::NoSuchTip { .. }
            | TipJarError::NotSuggested { .. } => ErrorKind::NotFound,
            TipJarError::Registry(_) | TipJarError::Transfer(_) => ErrorKind::External,
        }
    }

    /// Whether retrying later, with nothing else changed, could succeed.
    pub fn is_timing(&self) -> bool {
        self.kind() == ErrorKind::Timing
    }
}

/// Errors from loading configuration or installing the tracing subscriber.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("tracing subscriber error: {0}")]
    Telemetry(String),
}
