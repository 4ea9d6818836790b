//! Core type definitions for the TipJar escrow ledger.
//!
//! This crate provides the shared vocabulary only. No business logic lives here;
//! the registry and ledger crates both depend on it.

pub mod amount;
pub mod event;
pub mod ids;
pub mod records;
pub mod temporal;

pub use amount::{Amount, AmountError};
pub use event::TipJarEvent;
pub use ids::{AccountId, ContentDigest, ResourceId};
pub use records::{BlockWindow, ContentRecord, SuggestionState, TipAccount, TipKey};
pub use temporal::{Timestamp, BLOCK_PERIOD, COOLDOWN_PERIOD};
