//! TipJar escrow ledger.
//!
//! Third parties suggest content for a resource's keeper to act on and pool
//! tips toward a specific suggestion. The keeper collects the pool once the
//! registry confirms the suggestion was acted upon, and may briefly freeze a
//! disputed suggestion.
//!
//! Four components share one serialized state:
//!
//! - [`InvocationCatalog`]: suggested content keyed by digest
//! - [`TipLedger`]: per-key pools and per-tipper contributions
//! - [`check_claimable`] and [`TipJar::claim`]: one-shot release to the keeper
//! - [`WithdrawalLock`]: keeper freeze windows with a cooldown
//!
//! [`TipJar`] is the entry point. Who controls a resource and whether a
//! suggestion was acted upon are answered by a
//! [`ResourceRegistry`](tipjar_registry::ResourceRegistry); funds leave through
//! a [`FundsTransfer`].

pub mod catalog;
pub mod claim;
pub mod clock;
pub mod config;
pub mod error;
pub mod journal;
pub mod lock;
mod state;
pub mod telemetry;
pub mod tipjar;
pub mod tips;
pub mod transfer;

pub use catalog::{check_length, InvocationCatalog};
pub use claim::{check_claimable, ClaimReceipt};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LoggingConfig, StaticResourceConfig, TipJarConfig};
pub use error::{ConfigError, ErrorKind, TipJarError};
pub use journal::{verify_entries, EventJournal, JournalEntry};
pub use lock::WithdrawalLock;
pub use telemetry::init_tracing;
pub use tipjar::TipJar;
pub use tips::TipLedger;
pub use transfer::{FundsTransfer, InMemoryTreasury, Payout, TransferError};

pub use tipjar_registry as registry;
pub use tipjar_types as types;
