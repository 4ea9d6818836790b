#![allow(dead_code)]

use std::sync::Arc;

use tipjar_ledger::types::{AccountId, ResourceId, Timestamp};
use tipjar_ledger::registry::InMemoryRegistry;
use tipjar_ledger::{InMemoryTreasury, ManualClock, TipJar};

pub const START: Timestamp = Timestamp(1_700_000_000);
pub const MAX_LEN: usize = 64;

/// A ledger wired to in-memory collaborators, with handles kept for assertions.
pub struct Fixture {
    pub jar: TipJar,
    pub registry: Arc<InMemoryRegistry>,
    pub treasury: Arc<InMemoryTreasury>,
    pub clock: Arc<ManualClock>,
}

impl Fixture {
    pub fn new() -> Self {
        let registry = Arc::new(InMemoryRegistry::new());
        registry.register(resource(), keeper(), MAX_LEN);
        let treasury = Arc::new(InMemoryTreasury::new());
        let clock = Arc::new(ManualClock::new(START));
        let jar = TipJar::new(registry.clone(), treasury.clone(), clock.clone());
        Self {
            jar,
            registry,
            treasury,
            clock,
        }
    }
}

pub fn resource() -> ResourceId {
    ResourceId::new("punks", "7804")
}

pub fn keeper() -> AccountId {
    AccountId::new("keeper")
}

pub fn alice() -> AccountId {
    AccountId::new("alice")
}

pub fn bob() -> AccountId {
    AccountId::new("bob")
}
