use serde::{Deserialize, Serialize};
use tipjar_types::{TipJarEvent, Timestamp};
use tracing::{debug, warn};

/// One committed audit event with its position in the hash chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    pub recorded_at: Timestamp,
    pub event: TipJarEvent,
    /// BLAKE3 over (previous entry hash, seq, timestamp, serialized event).
    pub entry_hash: [u8; 32],
}

/// Append-only audit trail of ledger events.
///
/// Entries are chained by hash so a rewritten history no longer verifies.
#[derive(Debug, Default)]
pub struct EventJournal {
    entries: Vec<JournalEntry>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, recorded_at: Timestamp, event: TipJarEvent) -> &JournalEntry {
        let seq = self.entries.len() as u64;
        let entry_hash = chain_hash(self.head_hash(), seq, recorded_at, &event);

        debug!(
            seq,
            event = event.name(),
            resource = %event.resource(),
            digest = %event.digest().short(),
            "Event appended"
        );

        self.entries.push(JournalEntry {
            seq,
            recorded_at,
            event,
            entry_hash,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Drop the newest entry. Only used when rolling back an uncommitted operation.
    pub(crate) fn pop(&mut self) {
        self.entries.pop();
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hash of the newest entry, or all zeroes for an empty journal.
    pub fn head_hash(&self) -> [u8; 32] {
        self.entries
            .last()
            .map(|entry| entry.entry_hash)
            .unwrap_or([0u8; 32])
    }

    /// Recompute the chain and compare it against the stored hashes.
    pub fn verify_chain(&self) -> bool {
        verify_entries(&self.entries)
    }
}

/// Verify a detached slice of entries, e.g. one exported from [`EventJournal::entries`].
pub fn verify_entries(entries: &[JournalEntry]) -> bool {
    let mut previous = [0u8; 32];
    for (position, entry) in entries.iter().enumerate() {
        if entry.seq != position as u64 {
            return false;
        }
        if chain_hash(previous, entry.seq, entry.recorded_at, &entry.event) != entry.entry_hash {
            return false;
        }
        previous = entry.entry_hash;
    }
    true
}

fn chain_hash(previous: [u8; 32], seq: u64, at: Timestamp, event: &TipJarEvent) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"tipjar-journal-v1:");
    hasher.update(&previous);
    hasher.update(&seq.to_le_bytes());
    hasher.update(&at.0.to_le_bytes());
    hasher.update(&event_bytes(event));
    *hasher.finalize().as_bytes()
}

/// Canonical bytes of an event. JSON when it serializes, the `Debug` form
/// otherwise, so the hash always covers the event.
fn event_bytes(event: &TipJarEvent) -> Vec<u8> {
    match serde_json::to_vec(event) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(event = event.name(), error = %err, "Event not serializable, hashing debug form");
            format!("{event:?}").into_bytes()
        }
    }
}
