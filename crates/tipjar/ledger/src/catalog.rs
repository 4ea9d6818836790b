//! Invocation Catalog: write-once store of suggested texts keyed by digest.

use std::collections::HashMap;

use tipjar_types::{ContentDigest, ContentRecord, ResourceId};

use crate::error::TipJarError;
use crate::state::{Undo, UndoLog};

#[derive(Debug, Default)]
pub struct InvocationCatalog {
    records: HashMap<ContentDigest, ContentRecord>,
}

impl InvocationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, digest: &ContentDigest) -> Option<&ContentRecord> {
        self.records.get(digest)
    }

    pub fn contains(&self, digest: &ContentDigest) -> bool {
        self.records.contains_key(digest)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ensure_unsuggested(&self, digest: &ContentDigest) -> Result<(), TipJarError> {
        if self.contains(digest) {
            return Err(TipJarError::AlreadySuggested(*digest));
        }
        Ok(())
    }

    pub(crate) fn insert(
        &mut self,
        record: ContentRecord,
        undo: &mut UndoLog,
    ) -> Result<(), TipJarError> {
        self.ensure_unsuggested(&record.digest)?;
        let digest = record.digest;
        self.records.insert(digest, record);
        undo.push(Undo::ContentInserted(digest));
        Ok(())
    }

    pub(crate) fn remove(&mut self, digest: &ContentDigest) {
        self.records.remove(digest);
    }
}

/// Reject text longer than the resource's limit.
pub fn check_length(resource: &ResourceId, length: usize, max: usize) -> Result<(), TipJarError> {
    if length > max {
        return Err(TipJarError::ContentTooLong {
            resource: resource.clone(),
            length,
            max,
        });
    }
    Ok(())
}
