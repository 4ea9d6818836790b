use std::collections::HashMap;

use parking_lot::RwLock;
use tipjar_types::{AccountId, ContentDigest, ResourceId};
use tracing::debug;

use crate::error::RegistryError;
use crate::traits::ResourceRegistry;

#[derive(Clone, Debug)]
struct ResourceEntry {
    keeper: Option<AccountId>,
    max_content_length: usize,
    invocations: HashMap<u64, ContentDigest>,
}

/// Mutable in-memory registry for one resource family.
///
/// Keepers can change hands at any time, which is what makes fresh keeper
/// resolution at claim time observable.
pub struct InMemoryRegistry {
    resources: RwLock<HashMap<ResourceId, ResourceEntry>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(HashMap::new()),
        }
    }

    /// Register (or re-register) a resource with its keeper and length limit.
    pub fn register(&self, resource: ResourceId, keeper: AccountId, max_content_length: usize) {
        debug!(resource = %resource, keeper = %keeper, max_content_length, "Resource registered");
        self.resources.write().insert(
            resource,
            ResourceEntry {
                keeper: Some(keeper),
                max_content_length,
                invocations: HashMap::new(),
            },
        );
    }

    /// Hand control of a resource to a new keeper.
    pub fn transfer_keeper(
        &self,
        resource: &ResourceId,
        keeper: AccountId,
    ) -> Result<(), RegistryError> {
        let mut resources = self.resources.write();
        let entry = resources
            .get_mut(resource)
            .ok_or_else(|| RegistryError::UnknownResource(resource.clone()))?;
        debug!(resource = %resource, keeper = %keeper, "Keeper transferred");
        entry.keeper = Some(keeper);
        Ok(())
    }

    /// Leave a resource without a keeper (e.g. burned or escrowed elsewhere).
    pub fn clear_keeper(&self, resource: &ResourceId) -> Result<(), RegistryError> {
        let mut resources = self.resources.write();
        let entry = resources
            .get_mut(resource)
            .ok_or_else(|| RegistryError::UnknownResource(resource.clone()))?;
        entry.keeper = None;
        Ok(())
    }

    pub fn set_max_content_length(
        &self,
        resource: &ResourceId,
        max_content_length: usize,
    ) -> Result<(), RegistryError> {
        let mut resources = self.resources.write();
        let entry = resources
            .get_mut(resource)
            .ok_or_else(|| RegistryError::UnknownResource(resource.clone()))?;
        entry.max_content_length = max_content_length;
        Ok(())
    }

    /// Record that the resource acted on `digest` at `index`.
    pub fn record_invocation(
        &self,
        resource: &ResourceId,
        index: u64,
        digest: ContentDigest,
    ) -> Result<(), RegistryError> {
        let mut resources = self.resources.write();
        let entry = resources
            .get_mut(resource)
            .ok_or_else(|| RegistryError::UnknownResource(resource.clone()))?;
        debug!(resource = %resource, index, digest = %digest.short(), "Invocation recorded");
        entry.invocations.insert(index, digest);
        Ok(())
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry for InMemoryRegistry {
    fn current_keeper(&self, resource: &ResourceId) -> Result<AccountId, RegistryError> {
        let resources = self.resources.read();
        let entry = resources
            .get(resource)
            .ok_or_else(|| RegistryError::UnknownResource(resource.clone()))?;
        entry
            .keeper
            .clone()
            .ok_or_else(|| RegistryError::NoKeeper(resource.clone()))
    }

    fn max_content_length(&self, resource: &ResourceId) -> Result<usize, RegistryError> {
        self.resources
            .read()
            .get(resource)
            .map(|entry| entry.max_content_length)
            .ok_or_else(|| RegistryError::UnknownResource(resource.clone()))
    }

    fn was_invoked(
        &self,
        resource: &ResourceId,
        index: u64,
        digest: &ContentDigest,
    ) -> Result<bool, RegistryError> {
        let resources = self.resources.read();
        let entry = resources
            .get(resource)
            .ok_or_else(|| RegistryError::UnknownResource(resource.clone()))?;
        Ok(entry.invocations.get(&index) == Some(digest))
    }
}
