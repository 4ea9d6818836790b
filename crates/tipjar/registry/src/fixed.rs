use std::collections::HashMap;

use parking_lot::RwLock;
use tipjar_types::{AccountId, ContentDigest, ResourceId};

use crate::error::RegistryError;
use crate::traits::ResourceRegistry;

#[derive(Clone, Debug)]
struct FixedResource {
    keeper: AccountId,
    max_content_length: usize,
}

/// Registry for legacy resources whose keeper and length limit never change.
///
/// Keeper and limit are fixed when the resource is declared (typically from
/// configuration). Invocations are still recorded at runtime.
pub struct StaticResourceRegistry {
    resources: HashMap<ResourceId, FixedResource>,
    invocations: RwLock<HashMap<(ResourceId, u64), ContentDigest>>,
}

impl StaticResourceRegistry {
    pub fn new() -> Self {
        Self {
            resources: HashMap::new(),
            invocations: RwLock::new(HashMap::new()),
        }
    }

    /// Declare a fixed resource. Builder-style, consumed before the registry is shared.
    pub fn with_resource(
        mut self,
        resource: ResourceId,
        keeper: AccountId,
        max_content_length: usize,
    ) -> Self {
        self.resources.insert(
            resource,
            FixedResource {
                keeper,
                max_content_length,
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Families covered by the declared resources, for router wiring.
    pub fn families(&self) -> Vec<String> {
        let mut families: Vec<String> = self
            .resources
            .keys()
            .map(|resource| resource.family.clone())
            .collect();
        families.sort();
        families.dedup();
        families
    }

    pub fn record_invocation(
        &self,
        resource: &ResourceId,
        index: u64,
        digest: ContentDigest,
    ) -> Result<(), RegistryError> {
        self.lookup(resource)?;
        self.invocations
            .write()
            .insert((resource.clone(), index), digest);
        Ok(())
    }

    fn lookup(&self, resource: &ResourceId) -> Result<&FixedResource, RegistryError> {
        self.resources
            .get(resource)
            .ok_or_else(|| RegistryError::UnknownResource(resource.clone()))
    }
}

impl Default for StaticResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry for StaticResourceRegistry {
    fn current_keeper(&self, resource: &ResourceId) -> Result<AccountId, RegistryError> {
        Ok(self.lookup(resource)?.keeper.clone())
    }

    fn max_content_length(&self, resource: &ResourceId) -> Result<usize, RegistryError> {
        Ok(self.lookup(resource)?.max_content_length)
    }

    fn was_invoked(
        &self,
        resource: &ResourceId,
        index: u64,
        digest: &ContentDigest,
    ) -> Result<bool, RegistryError> {
        self.lookup(resource)?;
        Ok(self
            .invocations
            .read()
            .get(&(resource.clone(), index))
            == Some(digest))
    }
}
