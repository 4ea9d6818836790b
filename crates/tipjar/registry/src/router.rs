use std::collections::HashMap;
use std::sync::Arc;

use tipjar_types::{AccountId, ContentDigest, ResourceId};
use tracing::debug;

use crate::error::RegistryError;
use crate::traits::ResourceRegistry;

/// Routes registry queries to the adapter responsible for a resource family.
pub struct RegistryRouter {
    families: HashMap<String, Arc<dyn ResourceRegistry>>,
}

impl RegistryRouter {
    pub fn new() -> Self {
        Self {
            families: HashMap::new(),
        }
    }

    /// Mount an adapter for a family. A later mount for the same family replaces it.
    pub fn mount(&mut self, family: impl Into<String>, registry: Arc<dyn ResourceRegistry>) {
        let family = family.into();
        debug!(family = %family, "Registry adapter mounted");
        self.families.insert(family, registry);
    }

    /// Builder-style [`RegistryRouter::mount`].
    pub fn with_family(
        mut self,
        family: impl Into<String>,
        registry: Arc<dyn ResourceRegistry>,
    ) -> Self {
        self.mount(family, registry);
        self
    }

    pub fn families(&self) -> Vec<&str> {
        let mut families: Vec<&str> = self.families.keys().map(String::as_str).collect();
        families.sort();
        families
    }

    fn adapter(&self, resource: &ResourceId) -> Result<&Arc<dyn ResourceRegistry>, RegistryError> {
        self.families
            .get(&resource.family)
            .ok_or_else(|| RegistryError::UnknownFamily(resource.family.clone()))
    }
}

impl Default for RegistryRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry for RegistryRouter {
    fn current_keeper(&self, resource: &ResourceId) -> Result<AccountId, RegistryError> {
        self.adapter(resource)?.current_keeper(resource)
    }

    fn max_content_length(&self, resource: &ResourceId) -> Result<usize, RegistryError> {
        self.adapter(resource)?.max_content_length(resource)
    }

    fn was_invoked(
        &self,
        resource: &ResourceId,
        index: u64,
        digest: &ContentDigest,
    ) -> Result<bool, RegistryError> {
        self.adapter(resource)?.was_invoked(resource, index, digest)
    }
}
