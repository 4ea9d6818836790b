use tipjar_types::{AccountId, ContentDigest, ResourceId};

use crate::error::RegistryError;

/// Trait for resolving facts about a resource.
///
/// Implementations may call back into the ledger; the ledger only invokes these
/// methods when no internal borrow is held.
pub trait ResourceRegistry: Send + Sync {
    /// Identity currently in control of the resource. Resolved fresh on every call.
    fn current_keeper(&self, resource: &ResourceId) -> Result<AccountId, RegistryError>;

    /// Maximum accepted suggestion length for the resource, in UTF-8 bytes.
    fn max_content_length(&self, resource: &ResourceId) -> Result<usize, RegistryError>;

    /// Whether the suggestion with `digest` was acted upon at `index` for the resource.
    fn was_invoked(
        &self,
        resource: &ResourceId,
        index: u64,
        digest: &ContentDigest,
    ) -> Result<bool, RegistryError>;
}
