use thiserror::Error;
use tipjar_types::ResourceId;

/// Errors reported by a Resource Registry adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("resource not known to registry: {0}")]
    UnknownResource(ResourceId),

    #[error("no registry adapter for resource family: {0}")]
    UnknownFamily(String),

    #[error("resource has no current keeper: {0}")]
    NoKeeper(ResourceId),

    #[error("registry unavailable: {0}")]
    Unavailable(String),
}
