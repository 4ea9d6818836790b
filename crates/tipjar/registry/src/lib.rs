//! Resource Registry: the external capability the ledger consults about resources.
//!
//! The ledger never decides who controls a resource, how long a suggestion for it
//! may be, or whether a suggestion was acted upon. It asks a [`ResourceRegistry`].
//! One adapter exists per resource family; [`RegistryRouter`] picks the adapter by
//! [`ResourceId::family`](tipjar_types::ResourceId).
//!
//! Legacy resources with a fixed keeper and a fixed length limit are served by
//! [`StaticResourceRegistry`] behind the same trait, so core logic carries no
//! special cases.

pub mod error;
pub mod fixed;
pub mod memory;
pub mod router;
pub mod traits;

pub use error::RegistryError;
pub use fixed::StaticResourceRegistry;
pub use memory::InMemoryRegistry;
pub use router::RegistryRouter;
pub use traits::ResourceRegistry;
