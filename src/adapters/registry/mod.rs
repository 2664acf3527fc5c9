//! Project registry adapters.

mod static_registry;
mod yaml_loader;

pub use static_registry::{RegistryError, StaticProjectRegistry};
pub use yaml_loader::{load_registry, parse_registry};
