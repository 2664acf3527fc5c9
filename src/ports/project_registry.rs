//! ProjectRegistry port - the set of projects that report, grouped into
//! business streams.
//!
//! Reads are synchronous: registries are loaded once at startup and held
//! in memory.

use crate::domain::foundation::ProjectId;
use crate::domain::registry::{BusinessStream, Project};

/// Port for project lookups.
pub trait ProjectRegistry: Send + Sync {
    /// Resolves a free-form name, id or alias to a known project id.
    fn resolve(&self, candidate: &str) -> Option<ProjectId>;

    /// Full record for a project id.
    fn project(&self, id: &ProjectId) -> Option<Project>;

    /// Active project ids in stable report order.
    fn list_active(&self) -> Vec<ProjectId>;

    /// Business streams in display order.
    fn streams(&self) -> Vec<BusinessStream>;

    fn is_active(&self, id: &ProjectId) -> bool {
        self.project(id).map(|p| p.is_active).unwrap_or(false)
    }

    fn is_empty(&self) -> bool {
        self.list_active().is_empty()
    }
}
