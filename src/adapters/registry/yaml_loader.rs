//! Registry loading from a YAML catalogue.
//!
//! ```yaml
//! streams:
//!   - id: funding
//!     name: Funding
//!     order: 7
//!     projects:
//!       - id: payments
//!         name: Payments
//!         aliases: [pay]
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::info;

use super::static_registry::{RegistryError, StaticProjectRegistry};
use crate::domain::foundation::ProjectId;
use crate::domain::registry::{BusinessStream, Project};

#[derive(Debug, Deserialize)]
struct RegistryFile {
    streams: Vec<StreamEntry>,
}

#[derive(Debug, Deserialize)]
struct StreamEntry {
    id: String,
    name: String,
    /// Falls back to position in the file.
    #[serde(default)]
    order: Option<u32>,
    #[serde(default)]
    projects: Vec<ProjectEntry>,
}

#[derive(Debug, Deserialize)]
struct ProjectEntry {
    id: String,
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default = "default_active")]
    is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Parses a YAML catalogue.
pub fn parse_registry(yaml: &str) -> Result<StaticProjectRegistry, RegistryError> {
    let file: RegistryFile =
        serde_yaml::from_str(yaml).map_err(|e| RegistryError::Parse(e.to_string()))?;

    let mut streams = Vec::with_capacity(file.streams.len());
    let mut projects = Vec::new();

    for (index, entry) in file.streams.into_iter().enumerate() {
        let order = entry.order.unwrap_or(index as u32 + 1);
        for p in entry.projects {
            let id = ProjectId::new(&p.id).map_err(|e| RegistryError::Parse(e.to_string()))?;
            let mut project = Project::new(id, p.name, entry.id.clone()).with_aliases(p.aliases);
            if !p.is_active {
                project = project.inactive();
            }
            projects.push(project);
        }
        streams.push(BusinessStream::new(entry.id, entry.name, order));
    }

    StaticProjectRegistry::new(streams, projects)
}

/// Reads and parses a YAML catalogue from disk.
pub fn load_registry(path: &Path) -> Result<StaticProjectRegistry, RegistryError> {
    let raw = std::fs::read_to_string(path).map_err(|e| RegistryError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let registry = parse_registry(&raw)?;
    info!(
        path = %path.display(),
        projects = registry.projects().len(),
        "loaded project registry"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ProjectRegistry;
    use std::io::Write;

    const CATALOGUE: &str = r#"
streams:
  - id: funding
    name: Funding
    order: 2
    projects:
      - id: payments
        name: Payments
        aliases: [pay]
      - id: old_payments
        name: Old Payments
        is_active: false
  - id: mobile
    name: Mobile
    order: 1
    projects:
      - id: Mobile App
        name: Mobile App
"#;

    #[test]
    fn parses_streams_projects_and_flags() {
        let registry = parse_registry(CATALOGUE).unwrap();

        let active: Vec<String> = registry.list_active().iter().map(|p| p.to_string()).collect();
        assert_eq!(active, vec!["mobile app", "payments"]);
        assert_eq!(registry.resolve("pay").map(|p| p.to_string()), Some("payments".into()));
        assert!(!registry.is_active(&ProjectId::new("old_payments").unwrap()));
    }

    #[test]
    fn missing_order_uses_position() {
        let registry = parse_registry(
            "streams:\n  - id: a\n    name: A\n  - id: b\n    name: B\n",
        )
        .unwrap();
        let orders: Vec<u32> = registry.streams().iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[test]
    fn duplicate_project_is_rejected() {
        let yaml = "streams:\n  - id: a\n    name: A\n    projects:\n      - {id: x, name: X}\n      - {id: x, name: Y}\n";
        assert!(matches!(parse_registry(yaml), Err(RegistryError::DuplicateProject(_))));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        assert!(matches!(parse_registry("streams: 3"), Err(RegistryError::Parse(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOGUE.as_bytes()).unwrap();

        let registry = load_registry(file.path()).unwrap();
        assert_eq!(registry.projects().len(), 3);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_registry(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
    }
}
