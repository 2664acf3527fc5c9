//! In-memory project registry with the built-in stream/project catalogue.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use thiserror::Error;

use crate::domain::foundation::ProjectId;
use crate::domain::registry::{BusinessStream, Project};
use crate::ports::ProjectRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate business stream id '{0}'")]
    DuplicateStream(String),

    #[error("duplicate project id '{0}'")]
    DuplicateProject(ProjectId),

    #[error("project {project} references unknown stream '{stream}'")]
    UnknownStream { project: ProjectId, stream: String },

    #[error("could not read registry file {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid registry file: {0}")]
    Parse(String),
}

/// Projects kept in report order: by stream order, then declaration order.
#[derive(Debug, Clone)]
pub struct StaticProjectRegistry {
    streams: Vec<BusinessStream>,
    projects: Vec<Project>,
}

impl StaticProjectRegistry {
    /// Validates ids and stream references, then fixes report order.
    pub fn new(
        mut streams: Vec<BusinessStream>,
        projects: Vec<Project>,
    ) -> Result<Self, RegistryError> {
        let mut stream_ids = HashSet::new();
        for stream in &streams {
            if !stream_ids.insert(stream.id.clone()) {
                return Err(RegistryError::DuplicateStream(stream.id.clone()));
            }
        }

        let mut project_ids = HashSet::new();
        for project in &projects {
            if !project_ids.insert(project.id.clone()) {
                return Err(RegistryError::DuplicateProject(project.id.clone()));
            }
            if !stream_ids.contains(&project.business_stream) {
                return Err(RegistryError::UnknownStream {
                    project: project.id.clone(),
                    stream: project.business_stream.clone(),
                });
            }
        }

        streams.sort_by_key(|s| s.order);
        let mut ordered = Vec::with_capacity(projects.len());
        for stream in &streams {
            ordered.extend(
                projects
                    .iter()
                    .filter(|p| p.business_stream == stream.id)
                    .cloned(),
            );
        }

        Ok(Self {
            streams,
            projects: ordered,
        })
    }

    /// A registry with nothing in it.
    pub fn empty() -> Self {
        Self {
            streams: Vec::new(),
            projects: Vec::new(),
        }
    }

    /// The built-in catalogue.
    pub fn default_registry() -> Self {
        DEFAULT_REGISTRY.clone()
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn stream_name(&self, stream_id: &str) -> Option<&str> {
        self.streams
            .iter()
            .find(|s| s.id == stream_id)
            .map(|s| s.name.as_str())
    }
}

impl ProjectRegistry for StaticProjectRegistry {
    fn resolve(&self, candidate: &str) -> Option<ProjectId> {
        self.projects
            .iter()
            .find(|p| p.matches(candidate))
            .map(|p| p.id.clone())
    }

    fn project(&self, id: &ProjectId) -> Option<Project> {
        self.projects.iter().find(|p| &p.id == id).cloned()
    }

    fn list_active(&self) -> Vec<ProjectId> {
        self.projects
            .iter()
            .filter(|p| p.is_active)
            .map(|p| p.id.clone())
            .collect()
    }

    fn streams(&self) -> Vec<BusinessStream> {
        self.streams.clone()
    }
}

static DEFAULT_REGISTRY: Lazy<StaticProjectRegistry> = Lazy::new(|| {
    let streams = vec![
        BusinessStream::new("affiliates", "Affiliates", 1),
        BusinessStream::new("backbone_bridge", "Backbone Systems / Bridge", 2),
        BusinessStream::new("backbone_platform", "Backbone Systems / Platform Systems", 3),
        BusinessStream::new("backbone_trading", "Backbone Systems / Trading Platform", 4),
        BusinessStream::new("client_engagement", "Client Engagement", 5),
        BusinessStream::new("client_journey", "Client Journey", 6),
        BusinessStream::new("funding", "Funding", 7),
        BusinessStream::new("internal_systems", "Internal Systems", 8),
        BusinessStream::new("mobile", "Mobile", 9),
        BusinessStream::new("www_cfa", "WWW / Client Face Application (CFA)", 10),
    ];

    let catalogue: &[(&str, &str, &str, &[&str])] = &[
        ("affiliate", "Affiliate", "affiliates", &[]),
        ("bridge", "Bridge", "backbone_bridge", &[]),
        ("jthales", "JThales", "backbone_platform", &[]),
        ("jmanager_server_portal", "jManager Server and Portal", "backbone_platform", &["jmanager"]),
        ("symbols_management_service", "Symbols Management Service", "backbone_platform", &[]),
        ("local_depositors_service", "Local Depositors Service", "backbone_platform", &[]),
        ("fees_management_service", "Fees Management Service", "backbone_platform", &[]),
        ("admin_tools_service", "Admin Tools Service", "backbone_platform", &[]),
        ("funding_service", "Funding Service (Not Live)", "backbone_platform", &["funding service"]),
        ("jtools", "JTools", "backbone_platform", &[]),
        ("data_access_layer", "Data Access Layer (DAL)", "backbone_platform", &["dal", "data access layer"]),
        ("metaproxy", "MetaProxy", "backbone_trading", &[]),
        ("plugins", "Plugins", "backbone_trading", &[]),
        ("tsda", "TSDA", "backbone_trading", &[]),
        ("horn", "HORN", "backbone_trading", &[]),
        ("social_trading_copy", "Social Trading - Copy Trading", "client_engagement", &["copy trading"]),
        ("social_trading_competitions", "Social Trading - Competitions", "client_engagement", &["competitions"]),
        ("promotions_tool", "Promotions Tool", "client_engagement", &[]),
        ("client_loyalty_loyalty", "Client Loyalty - Loyalty", "client_engagement", &["loyalty"]),
        ("client_loyalty_bonus", "Client Loyalty - Bonus", "client_engagement", &["bonus"]),
        ("market_intelligence", "Market Intelligence", "client_engagement", &[]),
        ("artificial_intelligence", "Artificial Intelligence (AI)", "client_engagement", &["ai"]),
        ("client_communication", "Client Communication", "client_engagement", &[]),
        ("education", "Education", "client_engagement", &[]),
        ("client_support", "Client Support", "client_journey", &[]),
        ("client_authentication", "Client Authentication", "client_journey", &[]),
        ("client_trading", "Client Trading", "client_journey", &[]),
        ("onboarding_account_mgmt", "Onboarding & Account Management", "client_journey", &["onboarding"]),
        ("realtime_communications", "Realtime Communications", "client_journey", &[]),
        ("payments", "Payments", "funding", &[]),
        ("withdrawals", "Withdrawals", "funding", &[]),
        ("kyc", "KYC", "internal_systems", &[]),
        ("scc", "SCC", "internal_systems", &[]),
        ("crm", "CRM", "internal_systems", &[]),
        ("digital_marketing", "Digital Marketing", "internal_systems", &[]),
        ("mobile_trading_point", "Mobile - XM Trading Point", "mobile", &["xm trading point"]),
        ("angular_core_web", "Angular Core Web", "www_cfa", &[]),
        ("angular_www", "Angular WWW", "www_cfa", &[]),
    ];

    let projects = catalogue
        .iter()
        .filter_map(|(id, name, stream, aliases)| {
            ProjectId::new(id)
                .ok()
                .map(|pid| Project::new(pid, *name, *stream).with_aliases(aliases.iter().copied()))
        })
        .collect();

    StaticProjectRegistry::new(streams, projects).unwrap_or_else(|_| StaticProjectRegistry::empty())
});

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(raw: &str) -> ProjectId {
        ProjectId::new(raw).unwrap()
    }

    #[test]
    fn default_catalogue_is_complete_and_ordered() {
        let registry = StaticProjectRegistry::default_registry();
        let active = registry.list_active();

        assert_eq!(registry.streams().len(), 10);
        assert_eq!(active.len(), 38);
        assert_eq!(active.first(), Some(&pid("affiliate")));
        assert_eq!(active.last(), Some(&pid("angular_www")));
        assert_eq!(registry.stream_name("funding"), Some("Funding"));
    }

    #[test]
    fn resolve_uses_names_and_aliases() {
        let registry = StaticProjectRegistry::default_registry();
        assert_eq!(registry.resolve("DAL"), Some(pid("data_access_layer")));
        assert_eq!(registry.resolve("Client Trading"), Some(pid("client_trading")));
        assert_eq!(registry.resolve("Onboarding & Account Management"), Some(pid("onboarding_account_mgmt")));
        assert_eq!(registry.resolve("unknown thing"), None);
    }

    #[test]
    fn orders_by_stream_then_declaration() {
        let registry = StaticProjectRegistry::new(
            vec![BusinessStream::new("b", "B", 2), BusinessStream::new("a", "A", 1)],
            vec![
                Project::new(pid("in_b"), "In B", "b"),
                Project::new(pid("in_a_1"), "In A 1", "a"),
                Project::new(pid("in_a_2"), "In A 2", "a"),
            ],
        )
        .unwrap();

        assert_eq!(
            registry.list_active(),
            vec![pid("in_a_1"), pid("in_a_2"), pid("in_b")]
        );
    }

    #[test]
    fn inactive_projects_are_resolvable_but_not_listed() {
        let registry = StaticProjectRegistry::new(
            vec![BusinessStream::new("a", "A", 1)],
            vec![
                Project::new(pid("live"), "Live", "a"),
                Project::new(pid("retired"), "Retired", "a").inactive(),
            ],
        )
        .unwrap();

        assert_eq!(registry.list_active(), vec![pid("live")]);
        assert_eq!(registry.resolve("retired"), Some(pid("retired")));
        assert!(!registry.is_active(&pid("retired")));
        assert!(!registry.is_active(&pid("missing")));
    }

    #[test]
    fn rejects_inconsistent_catalogues() {
        let dup_stream = StaticProjectRegistry::new(
            vec![BusinessStream::new("a", "A", 1), BusinessStream::new("a", "A again", 2)],
            vec![],
        );
        assert_eq!(dup_stream.unwrap_err(), RegistryError::DuplicateStream("a".into()));

        let dup_project = StaticProjectRegistry::new(
            vec![BusinessStream::new("a", "A", 1)],
            vec![Project::new(pid("x"), "X", "a"), Project::new(pid("x"), "X2", "a")],
        );
        assert_eq!(dup_project.unwrap_err(), RegistryError::DuplicateProject(pid("x")));

        let orphan = StaticProjectRegistry::new(
            vec![BusinessStream::new("a", "A", 1)],
            vec![Project::new(pid("x"), "X", "nowhere")],
        );
        assert!(matches!(orphan.unwrap_err(), RegistryError::UnknownStream { .. }));
    }

    #[test]
    fn empty_registry_reports_empty() {
        assert!(StaticProjectRegistry::empty().is_empty());
        assert!(!StaticProjectRegistry::default_registry().is_empty());
    }
}
