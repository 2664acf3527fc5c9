use serde::{Deserialize, Serialize};

use crate::domain::foundation::{normalize_key, ProjectId};

/// A business stream grouping several projects in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessStream {
    pub id: String,
    pub name: String,
    /// Position of the stream in report output.
    pub order: u32,
}

impl BusinessStream {
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
        }
    }
}

/// A project that submits monthly QA status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub business_stream: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Project {
    pub fn new(id: ProjectId, name: impl Into<String>, business_stream: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            business_stream: business_stream.into(),
            aliases: Vec::new(),
            is_active: true,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Whether `candidate` names this project by id, display name or alias.
    ///
    /// Underscores and spaces are treated alike so "client trading" finds
    /// `client_trading`.
    pub fn matches(&self, candidate: &str) -> bool {
        let wanted = loose_key(candidate);
        if wanted.is_empty() {
            return false;
        }
        loose_key(self.id.as_str()) == wanted
            || loose_key(&self.name) == wanted
            || self.aliases.iter().any(|alias| loose_key(alias) == wanted)
    }
}

fn loose_key(raw: &str) -> String {
    normalize_key(&raw.replace(['_', '-'], " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payments() -> Project {
        Project::new(ProjectId::new("payments").unwrap(), "Payments", "funding")
            .with_aliases(["pay", "Payment Gateway"])
    }

    #[test]
    fn matches_by_id_name_and_alias() {
        let project = payments();
        assert!(project.matches("PAYMENTS"));
        assert!(project.matches("  payments "));
        assert!(project.matches("payment gateway"));
        assert!(project.matches("Pay"));
        assert!(!project.matches("withdrawals"));
        assert!(!project.matches(""));
    }

    #[test]
    fn matches_treats_underscores_as_spaces() {
        let project = Project::new(
            ProjectId::new("client_trading").unwrap(),
            "Client Trading",
            "client_journey",
        );
        assert!(project.matches("client trading"));
        assert!(project.matches("client-trading"));
    }

    #[test]
    fn projects_are_active_by_default() {
        assert!(payments().is_active);
        assert!(!payments().inactive().is_active);
    }
}
