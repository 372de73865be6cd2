//! ProjectManager API models.

use pm_core::ids::{ProjectId, TaskId, UserId};
use pm_core::query::QueryParams;
use serde::{Deserialize, Serialize};

/// Profile of the signed-in user, as returned by `api/data/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Full display name.
    pub full_name: String,
    /// Email address used to sign in.
    pub email_address: String,
    /// Resource identifier of the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Security role within the workspace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    /// Name of the workspace the token belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_space_name: Option<String>,
    /// IANA time zone of the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// A task within a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    /// Short human-readable identifier (e.g. `T-12`).
    #[serde(default)]
    pub short_id: String,
    /// Task name.
    #[serde(default)]
    pub name: String,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// Work breakdown structure code (e.g. `1.2.3`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wbs: Option<String>,
    /// Completion percentage, 0 to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<u32>,
    /// Markdown description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project identifier.
    pub id: ProjectId,
    /// Short human-readable identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    /// Project name.
    pub name: String,
    /// Markdown description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Project {
    /// Returns true if `identifier` is this project's id, short id or
    /// (case-insensitively) name.
    #[must_use]
    pub fn matches(&self, identifier: &str) -> bool {
        self.short_id.as_deref() == Some(identifier)
            || self.name.eq_ignore_ascii_case(identifier)
            || self.id.to_string().eq_ignore_ascii_case(identifier)
    }
}

/// OData system query options accepted by collection endpoints.
///
/// All options are optional; the default query fetches everything the API
/// returns on its first page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ODataQuery {
    /// `$top`: maximum number of records.
    pub top: Option<u32>,
    /// `$skip`: records to skip.
    pub skip: Option<u32>,
    /// `$filter`: filter expression.
    pub filter: Option<String>,
    /// `$select`: comma-separated field list.
    pub select: Option<String>,
    /// `$orderby`: sort expression.
    pub orderby: Option<String>,
    /// `$expand`: related entities to include.
    pub expand: Option<String>,
}

impl ODataQuery {
    /// Create an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of records.
    #[must_use]
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Skip records.
    #[must_use]
    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Set the filter expression.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the sort expression.
    #[must_use]
    pub fn with_orderby(mut self, orderby: impl Into<String>) -> Self {
        self.orderby = Some(orderby.into());
        self
    }

    /// Convert into query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("$top", self.top);
        params.push_opt("$skip", self.skip);
        params.push_opt("$filter", self.filter.as_deref());
        params.push_opt("$select", self.select.as_deref());
        params.push_opt("$orderby", self.orderby.as_deref());
        params.push_opt("$expand", self.expand.as_deref());
        params.into_pairs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_profile_from_api_json() {
        let profile: UserProfile = serde_json::from_value(json!({
            "fullName": "Jane Doe",
            "emailAddress": "jane@example.com",
            "roleName": "Admin",
            "workSpaceName": "Acme",
            "unknownField": 42
        }))
        .unwrap();

        assert_eq!(profile.full_name, "Jane Doe");
        assert_eq!(profile.email_address, "jane@example.com");
        assert_eq!(profile.role_name.as_deref(), Some("Admin"));
        assert!(profile.user_id.is_none());
    }

    #[test]
    fn task_tolerates_sparse_json() {
        let task: Task = serde_json::from_value(json!({
            "shortId": "T-1",
            "name": "Fix bug",
            "percentComplete": 50
        }))
        .unwrap();

        assert_eq!(task.short_id, "T-1");
        assert_eq!(task.percent_complete, Some(50));
        assert!(task.id.is_none());
    }

    #[test]
    fn project_matches_identifiers() {
        let id = ProjectId::new_v4();
        let project = Project {
            id,
            short_id: Some("PRJ-7".into()),
            name: "Website Relaunch".into(),
            description: None,
        };

        assert!(project.matches("PRJ-7"));
        assert!(project.matches("website relaunch"));
        assert!(project.matches(&id.to_string().to_uppercase()));
        assert!(!project.matches("PRJ-8"));
    }

    #[test]
    fn empty_query_has_no_pairs() {
        assert!(ODataQuery::new().to_pairs().is_empty());
    }

    #[test]
    fn query_pairs_use_odata_names() {
        let query = ODataQuery::new()
            .with_top(10)
            .with_filter("percentComplete lt 100")
            .with_orderby("wbs");

        assert_eq!(
            query.to_pairs(),
            vec![
                ("$top", "10".to_string()),
                ("$filter", "percentComplete lt 100".to_string()),
                ("$orderby", "wbs".to_string()),
            ]
        );
    }
}
