use serde::{Deserialize, Serialize};

/// A caller-selected criterion (focus area, eligibility, region...) shown in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextParameter {
    pub id: String,
    pub label: String,
    pub description: String,
}

/// One grant opportunity carved out of unstructured research text.
///
/// `description` always holds the full section, including any lines the
/// structured fields were read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRecord {
    pub raw_section: String,
    pub title: Option<String>,
    pub organization: Option<String>,
    pub amount: Option<String>,
    pub deadline: Option<String>,
    pub description: String,
}

impl GrantRecord {
    /// Present structured fields as (label, value) pairs, in display order.
    pub fn attributes(&self) -> Vec<(&'static str, &str)> {
        [
            ("Organization", self.organization.as_deref()),
            ("Amount", self.amount.as_deref()),
            ("Deadline", self.deadline.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }
}

/// Body of `POST /api/v1/report/docx`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub text: String,
    #[serde(default)]
    pub org_description: Option<String>,
    #[serde(default)]
    pub context_parameters: Vec<ContextParameter>,
    pub timestamp: String,
}

impl ReportRequest {
    /// The organization description, if it carries any visible text.
    pub fn org_profile(&self) -> Option<&str> {
        self.org_description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
