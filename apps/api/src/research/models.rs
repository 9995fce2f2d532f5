use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::report::models::ContextParameter;

/// Upstream a research request may be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchSource {
    Llm,
    Grants,
}

impl ResearchSource {
    pub fn all() -> Vec<ResearchSource> {
        vec![ResearchSource::Llm, ResearchSource::Grants]
    }
}

/// Body of `POST /api/v1/research`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    pub prompt: String,
    #[serde(default)]
    pub org_description: Option<String>,
    #[serde(default)]
    pub context_parameters: Vec<ContextParameter>,
    #[serde(default = "ResearchSource::all")]
    pub sources: Vec<ResearchSource>,
}

impl ResearchRequest {
    pub fn wants(&self, source: ResearchSource) -> bool {
        self.sources.contains(&source)
    }
}

/// Combined result of the selected upstreams.
///
/// `timestamp` is what clients pass back to the report endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResponse {
    pub text: Option<String>,
    pub grants: Option<Value>,
    pub timestamp: String,
}
