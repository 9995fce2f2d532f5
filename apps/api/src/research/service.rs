//! Research fan-out: pluggable upstreams behind traits.
//!
//! `AppState` holds `Arc<dyn ResearchModel>` and `Arc<dyn GrantsSource>`, so the
//! handler can be exercised without network access.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::grants_client::{GrantsClient, GrantsError, GrantsQuery};
use crate::llm_client::{LlmClient, LlmError};
use crate::research::models::{ResearchRequest, ResearchResponse, ResearchSource};
use crate::research::prompts::{compose_prompt, RESEARCH_SYSTEM};

/// Produces free-text research from a composed prompt.
#[async_trait]
pub trait ResearchModel: Send + Sync {
    async fn research(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl ResearchModel for LlmClient {
    async fn research(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.complete(prompt, system).await
    }
}

/// Searches a grants database and returns its raw JSON answer.
#[async_trait]
pub trait GrantsSource: Send + Sync {
    async fn search(&self, query: &GrantsQuery) -> Result<Value, GrantsError>;
}

#[async_trait]
impl GrantsSource for GrantsClient {
    async fn search(&self, query: &GrantsQuery) -> Result<Value, GrantsError> {
        GrantsClient::search(self, query).await
    }
}

/// Runs the selected upstreams concurrently and combines their answers.
///
/// Any selected upstream failing fails the whole request.
pub async fn run_research(
    model: &dyn ResearchModel,
    grants: &dyn GrantsSource,
    request: &ResearchRequest,
    now: DateTime<Utc>,
) -> Result<ResearchResponse, AppError> {
    let keyword = request.prompt.trim();
    if keyword.is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }
    if request.sources.is_empty() {
        return Err(AppError::Validation(
            "at least one research source must be selected".to_string(),
        ));
    }

    let prompt = compose_prompt(request);
    info!(
        "Research request: {} context parameters, sources={:?}",
        request.context_parameters.len(),
        request.sources
    );

    let llm_call = async {
        if request.wants(ResearchSource::Llm) {
            model.research(&prompt, RESEARCH_SYSTEM).await.map(Some)
        } else {
            Ok(None)
        }
    };
    let grants_call = async {
        if request.wants(ResearchSource::Grants) {
            grants.search(&GrantsQuery::keyword(keyword)).await.map(Some)
        } else {
            Ok(None)
        }
    };

    let (text, grants) = tokio::join!(llm_call, grants_call);
    let text = text.map_err(|e| AppError::Llm(format!("Research call failed: {e}")))?;
    let grants = grants.map_err(|e| AppError::Grants(format!("Grants search failed: {e}")))?;

    Ok(ResearchResponse {
        text,
        grants,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::report::models::ContextParameter;

    /// Records prompts and answers with canned text.
    #[derive(Default)]
    pub(crate) struct StubModel {
        pub prompts: Mutex<Vec<String>>,
        pub fail: bool,
    }

    #[async_trait]
    impl ResearchModel for StubModel {
        async fn research(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(LlmError::Api {
                    status: 401,
                    message: "invalid x-api-key".to_string(),
                });
            }
            Ok("1. Stub Grant\nAmount: $1,000\nA stubbed research answer for tests.".to_string())
        }
    }

    #[derive(Default)]
    pub(crate) struct StubGrants {
        pub queries: Mutex<Vec<GrantsQuery>>,
    }

    #[async_trait]
    impl GrantsSource for StubGrants {
        async fn search(&self, query: &GrantsQuery) -> Result<Value, GrantsError> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(json!({"hitCount": 1, "oppHits": [{"title": "Stub Opportunity"}]}))
        }
    }

    fn request(sources: Vec<ResearchSource>) -> ResearchRequest {
        ResearchRequest {
            prompt: "Library literacy grants".to_string(),
            org_description: Some("Rural library".to_string()),
            context_parameters: vec![ContextParameter {
                id: "focus".to_string(),
                label: "Focus".to_string(),
                description: "Adult literacy".to_string(),
            }],
            sources,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 15, 4, 5).unwrap()
    }

    #[tokio::test]
    async fn test_both_sources_are_combined() {
        let model = StubModel::default();
        let grants = StubGrants::default();
        let response = run_research(&model, &grants, &request(ResearchSource::all()), now())
            .await
            .unwrap();

        assert!(response.text.unwrap().starts_with("1. Stub Grant"));
        assert_eq!(response.grants.unwrap()["hitCount"], 1);
        assert_eq!(response.timestamp, "2026-03-02T15:04:05.000Z");

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("- Focus: Adult literacy"));
        assert_eq!(
            grants.queries.lock().unwrap()[0].keyword,
            "Library literacy grants"
        );
    }

    #[tokio::test]
    async fn test_unselected_source_is_not_called() {
        let model = StubModel::default();
        let grants = StubGrants::default();
        let response = run_research(&model, &grants, &request(vec![ResearchSource::Grants]), now())
            .await
            .unwrap();

        assert!(response.text.is_none());
        assert!(response.grants.is_some());
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected() {
        let mut req = request(ResearchSource::all());
        req.prompt = "   ".to_string();
        let err = run_research(&StubModel::default(), &StubGrants::default(), &req, now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_source_list_is_rejected() {
        let err = run_research(
            &StubModel::default(),
            &StubGrants::default(),
            &request(vec![]),
            now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upstream_failure_fails_request() {
        let model = StubModel {
            fail: true,
            ..Default::default()
        };
        let err = run_research(&model, &StubGrants::default(), &request(ResearchSource::all()), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(ref msg) if msg.contains("invalid x-api-key")));
    }
}
