use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::{EligibilityQuery, EligibilityRequest, EligibilityResponse, QueryError};

pub const ELIGIBILITY_PREVIEW_PATH: &str = "/api/v1/job-descriptions/eligibility-preview";

/// JSON client for a remote eligibility service.
pub struct HttpEligibilityQuery {
    endpoint: String,
    client: reqwest::Client,
}

/// Texts pulled from a non-2xx body, most specific first.
#[derive(Debug, Default, PartialEq, Eq)]
struct ServiceErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

impl ServiceErrorBody {
    /// `detail` may be a string or a list of `{msg}` entries; `message` falls back to `error`.
    fn parse(body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return Self::default();
        };

        let detail = match value.get("detail") {
            Some(Value::String(text)) => non_blank(text),
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .find_map(non_blank),
            Some(Value::Object(entry)) => entry
                .get("msg")
                .and_then(Value::as_str)
                .and_then(non_blank),
            _ => None,
        };
        let message = ["message", "error"]
            .iter()
            .filter_map(|key| value.get(*key).and_then(Value::as_str))
            .find_map(non_blank);

        Self { detail, message }
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl HttpEligibilityQuery {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, QueryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| QueryError::Transport(err.to_string()))?;

        Ok(Self {
            endpoint: format!(
                "{}{}",
                base_url.trim().trim_end_matches('/'),
                ELIGIBILITY_PREVIEW_PATH
            ),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EligibilityQuery for HttpEligibilityQuery {
    async fn preview(
        &self,
        request: &EligibilityRequest,
    ) -> Result<EligibilityResponse, QueryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| QueryError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed = ServiceErrorBody::parse(&body);
            warn!(
                status = status.as_u16(),
                endpoint = %self.endpoint,
                "eligibility service rejected preview request"
            );
            return Err(QueryError::Rejected {
                status: status.as_u16(),
                detail: parsed.detail,
                message: parsed.message,
            });
        }

        response
            .json::<EligibilityResponse>()
            .await
            .map_err(|err| QueryError::Decode(err.to_string()))
    }
}
