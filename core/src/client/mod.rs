use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

pub mod clist;
pub mod codeforces;
pub mod leetcode;

// Re-export common types
pub use clist::{ClistApi, ClistClient, Contest};
pub use codeforces::{
    CfProblem, CfProblemset, CfRatingChange, CfSubmission, CfUser, CodeforcesApi, CodeforcesClient,
};
pub use leetcode::{DailyProblem, LeetCodeApi, LeetCodeClient};

const USER_AGENT: &str = "ladder-assistant/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const BODY_EXCERPT_LEN: usize = 280;

/// Failure kinds exposed by the upstream client layer.
///
/// Every platform integration folds its failures into exactly these two
/// variants: the upstream rejected the request (transport status or an
/// application-level error payload), or the request never completed.
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl ClientError {
    /// Whether this failure signals a missing entity (unknown handle,
    /// unknown resource) rather than a broken upstream.
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::Api { status, message } => {
                *status == 404 || message.to_lowercase().contains("not found")
            }
            ClientError::Network(_) => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Shared HTTP wrapper used by the platform clients.
///
/// Carries one `reqwest::Client` with a fixed request timeout and user
/// agent. Non-2xx statuses become [`ClientError::Api`] with a bounded
/// body excerpt; connection and timeout failures become
/// [`ClientError::Network`]. One outbound call per invocation, no retries.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { http }
    }

    pub async fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> ClientResult<Value> {
        let mut req = self.http.get(url).query(params);
        for (name, value) in headers {
            req = req.header(*name, value);
        }
        Self::into_json(req.send().await).await
    }

    pub async fn post_json(&self, url: &str, body: &Value) -> ClientResult<Value> {
        Self::into_json(self.http.post(url).json(body).send().await).await
    }

    async fn into_json(resp: Result<reqwest::Response, reqwest::Error>) -> ClientResult<Value> {
        let resp = resp.map_err(|e| ClientError::Network(format!("request failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: excerpt(&body),
            });
        }

        resp.json::<Value>().await.map_err(|e| ClientError::Api {
            status: status.as_u16(),
            message: format!("response was not valid JSON: {e}"),
        })
    }
}

/// Truncates a response body at a safe UTF-8 boundary for error messages.
fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "<empty body>".into();
    }
    if body.len() <= BODY_EXCERPT_LEN {
        return body.to_string();
    }
    let mut end = BODY_EXCERPT_LEN;
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}
