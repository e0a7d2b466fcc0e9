use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{ApiClient, ClientError, ClientResult};

const BASE_URL: &str = "https://leetcode.com/graphql";

const DAILY_QUERY: &str = "\
query questionOfToday {
    activeDailyCodingChallengeQuestion {
        date
        link
        question {
            difficulty
            title
            titleSlug
            content
            topicTags { name }
        }
    }
}";

/// Today's daily challenge, normalized from the GraphQL payload.
#[derive(Debug, Clone)]
pub struct DailyProblem {
    pub date: String,
    pub title: String,
    pub difficulty: String,
    /// Absolute problem URL.
    pub url: String,
    /// Raw HTML problem statement as served by the API.
    pub content_html: String,
    pub topics: Vec<String>,
}

/// The LeetCode operations the tool layer depends on.
#[async_trait]
pub trait LeetCodeApi: Send + Sync {
    async fn daily_problem(&self) -> ClientResult<DailyProblem>;
}

/// GraphQL client for LeetCode.
///
/// A 200 response whose body carries a non-empty `errors` array is an
/// application-level rejection and is folded into [`ClientError::Api`]
/// using the first error's message.
pub struct LeetCodeClient {
    api: ApiClient,
    base_url: String,
}

impl LeetCodeClient {
    pub fn new(api: ApiClient) -> Self {
        Self::with_base_url(api, BASE_URL)
    }

    pub fn with_base_url(api: ApiClient, base_url: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into(),
        }
    }

    async fn graphql(&self, query: &str) -> ClientResult<Value> {
        debug!(target: "leetcode", "Sending GraphQL query");
        let data = self
            .api
            .post_json(&self.base_url, &json!({ "query": query }))
            .await?;

        if let Some(errors) = data.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let message = errors[0]
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                return Err(ClientError::Api {
                    status: 400,
                    message: format!("LeetCode error: {message}"),
                });
            }
        }
        Ok(data.get("data").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl LeetCodeApi for LeetCodeClient {
    async fn daily_problem(&self) -> ClientResult<DailyProblem> {
        let data = self.graphql(DAILY_QUERY).await?;
        let challenge = data
            .get("activeDailyCodingChallengeQuestion")
            .filter(|v| !v.is_null())
            .ok_or_else(|| ClientError::Api {
                status: 200,
                message: "no active daily challenge in response".into(),
            })?;

        let question = challenge.get("question").cloned().unwrap_or(Value::Null);
        let link = str_field(challenge, "link");
        let topics = question
            .get("topicTags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(DailyProblem {
            date: str_field(challenge, "date"),
            title: str_field(&question, "title"),
            difficulty: str_field(&question, "difficulty"),
            url: format!("https://leetcode.com{link}"),
            content_html: str_field(&question, "content"),
            topics,
        })
    }
}

fn str_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
