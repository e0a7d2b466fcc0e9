use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{ApiClient, ClientError, ClientResult};

const BASE_URL: &str = "https://codeforces.com/api";

/// User record from `user.info`.
#[derive(Debug, Clone, Deserialize)]
pub struct CfUser {
    pub handle: String,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default, rename = "maxRating")]
    pub max_rating: Option<i64>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default, rename = "maxRank")]
    pub max_rank: Option<String>,
    #[serde(default, rename = "registrationTimeSeconds")]
    pub registration_time_seconds: Option<i64>,
}

/// Problem record embedded in submissions and the problemset dump.
#[derive(Debug, Clone, Deserialize)]
pub struct CfProblem {
    #[serde(default, rename = "contestId")]
    pub contest_id: Option<i64>,
    pub index: String,
    pub name: String,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Submission record from `user.status`.
#[derive(Debug, Clone, Deserialize)]
pub struct CfSubmission {
    pub id: i64,
    #[serde(rename = "creationTimeSeconds")]
    pub creation_time_seconds: i64,
    pub problem: CfProblem,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default, rename = "programmingLanguage")]
    pub programming_language: Option<String>,
}

/// Rating change record from `user.rating`.
#[derive(Debug, Clone, Deserialize)]
pub struct CfRatingChange {
    #[serde(rename = "contestId")]
    pub contest_id: i64,
    #[serde(rename = "contestName")]
    pub contest_name: String,
    pub rank: i64,
    #[serde(rename = "ratingUpdateTimeSeconds")]
    pub rating_update_time_seconds: i64,
    #[serde(rename = "oldRating")]
    pub old_rating: i64,
    #[serde(rename = "newRating")]
    pub new_rating: i64,
}

/// Result payload of `problemset.problems`.
#[derive(Debug, Clone, Deserialize)]
pub struct CfProblemset {
    pub problems: Vec<CfProblem>,
}

/// The Codeforces operations the tool layer depends on.
#[async_trait]
pub trait CodeforcesApi: Send + Sync {
    /// Batch profile lookup; handles are semicolon-joined upstream.
    async fn user_info(&self, handles: &[String]) -> ClientResult<Vec<CfUser>>;

    /// Most recent submissions for a handle, newest first upstream.
    async fn user_status(&self, handle: &str, count: u32) -> ClientResult<Vec<CfSubmission>>;

    /// Full rating-change history for a handle, oldest first upstream.
    async fn user_rating(&self, handle: &str) -> ClientResult<Vec<CfRatingChange>>;

    /// Problemset dump, optionally filtered by tags.
    async fn problemset(&self, tags: &[String]) -> ClientResult<CfProblemset>;
}

/// HTTP client for the Codeforces REST API.
///
/// Responses arrive in an envelope with a `status` flag; a 200 whose
/// status is not "OK" carries the rejection in `comment` and is folded
/// into [`ClientError::Api`] alongside transport-level failures.
pub struct CodeforcesClient {
    api: ApiClient,
    base_url: String,
}

impl CodeforcesClient {
    pub fn new(api: ApiClient) -> Self {
        Self::with_base_url(api, BASE_URL)
    }

    pub fn with_base_url(api: ApiClient, base_url: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into(),
        }
    }

    async fn query(&self, endpoint: &str, params: &[(&str, String)]) -> ClientResult<Value> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(target: "codeforces", endpoint = %endpoint, "Querying Codeforces API");

        let data = self.api.get(&url, params, &[]).await?;
        if data.get("status").and_then(Value::as_str) != Some("OK") {
            let comment = data
                .get("comment")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(ClientError::Api {
                status: 400,
                message: format!("Codeforces error: {comment}"),
            });
        }
        Ok(data.get("result").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl CodeforcesApi for CodeforcesClient {
    async fn user_info(&self, handles: &[String]) -> ClientResult<Vec<CfUser>> {
        let result = self
            .query("user.info", &[("handles", handles.join(";"))])
            .await?;
        decode("user.info", result)
    }

    async fn user_status(&self, handle: &str, count: u32) -> ClientResult<Vec<CfSubmission>> {
        let result = self
            .query(
                "user.status",
                &[
                    ("handle", handle.to_string()),
                    ("from", "1".to_string()),
                    ("count", count.to_string()),
                ],
            )
            .await?;
        decode("user.status", result)
    }

    async fn user_rating(&self, handle: &str) -> ClientResult<Vec<CfRatingChange>> {
        let result = self
            .query("user.rating", &[("handle", handle.to_string())])
            .await?;
        decode("user.rating", result)
    }

    async fn problemset(&self, tags: &[String]) -> ClientResult<CfProblemset> {
        let params: Vec<(&str, String)> = if tags.is_empty() {
            Vec::new()
        } else {
            vec![("tags", tags.join(";"))]
        };
        let result = self.query("problemset.problems", &params).await?;
        decode("problemset.problems", result)
    }
}

fn decode<T: serde::de::DeserializeOwned>(endpoint: &str, value: Value) -> ClientResult<T> {
    serde_json::from_value(value).map_err(|e| ClientError::Api {
        status: 200,
        message: format!("unexpected {endpoint} payload: {e}"),
    })
}
