use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{ApiClient, ClientError, ClientResult};

const BASE_URL: &str = "https://clist.by/api/v4/contest/";

/// Platform aliases accepted from callers mapped to clist resource names.
const PLATFORM_RESOURCES: &[(&str, &str)] = &[
    ("codeforces", "codeforces.com"),
    ("leetcode", "leetcode.com"),
    ("codechef", "codechef.com"),
    ("atcoder", "atcoder.jp"),
    ("topcoder", "topcoder.com"),
    ("codingninjas", "codingninjas.com/codestudio"),
];

pub fn resource_for(platform: &str) -> Option<&'static str> {
    let platform = platform.to_lowercase();
    PLATFORM_RESOURCES
        .iter()
        .find(|(name, _)| *name == platform)
        .map(|(_, resource)| *resource)
}

pub fn supported_platforms() -> Vec<&'static str> {
    PLATFORM_RESOURCES.iter().map(|(name, _)| *name).collect()
}

/// Contest entry from the clist.by aggregator.
#[derive(Debug, Clone, Deserialize)]
pub struct Contest {
    pub event: String,
    pub resource: String,
    /// Start time, ISO-8601 in UTC (with or without a trailing Z).
    pub start: String,
    pub end: String,
    pub href: String,
}

impl Contest {
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        parse_contest_time(&self.start)
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        parse_contest_time(&self.end)
    }
}

/// Parses the aggregator's timestamps, which arrive either RFC 3339 or
/// as a bare `YYYY-MM-DDTHH:MM:SS` assumed UTC.
pub fn parse_contest_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// The contest-aggregator operations the tool layer depends on.
#[async_trait]
pub trait ClistApi: Send + Sync {
    /// Upcoming contests for the given platform aliases, soonest first.
    /// Unknown aliases are skipped; no known alias means an empty list.
    async fn upcoming_contests(&self, platforms: &[String]) -> ClientResult<Vec<Contest>>;
}

/// API-key-authenticated client for clist.by.
pub struct ClistClient {
    api: ApiClient,
    api_key: String,
    base_url: String,
}

impl ClistClient {
    pub fn new(api: ApiClient, api_key: String) -> Self {
        Self::with_base_url(api, api_key, BASE_URL)
    }

    pub fn with_base_url(api: ApiClient, api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api,
            api_key,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ClistApi for ClistClient {
    async fn upcoming_contests(&self, platforms: &[String]) -> ClientResult<Vec<Contest>> {
        let resources: Vec<&str> = platforms
            .iter()
            .filter_map(|p| resource_for(p))
            .collect();
        if resources.is_empty() {
            return Ok(Vec::new());
        }

        debug!(target: "clist", resources = ?resources, "Fetching upcoming contests");
        let now = Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        let params = [
            ("start__gt", now),
            ("order_by", "start".to_string()),
            ("resource__in", resources.join(",")),
        ];
        let headers = [("Authorization", format!("ApiKey {}", self.api_key))];

        let data = self.api.get(&self.base_url, &params, &headers).await?;
        let objects = data
            .get("objects")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        serde_json::from_value(objects).map_err(|e| ClientError::Api {
            status: 200,
            message: format!("unexpected contest payload: {e}"),
        })
    }
}
