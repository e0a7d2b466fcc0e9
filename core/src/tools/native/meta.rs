//! Static informational tools plus the validation/liveness endpoints.

use async_trait::async_trait;
use chrono::Utc;

use crate::tools::{Args, Tool, ToolDescriptor, ToolOutcome, ToolResult};

const ABOUT_TEXT: &str = "\
Ladder - Competitive Programming Assistant

Ladder gives you contest problems, user stats, and contest schedules from
Codeforces, LeetCode, CodeChef, AtCoder, TopCoder, and CodingNinjas.

Main features:
- User stats and leaderboards
- Rating tracking and charts
- Problem recommendations
- Contest schedules and calendars

Examples: \"Show my Codeforces stats\", \"Recommend problems\",
\"Upcoming contests\".";

const CAPABILITIES_TEXT: &str = "\
Welcome to your competitive programming assistant. Here is what it can do:

Profile & Stats
- user stats: current rating, rank, and profile info
- compare users: head-to-head comparison between handles
- leaderboards between friends

Performance Analysis
- rating changes: recent contest performance and deltas
- rating histogram: solved problems broken down by rating range
- recent solves: latest accepted solutions
- rating / performance graphs and distribution charts

Practice & Improvement
- problem recommendations matched to your rating window
- LeetCode daily challenge

Contests
- upcoming contest schedules across platforms
- downloadable contest calendar (iCalendar format)

Quick examples:
- \"Show my Codeforces stats\"
- \"Recommend 5 problems around 1400 rating\"
- \"Compare me with tourist\"
- \"Show rating histogram with 200-point bins\"

Tip: configure a default handle so you do not have to repeat it.";

/// Describes the assistant and its supported platforms.
pub struct AboutTool;

#[async_trait]
impl Tool for AboutTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "meta:about",
            "Overview of the assistant, its supported platforms, and how to get started.",
        )
    }

    async fn call(&self, _args: Args) -> ToolResult<ToolOutcome> {
        Ok(ToolOutcome::text(ABOUT_TEXT))
    }
}

/// Lists available features with example phrasings.
pub struct CapabilitiesTool;

#[async_trait]
impl Tool for CapabilitiesTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "meta:capabilities",
            "Lists available commands and example usage. No upstream calls.",
        )
    }

    async fn call(&self, _args: Args) -> ToolResult<ToolOutcome> {
        Ok(ToolOutcome::text(CAPABILITIES_TEXT))
    }
}

/// Returns the configured owner contact so the orchestrator can verify
/// which deployment it is talking to.
pub struct ValidateTool {
    contact: String,
}

impl ValidateTool {
    pub fn new(contact: String) -> Self {
        Self { contact }
    }
}

#[async_trait]
impl Tool for ValidateTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "meta:validate",
            "Confirms the server is responsive and returns the configured owner contact.",
        )
    }

    async fn call(&self, _args: Args) -> ToolResult<ToolOutcome> {
        Ok(ToolOutcome::text(self.contact.clone()))
    }
}

/// Timestamped liveness probe; also the target of keep-alive pings.
pub struct HealthCheckTool;

#[async_trait]
impl Tool for HealthCheckTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("meta:health_check", "Liveness probe with a current timestamp.")
    }

    async fn call(&self, _args: Args) -> ToolResult<ToolOutcome> {
        Ok(ToolOutcome::text(format!(
            "Server is healthy at {}",
            Utc::now().to_rfc3339()
        )))
    }
}
