//! Contest schedule tools backed by the clist.by aggregator.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::client::{clist::supported_platforms, ClistApi, Contest};
use crate::render::text::{format_contest_start, format_duration};
use crate::tools::{Args, ParamSpec, Tool, ToolDescriptor, ToolOutcome, ToolResult};

fn platforms_param() -> ParamSpec {
    ParamSpec::string_list(
        "platforms",
        "Platforms to check. Supported: codeforces, leetcode, codechef, atcoder, topcoder, \
         codingninjas.",
    )
    .with_default(json!(["codeforces", "leetcode", "codechef"]))
}

// ─────────────────────────────────────────────────────────────────────
// contest:upcoming
// ─────────────────────────────────────────────────────────────────────

/// Upcoming and running contests across platforms.
pub struct UpcomingContestsTool {
    clist: Arc<dyn ClistApi>,
}

impl UpcomingContestsTool {
    pub fn new(clist: Arc<dyn ClistApi>) -> Self {
        Self { clist }
    }
}

#[async_trait]
impl Tool for UpcomingContestsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "contest:upcoming",
            "Upcoming contests from major platforms with names, start times, durations, and links.",
        )
        .param(platforms_param())
        .param(
            ParamSpec::integer("limit", "Maximum number of contests to return.")
                .with_default(json!(10))
                .bounds(1, 50),
        )
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let platforms = args.require_string_list("platforms")?;
        let limit = args.require_integer("limit")? as usize;

        let contests = self.clist.upcoming_contests(&platforms).await?;
        if contests.is_empty() {
            return Ok(ToolOutcome::text(format!(
                "No upcoming contests found for: {}. Supported platforms: {}.",
                platforms.join(", "),
                supported_platforms().join(", ")
            )));
        }

        let mut out = format!("Upcoming contests ({})\n\n", platforms.join(", "));
        for contest in contests.iter().take(limit) {
            let _ = writeln!(out, "- {}", contest.event);
            let _ = writeln!(out, "  - On: {}", contest.resource);
            if let Some(start) = contest.start_time() {
                let _ = writeln!(out, "  - Starts: {}", format_contest_start(&start));
                if let Some(end) = contest.end_time() {
                    let secs = (end - start).num_seconds();
                    let _ = writeln!(out, "  - Duration: {}", format_duration(secs));
                }
            }
            let _ = writeln!(out, "  - Link: {}", contest.href);
        }
        Ok(ToolOutcome::text(out.trim_end()))
    }
}

// ─────────────────────────────────────────────────────────────────────
// contest:calendar
// ─────────────────────────────────────────────────────────────────────

/// iCalendar export of upcoming contests.
pub struct ContestCalendarTool {
    clist: Arc<dyn ClistApi>,
}

impl ContestCalendarTool {
    pub fn new(clist: Arc<dyn ClistApi>) -> Self {
        Self { clist }
    }
}

#[async_trait]
impl Tool for ContestCalendarTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "contest:calendar",
            "Generates an iCalendar (.ics) document for upcoming contests on the given platforms.",
        )
        .param(platforms_param())
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let platforms = args.require_string_list("platforms")?;

        let contests = self.clist.upcoming_contests(&platforms).await?;
        if contests.is_empty() {
            return Ok(ToolOutcome::text(format!(
                "No upcoming contests found for: {}.",
                platforms.join(", ")
            )));
        }

        Ok(ToolOutcome::text(contests_to_ics(&contests)))
    }
}

/// Renders contests as an RFC 5545 calendar. Contests whose timestamps
/// fail to parse are skipped.
pub fn contests_to_ics(contests: &[Contest]) -> String {
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".into(),
        "VERSION:2.0".into(),
        "PRODID:-//ladder//contest-calendar//EN".into(),
    ];

    for (i, contest) in contests.iter().enumerate() {
        let (Some(start), Some(end)) = (contest.start_time(), contest.end_time()) else {
            continue;
        };
        lines.push("BEGIN:VEVENT".into());
        lines.push(format!("UID:{}-{}@ladder", start.timestamp(), i));
        lines.push(format!("DTSTAMP:{}", ics_timestamp(&start)));
        lines.push(format!("DTSTART:{}", ics_timestamp(&start)));
        lines.push(format!("DTEND:{}", ics_timestamp(&end)));
        lines.push(format!("SUMMARY:{}", ics_escape(&contest.event)));
        lines.push(format!(
            "DESCRIPTION:{}",
            ics_escape(&format!("{} on {}", contest.event, contest.resource))
        ));
        lines.push(format!("URL:{}", contest.href));
        lines.push("END:VEVENT".into());
    }

    lines.push("END:VCALENDAR".into());
    lines.join("\r\n")
}

fn ics_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn ics_escape(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}
