//! Codeforces text tools: stats, recommendations, activity, histogram,
//! and the multi-user comparison with per-entity partial failure.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::json;
use tracing::{debug, warn};

use super::stats::{
    default_rating_window, filter_candidates, problem_url, profile_url, recent_solved,
    sample_candidates, solved_problem_keys, solved_rating_bins, ACCEPTED,
};
use super::{require_handle, require_handles};
use crate::client::{CfUser, CodeforcesApi};
use crate::render::text::{format_date, format_member_since};
use crate::tools::{Args, ParamSpec, Tool, ToolDescriptor, ToolError, ToolOutcome, ToolResult};

const HISTOGRAM_BAR_WIDTH: usize = 40;

fn handle_param() -> ParamSpec {
    ParamSpec::string("handle", "The user's Codeforces handle. Defaults to the configured handle.")
        .default_handle()
}

fn user_not_found(handles: &[String]) -> ToolError {
    ToolError::NotFound(format!("could not find user(s): {}", handles.join(", ")))
}

fn rank_of(user: &CfUser) -> &str {
    user.rank.as_deref().unwrap_or("unrated")
}

// ─────────────────────────────────────────────────────────────────────
// codeforces:user_stats
// ─────────────────────────────────────────────────────────────────────

/// Profile stats for one or more handles, sorted into a leaderboard.
pub struct UserStatsTool {
    cf: Arc<dyn CodeforcesApi>,
}

impl UserStatsTool {
    pub fn new(cf: Arc<dyn CodeforcesApi>) -> Self {
        Self { cf }
    }
}

#[async_trait]
impl Tool for UserStatsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "codeforces:user_stats",
            "Codeforces profile stats for one or more users: rating, rank, membership date, \
             and profile link. Multiple handles are sorted into a leaderboard.",
        )
        .param(
            ParamSpec::string_list("handles", "Codeforces handles to look up.").default_handle(),
        )
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let handles = require_handles(&args, "handles")?;
        let mut users = self.cf.user_info(&handles).await.map_err(|e| {
            if e.is_not_found() {
                user_not_found(&handles)
            } else {
                ToolError::Upstream(e)
            }
        })?;
        if users.is_empty() {
            return Err(user_not_found(&handles));
        }

        users.sort_by_key(|u| std::cmp::Reverse(u.rating.unwrap_or(0)));

        let title = if users.len() > 1 {
            "Codeforces User Leaderboard"
        } else {
            "Codeforces User Stats"
        };
        let mut out = format!("{title}\n\n");
        for (i, user) in users.iter().enumerate() {
            let member_since = user
                .registration_time_seconds
                .map(format_member_since)
                .unwrap_or_else(|| "unknown".into());
            let _ = writeln!(out, "{}. {} {}", i + 1, rank_of(user), user.handle);
            let _ = writeln!(
                out,
                "   - Rating: {} (Max: {})",
                user.rating.unwrap_or(0),
                user.max_rating.unwrap_or(0)
            );
            let _ = writeln!(out, "   - Member Since: {member_since}");
            let _ = writeln!(out, "   - Profile: {}", profile_url(&user.handle));
        }
        Ok(ToolOutcome::text(out.trim_end()))
    }
}

// ─────────────────────────────────────────────────────────────────────
// codeforces:recommend_problems
// ─────────────────────────────────────────────────────────────────────

/// Unsolved problem recommendations inside a rating window.
pub struct RecommendProblemsTool {
    cf: Arc<dyn CodeforcesApi>,
}

impl RecommendProblemsTool {
    pub fn new(cf: Arc<dyn CodeforcesApi>) -> Self {
        Self { cf }
    }
}

#[async_trait]
impl Tool for RecommendProblemsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "codeforces:recommend_problems",
            "Recommends unsolved Codeforces problems for the user's skill level. Filters by \
             rating window and excludes already-solved problems; the pick is a uniform sample.",
        )
        .param(handle_param())
        .param(ParamSpec::integer("min_rating", "Minimum problem rating. Defaults to the user's current rating.").optional())
        .param(ParamSpec::integer("max_rating", "Maximum problem rating. Defaults to the user's current rating + 199.").optional())
        .param(ParamSpec::integer("count", "Number of problems to recommend.").with_default(json!(5)).bounds(1, 20))
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let handle = require_handle(&args)?;
        let count = args.require_integer("count")? as usize;

        let users = self
            .cf
            .user_info(&[handle.clone()])
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    user_not_found(&[handle.clone()])
                } else {
                    ToolError::Upstream(e)
                }
            })?;
        let user = users.first().ok_or_else(|| user_not_found(&[handle.clone()]))?;

        let (min_rating, max_rating) = match (args.integer("min_rating"), args.integer("max_rating")) {
            (None, None) => default_rating_window(user.rating.unwrap_or(1200)),
            (lo, hi) => (lo.unwrap_or(800), hi.unwrap_or(3500)),
        };

        // Submission history and the problemset are independent fetches.
        let (submissions, problemset) = tokio::join!(
            self.cf.user_status(&handle, 1000),
            self.cf.problemset(&[])
        );
        let submissions = submissions?;
        let problemset = problemset?;

        let solved = solved_problem_keys(&submissions);
        let candidates = filter_candidates(&problemset.problems, &solved, min_rating, max_rating);
        debug!(
            target: "recommend",
            handle = %handle,
            candidates = candidates.len(),
            "Filtered recommendation candidates"
        );

        if candidates.is_empty() {
            return Ok(ToolOutcome::text(format!(
                "No suitable unsolved problems found for {handle} in rating range \
                 {min_rating}-{max_rating}."
            )));
        }

        let picks = sample_candidates(candidates, count);
        let mut out = format!("Recommended problems for {handle} ({min_rating}-{max_rating}):\n\n");
        for (i, problem) in picks.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} ({}) - {}",
                i + 1,
                problem.name,
                problem.rating.unwrap_or(0),
                problem_url(problem)
            );
        }
        Ok(ToolOutcome::text(out.trim_end()))
    }
}

// ─────────────────────────────────────────────────────────────────────
// codeforces:solved_problems
// ─────────────────────────────────────────────────────────────────────

/// Recently solved problems, deduplicated and newest first.
pub struct SolvedProblemsTool {
    cf: Arc<dyn CodeforcesApi>,
}

impl SolvedProblemsTool {
    pub fn new(cf: Arc<dyn CodeforcesApi>) -> Self {
        Self { cf }
    }
}

#[async_trait]
impl Tool for SolvedProblemsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "codeforces:solved_problems",
            "Recently solved Codeforces problems with names, ratings, dates, and links. \
             Each problem counts once regardless of resubmissions.",
        )
        .param(handle_param())
        .param(ParamSpec::integer("count", "Number of problems to show.").with_default(json!(10)).bounds(1, 50))
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let handle = require_handle(&args)?;
        let count = args.require_integer("count")? as usize;

        let submissions = self.cf.user_status(&handle, 100).await?;
        let solved = recent_solved(&submissions);
        if solved.is_empty() {
            return Ok(ToolOutcome::text(format!(
                "No recent accepted submissions found for {handle}."
            )));
        }

        let mut out = format!("Recently solved by {handle}\n\n");
        for (i, sub) in solved.iter().take(count).enumerate() {
            let _ = writeln!(
                out,
                "{}. {} ({}) - solved on {} - {}",
                i + 1,
                sub.problem.name,
                sub.problem
                    .rating
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "unrated".into()),
                format_date(sub.creation_time_seconds),
                problem_url(&sub.problem)
            );
        }
        Ok(ToolOutcome::text(out.trim_end()))
    }
}

// ─────────────────────────────────────────────────────────────────────
// codeforces:rating_changes
// ─────────────────────────────────────────────────────────────────────

/// Rating deltas from recent contests.
pub struct RatingChangesTool {
    cf: Arc<dyn CodeforcesApi>,
}

impl RatingChangesTool {
    pub fn new(cf: Arc<dyn CodeforcesApi>) -> Self {
        Self { cf }
    }
}

#[async_trait]
impl Tool for RatingChangesTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "codeforces:rating_changes",
            "Rating changes from recent Codeforces contests: contest name, rank, old and new \
             rating, and delta.",
        )
        .param(handle_param())
        .param(ParamSpec::integer("count", "Number of recent contests to show.").with_default(json!(5)).bounds(1, 20))
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let handle = require_handle(&args)?;
        let count = args.require_integer("count")? as usize;

        let mut changes = self.cf.user_rating(&handle).await?;
        if changes.is_empty() {
            return Ok(ToolOutcome::text(format!(
                "No rating changes found for {handle}. They might be unrated."
            )));
        }

        changes.sort_by_key(|c| std::cmp::Reverse(c.rating_update_time_seconds));
        let mut out = format!("Recent rating changes for {handle}\n\n");
        for change in changes.iter().take(count) {
            let delta = change.new_rating - change.old_rating;
            let _ = writeln!(
                out,
                "- {} ({})",
                change.contest_name,
                super::stats::contest_url(change.contest_id)
            );
            let _ = writeln!(
                out,
                "  - Rank: {}, {} -> {} ({:+})",
                change.rank, change.old_rating, change.new_rating, delta
            );
        }
        Ok(ToolOutcome::text(out.trim_end()))
    }
}

// ─────────────────────────────────────────────────────────────────────
// codeforces:rating_histogram
// ─────────────────────────────────────────────────────────────────────

/// ASCII histogram of distinct solved problems per rating bucket.
pub struct RatingHistogramTool {
    cf: Arc<dyn CodeforcesApi>,
}

impl RatingHistogramTool {
    pub fn new(cf: Arc<dyn CodeforcesApi>) -> Self {
        Self { cf }
    }
}

#[async_trait]
impl Tool for RatingHistogramTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "codeforces:rating_histogram",
            "Text histogram of solved problems by rating range. Reveals strengths and gaps.",
        )
        .param(handle_param())
        .param(ParamSpec::integer("bin_size", "The size of each rating bin.").with_default(json!(100)).bounds(100, 400))
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let handle = require_handle(&args)?;
        let bin_size = args.require_integer("bin_size")?;

        let submissions = self.cf.user_status(&handle, 5000).await?;
        let bins = solved_rating_bins(&submissions, bin_size);
        if bins.is_empty() {
            return Ok(ToolOutcome::text(format!(
                "No rated problems solved by {handle}."
            )));
        }

        let max_count = bins.values().copied().max().unwrap_or(1).max(1);
        let mut out = format!("Solved problems histogram for {handle}\n\n```\n");
        for (bucket, count) in &bins {
            let bar_len = count * HISTOGRAM_BAR_WIDTH / max_count;
            let bar = "#".repeat(bar_len);
            let _ = writeln!(
                out,
                "{:>4}-{:<4} | {:<width$} ({})",
                bucket,
                bucket + bin_size - 1,
                bar,
                count,
                width = HISTOGRAM_BAR_WIDTH
            );
        }
        out.push_str("```");
        Ok(ToolOutcome::text(out))
    }
}

// ─────────────────────────────────────────────────────────────────────
// codeforces:compare_users
// ─────────────────────────────────────────────────────────────────────

/// Per-handle comparison metrics; missing or degraded entries stay
/// visible instead of aborting the rest of the fan-out.
enum CompareRow {
    Found(Box<CompareMetrics>),
    Missing { handle: String },
    Unavailable { handle: String, reason: String },
}

struct CompareMetrics {
    user: CfUser,
    contests: Option<usize>,
    recent_accepted: Option<usize>,
}

impl CompareMetrics {
    fn degraded(&self) -> bool {
        self.contests.is_none() || self.recent_accepted.is_none()
    }
}

/// Multi-user comparison with per-entity fan-out.
pub struct CompareUsersTool {
    cf: Arc<dyn CodeforcesApi>,
}

impl CompareUsersTool {
    pub fn new(cf: Arc<dyn CodeforcesApi>) -> Self {
        Self { cf }
    }

    async fn gather(&self, handle: &str) -> CompareRow {
        let users = match self.cf.user_info(&[handle.to_string()]).await {
            Ok(users) => users,
            Err(e) if e.is_not_found() => {
                return CompareRow::Missing {
                    handle: handle.to_string(),
                }
            }
            Err(e) => {
                warn!(target: "compare", handle = %handle, error = %e, "Profile fetch failed");
                return CompareRow::Unavailable {
                    handle: handle.to_string(),
                    reason: e.to_string(),
                };
            }
        };
        let Some(user) = users.into_iter().next() else {
            return CompareRow::Missing {
                handle: handle.to_string(),
            };
        };

        // Enrichment calls run concurrently; a failure degrades this row
        // only.
        let (changes, recent) = tokio::join!(
            self.cf.user_rating(handle),
            self.cf.user_status(handle, 50)
        );
        let contests = match changes {
            Ok(changes) => Some(changes.len()),
            Err(e) => {
                warn!(target: "compare", handle = %handle, error = %e, "Rating history unavailable");
                None
            }
        };
        let recent_accepted = match recent {
            Ok(submissions) => Some(
                submissions
                    .iter()
                    .filter(|s| s.verdict.as_deref() == Some(ACCEPTED))
                    .count(),
            ),
            Err(e) => {
                warn!(target: "compare", handle = %handle, error = %e, "Recent submissions unavailable");
                None
            }
        };

        CompareRow::Found(Box::new(CompareMetrics {
            user,
            contests,
            recent_accepted,
        }))
    }
}

#[async_trait]
impl Tool for CompareUsersTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "codeforces:compare_users",
            "Compares multiple Codeforces users: ratings, contest counts, and recent activity. \
             Users missing upstream are reported without aborting the comparison.",
        )
        .param(ParamSpec::string_list("handles", "Codeforces handles to compare (at least 2)."))
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let handles = args.require_string_list("handles")?;
        if handles.len() < 2 {
            return Err(ToolError::InvalidArguments(
                "provide at least 2 handles to compare".into(),
            ));
        }

        let rows = join_all(handles.iter().map(|h| self.gather(h))).await;

        let mut found: Vec<&CompareMetrics> = Vec::new();
        let mut absent: Vec<String> = Vec::new();
        for row in &rows {
            match row {
                CompareRow::Found(metrics) => found.push(metrics),
                CompareRow::Missing { handle } => {
                    absent.push(format!("- {handle}: not found on Codeforces"));
                }
                CompareRow::Unavailable { handle, reason } => {
                    absent.push(format!("- {handle}: data unavailable ({reason})"));
                }
            }
        }
        found.sort_by_key(|m| std::cmp::Reverse(m.user.rating.unwrap_or(0)));

        let mut out = String::from("Codeforces User Comparison\n\n");
        for (i, metrics) in found.iter().enumerate() {
            let user = &metrics.user;
            let _ = writeln!(out, "{}. {} {}", i + 1, rank_of(user), user.handle);
            let _ = writeln!(
                out,
                "   - Current Rating: {} (Max: {})",
                user.rating.unwrap_or(0),
                user.max_rating.unwrap_or(0)
            );
            match metrics.contests {
                Some(n) => {
                    let _ = writeln!(out, "   - Contests: {n}");
                }
                None => {
                    let _ = writeln!(out, "   - Contests: n/a");
                }
            }
            match metrics.recent_accepted {
                Some(n) => {
                    let _ = writeln!(out, "   - Recent Accepted: {n}");
                }
                None => {
                    let _ = writeln!(out, "   - Recent Accepted: n/a");
                }
            }
            if let Some(secs) = user.registration_time_seconds {
                let _ = writeln!(out, "   - Member Since: {}", format_member_since(secs));
            }
            if metrics.degraded() {
                let _ = writeln!(out, "   - Note: partial data (some lookups failed)");
            }
            out.push('\n');
        }

        if !absent.is_empty() {
            out.push_str(&absent.join("\n"));
            out.push_str("\n\n");
        }

        if let Some(leader) = found.first() {
            let _ = writeln!(
                out,
                "Verdict: {} leads with {} rating.",
                leader.user.handle,
                leader.user.rating.unwrap_or(0)
            );
            if found.len() > 1 {
                let spread = leader.user.rating.unwrap_or(0)
                    - found.last().map(|m| m.user.rating.unwrap_or(0)).unwrap_or(0);
                let _ = writeln!(out, "\nInsights:\n- Rating spread: {spread} points");
                if let Some(most_active) = found
                    .iter()
                    .filter(|m| m.recent_accepted.is_some())
                    .max_by_key(|m| m.recent_accepted.unwrap_or(0))
                {
                    let _ = writeln!(
                        out,
                        "- Most active recently: {} ({} accepted in their last 50 submissions)",
                        most_active.user.handle,
                        most_active.recent_accepted.unwrap_or(0)
                    );
                }
            }
        } else {
            out.push_str("No comparison data could be gathered for the requested handles.\n");
        }

        Ok(ToolOutcome::text(out.trim_end()))
    }
}
