//! Image-producing tools: rating and performance graphs, distribution
//! charts, and profile/comparison cards. Data fetching and series
//! computation happen here; pixel-free SVG production is delegated to
//! the renderer, and the resulting bytes stay opaque from then on.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use serde_json::json;
use tracing::warn;

use super::stats::{performance_rating, solved_problem_keys};
use super::{require_handle, require_handles};
use crate::client::{CfRatingChange, CodeforcesApi};
use crate::render::svg::{
    self, CardStyle, ComparisonEntry, ProfileCardData, Series, MIME_SVG,
};
use crate::render::text::format_member_since;
use crate::tools::{Args, ParamSpec, Tool, ToolDescriptor, ToolError, ToolOutcome, ToolResult};

/// Verdicts shown individually in the distribution chart; everything
/// else is folded into "OTHER".
const MAIN_VERDICTS: &[&str] = &[
    "OK",
    "WRONG_ANSWER",
    "TIME_LIMIT_EXCEEDED",
    "MEMORY_LIMIT_EXCEEDED",
    "RUNTIME_ERROR",
    "COMPILATION_ERROR",
];

fn handle_param() -> ParamSpec {
    ParamSpec::string("handle", "The user's Codeforces handle. Defaults to the configured handle.")
        .default_handle()
}

fn rating_points(changes: &mut [CfRatingChange]) -> Vec<(i64, i64)> {
    changes.sort_by_key(|c| c.rating_update_time_seconds);
    changes
        .iter()
        .map(|c| (c.rating_update_time_seconds, c.new_rating))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────
// codeforces:rating_graph
// ─────────────────────────────────────────────────────────────────────

/// Rating-over-time line graph for one or more users.
pub struct RatingGraphTool {
    cf: Arc<dyn CodeforcesApi>,
}

impl RatingGraphTool {
    pub fn new(cf: Arc<dyn CodeforcesApi>) -> Self {
        Self { cf }
    }
}

#[async_trait]
impl Tool for RatingGraphTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "codeforces:rating_graph",
            "Line graph of Codeforces rating over time for one or more users.",
        )
        .param(ParamSpec::string_list("handles", "Codeforces handles to plot.").default_handle())
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let handles = require_handles(&args, "handles")?;

        let histories = join_all(handles.iter().map(|h| self.cf.user_rating(h))).await;
        let mut series = Vec::new();
        for (handle, history) in handles.iter().zip(histories) {
            match history {
                Ok(mut changes) if !changes.is_empty() => series.push(Series {
                    label: handle.clone(),
                    points: rating_points(&mut changes),
                }),
                Ok(_) => {
                    warn!(target: "charts", handle = %handle, "No rating changes, skipping series");
                }
                Err(e) => {
                    warn!(target: "charts", handle = %handle, error = %e, "Rating fetch failed, skipping series");
                }
            }
        }

        if series.is_empty() {
            return Err(ToolError::NotFound(format!(
                "no rating changes found for: {}",
                handles.join(", ")
            )));
        }

        let image = svg::line_chart("Codeforces Rating History", "Rating", &series, false);
        let caption = format!("Rating graph for {}.", handles.join(", "));
        Ok(ToolOutcome::text_and_image(caption, &image, MIME_SVG))
    }
}

// ─────────────────────────────────────────────────────────────────────
// codeforces:performance_graph
// ─────────────────────────────────────────────────────────────────────

/// Estimated per-contest performance over rank bands.
pub struct PerformanceGraphTool {
    cf: Arc<dyn CodeforcesApi>,
}

impl PerformanceGraphTool {
    pub fn new(cf: Arc<dyn CodeforcesApi>) -> Self {
        Self { cf }
    }
}

#[async_trait]
impl Tool for PerformanceGraphTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "codeforces:performance_graph",
            "Contest-by-contest estimated performance ratings for a user, drawn over the \
             rank color bands.",
        )
        .param(handle_param())
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let handle = require_handle(&args)?;

        let mut changes = self.cf.user_rating(&handle).await?;
        if changes.is_empty() {
            return Err(ToolError::NotFound(format!(
                "no rating changes found for {handle}; they might be unrated"
            )));
        }

        changes.sort_by_key(|c| c.rating_update_time_seconds);
        let current_rating = changes.last().map(|c| c.new_rating).unwrap_or(0);
        let points: Vec<(i64, i64)> = changes
            .iter()
            .map(|c| {
                (
                    c.rating_update_time_seconds,
                    performance_rating(c.old_rating, c.new_rating),
                )
            })
            .collect();
        let series = [Series {
            label: format!("{handle} ({current_rating})"),
            points,
        }];

        let title = format!("Codeforces Performance for {handle}");
        let image = svg::line_chart(&title, "Performance Rating", &series, true);
        let caption = format!("Performance graph for {handle}.");
        Ok(ToolOutcome::text_and_image(caption, &image, MIME_SVG))
    }
}

// ─────────────────────────────────────────────────────────────────────
// codeforces:rating_distribution
// ─────────────────────────────────────────────────────────────────────

/// Bar chart of distinct solved problems per rating bucket.
pub struct RatingDistributionTool {
    cf: Arc<dyn CodeforcesApi>,
}

impl RatingDistributionTool {
    pub fn new(cf: Arc<dyn CodeforcesApi>) -> Self {
        Self { cf }
    }
}

#[async_trait]
impl Tool for RatingDistributionTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "codeforces:rating_distribution",
            "Bar chart of solved problems by rating range.",
        )
        .param(handle_param())
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let handle = require_handle(&args)?;

        let submissions = self.cf.user_status(&handle, 5000).await?;
        let bins = super::stats::solved_rating_bins(&submissions, 100);
        if bins.is_empty() {
            return Err(ToolError::NotFound(format!(
                "no rated problems solved by {handle}"
            )));
        }

        let bins: Vec<(i64, usize)> = bins.into_iter().collect();
        let title = format!("Solved Problem Rating Distribution for {handle}");
        let image = svg::bar_chart(&title, &bins, 100);
        let caption = format!("Histogram of solved problem ratings for {handle}.");
        Ok(ToolOutcome::text_and_image(caption, &image, MIME_SVG))
    }
}

// ─────────────────────────────────────────────────────────────────────
// codeforces:verdict_distribution
// ─────────────────────────────────────────────────────────────────────

/// Pie chart of submission verdicts.
pub struct VerdictDistributionTool {
    cf: Arc<dyn CodeforcesApi>,
}

impl VerdictDistributionTool {
    pub fn new(cf: Arc<dyn CodeforcesApi>) -> Self {
        Self { cf }
    }
}

#[async_trait]
impl Tool for VerdictDistributionTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "codeforces:verdict_distribution",
            "Pie chart of submission verdicts (accepted, wrong answer, and so on) for a user.",
        )
        .param(handle_param())
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let handle = require_handle(&args)?;

        let submissions = self.cf.user_status(&handle, 5000).await?;
        if submissions.is_empty() {
            return Err(ToolError::NotFound(format!(
                "no submissions found for {handle}"
            )));
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut other = 0usize;
        for sub in &submissions {
            let verdict = sub.verdict.as_deref().unwrap_or("UNKNOWN");
            if MAIN_VERDICTS.contains(&verdict) {
                *counts.entry(verdict).or_insert(0) += 1;
            } else {
                other += 1;
            }
        }

        // Fixed verdict order keeps slice colors stable between runs.
        let mut slices: Vec<(String, usize)> = MAIN_VERDICTS
            .iter()
            .filter_map(|v| counts.get(v).map(|c| (v.to_string(), *c)))
            .collect();
        if other > 0 {
            slices.push(("OTHER".to_string(), other));
        }

        let title = format!("Submission Verdicts for {handle}");
        let image = svg::pie_chart(&title, &slices);
        let caption = format!("Verdict distribution for {handle}.");
        Ok(ToolOutcome::text_and_image(caption, &image, MIME_SVG))
    }
}

// ─────────────────────────────────────────────────────────────────────
// codeforces:profile_card
// ─────────────────────────────────────────────────────────────────────

/// Shareable profile card with stats and a mini rating graph.
pub struct ProfileCardTool {
    cf: Arc<dyn CodeforcesApi>,
}

impl ProfileCardTool {
    pub fn new(cf: Arc<dyn CodeforcesApi>) -> Self {
        Self { cf }
    }
}

#[async_trait]
impl Tool for ProfileCardTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "codeforces:profile_card",
            "Generates a Codeforces profile card image with rating, rank, and statistics.",
        )
        .param(handle_param())
        .param(
            ParamSpec::string("style", "Card style: 'modern', 'minimal', or 'dark'.")
                .with_default(json!("modern")),
        )
        .param(
            ParamSpec::boolean("include_graph", "Whether to include a mini rating graph.")
                .with_default(json!(true)),
        )
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let handle = require_handle(&args)?;
        let style_raw = args.require_str("style")?;
        let style = CardStyle::parse(&style_raw).ok_or_else(|| {
            ToolError::InvalidArguments(format!(
                "unknown style '{style_raw}'; expected 'modern', 'minimal', or 'dark'"
            ))
        })?;
        let include_graph = args.boolean("include_graph").unwrap_or(true);

        let (users, changes, submissions) = tokio::join!(
            self.cf.user_info(&[handle.clone()]),
            self.cf.user_rating(&handle),
            self.cf.user_status(&handle, 1000)
        );
        let users = users.map_err(|e| {
            if e.is_not_found() {
                ToolError::NotFound(format!("user '{handle}' not found"))
            } else {
                ToolError::Upstream(e)
            }
        })?;
        let user = users
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::NotFound(format!("user '{handle}' not found")))?;
        let mut changes = changes?;
        let submissions = submissions?;

        changes.sort_by_key(|c| c.rating_update_time_seconds);
        let history: Vec<i64> = if include_graph {
            changes.iter().map(|c| c.new_rating).collect()
        } else {
            Vec::new()
        };

        let rank = user.rank.clone().unwrap_or_else(|| "unrated".into());
        let rating = user.rating.unwrap_or(0);
        let data = ProfileCardData {
            handle: user.handle.clone(),
            rank: rank.clone(),
            rating,
            max_rating: user.max_rating.unwrap_or(rating),
            solved: solved_problem_keys(&submissions).len(),
            contests: changes.len(),
            member_since: user
                .registration_time_seconds
                .map(format_member_since)
                .unwrap_or_else(|| "unknown".into()),
            history,
            style,
            generated_on: Utc::now().format("%B %d, %Y").to_string(),
        };

        let image = svg::profile_card(&data);
        let caption = format!(
            "Profile card generated for {}\n\n- Rating: {} ({})\n- Problems Solved: {}\n- Style: {}",
            data.handle, data.rating, data.rank, data.solved, style_raw
        );
        Ok(ToolOutcome::text_and_image(caption, &image, MIME_SVG))
    }
}

// ─────────────────────────────────────────────────────────────────────
// codeforces:comparison_card
// ─────────────────────────────────────────────────────────────────────

/// Side-by-side comparison card image for two to four users.
pub struct ComparisonCardTool {
    cf: Arc<dyn CodeforcesApi>,
}

impl ComparisonCardTool {
    pub fn new(cf: Arc<dyn CodeforcesApi>) -> Self {
        Self { cf }
    }

    async fn gather(&self, handle: &str) -> Option<ComparisonEntry> {
        let (users, changes, submissions) = tokio::join!(
            self.cf.user_info(&[handle.to_string()]),
            self.cf.user_rating(handle),
            self.cf.user_status(handle, 1000)
        );
        let user = match users {
            Ok(users) => users.into_iter().next()?,
            Err(e) => {
                warn!(target: "charts", handle = %handle, error = %e, "Skipping comparison entry");
                return None;
            }
        };

        let mut history = Vec::new();
        if let Ok(mut changes) = changes {
            changes.sort_by_key(|c| c.rating_update_time_seconds);
            history = changes.iter().map(|c| c.new_rating).collect();
        }
        let solved = submissions
            .map(|subs| solved_problem_keys(&subs).len())
            .unwrap_or(0);

        let rating = user.rating.unwrap_or(0);
        Some(ComparisonEntry {
            handle: user.handle,
            rank: user.rank.unwrap_or_else(|| "unrated".into()),
            rating,
            max_rating: user.max_rating.unwrap_or(rating),
            solved,
            history,
        })
    }
}

#[async_trait]
impl Tool for ComparisonCardTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "codeforces:comparison_card",
            "Generates a comparison card image for 2-4 Codeforces users with ratings and stats.",
        )
        .param(ParamSpec::string_list("handles", "Codeforces handles to compare (2 to 4)."))
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        let mut handles = args.require_string_list("handles")?;
        if handles.len() < 2 {
            return Err(ToolError::InvalidArguments(
                "provide at least 2 handles for comparison".into(),
            ));
        }
        // Layout caps at four cards.
        handles.truncate(4);

        let entries: Vec<ComparisonEntry> =
            join_all(handles.iter().map(|h| self.gather(h)))
                .await
                .into_iter()
                .flatten()
                .collect();
        if entries.is_empty() {
            return Err(ToolError::NotFound(
                "no valid users found for comparison".into(),
            ));
        }

        let mut caption = format!("Profile comparison for {} users:\n", entries.len());
        for entry in &entries {
            caption.push_str(&format!(
                "- {}: {} ({})\n",
                entry.handle, entry.rating, entry.rank
            ));
        }

        let image = svg::comparison_card(&entries);
        Ok(ToolOutcome::text_and_image(caption.trim_end(), &image, MIME_SVG))
    }
}
