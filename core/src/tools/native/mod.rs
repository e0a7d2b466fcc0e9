pub mod charts;
pub mod codeforces;
pub mod contests;
pub mod leetcode;
pub mod meta;
pub mod stats;

// Re-export the tool types
pub use charts::{
    ComparisonCardTool, PerformanceGraphTool, ProfileCardTool, RatingDistributionTool,
    RatingGraphTool, VerdictDistributionTool,
};
pub use codeforces::{
    CompareUsersTool, RatingChangesTool, RatingHistogramTool, RecommendProblemsTool,
    SolvedProblemsTool, UserStatsTool,
};
pub use contests::{ContestCalendarTool, UpcomingContestsTool};
pub use leetcode::DailyProblemTool;
pub use meta::{AboutTool, CapabilitiesTool, HealthCheckTool, ValidateTool};

use std::sync::Arc;

use super::error::{ToolError, ToolResult};
use super::registry::ToolRegistry;
use super::schema::Args;
use crate::client::{ClistApi, CodeforcesApi, LeetCodeApi};
use crate::config::Config;

/// Registers the complete native toolset against shared platform clients.
/// Called once at startup, before the registry is handed to the
/// dispatcher.
pub fn install(
    registry: &ToolRegistry,
    cf: Arc<dyn CodeforcesApi>,
    leetcode: Arc<dyn LeetCodeApi>,
    clist: Arc<dyn ClistApi>,
    config: &Config,
) {
    registry.register(Arc::new(AboutTool));
    registry.register(Arc::new(CapabilitiesTool));
    registry.register(Arc::new(ValidateTool::new(config.owner_contact.clone())));
    registry.register(Arc::new(HealthCheckTool));

    registry.register(Arc::new(UserStatsTool::new(cf.clone())));
    registry.register(Arc::new(RecommendProblemsTool::new(cf.clone())));
    registry.register(Arc::new(SolvedProblemsTool::new(cf.clone())));
    registry.register(Arc::new(RatingChangesTool::new(cf.clone())));
    registry.register(Arc::new(RatingHistogramTool::new(cf.clone())));
    registry.register(Arc::new(CompareUsersTool::new(cf.clone())));

    registry.register(Arc::new(RatingGraphTool::new(cf.clone())));
    registry.register(Arc::new(PerformanceGraphTool::new(cf.clone())));
    registry.register(Arc::new(RatingDistributionTool::new(cf.clone())));
    registry.register(Arc::new(VerdictDistributionTool::new(cf.clone())));
    registry.register(Arc::new(ProfileCardTool::new(cf.clone())));
    registry.register(Arc::new(ComparisonCardTool::new(cf)));

    registry.register(Arc::new(UpcomingContestsTool::new(clist.clone())));
    registry.register(Arc::new(ContestCalendarTool::new(clist)));

    registry.register(Arc::new(DailyProblemTool::new(leetcode)));
}

/// Identity parameter guard: after validation the handle is present
/// either explicitly or via the configured default handle; otherwise the
/// caller has to supply one.
pub(crate) fn require_handle(args: &Args) -> ToolResult<String> {
    args.str("handle").map(str::to_string).ok_or_else(|| {
        ToolError::InvalidArguments("no handle given and no default handle configured".into())
    })
}

pub(crate) fn require_handles(args: &Args, name: &str) -> ToolResult<Vec<String>> {
    match args.string_list(name) {
        Some(handles) if !handles.is_empty() => Ok(handles),
        _ => Err(ToolError::InvalidArguments(
            "no handles given and no default handle configured".into(),
        )),
    }
}
