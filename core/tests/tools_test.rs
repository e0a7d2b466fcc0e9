/// Handler tests against a stubbed Codeforces API
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use ladder_core::client::{
    CfProblem, CfProblemset, CfRatingChange, CfSubmission, CfUser, ClientError, ClientResult,
    CodeforcesApi,
};
use ladder_core::tools::native::{
    CompareUsersTool, RatingGraphTool, RatingHistogramTool, RecommendProblemsTool,
    SolvedProblemsTool, UserStatsTool,
};
use ladder_core::tools::{Args, Tool, ToolContent, ToolError, ToolOutcome};
use serde_json::json;

#[derive(Default)]
struct StubCf {
    users: HashMap<String, CfUser>,
    submissions: HashMap<String, Vec<CfSubmission>>,
    ratings: HashMap<String, Vec<CfRatingChange>>,
    problems: Vec<CfProblem>,
    /// Handles whose enrichment calls fail with a network error.
    broken_enrichment: HashSet<String>,
}

#[async_trait]
impl CodeforcesApi for StubCf {
    async fn user_info(&self, handles: &[String]) -> ClientResult<Vec<CfUser>> {
        let found: Vec<CfUser> = handles
            .iter()
            .filter_map(|h| self.users.get(h).cloned())
            .collect();
        if found.is_empty() {
            return Err(ClientError::Api {
                status: 400,
                message: format!(
                    "Codeforces error: handles: User with handle {} not found",
                    handles.join(";")
                ),
            });
        }
        Ok(found)
    }

    async fn user_status(&self, handle: &str, _count: u32) -> ClientResult<Vec<CfSubmission>> {
        if self.broken_enrichment.contains(handle) {
            return Err(ClientError::Network("connection reset".into()));
        }
        Ok(self.submissions.get(handle).cloned().unwrap_or_default())
    }

    async fn user_rating(&self, handle: &str) -> ClientResult<Vec<CfRatingChange>> {
        if self.broken_enrichment.contains(handle) {
            return Err(ClientError::Network("connection reset".into()));
        }
        Ok(self.ratings.get(handle).cloned().unwrap_or_default())
    }

    async fn problemset(&self, _tags: &[String]) -> ClientResult<CfProblemset> {
        Ok(CfProblemset {
            problems: self.problems.clone(),
        })
    }
}

fn user(handle: &str, rating: i64) -> CfUser {
    CfUser {
        handle: handle.to_string(),
        rating: Some(rating),
        max_rating: Some(rating + 100),
        rank: Some("specialist".to_string()),
        max_rank: Some("expert".to_string()),
        registration_time_seconds: Some(1_262_304_000),
    }
}

fn problem(contest_id: i64, index: &str, rating: i64) -> CfProblem {
    CfProblem {
        contest_id: Some(contest_id),
        index: index.to_string(),
        name: format!("Problem {contest_id}{index}"),
        rating: Some(rating),
        tags: vec![],
    }
}

fn accepted(id: i64, time: i64, p: CfProblem) -> CfSubmission {
    CfSubmission {
        id,
        creation_time_seconds: time,
        problem: p,
        verdict: Some("OK".to_string()),
        programming_language: Some("Rust".to_string()),
    }
}

fn rating_change(contest_id: i64, time: i64, old: i64, new: i64) -> CfRatingChange {
    CfRatingChange {
        contest_id,
        contest_name: format!("Round {contest_id}"),
        rank: 100,
        rating_update_time_seconds: time,
        old_rating: old,
        new_rating: new,
    }
}

fn args_for(tool: &dyn Tool, raw: serde_json::Value) -> Args {
    tool.descriptor()
        .validate(&raw, &Default::default())
        .expect("arguments should validate")
}

fn text_of(outcome: ToolOutcome) -> String {
    match outcome {
        ToolOutcome::Text(text) => text,
        other => panic!("expected text outcome, got {other:?}"),
    }
}

mod compare {
    use super::*;

    #[tokio::test]
    async fn missing_user_does_not_abort_the_comparison() {
        let mut stub = StubCf::default();
        stub.users.insert("alice".into(), user("alice", 1500));
        stub.users.insert("carol".into(), user("carol", 1300));

        let tool = CompareUsersTool::new(Arc::new(stub));
        let args = args_for(&tool, json!({"handles": ["alice", "bob", "carol"]}));
        let text = text_of(tool.call(args).await.unwrap());

        assert!(text.contains("alice"));
        assert!(text.contains("carol"));
        assert!(text.contains("bob: not found on Codeforces"));
        // Higher-rated user leads the ranking.
        assert!(text.find("alice").unwrap() < text.find("carol").unwrap());
        assert!(text.contains("Verdict: alice leads with 1500 rating."));
    }

    #[tokio::test]
    async fn failed_enrichment_degrades_one_row_only() {
        let mut stub = StubCf::default();
        stub.users.insert("alice".into(), user("alice", 1500));
        stub.users.insert("carol".into(), user("carol", 1300));
        stub.ratings
            .insert("carol".into(), vec![rating_change(1, 100, 1200, 1300)]);
        stub.broken_enrichment.insert("alice".into());

        let tool = CompareUsersTool::new(Arc::new(stub));
        let args = args_for(&tool, json!({"handles": ["alice", "carol"]}));
        let text = text_of(tool.call(args).await.unwrap());

        assert!(text.contains("alice"));
        assert!(text.contains("partial data"));
        assert!(text.contains("Contests: 1"));
    }

    #[tokio::test]
    async fn fewer_than_two_handles_is_invalid() {
        let tool = CompareUsersTool::new(Arc::new(StubCf::default()));
        let args = args_for(&tool, json!({"handles": ["alice"]}));
        let err = tool.call(args).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}

mod recommend {
    use super::*;

    fn stub_with_problems() -> StubCf {
        let mut stub = StubCf::default();
        stub.users.insert("alice".into(), user("alice", 1200));
        stub.problems = vec![
            problem(1, "A", 1200),
            problem(2, "A", 1300),
            problem(3, "A", 1400),
            problem(4, "A", 1500),
        ];
        // alice already solved 2A.
        stub.submissions
            .insert("alice".into(), vec![accepted(1, 100, problem(2, "A", 1300))]);
        stub
    }

    #[tokio::test]
    async fn explicit_window_excludes_solved_problems() {
        let tool = RecommendProblemsTool::new(Arc::new(stub_with_problems()));
        let args = args_for(
            &tool,
            json!({"handle": "alice", "min_rating": 1300, "max_rating": 1400, "count": 10}),
        );
        let text = text_of(tool.call(args).await.unwrap());

        // 2A is solved, 1A/4A are outside the window; only 3A qualifies.
        assert!(text.contains("Problem 3A"));
        assert!(!text.contains("Problem 2A"));
        assert!(!text.contains("Problem 1A"));
        assert!(!text.contains("Problem 4A"));
    }

    #[tokio::test]
    async fn default_window_is_rating_to_rating_plus_199() {
        let tool = RecommendProblemsTool::new(Arc::new(stub_with_problems()));
        let args = args_for(&tool, json!({"handle": "alice"}));
        let text = text_of(tool.call(args).await.unwrap());
        assert!(text.contains("(1200-1399)"));
    }

    #[tokio::test]
    async fn unknown_handle_is_not_found() {
        let tool = RecommendProblemsTool::new(Arc::new(StubCf::default()));
        let args = args_for(&tool, json!({"handle": "nobody"}));
        let err = tool.call(args).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }
}

mod activity {
    use super::*;

    #[tokio::test]
    async fn solved_list_is_deduped() {
        let mut stub = StubCf::default();
        stub.users.insert("alice".into(), user("alice", 1200));
        stub.submissions.insert(
            "alice".into(),
            vec![
                accepted(1, 100, problem(5, "B", 1100)),
                accepted(2, 900, problem(5, "B", 1100)),
                accepted(3, 500, problem(6, "A", 1200)),
            ],
        );

        let tool = SolvedProblemsTool::new(Arc::new(stub));
        let args = args_for(&tool, json!({"handle": "alice"}));
        let text = text_of(tool.call(args).await.unwrap());

        assert_eq!(text.matches("Problem 5B").count(), 1);
        assert!(text.contains("Problem 6A"));
    }

    #[tokio::test]
    async fn histogram_uses_floor_buckets() {
        let mut stub = StubCf::default();
        stub.users.insert("alice".into(), user("alice", 1200));
        stub.submissions.insert(
            "alice".into(),
            vec![
                accepted(1, 100, problem(1, "A", 1050)),
                accepted(2, 200, problem(2, "A", 999)),
            ],
        );

        let tool = RatingHistogramTool::new(Arc::new(stub));
        let args = args_for(&tool, json!({"handle": "alice", "bin_size": 100}));
        let text = text_of(tool.call(args).await.unwrap());

        assert!(text.contains("1000-1099"));
        assert!(text.contains(" 900-999"));
    }

    #[tokio::test]
    async fn histogram_bin_size_is_bounded() {
        let tool = RatingHistogramTool::new(Arc::new(StubCf::default()));
        let err = tool
            .descriptor()
            .validate(&json!({"handle": "alice", "bin_size": 50}), &Default::default())
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}

mod stats_tool {
    use super::*;

    #[tokio::test]
    async fn multiple_users_become_a_leaderboard() {
        let mut stub = StubCf::default();
        stub.users.insert("alice".into(), user("alice", 1500));
        stub.users.insert("bob".into(), user("bob", 1700));

        let tool = UserStatsTool::new(Arc::new(stub));
        let args = args_for(&tool, json!({"handles": ["alice", "bob"]}));
        let text = text_of(tool.call(args).await.unwrap());

        assert!(text.contains("Leaderboard"));
        assert!(text.find("bob").unwrap() < text.find("alice").unwrap());
    }

    #[tokio::test]
    async fn missing_handle_without_default_is_invalid() {
        let tool = UserStatsTool::new(Arc::new(StubCf::default()));
        let args = args_for(&tool, json!({}));
        let err = tool.call(args).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}

mod charts {
    use super::*;

    #[tokio::test]
    async fn rating_graph_returns_caption_and_svg_image() {
        let mut stub = StubCf::default();
        stub.users.insert("alice".into(), user("alice", 1500));
        stub.ratings.insert(
            "alice".into(),
            vec![
                rating_change(1, 100, 1200, 1300),
                rating_change(2, 200, 1300, 1500),
            ],
        );

        let tool = RatingGraphTool::new(Arc::new(stub));
        let args = args_for(&tool, json!({"handles": ["alice"]}));
        let parts = tool.call(args).await.unwrap().into_parts();

        assert_eq!(parts.len(), 2);
        assert!(matches!(&parts[0], ToolContent::Text { text } if text.contains("alice")));
        match &parts[1] {
            ToolContent::Image { data, mime_type } => {
                assert_eq!(mime_type, "image/svg+xml");
                assert!(!data.is_empty());
            }
            other => panic!("expected image part, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rating_graph_skips_failed_series_but_keeps_survivors() {
        let mut stub = StubCf::default();
        stub.users.insert("alice".into(), user("alice", 1500));
        stub.ratings
            .insert("alice".into(), vec![rating_change(1, 100, 1200, 1300)]);
        stub.broken_enrichment.insert("bob".into());

        let tool = RatingGraphTool::new(Arc::new(stub));
        let args = args_for(&tool, json!({"handles": ["alice", "bob"]}));
        let parts = tool.call(args).await.unwrap().into_parts();
        assert!(matches!(&parts[0], ToolContent::Text { text } if text.contains("alice")));
    }
}
