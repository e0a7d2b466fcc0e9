//! LeetCode daily challenge tool.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::LeetCodeApi;
use crate::render::text::html_to_text;
use crate::tools::{Args, Tool, ToolDescriptor, ToolOutcome, ToolResult};

/// Today's LeetCode daily challenge, flattened to chat-friendly text.
pub struct DailyProblemTool {
    leetcode: Arc<dyn LeetCodeApi>,
}

impl DailyProblemTool {
    pub fn new(leetcode: Arc<dyn LeetCodeApi>) -> Self {
        Self { leetcode }
    }
}

#[async_trait]
impl Tool for DailyProblemTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "leetcode:daily",
            "Today's LeetCode Daily Challenge with title, difficulty, description, and link.",
        )
    }

    async fn call(&self, _args: Args) -> ToolResult<ToolOutcome> {
        let problem = self.leetcode.daily_problem().await?;

        let mut out = String::from("Today's LeetCode Daily Problem\n\n");
        out.push_str(&format!("{} ({})\n", problem.title, problem.difficulty));
        out.push_str(&format!("Solve it here: {}\n", problem.url));
        if !problem.topics.is_empty() {
            out.push_str(&format!("Topics: {}\n", problem.topics.join(", ")));
        }
        out.push_str(&format!(
            "\nProblem description:\n{}",
            html_to_text(&problem.content_html)
        ));

        Ok(ToolOutcome::text(out))
    }
}
