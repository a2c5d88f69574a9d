//! Box-drawing rendering of the goal tree.

use serde::Serialize;

use crate::cli::output::{short_id, styled_completion};
use crate::domain::errors::DomainResult;
use crate::domain::models::Goal;
use crate::domain::ports::GoalRepository;
use crate::services::GoalService;

const TREE_BRANCH: &str = "├── ";
const TREE_LAST: &str = "└── ";
const TREE_PIPE: &str = "│   ";
const TREE_SPACE: &str = "    ";

/// One goal in pre order, with what is needed to draw its line.
#[derive(Debug, Clone, Serialize)]
pub struct TreeRow {
    pub depth: usize,
    pub id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub completion: u8,
    pub weight: String,
    #[serde(skip)]
    prefix: String,
    #[serde(skip)]
    is_last: bool,
}

/// Walk the whole tree in pre order.
pub async fn collect_rows<R: GoalRepository>(service: &GoalService<R>) -> DomainResult<Vec<TreeRow>> {
    let roots = service.top_level_goals().await?;
    let mut stack = frames(roots, 0, "");
    let mut rows = Vec::new();

    while let Some((goal, depth, prefix, is_last)) = stack.pop() {
        let children = service.get_children(goal.id).await?;
        let child_prefix = if depth == 0 {
            String::new()
        } else if is_last {
            format!("{prefix}{TREE_SPACE}")
        } else {
            format!("{prefix}{TREE_PIPE}")
        };
        stack.extend(frames(children, depth + 1, &child_prefix));
        rows.push(TreeRow {
            depth,
            id: goal.id.to_string(),
            parent_id: goal.parent_id.map(|id| id.to_string()),
            name: goal.name,
            completion: goal.completion,
            weight: goal.weight.as_str().to_string(),
            prefix,
            is_last,
        });
    }
    Ok(rows)
}

/// Stack frames for `goals`, reversed so the first goal is popped first.
fn frames(goals: Vec<Goal>, depth: usize, prefix: &str) -> Vec<(Goal, usize, String, bool)> {
    let count = goals.len();
    goals
        .into_iter()
        .enumerate()
        .map(|(i, goal)| (goal, depth, prefix.to_string(), i + 1 == count))
        .rev()
        .collect()
}

pub fn render_rows(rows: &[TreeRow]) -> String {
    rows.iter()
        .map(|row| {
            let connector = match (row.depth, row.is_last) {
                (0, _) => "",
                (_, true) => TREE_LAST,
                (_, false) => TREE_BRANCH,
            };
            format!(
                "{}{}{} {} [{}]",
                row.prefix,
                connector,
                styled_completion(row.completion),
                row.name,
                short_id(&row.id)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
