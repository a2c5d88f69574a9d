//! Common test utilities for integration tests

use std::sync::Arc;

use mango::adapters::memory::{InMemoryGoalRepository, InMemoryImageStore};
use mango::adapters::sqlite::{create_migrated_test_pool, SqliteGoalRepository};
use mango::domain::models::weighted_completion;
use mango::{Goal, GoalRepository, GoalService};

#[allow(dead_code)]
pub fn memory_service() -> (GoalService<InMemoryGoalRepository>, InMemoryImageStore) {
    let images = InMemoryImageStore::new();
    let service = GoalService::new(Arc::new(InMemoryGoalRepository::new()), Arc::new(images.clone()));
    (service, images)
}

#[allow(dead_code)]
pub async fn sqlite_service() -> (GoalService<SqliteGoalRepository>, InMemoryImageStore) {
    let pool = create_migrated_test_pool().await.expect("Failed to create test pool");
    let images = InMemoryImageStore::new();
    let service = GoalService::new(Arc::new(SqliteGoalRepository::new(pool)), Arc::new(images.clone()));
    (service, images)
}

/// Check that every goal with sub-goals carries their weighted average.
///
/// Returns the first offending goal's name.
#[allow(dead_code)]
pub async fn completion_violation<R: GoalRepository>(service: &GoalService<R>) -> Option<String> {
    for goal in service.collect_all_post_order().await.ok()? {
        let children = service.get_children(goal.id).await.ok()?;
        if let Some(expected) = weighted_completion(children.iter().map(|c| (c.completion, c.weight))) {
            if goal.completion != expected {
                return Some(format!("{}: {} != {expected}", goal.name, goal.completion));
            }
        }
    }
    None
}

/// Shape of the tree below `parent` (or of the whole tree), for comparing
/// trees that live in different stores.
#[allow(dead_code)]
pub async fn shape<R: GoalRepository>(service: &GoalService<R>) -> Vec<(usize, Goal)> {
    let mut out = Vec::new();
    let mut stack: Vec<(usize, Goal)> = service
        .top_level_goals()
        .await
        .expect("top level")
        .into_iter()
        .rev()
        .map(|g| (0, g))
        .collect();
    while let Some((depth, goal)) = stack.pop() {
        let children = service.get_children(goal.id).await.expect("children");
        stack.extend(children.into_iter().rev().map(|c| (depth + 1, c)));
        out.push((depth, goal));
    }
    out
}
