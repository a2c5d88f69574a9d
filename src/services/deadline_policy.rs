//! Deadline consistency between a goal and its relatives.
//!
//! A sub-goal should not be due after the goal it belongs to. The store does
//! not enforce this; these helpers detect conflicts and, on request, move
//! the conflicting deadlines.

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Goal;
use crate::domain::ports::GoalRepository;
use crate::services::goal_service::GoalService;
use crate::services::goal_traversal;

/// Ancestors, starting at `parent_id` and going up, whose deadline is
/// earlier than `deadline`.
pub async fn ancestor_conflicts<R: GoalRepository>(
    service: &GoalService<R>,
    parent_id: Uuid,
    deadline: NaiveDate,
) -> DomainResult<Vec<Goal>> {
    let mut conflicts = Vec::new();
    let mut next = Some(parent_id);
    while let Some(id) = next {
        let goal = service.get_goal(id).await?;
        next = goal.parent_id;
        if goal.deadline.is_some_and(|d| d < deadline) {
            conflicts.push(goal);
        }
    }
    Ok(conflicts)
}

/// Push every conflicting ancestor's deadline out to `deadline`.
pub async fn extend_ancestor_deadlines<R: GoalRepository>(
    service: &GoalService<R>,
    parent_id: Uuid,
    deadline: NaiveDate,
) -> DomainResult<usize> {
    let conflicts = ancestor_conflicts(service, parent_id, deadline).await?;
    for goal in &conflicts {
        move_deadline(service, goal, deadline).await?;
    }
    if !conflicts.is_empty() {
        info!(count = conflicts.len(), %deadline, "ancestor deadlines extended");
    }
    Ok(conflicts.len())
}

/// Goals anywhere below `id` whose deadline is later than `deadline`, in
/// pre order.
pub async fn descendant_conflicts<R: GoalRepository>(
    service: &GoalService<R>,
    id: Uuid,
    deadline: NaiveDate,
) -> DomainResult<Vec<Goal>> {
    let descendants = goal_traversal::descendants_pre_order(service.repository(), id).await?;
    Ok(descendants
        .into_iter()
        .filter(|g| g.deadline.is_some_and(|d| d > deadline))
        .collect())
}

/// Pull every later deadline in the subtree below `id` in to `deadline`.
pub async fn clamp_descendant_deadlines<R: GoalRepository>(
    service: &GoalService<R>,
    id: Uuid,
    deadline: NaiveDate,
) -> DomainResult<usize> {
    let conflicts = descendant_conflicts(service, id, deadline).await?;
    let moved = conflicts.len();
    for goal in &conflicts {
        move_deadline(service, goal, deadline).await?;
    }
    if moved > 0 {
        info!(goal_id = %id, count = moved, %deadline, "descendant deadlines clamped");
    }
    Ok(moved)
}

async fn move_deadline<R: GoalRepository>(
    service: &GoalService<R>,
    goal: &Goal,
    deadline: NaiveDate,
) -> DomainResult<()> {
    let changes = goal.clone().with_deadline(deadline);
    service.update(goal.id, &changes).await?;
    Ok(())
}
