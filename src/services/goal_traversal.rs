//! Depth-first walks over the goal tree.
//!
//! Every walk is iterative with an explicit stack, so deep trees cannot
//! exhaust the call stack. Siblings are always visited left to right
//! (insertion order).

use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Goal;
use crate::domain::ports::GoalRepository;

enum Visit {
    Enter(Goal),
    Exit(Goal),
}

/// All goals without children, depth-first.
pub async fn collect_leaves<R: GoalRepository + ?Sized>(repo: &R) -> DomainResult<Vec<Goal>> {
    let mut stack: Vec<Goal> = repo.get_top_level().await?;
    stack.reverse();

    let mut leaves = Vec::new();
    while let Some(goal) = stack.pop() {
        let children = repo.get_children(goal.id).await?;
        if children.is_empty() {
            leaves.push(goal);
        } else {
            stack.extend(children.into_iter().rev());
        }
    }
    Ok(leaves)
}

/// Every goal exactly once, each preceded by all of its descendants.
pub async fn collect_all_post_order<R: GoalRepository + ?Sized>(repo: &R) -> DomainResult<Vec<Goal>> {
    let roots = repo.get_top_level().await?;
    post_order(repo, roots).await
}

/// The subtree rooted at `root` in post order; `root` comes last.
pub async fn subtree_post_order<R: GoalRepository + ?Sized>(repo: &R, root: Goal) -> DomainResult<Vec<Goal>> {
    post_order(repo, vec![root]).await
}

/// All descendants of `id` in pre order (parents before their children).
/// `id` itself is not included.
pub async fn descendants_pre_order<R: GoalRepository + ?Sized>(repo: &R, id: Uuid) -> DomainResult<Vec<Goal>> {
    let mut stack: Vec<Goal> = repo.get_children(id).await?;
    stack.reverse();

    let mut out = Vec::new();
    while let Some(goal) = stack.pop() {
        let children = repo.get_children(goal.id).await?;
        stack.extend(children.into_iter().rev());
        out.push(goal);
    }
    Ok(out)
}

async fn post_order<R: GoalRepository + ?Sized>(repo: &R, roots: Vec<Goal>) -> DomainResult<Vec<Goal>> {
    let mut stack: Vec<Visit> = roots.into_iter().rev().map(Visit::Enter).collect();
    let mut out = Vec::new();

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(goal) => {
                let children = repo.get_children(goal.id).await?;
                stack.push(Visit::Exit(goal));
                stack.extend(children.into_iter().rev().map(Visit::Enter));
            }
            Visit::Exit(goal) => out.push(goal),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryGoalRepository;

    fn names(goals: &[Goal]) -> Vec<&str> {
        goals.iter().map(|g| g.name.as_str()).collect()
    }

    /// A
    /// ├── A1
    /// │   ├── A1a
    /// │   └── A1b
    /// └── A2
    /// B
    async fn sample_tree() -> (InMemoryGoalRepository, Uuid) {
        let repo = InMemoryGoalRepository::new();
        let a = Goal::new("A", "");
        let a1 = Goal::new("A1", "").with_parent(a.id);
        let a1a = Goal::new("A1a", "").with_parent(a1.id);
        let a1b = Goal::new("A1b", "").with_parent(a1.id);
        let a2 = Goal::new("A2", "").with_parent(a.id);
        let b = Goal::new("B", "");
        for goal in [&a, &a1, &a1a, &a1b, &a2, &b] {
            repo.create(goal).await.unwrap();
        }
        (repo, a.id)
    }

    #[tokio::test]
    async fn test_collect_leaves() {
        let (repo, _) = sample_tree().await;
        let leaves = collect_leaves(&repo).await.unwrap();
        assert_eq!(names(&leaves), ["A1a", "A1b", "A2", "B"]);
    }

    #[tokio::test]
    async fn test_collect_all_post_order() {
        let (repo, _) = sample_tree().await;
        let all = collect_all_post_order(&repo).await.unwrap();
        assert_eq!(names(&all), ["A1a", "A1b", "A1", "A2", "A", "B"]);
    }

    #[tokio::test]
    async fn test_subtree_and_descendants() {
        let (repo, a_id) = sample_tree().await;
        let a = repo.get(a_id).await.unwrap().unwrap();

        let subtree = subtree_post_order(&repo, a).await.unwrap();
        assert_eq!(names(&subtree), ["A1a", "A1b", "A1", "A2", "A"]);

        let descendants = descendants_pre_order(&repo, a_id).await.unwrap();
        assert_eq!(names(&descendants), ["A1", "A1a", "A1b", "A2"]);
    }

    #[tokio::test]
    async fn test_empty_tree() {
        let repo = InMemoryGoalRepository::new();
        assert!(collect_leaves(&repo).await.unwrap().is_empty());
        assert!(collect_all_post_order(&repo).await.unwrap().is_empty());
    }
}
