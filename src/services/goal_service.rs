//! Goal service: the single entry point for reading and mutating the goal tree.
//!
//! The repository only stores rows. This service keeps the tree consistent:
//! it recalculates completion up the ancestor chain after every change,
//! cascades deletes through subtrees and releases image assets.

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{weighted_completion, Goal, MAX_COMPLETION};
use crate::domain::ports::{GoalRepository, ImageStore};
use crate::services::goal_traversal;

pub struct GoalService<R: GoalRepository> {
    repository: Arc<R>,
    images: Arc<dyn ImageStore>,
}

impl<R: GoalRepository> GoalService<R> {
    pub fn new(repository: Arc<R>, images: Arc<dyn ImageStore>) -> Self {
        Self { repository, images }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn images(&self) -> &dyn ImageStore {
        self.images.as_ref()
    }

    /// Number of top-level goals.
    pub async fn count_top_level(&self) -> DomainResult<u64> {
        self.repository.count_top_level().await
    }

    /// Top-level goal at `index` (insertion order).
    pub async fn get_top_level(&self, index: usize) -> DomainResult<Goal> {
        if let Some(goal) = self.repository.get_top_level_at(index).await? {
            return Ok(goal);
        }
        let count = self.repository.count_top_level().await?;
        Err(DomainError::TopLevelIndexOutOfRange { index, count })
    }

    /// All top-level goals (insertion order).
    pub async fn top_level_goals(&self) -> DomainResult<Vec<Goal>> {
        self.repository.get_top_level().await
    }

    /// Get a goal by ID, failing with `GoalNotFound` if it does not exist.
    pub async fn get_goal(&self, id: Uuid) -> DomainResult<Goal> {
        self.repository.get(id).await?.ok_or(DomainError::GoalNotFound(id))
    }

    pub async fn has_children(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.repository.count_children(id).await? > 0)
    }

    /// Direct children of a goal (insertion order, possibly empty).
    pub async fn get_children(&self, parent_id: Uuid) -> DomainResult<Vec<Goal>> {
        self.repository.get_children(parent_id).await
    }

    /// Ancestors of a goal, nearest first.
    pub async fn ancestors(&self, id: Uuid) -> DomainResult<Vec<Goal>> {
        let goal = self.get_goal(id).await?;
        let mut ancestors = Vec::new();
        let mut next = goal.parent_id;
        while let Some(pid) = next {
            let parent = self.get_goal(pid).await?;
            next = parent.parent_id;
            ancestors.push(parent);
        }
        Ok(ancestors)
    }

    pub async fn collect_leaves(&self) -> DomainResult<Vec<Goal>> {
        goal_traversal::collect_leaves(self.repository.as_ref()).await
    }

    pub async fn collect_all_post_order(&self) -> DomainResult<Vec<Goal>> {
        goal_traversal::collect_all_post_order(self.repository.as_ref()).await
    }

    /// Insert a new goal below `parent_id` (or at the top level) and return its fresh id.
    ///
    /// The goal's own `id` and `parent_id` are ignored. The parent's
    /// completion, and its ancestors', is recalculated afterwards.
    pub async fn insert(&self, goal: Goal, parent_id: Option<Uuid>) -> DomainResult<Uuid> {
        let goal = Goal {
            id: Uuid::new_v4(),
            parent_id,
            ..goal
        };
        goal.validate().map_err(DomainError::ValidationFailed)?;

        self.repository.create(&goal).await?;
        info!(goal_id = %goal.id, parent_id = ?parent_id, name = %goal.name, "goal inserted");

        self.refresh_ancestors(parent_id).await?;
        Ok(goal.id)
    }

    /// Overwrite the editable fields of goal `id` with those of `changes`.
    ///
    /// Name, description, image, weight and deadline are always taken. The
    /// completion is only taken while the goal is a leaf; otherwise the
    /// derived value is kept. A replaced image asset is released.
    pub async fn update(&self, id: Uuid, changes: &Goal) -> DomainResult<Goal> {
        let existing = self.get_goal(id).await?;
        let is_leaf = !self.has_children(id).await?;

        let updated = Goal {
            name: changes.name.clone(),
            description: changes.description.clone(),
            image_name: changes.image_name.clone(),
            weight: changes.weight,
            deadline: changes.deadline,
            completion: if is_leaf { changes.completion } else { existing.completion },
            ..existing.clone()
        };
        updated.validate().map_err(DomainError::ValidationFailed)?;

        self.repository.update(&updated).await?;
        info!(goal_id = %id, "goal updated");

        if existing.image_name != updated.image_name {
            self.release_image(&existing.image_name).await;
        }

        self.refresh_ancestors(updated.parent_id).await?;
        Ok(updated)
    }

    /// Delete a goal together with its whole subtree.
    ///
    /// Descendants go first (post order), each one's image released right
    /// after its row is removed. The former parent is recalculated
    /// afterwards. Returns true if the deleted goal was a top-level goal.
    pub async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let goal = self.get_goal(id).await?;
        let removed = self.delete_subtree(goal.clone(), true).await?;
        info!(goal_id = %id, removed, "goal deleted");

        if let Some(parent_id) = goal.parent_id {
            self.recalculate_completion(parent_id).await?;
        }
        Ok(goal.is_top_level())
    }

    /// Delete every goal, optionally releasing all image assets too.
    pub async fn clear(&self, with_images: bool) -> DomainResult<usize> {
        let mut removed = 0;
        for goal in self.repository.get_top_level().await? {
            removed += self.delete_subtree(goal, with_images).await?;
        }
        info!(removed, with_images, "goal tree cleared");
        Ok(removed)
    }

    /// Recompute the completion of `id` from its direct children, then of
    /// each ancestor in turn up to the root.
    ///
    /// Returns `Ok(false)` without changing anything if `id` has no
    /// children: there is nothing to aggregate.
    pub async fn recalculate_completion(&self, id: Uuid) -> DomainResult<bool> {
        let mut current = self.get_goal(id).await?;
        let mut recalculated = false;

        loop {
            let children = self.repository.get_children(current.id).await?;
            let Some(completion) = weighted_completion(children.iter().map(|c| (c.completion, c.weight))) else {
                debug!(goal_id = %current.id, "no sub-goals to aggregate");
                return Ok(recalculated);
            };

            self.repository.set_completion(current.id, completion).await?;
            debug!(goal_id = %current.id, completion, "completion recalculated");
            recalculated = true;

            match current.parent_id {
                Some(parent_id) => current = self.get_goal(parent_id).await?,
                None => return Ok(true),
            }
        }
    }

    /// Set the completion of a leaf goal and propagate it upwards.
    ///
    /// Fails with `CompletionIsDerived` if the goal has sub-goals.
    pub async fn set_leaf_completion(&self, id: Uuid, completion: u8) -> DomainResult<()> {
        let goal = self.get_goal(id).await?;
        if self.has_children(id).await? {
            return Err(DomainError::CompletionIsDerived(id));
        }
        if completion > MAX_COMPLETION {
            return Err(DomainError::ValidationFailed(format!(
                "Completion must be between 0 and {MAX_COMPLETION}, got {completion}"
            )));
        }

        self.repository.set_completion(id, completion).await?;
        info!(goal_id = %id, completion, "leaf completion set");

        self.refresh_ancestors(goal.parent_id).await
    }

    /// Store `bytes` as the goal's image, replacing any previous one.
    pub async fn attach_image(&self, id: Uuid, file_name: &str, bytes: &[u8]) -> DomainResult<String> {
        let mut goal = self.get_goal(id).await?;
        let stored_as = self.images.save(file_name, bytes).await?;
        let previous = std::mem::replace(&mut goal.image_name, stored_as.clone());

        self.repository.update(&goal).await?;
        info!(goal_id = %id, image = %stored_as, "image attached");

        self.release_image(&previous).await;
        Ok(stored_as)
    }

    /// Remove the goal's image and release the asset.
    pub async fn detach_image(&self, id: Uuid) -> DomainResult<()> {
        let mut goal = self.get_goal(id).await?;
        if !goal.has_image() {
            return Ok(());
        }
        let previous = std::mem::take(&mut goal.image_name);
        self.repository.update(&goal).await?;
        self.release_image(&previous).await;
        Ok(())
    }

    async fn refresh_ancestors(&self, parent_id: Option<Uuid>) -> DomainResult<()> {
        if let Some(parent_id) = parent_id {
            self.recalculate_completion(parent_id).await?;
        }
        Ok(())
    }

    async fn delete_subtree(&self, root: Goal, release_images: bool) -> DomainResult<usize> {
        let doomed = goal_traversal::subtree_post_order(self.repository.as_ref(), root).await?;
        for goal in &doomed {
            self.repository.delete(goal.id).await?;
            if release_images {
                self.release_image(&goal.image_name).await;
            }
        }
        Ok(doomed.len())
    }

    /// Best-effort asset deletion; failures never block the data change.
    ///
    /// Call after the goal row no longer points at `name`. An asset still
    /// referenced by another goal is kept.
    async fn release_image(&self, name: &str) {
        if name.is_empty() {
            return;
        }
        match self.repository.count_image_references(name).await {
            Ok(0) => {}
            Ok(count) => {
                debug!(image = %name, references = count, "image still in use");
                return;
            }
            Err(e) => {
                warn!(image = %name, error = %e, "failed to count image references, keeping image");
                return;
            }
        }
        if let Err(e) = self.images.delete(name).await {
            warn!(image = %name, error = %e, "failed to delete image");
        }
    }
}
