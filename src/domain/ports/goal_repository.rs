//! Goal repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Goal;

/// Row-level storage for goals.
///
/// Implementations hold no business rules: completion aggregation,
/// cascading deletes and image cleanup live in `GoalService`. Children and
/// top-level goals are always returned in insertion order.
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// Store a new goal. Fails with `GoalNotFound` if its parent is missing.
    async fn create(&self, goal: &Goal) -> DomainResult<()>;

    /// Get a goal by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Goal>>;

    /// Overwrite the mutable columns of an existing goal.
    ///
    /// `id`, `parent_id` and `created_on` are never changed.
    async fn update(&self, goal: &Goal) -> DomainResult<()>;

    /// Overwrite only the completion of an existing goal.
    async fn set_completion(&self, id: Uuid, completion: u8) -> DomainResult<()>;

    /// Delete a single goal. Fails with `HasChildren` if it still has any.
    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    /// Get the direct children of a goal.
    async fn get_children(&self, parent_id: Uuid) -> DomainResult<Vec<Goal>>;

    /// Count the direct children of a goal.
    async fn count_children(&self, parent_id: Uuid) -> DomainResult<u64>;

    /// Get all top-level goals.
    async fn get_top_level(&self) -> DomainResult<Vec<Goal>>;

    /// Get the top-level goal at a position.
    async fn get_top_level_at(&self, index: usize) -> DomainResult<Option<Goal>>;

    /// Count top-level goals.
    async fn count_top_level(&self) -> DomainResult<u64>;

    /// Count the goals whose image is the asset `image_name`.
    async fn count_image_references(&self, image_name: &str) -> DomainResult<u64>;
}
