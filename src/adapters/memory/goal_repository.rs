//! In-memory implementation of the GoalRepository.
//!
//! Goals live in a flat arena keyed by id. Parent and child links are ids
//! only, so there are no reference cycles to manage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Goal;
use crate::domain::ports::GoalRepository;

struct Node {
    goal: Goal,
    children: Vec<Uuid>,
}

#[derive(Default)]
struct Arena {
    nodes: HashMap<Uuid, Node>,
    top_level: Vec<Uuid>,
}

impl Arena {
    fn collect(&self, ids: &[Uuid]) -> Vec<Goal> {
        ids.iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|node| node.goal.clone())
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct InMemoryGoalRepository {
    arena: Arc<RwLock<Arena>>,
}

impl InMemoryGoalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored goals.
    pub async fn len(&self) -> usize {
        self.arena.read().await.nodes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.arena.read().await.nodes.is_empty()
    }
}

#[async_trait]
impl GoalRepository for InMemoryGoalRepository {
    async fn create(&self, goal: &Goal) -> DomainResult<()> {
        let mut arena = self.arena.write().await;

        if arena.nodes.contains_key(&goal.id) {
            return Err(DomainError::ValidationFailed(format!("Duplicate goal id: {}", goal.id)));
        }

        match goal.parent_id {
            Some(parent_id) => arena
                .nodes
                .get_mut(&parent_id)
                .ok_or(DomainError::GoalNotFound(parent_id))?
                .children
                .push(goal.id),
            None => arena.top_level.push(goal.id),
        }

        arena.nodes.insert(
            goal.id,
            Node {
                goal: goal.clone(),
                children: Vec::new(),
            },
        );
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Goal>> {
        let arena = self.arena.read().await;
        Ok(arena.nodes.get(&id).map(|node| node.goal.clone()))
    }

    async fn update(&self, goal: &Goal) -> DomainResult<()> {
        let mut arena = self.arena.write().await;
        let node = arena
            .nodes
            .get_mut(&goal.id)
            .ok_or(DomainError::GoalNotFound(goal.id))?;

        let stored = &mut node.goal;
        stored.name.clone_from(&goal.name);
        stored.description.clone_from(&goal.description);
        stored.image_name.clone_from(&goal.image_name);
        stored.completion = goal.completion;
        stored.weight = goal.weight;
        stored.deadline = goal.deadline;
        Ok(())
    }

    async fn set_completion(&self, id: Uuid, completion: u8) -> DomainResult<()> {
        let mut arena = self.arena.write().await;
        let node = arena.nodes.get_mut(&id).ok_or(DomainError::GoalNotFound(id))?;
        node.goal.completion = completion;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let mut arena = self.arena.write().await;
        let node = arena.nodes.get(&id).ok_or(DomainError::GoalNotFound(id))?;
        if !node.children.is_empty() {
            return Err(DomainError::HasChildren(id));
        }
        let parent_id = node.goal.parent_id;

        match parent_id {
            Some(pid) => {
                if let Some(parent) = arena.nodes.get_mut(&pid) {
                    parent.children.retain(|c| *c != id);
                }
            }
            None => arena.top_level.retain(|c| *c != id),
        }

        arena.nodes.remove(&id);
        Ok(())
    }

    async fn get_children(&self, parent_id: Uuid) -> DomainResult<Vec<Goal>> {
        let arena = self.arena.read().await;
        Ok(arena
            .nodes
            .get(&parent_id)
            .map(|node| arena.collect(&node.children))
            .unwrap_or_default())
    }

    async fn count_children(&self, parent_id: Uuid) -> DomainResult<u64> {
        let arena = self.arena.read().await;
        Ok(arena
            .nodes
            .get(&parent_id)
            .map_or(0, |node| node.children.len() as u64))
    }

    async fn get_top_level(&self) -> DomainResult<Vec<Goal>> {
        let arena = self.arena.read().await;
        Ok(arena.collect(&arena.top_level))
    }

    async fn get_top_level_at(&self, index: usize) -> DomainResult<Option<Goal>> {
        let arena = self.arena.read().await;
        Ok(arena
            .top_level
            .get(index)
            .and_then(|id| arena.nodes.get(id))
            .map(|node| node.goal.clone()))
    }

    async fn count_top_level(&self) -> DomainResult<u64> {
        Ok(self.arena.read().await.top_level.len() as u64)
    }

    async fn count_image_references(&self, image_name: &str) -> DomainResult<u64> {
        let arena = self.arena.read().await;
        Ok(arena
            .nodes
            .values()
            .filter(|node| node.goal.image_name == image_name)
            .count() as u64)
    }
}
