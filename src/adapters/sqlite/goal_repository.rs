//! SQLite implementation of the GoalRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_date, parse_optional_date, parse_optional_uuid, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CompletionWeight, Goal, DATE_FORMAT};
use crate::domain::ports::GoalRepository;

const GOAL_COLUMNS: &str =
    "id, parent_id, name, description, image_name, completion, completion_weight, deadline, created_on";

#[derive(Clone)]
pub struct SqliteGoalRepository {
    pool: SqlitePool,
}

impl SqliteGoalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: Uuid) -> DomainResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM goals WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

/// Empty strings are stored as NULL.
fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[async_trait]
impl GoalRepository for SqliteGoalRepository {
    async fn create(&self, goal: &Goal) -> DomainResult<()> {
        if let Some(parent_id) = goal.parent_id {
            if !self.exists(parent_id).await? {
                return Err(DomainError::GoalNotFound(parent_id));
            }
        }

        sqlx::query(
            r#"INSERT INTO goals (id, parent_id, name, description, image_name, completion, completion_weight, deadline, created_on)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(goal.id.to_string())
        .bind(goal.parent_id.map(|id| id.to_string()))
        .bind(&goal.name)
        .bind(non_empty(&goal.description))
        .bind(non_empty(&goal.image_name))
        .bind(i64::from(goal.completion))
        .bind(i64::from(goal.weight.value()))
        .bind(goal.deadline.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(goal.created_on.format(DATE_FORMAT).to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Goal>> {
        let row: Option<GoalRow> = sqlx::query_as(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, goal: &Goal) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE goals SET name = ?, description = ?, image_name = ?, completion = ?,
               completion_weight = ?, deadline = ?
               WHERE id = ?"#
        )
        .bind(&goal.name)
        .bind(non_empty(&goal.description))
        .bind(non_empty(&goal.image_name))
        .bind(i64::from(goal.completion))
        .bind(i64::from(goal.weight.value()))
        .bind(goal.deadline.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(goal.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GoalNotFound(goal.id));
        }

        Ok(())
    }

    async fn set_completion(&self, id: Uuid, completion: u8) -> DomainResult<()> {
        let result = sqlx::query("UPDATE goals SET completion = ? WHERE id = ?")
            .bind(i64::from(completion))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GoalNotFound(id));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        if self.count_children(id).await? > 0 {
            return Err(DomainError::HasChildren(id));
        }

        let result = sqlx::query("DELETE FROM goals WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GoalNotFound(id));
        }

        Ok(())
    }

    async fn get_children(&self, parent_id: Uuid) -> DomainResult<Vec<Goal>> {
        let rows: Vec<GoalRow> = sqlx::query_as(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE parent_id = ? ORDER BY seq"
        ))
        .bind(parent_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_children(&self, parent_id: Uuid) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM goals WHERE parent_id = ?")
            .bind(parent_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(count.unsigned_abs())
    }

    async fn get_top_level(&self) -> DomainResult<Vec<Goal>> {
        let rows: Vec<GoalRow> = sqlx::query_as(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE parent_id IS NULL ORDER BY seq"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_top_level_at(&self, index: usize) -> DomainResult<Option<Goal>> {
        let offset = i64::try_from(index)
            .map_err(|_| DomainError::ValidationFailed(format!("Index too large: {index}")))?;

        let row: Option<GoalRow> = sqlx::query_as(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE parent_id IS NULL ORDER BY seq LIMIT 1 OFFSET ?"
        ))
        .bind(offset)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn count_top_level(&self) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM goals WHERE parent_id IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.unsigned_abs())
    }

    async fn count_image_references(&self, image_name: &str) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM goals WHERE image_name = ?")
            .bind(image_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.unsigned_abs())
    }
}

#[derive(sqlx::FromRow)]
struct GoalRow {
    id: String,
    parent_id: Option<String>,
    name: String,
    description: Option<String>,
    image_name: Option<String>,
    completion: i64,
    completion_weight: i64,
    deadline: Option<String>,
    created_on: String,
}

impl TryFrom<GoalRow> for Goal {
    type Error = DomainError;

    fn try_from(row: GoalRow) -> Result<Self, Self::Error> {
        let completion = u8::try_from(row.completion)
            .map_err(|_| DomainError::SerializationError(format!("Invalid completion: {}", row.completion)))?;

        let weight = u32::try_from(row.completion_weight)
            .ok()
            .and_then(CompletionWeight::from_value)
            .ok_or_else(|| {
                DomainError::SerializationError(format!("Invalid completion weight: {}", row.completion_weight))
            })?;

        Ok(Goal {
            id: parse_uuid(&row.id)?,
            name: row.name,
            description: row.description.unwrap_or_default(),
            image_name: row.image_name.unwrap_or_default(),
            completion,
            weight,
            deadline: parse_optional_date(row.deadline)?,
            created_on: parse_date(&row.created_on)?,
            parent_id: parse_optional_uuid(row.parent_id)?,
        })
    }
}
