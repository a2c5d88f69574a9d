//! Short ID prefix resolution for CLI commands.
//!
//! Allows users to specify any unique prefix of a goal UUID instead of the
//! full ID, similar to git short hashes.

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

const GOAL_QUERY: &str = "SELECT id FROM goals WHERE id LIKE ? ORDER BY seq";

/// Resolve a goal ID prefix to a full UUID.
pub async fn resolve_goal_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    // Fast path: a full UUID is returned as is; existence is checked by the caller
    if let Ok(uuid) = Uuid::parse_str(prefix) {
        return Ok(uuid);
    }

    validate_prefix(prefix)?;

    let pattern = format!("{}%", prefix.to_lowercase());
    let rows: Vec<(String,)> = sqlx::query_as(GOAL_QUERY).bind(&pattern).fetch_all(pool).await?;

    match rows.as_slice() {
        [] => bail!("No goal found matching '{prefix}'"),
        [(id,)] => Ok(Uuid::parse_str(id)?),
        _ => {
            let mut msg = format!("Ambiguous prefix '{prefix}': matches {} goals:", rows.len());
            for (id,) in &rows {
                msg.push_str(&format!("\n  {id}"));
            }
            bail!("{msg}")
        }
    }
}

fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        bail!("ID prefix must not be empty");
    }
    if !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        bail!("Invalid ID prefix '{prefix}': must contain only hex characters and dashes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteGoalRepository};
    use crate::domain::models::Goal;
    use crate::domain::ports::GoalRepository;

    #[tokio::test]
    async fn test_resolve_prefix() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteGoalRepository::new(pool.clone());
        let goal = Goal::new("Prefix", "");
        repo.create(&goal).await.unwrap();

        let full = goal.id.to_string();
        assert_eq!(resolve_goal_id(&pool, &full[..6]).await.unwrap(), goal.id);
        assert_eq!(resolve_goal_id(&pool, &full[..6].to_uppercase()).await.unwrap(), goal.id);
        assert_eq!(resolve_goal_id(&pool, &full).await.unwrap(), goal.id);
    }

    #[tokio::test]
    async fn test_resolve_errors() {
        let pool = create_migrated_test_pool().await.unwrap();
        assert!(resolve_goal_id(&pool, "").await.is_err());
        assert!(resolve_goal_id(&pool, "xyz").await.is_err());

        let err = resolve_goal_id(&pool, "abc").await.unwrap_err();
        assert!(err.to_string().contains("No goal found"));
    }

    #[tokio::test]
    async fn test_ambiguous_prefix() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteGoalRepository::new(pool.clone());
        for _ in 0..40 {
            repo.create(&Goal::new("g", "")).await.unwrap();
        }
        // 40 random ids over 16 leading hex digits: some digit repeats
        let ids: Vec<(String,)> = sqlx::query_as("SELECT id FROM goals").fetch_all(&pool).await.unwrap();
        let mut firsts: Vec<char> = ids.iter().filter_map(|(id,)| id.chars().next()).collect();
        firsts.sort_unstable();
        let repeated = firsts.windows(2).find(|w| w[0] == w[1]).map(|w| w[0]).unwrap();

        let err = resolve_goal_id(&pool, &repeated.to_string()).await.unwrap_err();
        assert!(err.to_string().contains("Ambiguous prefix"));
    }
}
