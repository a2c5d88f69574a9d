//! Wiring shared by the commands that touch the goal store.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::adapters::filesystem::FsImageStore;
use crate::adapters::sqlite::{initialize_configured_database, SqliteGoalRepository};
use crate::cli::id_resolver::resolve_goal_id;
use crate::domain::models::{Config, Goal};
use crate::services::GoalService;

pub struct CliContext {
    pub pool: SqlitePool,
    pub service: GoalService<SqliteGoalRepository>,
    pub config: Config,
}

impl CliContext {
    /// Open the configured database and image directory.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = initialize_configured_database(&config.database)
            .await
            .context("Failed to initialize database. Run 'mango init' first.")?;

        let repository = Arc::new(SqliteGoalRepository::new(pool.clone()));
        let images = Arc::new(FsImageStore::new(&config.images.dir));

        Ok(Self {
            pool,
            service: GoalService::new(repository, images),
            config: config.clone(),
        })
    }

    /// Resolve an id or unique id prefix to an existing goal.
    pub async fn goal(&self, id_or_prefix: &str) -> Result<Goal> {
        let id = resolve_goal_id(&self.pool, id_or_prefix).await?;
        Ok(self.service.get_goal(id).await?)
    }
}
