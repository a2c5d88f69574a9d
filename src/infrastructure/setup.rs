//! Project initialization
//!
//! `mango init` creates the project directory with:
//! - a commented default config file
//! - the image directory
//! - the migrated SQLite database

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::adapters::sqlite::{database_url, initialize_database};
use crate::infrastructure::config::PROJECT_DIR;

/// Default configuration template content
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Mango Configuration
# Override settings in .mango/local.yaml or with MANGO_ environment
# variables, using "__" for nesting:
#   export MANGO_LOGGING__LEVEL=debug
#   export MANGO_EXPORT__ICS_SCOPE=all

# Goal database
database:
  # Path to SQLite database file (project-local)
  path: ".mango/mango.db"

  # Maximum number of database connections in pool
  max_connections: 5

# Goal images
images:
  # Directory holding image assets
  dir: ".mango/images"

# Logging (written to stderr)
logging:
  # Log level: trace, debug, info, warn, error
  level: "warn"

  # Log format: json, pretty
  format: "pretty"

  # Optional directory for rolling JSON log files
  # log_dir: ".mango/logs"

  # File rotation: daily, hourly, never
  rotation: "daily"

# Import/export
export:
  # Goals exported to iCalendar: leaves, all
  ics_scope: "leaves"
"#;

/// Setup paths and directories
#[derive(Debug, Clone)]
pub struct SetupPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub database_file: PathBuf,
    pub images_dir: PathBuf,
}

impl SetupPaths {
    /// Paths for a project rooted at `root`
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        let config_dir = root.as_ref().join(PROJECT_DIR);
        Self {
            config_file: config_dir.join("config.yaml"),
            database_file: config_dir.join("mango.db"),
            images_dir: config_dir.join("images"),
            config_dir,
        }
    }

    /// Paths for the current directory
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::for_root(current_dir))
    }

    /// Check if the project is already initialized
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists() && self.database_file.exists()
    }
}

/// What `init` did
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SetupReport {
    pub config_written: bool,
    pub images_dir_created: bool,
    pub migrations_applied: bool,
}

/// Write the default configuration file. An existing file is only
/// replaced with `force`.
pub fn create_config_file(paths: &SetupPaths, force: bool) -> Result<bool> {
    if paths.config_file.exists() && !force {
        return Ok(false);
    }

    fs::create_dir_all(&paths.config_dir).context("Failed to create config directory")?;
    fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE).context("Failed to write config file")?;
    Ok(true)
}

/// Create the image directory
pub fn create_images_dir(paths: &SetupPaths) -> Result<bool> {
    if paths.images_dir.exists() {
        return Ok(false);
    }
    fs::create_dir_all(&paths.images_dir).context("Failed to create image directory")?;
    Ok(true)
}

/// Create the database and apply pending migrations. Existing goals are kept.
pub async fn run_migrations(paths: &SetupPaths) -> Result<bool> {
    let existed = paths.database_file.exists();
    let url = database_url(&paths.database_file.to_string_lossy());

    let pool = initialize_database(&url, None)
        .await
        .context("Failed to initialize database")?;
    pool.close().await;

    Ok(!existed)
}

/// Run every setup step. Safe to repeat; `force` only rewrites the config.
pub async fn init_project(paths: &SetupPaths, force: bool) -> Result<SetupReport> {
    let config_written = create_config_file(paths, force)?;
    let images_dir_created = create_images_dir(paths)?;
    let migrations_applied = run_migrations(paths).await?;

    tracing::info!(
        config_dir = %paths.config_dir.display(),
        config_written,
        images_dir_created,
        "project initialized"
    );

    Ok(SetupReport {
        config_written,
        images_dir_created,
        migrations_applied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::Config;

    #[test]
    fn test_template_parses_to_defaults() {
        let config: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        let defaults = Config::default();
        assert_eq!(config.database.path, defaults.database.path);
        assert_eq!(config.images.dir, defaults.images.dir);
        assert_eq!(config.logging.level, defaults.logging.level);
        assert_eq!(config.export.ics_scope, defaults.export.ics_scope);
    }

    #[tokio::test]
    async fn test_init_project() {
        let root = tempfile::tempdir().unwrap();
        let paths = SetupPaths::for_root(root.path());
        assert!(!paths.is_initialized());

        let report = init_project(&paths, false).await.unwrap();
        assert!(report.config_written);
        assert!(report.images_dir_created);
        assert!(report.migrations_applied);
        assert!(paths.is_initialized());
        assert!(paths.images_dir.is_dir());

        let again = init_project(&paths, false).await.unwrap();
        assert!(!again.config_written);
        assert!(!again.images_dir_created);
        assert!(!again.migrations_applied);
    }

    #[tokio::test]
    async fn test_force_rewrites_config() {
        let root = tempfile::tempdir().unwrap();
        let paths = SetupPaths::for_root(root.path());
        fs::create_dir_all(&paths.config_dir).unwrap();
        fs::write(&paths.config_file, "logging:\n  level: debug\n").unwrap();

        assert!(!create_config_file(&paths, false).unwrap());
        assert!(create_config_file(&paths, true).unwrap());
        let content = fs::read_to_string(&paths.config_file).unwrap();
        assert!(content.starts_with("# Mango Configuration"));
    }
}
