//! Implementation of the `mango init` command.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::setup::{init_project, SetupPaths};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite the config file even if it already exists
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_dir: PathBuf,
    pub config_written: bool,
    pub images_dir_created: bool,
    pub database_created: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push("  - wrote config.yaml".to_string());
        }
        if self.images_dir_created {
            lines.push("  - created images/".to_string());
        }
        if self.database_created {
            lines.push("  - created mango.db".to_string());
        }
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let paths = SetupPaths::new()?;
    let already = paths.is_initialized();

    let report = init_project(&paths, args.force).await?;

    let message = if already && !args.force {
        format!("Project already initialized in {}", paths.config_dir.display())
    } else {
        format!("Initialized Mango project in {}", paths.config_dir.display())
    };

    let out = InitOutput {
        success: true,
        message,
        config_dir: paths.config_dir,
        config_written: report.config_written,
        images_dir_created: report.images_dir_created,
        database_created: report.migrations_applied,
    };
    output(&out, json_mode);
    Ok(())
}
