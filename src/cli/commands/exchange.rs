//! `mango export` and `mango import`.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::context::CliContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::interchange::{export_ics_file, export_xml_file, import_xml, replace_with_xml};
use crate::services::IcsScope;

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub format: ExportCommands,
}

#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Write the goal tree as XML
    Xml {
        /// Output file
        path: PathBuf,
    },
    /// Write goal deadlines as an iCalendar file
    Ics {
        /// Output file
        path: PathBuf,
        /// Export every goal, not only goals without sub-goals
        #[arg(long)]
        all: bool,
    },
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    #[command(subcommand)]
    pub format: ImportCommands,
}

#[derive(Subcommand, Debug)]
pub enum ImportCommands {
    /// Read goals from an XML file
    Xml {
        /// Input file
        path: PathBuf,
        /// Delete all existing goals first
        #[arg(long)]
        replace: bool,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct ExchangeOutput {
    pub success: bool,
    pub message: String,
    pub path: PathBuf,
    pub goals: Option<usize>,
}

impl CommandOutput for ExchangeOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub async fn execute_export(args: ExportArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = CliContext::open(config).await?;

    let (path, message) = match args.format {
        ExportCommands::Xml { path } => {
            if !export_xml_file(&ctx.service, &path).await {
                bail!("XML export to {} failed", path.display());
            }
            let message = format!("Exported goal tree to {}", path.display());
            (path, message)
        }
        ExportCommands::Ics { path, all } => {
            let scope = if all {
                IcsScope::All
            } else {
                IcsScope::from_str(&ctx.config.export.ics_scope).unwrap_or_default()
            };
            if !export_ics_file(&ctx.service, &path, scope).await {
                bail!("Calendar export to {} failed", path.display());
            }
            let message = format!("Exported {} goal deadlines to {}", scope.as_str(), path.display());
            (path, message)
        }
    };

    let out = ExchangeOutput {
        success: true,
        message,
        path,
        goals: None,
    };
    output(&out, json_mode);
    Ok(())
}

pub async fn execute_import(args: ImportArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = CliContext::open(config).await?;

    let ImportCommands::Xml { path, replace } = args.format;
    let xml = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let imported = if replace {
        replace_with_xml(&ctx.service, &xml).await
    } else {
        import_xml(&ctx.service, &xml).await
    };
    let count = imported.with_context(|| format!("Failed to import {}", path.display()))?;

    let out = ExchangeOutput {
        success: true,
        message: format!("Imported {count} goal(s) from {}", path.display()),
        path,
        goals: Some(count),
    };
    output(&out, json_mode);
    Ok(())
}
