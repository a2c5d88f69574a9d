//! CLI type definitions
//!
//! The top-level clap parser; each subcommand's arguments live next to its
//! implementation in `cli::commands`.

use clap::{Parser, Subcommand};

use crate::cli::commands::exchange::{ExportArgs, ImportArgs};
use crate::cli::commands::goal::GoalArgs;
use crate::cli::commands::init::InitArgs;

#[derive(Parser, Debug)]
#[command(name = "mango")]
#[command(about = "Mango - hierarchical goal tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration, image directory and database
    Init(InitArgs),

    /// Goal management commands
    Goal(GoalArgs),

    /// Export goals to a file
    Export(ExportArgs),

    /// Import goals from a file
    Import(ImportArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::exchange::{ExportCommands, ImportCommands};
    use crate::cli::commands::goal::GoalCommands;
    use crate::domain::models::CompletionWeight;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_goal_add() {
        let cli = Cli::try_parse_from([
            "mango", "goal", "add", "Learn Rust", "-d", "Read the book", "--parent", "1a2b",
            "--deadline", "2031-01-31", "--weight", "high", "--json",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Goal(GoalArgs { command: GoalCommands::Add { name, parent, deadline, weight, completion, .. } }) =
            cli.command
        else {
            panic!("expected goal add");
        };
        assert_eq!(name, "Learn Rust");
        assert_eq!(parent.as_deref(), Some("1a2b"));
        assert_eq!(deadline.map(|d| d.to_string()), Some("2031-01-31".to_string()));
        assert_eq!(weight, CompletionWeight::High);
        assert_eq!(completion, 0);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Cli::try_parse_from(["mango", "goal", "progress", "abc", "101"]).is_err());
        assert!(Cli::try_parse_from(["mango", "goal", "add", "x", "--deadline", "31.01.2031"]).is_err());
        assert!(Cli::try_parse_from(["mango", "goal", "add", "x", "--weight", "huge"]).is_err());
        assert!(Cli::try_parse_from(["mango", "goal", "edit", "abc", "--image", "a.png", "--clear-image"]).is_err());
    }

    #[test]
    fn test_parse_exchange() {
        let cli = Cli::try_parse_from(["mango", "export", "ics", "out.ics", "--all"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Export(ExportArgs { format: ExportCommands::Ics { all: true, .. } })
        ));

        let cli = Cli::try_parse_from(["mango", "import", "xml", "in.xml", "--replace"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Import(ImportArgs { format: ImportCommands::Xml { replace: true, .. } })
        ));
    }
}
