//! Command-line front end.

pub mod commands;
pub mod context;
pub mod id_resolver;
pub mod output;
pub mod tree;
pub mod types;

pub use types::{Cli, Commands};

use console::style;

use crate::domain::errors::DomainError;

/// Print `err` for a human or as JSON, then exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let kind = err.downcast_ref::<DomainError>().map_or("error", DomainError::kind);
        let body = serde_json::json!({
            "success": false,
            "kind": kind,
            "error": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", style("Error:").red().bold());
    }
    std::process::exit(1)
}
