pub mod config;
pub mod goal;

pub use config::{Config, DatabaseConfig, ExportConfig, ImageConfig, LoggingConfig};
pub use goal::{
    weighted_completion, CompletionBand, CompletionWeight, Goal, DATE_FORMAT, MAX_COMPLETION,
};
