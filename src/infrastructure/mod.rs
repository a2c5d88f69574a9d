//! Infrastructure layer module
//!
//! - Configuration management
//! - Logging infrastructure
//! - Project setup

pub mod config;
pub mod logging;
pub mod setup;
