//! Domain layer for the Mango goal tree
//!
//! This module contains the goal model, the completion aggregation rule
//! and the port traits that storage adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
