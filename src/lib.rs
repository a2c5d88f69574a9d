//! Mango - hierarchical goal tracker
//!
//! Goals form a tree: top-level goals decompose into weighted sub-goals, and
//! a parent's completion is always the weighted average of its children's,
//! kept up to date all the way to the root after every change.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): goal model, errors and the repository and image ports
//! - **Adapters** (`adapters`): SQLite and in-memory goal stores, filesystem and in-memory image stores
//! - **Service Layer** (`services`): the goal service, tree traversal, deadline policy, XML/ICS interchange
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, project setup
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mango::adapters::memory::{InMemoryGoalRepository, InMemoryImageStore};
//! use mango::{CompletionWeight, Goal, GoalService};
//!
//! # async fn demo() -> mango::DomainResult<()> {
//! let service = GoalService::new(Arc::new(InMemoryGoalRepository::new()), Arc::new(InMemoryImageStore::new()));
//! let trip = service.insert(Goal::new("Trip", "Summer holiday"), None).await?;
//! service.insert(Goal::new("Book flights", "").with_completion(100), Some(trip)).await?;
//! service.insert(Goal::new("Pack", "").with_weight(CompletionWeight::High), Some(trip)).await?;
//! assert_eq!(service.get_goal(trip).await?.completion, 25);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{CompletionBand, CompletionWeight, Config, Goal};
pub use domain::ports::{GoalRepository, ImageStore};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{GoalService, IcsScope};
