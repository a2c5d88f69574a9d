//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - GoalRepository: row-level storage of goals
//! - ImageStore: storage of image assets attached to goals
//!
//! These traits keep the goal service independent of SQLite, the
//! filesystem, or any in-memory test double.

pub mod goal_repository;
pub mod image_store;

pub use goal_repository::GoalRepository;
pub use image_store::ImageStore;
