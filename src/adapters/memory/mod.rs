//! In-memory adapters: a flat goal arena and an image map.

pub mod goal_repository;
pub mod image_store;

pub use goal_repository::InMemoryGoalRepository;
pub use image_store::InMemoryImageStore;
