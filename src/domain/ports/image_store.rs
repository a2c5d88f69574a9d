//! Image store port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Storage for image assets attached to goals.
///
/// Goals reference assets by name only. The store decides the final name
/// of a saved asset, so a saved file is never overwritten. Imported goals
/// may point at an asset that is already in use; `GoalService` deletes an
/// asset only once no goal references it.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Whether an asset with this name exists.
    async fn exists(&self, name: &str) -> DomainResult<bool>;

    /// Save an asset and return the name it was stored under.
    ///
    /// `preferred_name` is used as-is when free, otherwise a numbered
    /// variant (`photo-1.png`, `photo-2.png`, ...) is chosen.
    async fn save(&self, preferred_name: &str, bytes: &[u8]) -> DomainResult<String>;

    /// Read an asset.
    async fn load(&self, name: &str) -> DomainResult<Vec<u8>>;

    /// Delete an asset. Deleting a missing asset is not an error.
    async fn delete(&self, name: &str) -> DomainResult<()>;
}

/// Pick the first candidate name not rejected by `is_taken`.
///
/// `photo.png` becomes `photo-1.png`, `photo-2.png`, ... Names without an
/// extension get the counter appended.
pub fn unique_name<F>(preferred_name: &str, mut is_taken: F) -> String
where
    F: FnMut(&str) -> bool,
{
    if !is_taken(preferred_name) {
        return preferred_name.to_string();
    }

    let (base, suffix) = match preferred_name.rfind('.') {
        Some(pos) if pos > 0 => preferred_name.split_at(pos),
        _ => (preferred_name, ""),
    };

    let mut index = 1u32;
    loop {
        let candidate = format!("{base}-{index}{suffix}");
        if !is_taken(&candidate) {
            return candidate;
        }
        index += 1;
    }
}
