//! In-memory image store, mainly for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::image_store::{unique_name, ImageStore};

#[derive(Clone, Default)]
pub struct InMemoryImageStore {
    images: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all stored assets, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.images.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn exists(&self, name: &str) -> DomainResult<bool> {
        Ok(self.images.read().await.contains_key(name))
    }

    async fn save(&self, preferred_name: &str, bytes: &[u8]) -> DomainResult<String> {
        let mut images = self.images.write().await;
        let name = unique_name(preferred_name, |candidate| images.contains_key(candidate));
        images.insert(name.clone(), bytes.to_vec());
        Ok(name)
    }

    async fn load(&self, name: &str) -> DomainResult<Vec<u8>> {
        self.images
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::Io(format!("Image not found: {name}")))
    }

    async fn delete(&self, name: &str) -> DomainResult<()> {
        self.images.write().await.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_picks_unique_names() {
        let store = InMemoryImageStore::new();
        let first = store.save("image.png", b"one").await.unwrap();
        let second = store.save("image.png", b"two").await.unwrap();

        assert_eq!(first, "image.png");
        assert_eq!(second, "image-1.png");
        assert_eq!(store.load(&second).await.unwrap(), b"two");

        store.delete(&first).await.unwrap();
        assert!(!store.exists(&first).await.unwrap());
        assert_eq!(store.names().await, vec!["image-1.png".to_string()]);
    }
}
