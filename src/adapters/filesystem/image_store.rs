//! Filesystem image store: one file per asset in a single directory.

use async_trait::async_trait;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::image_store::{unique_name, ImageStore};

#[derive(Debug, Clone)]
pub struct FsImageStore {
    dir: PathBuf,
}

impl FsImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve an asset name inside the image directory.
    ///
    /// Names are plain file names; anything that could escape the
    /// directory is rejected.
    fn path_for(&self, name: &str) -> DomainResult<PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
        {
            return Err(DomainError::ValidationFailed(format!("Invalid image name: '{name}'")));
        }
        Ok(self.dir.join(name))
    }

    async fn existing_names(&self) -> DomainResult<HashSet<String>> {
        let mut names = HashSet::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                names.insert(name.to_string());
            }
        }
        Ok(names)
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn exists(&self, name: &str) -> DomainResult<bool> {
        let Ok(path) = self.path_for(name) else {
            return Ok(false);
        };
        Ok(tokio::fs::try_exists(path).await?)
    }

    async fn save(&self, preferred_name: &str, bytes: &[u8]) -> DomainResult<String> {
        self.path_for(preferred_name)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let taken = self.existing_names().await?;
        let name = unique_name(preferred_name, |candidate| taken.contains(candidate));
        tokio::fs::write(self.dir.join(&name), bytes).await?;

        tracing::debug!(image = %name, bytes = bytes.len(), "image saved");
        Ok(name)
    }

    async fn load(&self, name: &str) -> DomainResult<Vec<u8>> {
        Ok(tokio::fs::read(self.path_for(name)?).await?)
    }

    async fn delete(&self, name: &str) -> DomainResult<()> {
        match tokio::fs::remove_file(self.path_for(name)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path().join("images"));

        let name = store.save("goal.png", b"png-bytes").await.unwrap();
        assert_eq!(name, "goal.png");
        assert!(store.exists(&name).await.unwrap());
        assert_eq!(store.load(&name).await.unwrap(), b"png-bytes");

        let second = store.save("goal.png", b"other").await.unwrap();
        assert_eq!(second, "goal-1.png");

        store.delete(&name).await.unwrap();
        assert!(!store.exists(&name).await.unwrap());
        // Deleting again is fine
        store.delete(&name).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());

        assert!(store.save("../escape.png", b"x").await.is_err());
        assert!(!store.exists("../escape.png").await.unwrap());
        assert!(store.delete("a/b.png").await.is_err());
    }
}
