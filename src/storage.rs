use std::path::PathBuf;

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;

/// Blob storage for avatar files. Keys are flat storage-relative names
/// (no directory components).
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
}

/// Local-disk storage rooted at the configured upload directory.
#[derive(Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub async fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create upload dir {}", root.display()))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        anyhow::ensure!(is_safe_key(key), "unsafe storage key {:?}", key);
        Ok(self.root.join(key))
    }
}

/// Storage keys must be plain file names; anything that could escape the
/// upload directory is refused.
pub fn is_safe_key(key: &str) -> bool {
    !key.is_empty() && !key.contains('/') && !key.contains('\\') && !key.contains("..")
}

#[async_trait]
impl StorageClient for DiskStorage {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("delete {}", path.display())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_traversal_keys() {
        assert!(is_safe_key("a1b2.png"));
        assert!(is_safe_key("plain"));
        assert!(!is_safe_key(""));
        assert!(!is_safe_key("../etc/passwd"));
        assert!(!is_safe_key("a/b.png"));
        assert!(!is_safe_key("a\\b.png"));
        assert!(!is_safe_key(".."));
    }

    #[tokio::test]
    async fn disk_roundtrip_and_idempotent_delete() {
        let dir = std::env::temp_dir().join(format!("usermgt-test-{}", uuid::Uuid::new_v4()));
        let storage = DiskStorage::new(&dir).await.unwrap();

        storage
            .put_object("x.bin", Bytes::from_static(b"abc"))
            .await
            .unwrap();
        assert_eq!(
            storage.get_object("x.bin").await.unwrap(),
            Some(Bytes::from_static(b"abc"))
        );

        storage.delete_object("x.bin").await.unwrap();
        assert_eq!(storage.get_object("x.bin").await.unwrap(), None);
        // deleting a missing object is a no-op
        storage.delete_object("x.bin").await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn disk_refuses_unsafe_keys() {
        let dir = std::env::temp_dir().join(format!("usermgt-test-{}", uuid::Uuid::new_v4()));
        let storage = DiskStorage::new(&dir).await.unwrap();
        assert!(storage.get_object("../x").await.is_err());
        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
