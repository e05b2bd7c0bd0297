//! Local filesystem storage backend.

use crate::error::{StorageError, StorageResult};
use crate::traits::{DataStore, data_key};
use async_trait::async_trait;
use bytes::Bytes;
use fragments_core::{FragmentId, OwnerId};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

/// Filesystem data store. Data lives at `{root}/{owner}/{id}`.
///
/// Owner and fragment ids are restricted to `[A-Za-z0-9_-]`, so a key can
/// never name a path outside its owner directory.
#[derive(Debug)]
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend, creating the root directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn owner_dir(&self, owner_id: &OwnerId) -> PathBuf {
        self.root.join(owner_id.as_str())
    }

    fn data_path(&self, owner_id: &OwnerId, id: &FragmentId) -> PathBuf {
        self.owner_dir(owner_id).join(id.as_str())
    }
}

fn map_not_found(err: std::io::Error, owner_id: &OwnerId, id: &FragmentId) -> StorageError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(data_key(owner_id, id))
    } else {
        StorageError::Io(err)
    }
}

#[async_trait]
impl DataStore for FilesystemBackend {
    #[instrument(skip(self, data), fields(backend = "filesystem", size = data.len()))]
    async fn put_data(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        data: Bytes,
    ) -> StorageResult<()> {
        let dir = self.owner_dir(owner_id);
        fs::create_dir_all(&dir).await?;

        // Write to a uniquely named temp file, fsync, then rename so readers
        // never observe a partially written fragment.
        let path = dir.join(id.as_str());
        let temp_path = dir.join(format!(".{}.tmp.{}", id, Uuid::new_v4()));
        let write = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &path).await
        };
        if let Err(err) = write.await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::Io(err));
        }

        Ok(())
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get_data(&self, owner_id: &OwnerId, id: &FragmentId) -> StorageResult<Option<Bytes>> {
        match fs::read(self.data_path(owner_id, id)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete_data(&self, owner_id: &OwnerId, id: &FragmentId) -> StorageResult<()> {
        fs::remove_file(self.data_path(owner_id, id))
            .await
            .map_err(|e| map_not_found(e, owner_id, id))
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn health_check(&self) -> StorageResult<()> {
        let metadata = fs::metadata(&self.root).await.map_err(|e| {
            StorageError::Io(std::io::Error::new(
                e.kind(),
                format!("storage root not accessible: {e}"),
            ))
        })?;

        if !metadata.is_dir() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                format!("storage root is not a directory: {:?}", self.root),
            )));
        }

        Ok(())
    }
}
