//! Update targets: where received images are written
//!
//! An [`UpdateTarget`] opens one [`UpdateSession`] per upload. The session
//! receives the image in chunks and is either finished (image becomes
//! active) or aborted (partial data discarded).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use ota_core::UpdateType;

/// Result type for target operations
pub type TargetResult<T> = Result<T, TargetError>;

/// Errors raised while writing an image
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// Target could not prepare for a new image
    #[error("Could not start update: {0}")]
    Begin(String),

    /// A chunk could not be written
    #[error("Write failed: {0}")]
    Write(String),

    /// Image could not be activated
    #[error("Could not finalize update: {0}")]
    Finish(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage that accepts firmware and data images
#[async_trait]
pub trait UpdateTarget: Send + Sync {
    /// Prepare to receive an image of the given type
    async fn begin(
        &self,
        update_type: UpdateType,
        file_name: &str,
    ) -> TargetResult<Box<dyn UpdateSession>>;
}

/// One image being received
#[async_trait]
pub trait UpdateSession: Send {
    async fn write(&mut self, chunk: &[u8]) -> TargetResult<()>;

    /// Complete the image; returns the number of bytes written
    async fn finish(self: Box<Self>) -> TargetResult<u64>;

    /// Discard everything written so far
    async fn abort(self: Box<Self>);
}

// =============================================================================
// Directory target
// =============================================================================

/// Writes `firmware.bin` / `data.bin` into a directory.
///
/// Data goes to a `.part` file first and is renamed on finish, so an
/// interrupted upload never replaces the previous image.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    root: PathBuf,
}

impl DirectoryTarget {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Final location of an image type
    pub fn image_path(&self, update_type: UpdateType) -> PathBuf {
        self.root.join(format!("{}.bin", update_type))
    }
}

#[async_trait]
impl UpdateTarget for DirectoryTarget {
    async fn begin(
        &self,
        update_type: UpdateType,
        file_name: &str,
    ) -> TargetResult<Box<dyn UpdateSession>> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| TargetError::Begin(format!("{}: {}", self.root.display(), e)))?;

        let final_path = self.image_path(update_type);
        let part_path = final_path.with_extension("bin.part");
        let file = File::create(&part_path)
            .await
            .map_err(|e| TargetError::Begin(format!("{}: {}", part_path.display(), e)))?;

        tracing::debug!(
            update_type = %update_type,
            file_name,
            path = %part_path.display(),
            "Writing image"
        );

        Ok(Box::new(DirectorySession {
            file,
            part_path,
            final_path,
            written: 0,
        }))
    }
}

struct DirectorySession {
    file: File,
    part_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

#[async_trait]
impl UpdateSession for DirectorySession {
    async fn write(&mut self, chunk: &[u8]) -> TargetResult<()> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| TargetError::Write(e.to_string()))?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    async fn finish(mut self: Box<Self>) -> TargetResult<u64> {
        self.file
            .flush()
            .await
            .map_err(|e| TargetError::Finish(e.to_string()))?;
        self.file
            .sync_all()
            .await
            .map_err(|e| TargetError::Finish(e.to_string()))?;
        tokio::fs::rename(&self.part_path, &self.final_path)
            .await
            .map_err(|e| TargetError::Finish(e.to_string()))?;
        Ok(self.written)
    }

    async fn abort(self: Box<Self>) {
        let Self { file, part_path, .. } = *self;
        drop(file);
        if let Err(e) = tokio::fs::remove_file(&part_path).await {
            tracing::warn!(path = %part_path.display(), error = %e, "Failed to remove partial image");
        }
    }
}

// =============================================================================
// Memory target
// =============================================================================

/// Image held by a [`MemoryTarget`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Keeps the last image of each type in memory.
///
/// Used when no storage directory is configured, and in tests. A failure
/// message can be injected to make every write fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    images: Arc<Mutex<HashMap<UpdateType, StoredImage>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target whose writes fail with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        let target = Self::new();
        target.fail_writes(Some(message.into()));
        target
    }

    /// Set or clear the injected write failure
    pub fn fail_writes(&self, message: Option<String>) {
        *self.failure.lock() = message;
    }

    /// Last complete image of a type
    pub fn image(&self, update_type: UpdateType) -> Option<StoredImage> {
        self.images.lock().get(&update_type).cloned()
    }
}

#[async_trait]
impl UpdateTarget for MemoryTarget {
    async fn begin(
        &self,
        update_type: UpdateType,
        file_name: &str,
    ) -> TargetResult<Box<dyn UpdateSession>> {
        Ok(Box::new(MemorySession {
            update_type,
            file_name: file_name.to_string(),
            buffer: Vec::new(),
            images: Arc::clone(&self.images),
            failure: self.failure.lock().clone(),
        }))
    }
}

struct MemorySession {
    update_type: UpdateType,
    file_name: String,
    buffer: Vec<u8>,
    images: Arc<Mutex<HashMap<UpdateType, StoredImage>>>,
    failure: Option<String>,
}

#[async_trait]
impl UpdateSession for MemorySession {
    async fn write(&mut self, chunk: &[u8]) -> TargetResult<()> {
        if let Some(message) = &self.failure {
            return Err(TargetError::Write(message.clone()));
        }
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    async fn finish(self: Box<Self>) -> TargetResult<u64> {
        let Self {
            update_type,
            file_name,
            buffer,
            images,
            ..
        } = *self;
        let written = buffer.len() as u64;
        images.lock().insert(
            update_type,
            StoredImage {
                file_name,
                content: buffer,
            },
        );
        Ok(written)
    }

    async fn abort(self: Box<Self>) {}
}
