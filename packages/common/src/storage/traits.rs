use std::io::Cursor;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Named upload storage. Files are addressed by a flat filename; writing an
/// existing name replaces its content.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Store bytes under `filename` and return the number of bytes written.
    async fn put(&self, filename: &str, data: &[u8]) -> Result<u64, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(filename, reader).await
    }

    /// Store data from an async reader under `filename`.
    async fn put_stream(&self, filename: &str, reader: BoxReader) -> Result<u64, StorageError>;

    /// Retrieve all bytes stored under `filename`.
    async fn get(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(filename).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve a stored file as a streaming async reader.
    async fn get_stream(&self, filename: &str) -> Result<BoxReader, StorageError>;

    /// On-disk location of `filename`, for collaborators that need a real path.
    fn path(&self, filename: &str) -> Result<PathBuf, StorageError>;

    /// Check whether a file exists.
    async fn exists(&self, filename: &str) -> Result<bool, StorageError>;

    /// Get the size of a stored file in bytes.
    async fn size(&self, filename: &str) -> Result<u64, StorageError>;
}
