use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::hash::ContentHash;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Result of storing a blob: its content hash and byte size.
#[derive(Debug, Clone, Copy)]
pub struct StoredBlob {
    pub hash: ContentHash,
    pub size: u64,
}

/// Content-addressed blob storage.
///
/// Blobs are immutable and deduplicated by SHA-256 hash: storing the same
/// bytes twice yields the same hash and a single stored copy.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes and return the content hash and size.
    async fn put(&self, data: &[u8]) -> Result<StoredBlob, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(reader).await
    }

    /// Store data from an async reader, hashing as it is written.
    async fn put_stream(&self, reader: BoxReader) -> Result<StoredBlob, StorageError>;

    /// Retrieve all bytes for a blob by its content hash.
    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(hash).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve a blob as a streaming async reader.
    async fn get_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError>;

    /// Check whether a blob exists.
    async fn exists(&self, hash: &ContentHash) -> Result<bool, StorageError>;

    /// Delete a blob. Returns `true` if it existed.
    async fn delete(&self, hash: &ContentHash) -> Result<bool, StorageError>;
}
