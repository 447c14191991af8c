pub mod storage;

pub use storage::{BlobStore, BoxReader, ContentHash, StorageError, StoredBlob};
