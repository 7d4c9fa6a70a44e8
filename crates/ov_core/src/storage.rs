use async_trait::async_trait;
use crate::name::DatasetName;
use crate::Result;

/// Read-only access to the place dataset files live.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Names of every entry directly under the storage root, unfiltered.
    async fn list_entries(&self) -> Result<Vec<String>>;

    /// Raw contents of one entry. Fails with `Error::NotFound` when it does not exist.
    async fn read_entry(&self, name: &DatasetName) -> Result<Vec<u8>>;

    /// Human readable location, for logs.
    fn describe(&self) -> String;
}
