use async_trait::async_trait;
use ov_core::{DatasetName, DatasetSource, Error, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Dataset files held in memory. Counts every access so callers can check
/// what reached storage.
#[derive(Debug, Default)]
pub struct MemorySource {
    entries: BTreeMap<String, Vec<u8>>,
    listings: AtomicUsize,
    reads: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(name.into(), contents.into());
        self
    }

    /// Number of `list_entries` and `read_entry` calls so far.
    pub fn accesses(&self) -> usize {
        self.listings.load(Ordering::SeqCst) + self.reads.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetSource for MemorySource {
    async fn list_entries(&self) -> Result<Vec<String>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.keys().cloned().collect())
    }

    async fn read_entry(&self, name: &DatasetName) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.entries
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    fn describe(&self) -> String {
        format!("memory ({} entries)", self.entries.len())
    }
}
