use ov_core::{
    derive_view, parse_slice, Dataset, DatasetEntry, DatasetName, DatasetSource, Error, Result,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub mod backends;

pub use backends::*;

/// Loads datasets by name from a [`DatasetSource`].
///
/// Nothing is cached: every call reads and parses the entry again, so each
/// request gets its own value.
#[derive(Clone)]
pub struct DatasetStore {
    source: Arc<dyn DatasetSource>,
}

impl DatasetStore {
    pub fn new(source: Arc<dyn DatasetSource>) -> Self {
        Self { source }
    }

    /// Store over the dataset files in `root`.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FsSource::new(root)))
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Every dataset that parses, sorted by file name. Entries that fail to
    /// load are logged and left out; an unreadable root gives an empty list.
    pub async fn list_datasets(&self) -> Vec<DatasetEntry> {
        let entries = match self.source.list_entries().await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error reading data directory {}: {}", self.source.describe(), e);
                return Vec::new();
            }
        };

        let mut names: Vec<DatasetName> = entries
            .iter()
            .filter_map(|entry| DatasetName::parse(entry).ok())
            .collect();
        names.sort();

        let mut datasets = Vec::with_capacity(names.len());
        for name in names {
            match self.load(&name).await {
                Ok(dataset) => datasets.push(DatasetEntry {
                    filename: name.to_string(),
                    dataset,
                }),
                Err(e) => warn!("Skipping dataset {}: {}", name, e),
            }
        }
        info!("📚 Found {} datasets in {}", datasets.len(), self.source.describe());
        datasets
    }

    /// Loads one dataset. The name is validated before storage is touched.
    pub async fn get_dataset(&self, filename: &str) -> Result<Dataset> {
        let name = DatasetName::parse(filename).map_err(|e| {
            debug!("Rejected dataset name {:?}: {}", filename, e);
            e
        })?;
        self.load(&name).await
    }

    /// Loads one dataset and derives its display view.
    pub async fn get_view(&self, filename: &str) -> Result<Dataset> {
        let dataset = self.get_dataset(filename).await?;
        Ok(derive_view(&dataset))
    }

    async fn load(&self, name: &DatasetName) -> Result<Dataset> {
        let raw = self.source.read_entry(name).await.map_err(|e| {
            if let Error::Io(io) = &e {
                error!("Error reading dataset {}: {}", name, io);
            }
            e
        })?;
        parse_slice(&raw).map_err(|e| {
            error!("Error parsing YAML file {}: {}", name, e);
            e
        })
    }
}
