use async_trait::async_trait;
use ov_core::{DatasetName, DatasetSource, Error, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// Dataset files in a single directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DatasetSource for FsSource {
    async fn list_entries(&self) -> Result<Vec<String>> {
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                debug!("Skipping non UTF-8 entry in {}", self.root.display());
                continue;
            };
            // follows symlinks
            match tokio::fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => names.push(name),
                Ok(_) => {}
                Err(e) => debug!("Skipping {}: {}", name, e),
            }
        }
        Ok(names)
    }

    async fn read_entry(&self, name: &DatasetName) -> Result<Vec<u8>> {
        let path = self.root.join(name.as_str());
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(Error::NotFound(name.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        }
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::NotFound(name.to_string()),
            _ => Error::Io(e),
        })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
