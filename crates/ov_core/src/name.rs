use crate::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Extension every dataset file carries.
pub const DATASET_EXTENSION: &str = "yaml";

/// A validated dataset file name: a single entry directly under the storage
/// root. Holding one means the name is safe to hand to a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DatasetName(String);

impl DatasetName {
    /// Validates `raw` without touching storage.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::InvalidIdentifier("empty name".to_string()));
        }
        if raw.contains("..") {
            return Err(Error::InvalidIdentifier(format!(
                "{}: parent directory reference",
                raw
            )));
        }
        if raw.contains(['/', '\\']) {
            return Err(Error::InvalidIdentifier(format!("{}: path separator", raw)));
        }
        if raw.contains(|c: char| c.is_control()) {
            return Err(Error::InvalidIdentifier(format!(
                "{}: control character",
                raw.escape_debug()
            )));
        }
        match raw.strip_suffix(DATASET_EXTENSION).and_then(|s| s.strip_suffix('.')) {
            Some(stem) if !stem.is_empty() => Ok(Self(raw.to_string())),
            Some(_) => Err(Error::InvalidIdentifier(format!("{}: empty file stem", raw))),
            None => Err(Error::InvalidIdentifier(format!(
                "{}: must end with .{}",
                raw, DATASET_EXTENSION
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file name without its extension.
    pub fn stem(&self) -> &str {
        &self.0[..self.0.len() - DATASET_EXTENSION.len() - 1]
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DatasetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_yaml_names() {
        let name = DatasetName::parse("ukraine-2025-01.yaml").unwrap();
        assert_eq!(name.as_str(), "ukraine-2025-01.yaml");
        assert_eq!(name.stem(), "ukraine-2025-01");
        assert!(DatasetName::parse("with spaces.yaml").is_ok());
    }

    #[test]
    fn test_rejects_unsafe_names() {
        for raw in [
            "",
            "../secrets.yaml",
            "..yaml",
            "a..b.yaml",
            "sub/dir.yaml",
            "/etc/passwd.yaml",
            "sub\\dir.yaml",
            "data.yml",
            "data.json",
            "yaml",
            ".yaml",
            "data.yaml\0",
            "datayaml",
        ] {
            let err = DatasetName::parse(raw).unwrap_err();
            assert!(
                matches!(err, Error::InvalidIdentifier(_)),
                "{:?} should be an invalid identifier",
                raw
            );
        }
    }
}
