pub mod error;
pub mod name;
pub mod parser;
pub mod render;
pub mod storage;
pub mod types;
pub mod view;

pub use error::{Error, Result};
pub use name::{DatasetName, DATASET_EXTENSION};
pub use parser::{parse, parse_slice, to_yaml};
pub use storage::DatasetSource;
pub use types::{Article, ArticleMetadata, Dataset, DatasetEntry, DatasetMetadata, Timestamp};
pub use view::{derive_view, keyed_articles, ArticleKey};

pub mod prelude {
    pub use crate::{Article, Dataset, DatasetName, Error, Result};
    pub use crate::render::{ArticleBody, FailureReason, ViewMode};
}
