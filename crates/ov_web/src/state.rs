use ov_core::{Dataset, Result};
use ov_storage::DatasetStore;

pub struct AppState {
    pub store: DatasetStore,
}

impl AppState {
    pub fn new(store: DatasetStore) -> Self {
        Self { store }
    }

    /// The articles a page lists: the display view, or with `all` every
    /// stored article in file order.
    pub async fn load_articles(&self, filename: &str, all: bool) -> Result<Dataset> {
        if all {
            self.store.get_dataset(filename).await
        } else {
            self.store.get_view(filename).await
        }
    }
}
