use std::path::PathBuf;

use serde::Deserialize;

use crate::db::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<Store>,
}

impl AppState {
    /// Closes the open store, if any. Returns whether one was open.
    pub fn close_store(&mut self) -> bool {
        self.workspace = None;
        let Some(store) = self.store.take() else {
            return false;
        };
        if let Err(e) = store.close() {
            tracing::warn!(error = ?e, "failed to close grade store");
        }
        true
    }
}
