/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - store: 起動時に 1 度だけ作る DocumentStore (MongoDB / in-memory)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::{fmt, sync::Arc};

use crate::{repos::resource_repo::ResourceRepo, services::store::DocumentStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn repo(&self, collection: &'static str) -> ResourceRepo {
        ResourceRepo::new(self.store.clone(), collection)
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend_name())
            .finish()
    }
}
