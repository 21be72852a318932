use std::sync::Arc;

use crate::{
    config::Config,
    database::{PgReferralRepo, ReferralRepo},
    storage::{HttpObjectStore, ObjectStore},
};

/// Shared per-process state. Holds the collaborators behind trait objects
/// so tests can swap in in-memory fakes.
pub struct AppState {
    pub config: Config,
    pub repo: Arc<dyn ReferralRepo>,
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let repo = PgReferralRepo::connect(&config.database_url)
            .await
            .expect("Database misconfigured!");
        let store = HttpObjectStore::new(&config.storage_url, &config.storage_key);

        Arc::new(Self {
            config,
            repo: Arc::new(repo),
            store: Arc::new(store),
        })
    }
}
