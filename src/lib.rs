pub mod api;
pub mod config;
pub mod crypto;
pub mod db;
pub mod storage;
pub mod web;

pub use db::DbPool;

use config::Config;

use crate::crypto::CredentialHasher;
use crate::storage::UploadStore;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub hasher: CredentialHasher,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(config: Config, db: DbPool, uploads: UploadStore) -> Self {
        Self {
            config,
            db,
            hasher: CredentialHasher::default(),
            uploads,
        }
    }

    /// Replace the password hasher
    pub fn with_hasher(mut self, hasher: CredentialHasher) -> Self {
        self.hasher = hasher;
        self
    }
}
