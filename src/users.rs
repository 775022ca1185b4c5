mod database;
mod file;

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_core::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

pub use database::SqliteStore;
pub use file::JsonFileStore;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("user file: {0}")]
    Io(#[from] std::io::Error),
    #[error("user file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database migration: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub username: Option<String>,
    pub first_name: Option<String>,
}

/// Key-value storage for known users, keyed by the stringified chat id.
/// `put` only ever adds: an id that is already present keeps its record.
pub trait UserStore: Send + Sync {
    fn get<'a>(&'a self, id: &'a str)
        -> BoxFuture<'a, Result<Option<UserRecord>, PersistenceError>>;

    /// Returns whether the record was added.
    fn put<'a>(
        &'a self,
        id: &'a str,
        record: &'a UserRecord,
    ) -> BoxFuture<'a, Result<bool, PersistenceError>>;

    fn list(&self) -> BoxFuture<'_, Result<BTreeMap<String, UserRecord>, PersistenceError>>;
}

/// All writes go through one lock, so concurrent `/start` commands can't
/// lose each other's users.
#[derive(Clone)]
pub struct Users {
    store: Arc<dyn UserStore>,
    writer: Arc<Mutex<()>>,
}

impl Users {
    pub fn new(store: impl UserStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
            writer: Default::default(),
        }
    }

    pub async fn check_user(
        &self,
        id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> Result<bool, PersistenceError> {
        let key = id.to_string();
        let _guard = self.writer.lock().await;

        if self.store.get(&key).await?.is_some() {
            return Ok(false);
        }

        let record = UserRecord {
            username: username.map(str::to_owned),
            first_name: first_name.map(str::to_owned),
        };
        self.store.put(&key, &record).await
    }

    /// Like [`Users::check_user`], but failures are only logged.
    pub async fn record(&self, id: i64, username: Option<&str>, first_name: Option<&str>) {
        match self.check_user(id, username, first_name).await {
            Ok(true) => log::info!("New user added: {id} ({username:?})"),
            Ok(false) => log::debug!("User {id} already known"),
            Err(e) => log::error!("Couldn't record user {id}: {e}"),
        }
    }

    pub async fn count(&self) -> Result<usize, PersistenceError> {
        Ok(self.store.list().await?.len())
    }
}
