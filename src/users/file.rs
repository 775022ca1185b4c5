use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use futures_core::future::BoxFuture;
use tokio::fs;

use super::{PersistenceError, UserRecord, UserStore};

type Map = BTreeMap<String, UserRecord>;

/// Users kept as one JSON object in a flat file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Map, PersistenceError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(users) => Ok(users),
            Err(e) => {
                log::warn!(
                    "User file {} is unreadable ({e}), starting with an empty one",
                    self.path.display()
                );
                fs::write(&self.path, b"{}").await?;
                Ok(Map::new())
            }
        }
    }

    async fn save(&self, users: &Map) -> Result<(), PersistenceError> {
        let payload = serde_json::to_vec(users)?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }
}

impl UserStore for JsonFileStore {
    fn get<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<UserRecord>, PersistenceError>> {
        Box::pin(async move { Ok::<_, PersistenceError>(self.load().await?.remove(id)) })
    }

    fn put<'a>(
        &'a self,
        id: &'a str,
        record: &'a UserRecord,
    ) -> BoxFuture<'a, Result<bool, PersistenceError>> {
        Box::pin(async move {
            let mut users = self.load().await?;
            if users.contains_key(id) {
                return Ok(false);
            }
            users.insert(id.to_string(), record.clone());
            self.save(&users).await?;
            Ok::<_, PersistenceError>(true)
        })
    }

    fn list(&self) -> BoxFuture<'_, Result<Map, PersistenceError>> {
        Box::pin(self.load())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("users.json"));
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.get("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[tokio::test]
    async fn file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let store = JsonFileStore::new(&path);

        let record = UserRecord {
            username: None,
            first_name: Some("Grace".into()),
        };
        assert!(store.put("7", &record).await.unwrap());
        assert!(!store.put("7", &UserRecord::default()).await.unwrap());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({"7": {"username": null, "first_name": "Grace"}})
        );
    }
}
