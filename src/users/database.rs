use std::collections::BTreeMap;
use std::str::FromStr;

use futures_core::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

use super::{PersistenceError, UserRecord, UserStore};

/// Users kept in an SQLite table, for deployments that set `DATABASE_URL`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        sqlx::migrate!().run(&pool).await?;
        Ok(Self { pool })
    }
}

impl UserStore for SqliteStore {
    fn get<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<UserRecord>, PersistenceError>> {
        Box::pin(async move {
            let record: Option<UserRecord> =
                sqlx::query_as("SELECT username, first_name FROM users WHERE user_id = ?")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
            Ok::<_, PersistenceError>(record)
        })
    }

    fn put<'a>(
        &'a self,
        id: &'a str,
        record: &'a UserRecord,
    ) -> BoxFuture<'a, Result<bool, PersistenceError>> {
        Box::pin(async move {
            let added = sqlx::query(
                "INSERT OR IGNORE INTO users (user_id, username, first_name) VALUES (?, ?, ?)",
            )
            .bind(id)
            .bind(&record.username)
            .bind(&record.first_name)
            .execute(&self.pool)
            .await?
            .rows_affected()
                > 0;
            Ok::<_, PersistenceError>(added)
        })
    }

    fn list(&self) -> BoxFuture<'_, Result<BTreeMap<String, UserRecord>, PersistenceError>> {
        Box::pin(async move {
            let rows: Vec<(String, Option<String>, Option<String>)> =
                sqlx::query_as("SELECT user_id, username, first_name FROM users")
                    .fetch_all(&self.pool)
                    .await?;

            let users: BTreeMap<_, _> = rows
                .into_iter()
                .map(|(id, username, first_name)| {
                    (
                        id,
                        UserRecord {
                            username,
                            first_name,
                        },
                    )
                })
                .collect();
            Ok::<_, PersistenceError>(users)
        })
    }
}
