use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::user::User;

pub mod error;
pub mod migrator;
pub mod portable_id;
pub mod repositories;

pub use error::StoreError;
pub use portable_id::{IdBackend, IdFormatError, IdValue, StoredId};

/// Handle to the user database.
///
/// Built explicitly from [`DatabaseConfig`] at startup; the identifier layout
/// is fixed here, once, from the connected backend.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    ids: IdBackend,
}

impl Store {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let Some(path) = sqlite_file_path(&config.url) {
            if let Some(parent) = Path::new(path).parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            if !Path::new(path).exists() {
                std::fs::File::create(path)
                    .with_context(|| format!("Failed to create database file {path}"))?;
            }
        }

        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(config.sqlx_logging);

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        migrator::Migrator::up(&conn, None)
            .await
            .context("Failed to apply migrations")?;

        let store = Self::from_connection(conn);

        info!(
            backend = ?store.conn.get_database_backend(),
            ids = ?store.ids,
            "Database connected & migrations applied (pool: {}-{})",
            config.min_connections,
            config.max_connections
        );

        Ok(store)
    }

    /// Wraps an existing connection without running migrations.
    #[must_use]
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        let ids = IdBackend::for_backend(conn.get_database_backend());
        Self { conn, ids }
    }

    #[must_use]
    pub const fn id_backend(&self) -> IdBackend {
        self.ids
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone(), self.ids)
    }

    pub async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        self.user_repo().create(user).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.user_repo().list().await
    }

    pub async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        self.user_repo().save(user).await
    }

    pub async fn update_user_password(
        &self,
        username: &str,
        new_password: &str,
    ) -> Result<(), StoreError> {
        self.user_repo()
            .update_password(username, new_password)
            .await
    }

    pub async fn verify_user_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, StoreError> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        self.user_repo().delete(id).await
    }
}

/// File path of a SQLite URL, or `None` for in-memory and non-SQLite URLs.
fn sqlite_file_path(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or(rest);

    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(path)
    }
}
