//! User credential storage: a `users` table with salted SHA-512 password
//! hashes and a portable UUID primary key, on top of sea-orm.

pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod telemetry;

pub use config::Config;
pub use db::{Store, StoreError};
pub use models::password::Credential;
pub use models::user::User;
