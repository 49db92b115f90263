//! Postgres persistence for the receivables core.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the receivables schema
//! - The schema migration
//! - [`SeaLedgerDatabase`], implementing the core's store traits

pub mod entities;
pub mod migration;
pub mod store;

pub use store::{SeaLedgerDatabase, SeaLedgerTransaction};

use receiva_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Connects with the pool sizes from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
