//! Database connection setup.
//!
//! The pool is created once in `main` and handed to every handler through
//! `web::Data<DatabaseConnection>`; there is no process-wide singleton.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::AppConfig;

pub async fn connect(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60));
    Database::connect(options).await
}
