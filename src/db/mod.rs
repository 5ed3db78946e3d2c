pub mod entities;
pub mod models;
pub mod schema;
pub mod services;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::server::config::ServerConfig;

/// Opens the connection pool described by the configuration and makes sure the
/// tables exist.
pub async fn connect(config: &ServerConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.to_owned());
    opt.max_connections(config.max_db_connections)
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    info!(max_connections = config.max_db_connections, "Connected to database.");
    schema::ensure_schema(&db).await?;
    Ok(db)
}
