use crate::config::Config;
use crate::error::{Error, Result};
use sqlx::{postgres::PgPoolOptions, Connection, Executor, PgConnection, PgPool};
use std::time::Duration;
use tracing::{info, warn};

const MAINTENANCE_DATABASE: &str = "postgres";

pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections.max(1))
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Drops and recreates the database named in `database_url`, connecting
/// through the server's maintenance database to do so.
pub async fn recreate_database(database_url: &str) -> Result<()> {
    let mut url = url::Url::parse(database_url)
        .map_err(|e| Error::Config(format!("Invalid database URL: {}", e)))?;
    let name = url.path().trim_start_matches('/').to_string();
    validate_database_name(&name)?;

    url.set_path(&format!("/{}", MAINTENANCE_DATABASE));
    let mut conn = PgConnection::connect(url.as_str()).await?;

    warn!(database = %name, "Dropping and recreating database");
    conn.execute(format!(r#"DROP DATABASE IF EXISTS "{}""#, name).as_str())
        .await?;
    conn.execute(format!(r#"CREATE DATABASE "{}""#, name).as_str())
        .await?;
    conn.close().await?;

    info!(database = %name, "Database recreated");
    Ok(())
}

fn validate_database_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if !valid || name.len() > 63 || name == MAINTENANCE_DATABASE {
        return Err(Error::Config(format!(
            "Refusing to recreate database with name {:?}",
            name
        )));
    }
    Ok(())
}
