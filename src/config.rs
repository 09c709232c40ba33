use crate::dto::employer_dto::EmployerEntry;
use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;
use validator::Validate;

const DEFAULT_HH_API_URL: &str = "https://api.hh.ru/vacancies";
const DEFAULT_USER_AGENT: &str = "hh-vacancies/0.1";
const DEFAULT_EMPLOYERS_FILE: &str = "data/employers.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub employers_file: PathBuf,
    pub hh_api_url: String,
    pub hh_user_agent: String,
    pub http_timeout_secs: u64,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub ingest_concurrency: usize,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => url,
            None => database_url_from_parts(&lookup)?,
        };

        let hh_api_url = lookup("HH_API_URL").unwrap_or_else(|| DEFAULT_HH_API_URL.to_string());
        url::Url::parse(&hh_api_url)
            .map_err(|e| Error::Config(format!("Invalid value for HH_API_URL: {}", e)))?;

        let ingest_concurrency: usize = parse_or(&lookup, "INGEST_CONCURRENCY", 1)?;
        if ingest_concurrency == 0 {
            return Err(Error::Config(
                "INGEST_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            employers_file: lookup("EMPLOYERS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EMPLOYERS_FILE)),
            hh_api_url,
            hh_user_agent: lookup("HH_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            http_timeout_secs: parse_or(&lookup, "HTTP_TIMEOUT_SECS", 30)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout_secs: parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 30)?,
            ingest_concurrency,
        })
    }
}

fn database_url_from_parts<F>(lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let require = |name: &str| {
        lookup(name).ok_or_else(|| {
            Error::Config(format!(
                "Missing environment variable: {} (or set DATABASE_URL)",
                name
            ))
        })
    };

    let host = require("DB_HOST")?;
    let port: u16 = require("DB_PORT")?
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for DB_PORT: {}", e)))?;
    let user = require("DB_USER")?;
    let password = require("DB_PASSWORD")?;
    let dbname = require("DB_NAME")?;

    let mut url = url::Url::parse(&format!("postgres://{}:{}", host, port))
        .map_err(|e| Error::Config(format!("Invalid value for DB_HOST: {}", e)))?;
    url.set_username(&user)
        .map_err(|_| Error::Config("Invalid value for DB_USER".to_string()))?;
    url.set_password(Some(&password))
        .map_err(|_| Error::Config("Invalid value for DB_PASSWORD".to_string()))?;
    url.set_path(&format!("/{}", dbname));
    Ok(url.to_string())
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

/// Reads the employers file: a JSON array of `{ "employer_id": ... }` entries.
pub fn load_employers(path: &Path) -> Result<Vec<EmployerEntry>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Cannot read employers file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_employers(&raw)
}

pub fn parse_employers(raw: &str) -> Result<Vec<EmployerEntry>> {
    let entries: Vec<EmployerEntry> = serde_json::from_str(raw)
        .map_err(|e| Error::Config(format!("Invalid employers file: {}", e)))?;

    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(entries.len());
    for entry in entries {
        entry.validate().map_err(|e| {
            Error::Config(format!("Invalid employer entry {}: {}", entry.employer_id, e))
        })?;
        if seen.insert(entry.employer_id) {
            unique.push(entry);
        } else {
            warn!(employer_id = entry.employer_id, "Ignoring repeated employer entry");
        }
    }

    if unique.is_empty() {
        return Err(Error::Config("Employers file lists no employers".to_string()));
    }
    Ok(unique)
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
