use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub storage_url: String,
    pub storage_key: String,
    pub bucket: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "3000"),
            database_url: load_required("DATABASE_URL"),
            storage_url: load_required("STORAGE_URL"),
            storage_key: load_secret("STORAGE_SERVICE_KEY"),
            bucket: try_load("STORAGE_BUCKET", "referral-images"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn load_required(key: &str) -> String {
    var(key).expect("Environment misconfigured!")
}

/// Reads a Docker-style secret file, falling back to a plain environment
/// variable for local runs.
fn load_secret(secret_name: &str) -> String {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .or_else(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
            var(secret_name)
        })
        .expect("Secrets misconfigured!")
}
