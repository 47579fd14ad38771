use std::env;

use crate::{migration::Migrator, prelude::*, sv};

/// Process-wide configuration, built once at startup and passed down.
/// Nothing reads the environment after this.
#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub identity_url: String,
  pub port: u16,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let database_url = env::var("DATABASE_URL")
      .unwrap_or_else(|_| "sqlite:records.db?mode=rwc".into());
    let identity_url =
      env::var("IDENTITY_URL").context("IDENTITY_URL not set")?;
    let port = match env::var("PORT") {
      Ok(port) => port.parse().context("Invalid PORT")?,
      Err(_) => 3000,
    };

    Ok(Self { database_url, identity_url, port })
  }
}

pub struct Services<'a> {
  pub record: sv::Record<'a>,
  pub identity: sv::Identity<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub http: reqwest::Client,
  pub config: Config,
}

impl AppState {
  pub async fn new(config: Config) -> Self {
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
      .await
      .expect("Failed to connect to database");

    info!("Running migrations...");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    Self { db, http: reqwest::Client::new(), config }
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      record: sv::Record::new(&self.db),
      identity: sv::Identity::new(
        &self.db,
        &self.http,
        &self.config.identity_url,
      ),
    }
  }
}
