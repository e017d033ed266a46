use anyhow::{Context, Result, bail};

const DEFAULT_SCHEMA: &str = "boulder_league_dev";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Postgres schema holding the league tables
    pub database_schema: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_schema =
            std::env::var("DATABASE_SCHEMA").unwrap_or_else(|_| DEFAULT_SCHEMA.to_string());
        if database_schema.trim().is_empty() {
            bail!("DATABASE_SCHEMA must not be empty");
        }

        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            database_schema,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
