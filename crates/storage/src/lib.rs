use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;

pub use store::{LeagueStore, MemoryStore};

use error::{Result, StorageError};

/// Postgres-backed league store. Every pooled connection runs inside `schema`.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str, schema: &str) -> Result<Self> {
        if !is_plain_identifier(schema) {
            return Err(StorageError::validation(format!(
                "Invalid database schema name: {}",
                schema
            )));
        }

        let create_schema = format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", schema);
        let search_path = format!("SET search_path TO \"{}\", public", schema);

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .after_connect(move |conn, _meta| {
                let create_schema = create_schema.clone();
                let search_path = search_path.clone();
                Box::pin(async move {
                    sqlx::query(&create_schema).execute(&mut *conn).await?;
                    sqlx::query(&search_path).execute(&mut *conn).await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && name.len() <= 63
}
