// ABOUTME: PostgreSQL client adapter using sqlx
// ABOUTME: Turns a resolved descriptor into a scoped pool and reads information_schema

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use thiserror::Error;

use super::column_info;
use crate::models::{ColumnInfo, ConnectionDescriptor, TableInfo};

#[derive(Error, Debug)]
pub enum PostgresError {
    #[error("Unsupported scheme for PostgreSQL: {0}")]
    UnsupportedScheme(String),
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Table not found: {0}.{1}")]
    TableNotFound(String, String),
}

const COLUMNS_QUERY: &str = r#"
    SELECT column_name::text, data_type::text, is_nullable::text
    FROM information_schema.columns
    WHERE table_schema = $1 AND table_name = $2
    ORDER BY ordinal_position
"#;

/// Build sqlx connect options from a resolved descriptor
///
/// Fields are handed over individually, so percent-encoded values never
/// need to be decoded a second time.
pub fn connect_options(
    descriptor: &ConnectionDescriptor,
    trust_certificate: bool,
) -> Result<PgConnectOptions, PostgresError> {
    match descriptor.scheme().to_ascii_lowercase().as_str() {
        "postgresql" | "postgres" => {}
        other => return Err(PostgresError::UnsupportedScheme(other.to_string())),
    }

    let ssl_mode = if trust_certificate {
        PgSslMode::Prefer
    } else {
        PgSslMode::VerifyFull
    };

    Ok(PgConnectOptions::new()
        .host(descriptor.host())
        .port(descriptor.port())
        .database(descriptor.database_name())
        .username(descriptor.account_name())
        .password(descriptor.secret())
        .ssl_mode(ssl_mode))
}

/// A caller-owned single-connection pool; closed when the caller drops it
pub struct PostgresConnection {
    pool: PgPool,
}

impl PostgresConnection {
    pub async fn connect(
        descriptor: &ConnectionDescriptor,
        trust_certificate: bool,
    ) -> Result<Self, PostgresError> {
        let options = connect_options(descriptor, trust_certificate)?;
        log::debug!("Connecting to {}", descriptor);

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub async fn server_version(&self) -> Result<String, PostgresError> {
        let (version,): (String,) = sqlx::query_as("SELECT version()")
            .fetch_one(&self.pool)
            .await?;
        Ok(version)
    }

    /// List base tables outside the system schemas
    pub async fn table_names(&self) -> Result<Vec<TableInfo>, PostgresError> {
        // information_schema columns are domain types; cast so they decode as text
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT table_schema::text, table_name::text
            FROM information_schema.tables
            WHERE table_type = 'BASE TABLE'
              AND table_schema NOT IN ('pg_catalog', 'information_schema')
            ORDER BY table_schema, table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(schema, name)| TableInfo { schema, name })
            .collect())
    }

    /// Describe the columns of one table, in declaration order
    pub async fn columns(&self, table: &TableInfo) -> Result<Vec<ColumnInfo>, PostgresError> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(COLUMNS_QUERY)
            .bind(&table.schema)
            .bind(&table.name)
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(PostgresError::TableNotFound(
                table.schema.clone(),
                table.name.clone(),
            ));
        }

        Ok(rows
            .iter()
            .map(|(name, data_type, nullable)| column_info(name, data_type, nullable))
            .collect())
    }
}
