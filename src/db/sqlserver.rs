// ABOUTME: SQL Server client adapter using tiberius
// ABOUTME: Turns a resolved descriptor into a scoped connection and reads the schema catalog

use thiserror::Error;
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use super::column_info;
use crate::models::{ColumnInfo, ConnectionDescriptor, TableInfo};

#[derive(Error, Debug)]
pub enum SqlServerError {
    #[error("Unsupported scheme for SQL Server: {0}")]
    UnsupportedScheme(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Tiberius error: {0}")]
    Tiberius(#[from] tiberius::error::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Table not found: {0}")]
    TableNotFound(String),
}

// Same-named tables in different schemas must not be merged
const COLUMNS_QUERY: &str = r#"
    SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_NAME = @P1 AND TABLE_SCHEMA = @P2
    ORDER BY ORDINAL_POSITION
"#;

/// Build a tiberius config from a resolved descriptor
pub fn client_config(
    descriptor: &ConnectionDescriptor,
    trust_certificate: bool,
) -> Result<Config, SqlServerError> {
    match descriptor.scheme().to_ascii_lowercase().as_str() {
        "mssql" | "sqlserver" => {}
        other => return Err(SqlServerError::UnsupportedScheme(other.to_string())),
    }

    let mut config = Config::new();
    config.host(descriptor.host());
    config.port(descriptor.port());
    config.database(descriptor.database_name());
    config.authentication(AuthMethod::sql_server(
        descriptor.account_name(),
        descriptor.secret(),
    ));

    if trust_certificate {
        config.trust_cert();
    }

    Ok(config)
}

/// A caller-owned connection; dropped when the caller is done with it
pub struct SqlServerConnection {
    client: Client<Compat<TcpStream>>,
}

impl SqlServerConnection {
    pub async fn connect(
        descriptor: &ConnectionDescriptor,
        trust_certificate: bool,
    ) -> Result<Self, SqlServerError> {
        let config = client_config(descriptor, trust_certificate)?;
        log::debug!("Connecting to {}", descriptor);

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| SqlServerError::ConnectionFailed(format!("{}: {}", descriptor, e)))?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(config, tcp.compat_write()).await?;
        Ok(Self { client })
    }

    pub async fn server_version(&mut self) -> Result<String, SqlServerError> {
        let row = self
            .client
            .simple_query("SELECT @@VERSION")
            .await?
            .into_row()
            .await?
            .ok_or_else(|| SqlServerError::QueryFailed("@@VERSION returned no row".to_string()))?;

        Ok(row.get::<&str, _>(0).unwrap_or("Unknown").to_string())
    }

    /// List base tables in the connected database
    pub async fn table_names(&mut self) -> Result<Vec<TableInfo>, SqlServerError> {
        let query = r#"
            SELECT TABLE_SCHEMA, TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_SCHEMA, TABLE_NAME
        "#;

        let rows = self.client.simple_query(query).await?.into_first_result().await?;

        Ok(rows
            .iter()
            .map(|row| TableInfo {
                schema: row.get::<&str, _>(0).unwrap_or("dbo").to_string(),
                name: row.get::<&str, _>(1).unwrap_or("").to_string(),
            })
            .collect())
    }

    /// Describe the columns of one table, in declaration order
    pub async fn columns(&mut self, table: &TableInfo) -> Result<Vec<ColumnInfo>, SqlServerError> {
        let rows = self
            .client
            .query(COLUMNS_QUERY, &[&table.name.as_str(), &table.schema.as_str()])
            .await?
            .into_first_result()
            .await?;

        if rows.is_empty() {
            return Err(SqlServerError::TableNotFound(format!(
                "{}.{}",
                table.schema, table.name
            )));
        }

        Ok(rows
            .iter()
            .map(|row| {
                column_info(
                    row.get::<&str, _>(0).unwrap_or(""),
                    row.get::<&str, _>(1).unwrap_or(""),
                    row.get::<&str, _>(2).unwrap_or("NO"),
                )
            })
            .collect())
    }
}
