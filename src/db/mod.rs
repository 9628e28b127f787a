// ABOUTME: Database client adapters for dbcred
// ABOUTME: Consume resolved descriptors; the resolver itself never opens sockets

pub mod postgres;
pub mod sqlserver;

pub use postgres::{connect_options, PostgresConnection, PostgresError};
pub use sqlserver::{client_config, SqlServerConnection, SqlServerError};

use thiserror::Error;

use crate::models::{ColumnInfo, ConnectionDescriptor, TableInfo};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("No client adapter for scheme: {0}")]
    UnsupportedScheme(String),
    #[error(transparent)]
    Postgres(#[from] PostgresError),
    #[error(transparent)]
    SqlServer(#[from] SqlServerError),
}

/// Which adapter handles a scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    SqlServer,
}

impl Backend {
    pub fn for_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" => Some(Backend::Postgres),
            "mssql" | "sqlserver" => Some(Backend::SqlServer),
            _ => None,
        }
    }
}

/// Map one information_schema column row
pub(crate) fn column_info(name: &str, data_type: &str, is_nullable: &str) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        data_type: data_type.to_string(),
        nullable: is_nullable.trim().eq_ignore_ascii_case("YES"),
    }
}

/// Schema catalog reader over whichever adapter the descriptor's scheme selects
pub enum CatalogConnection {
    Postgres(PostgresConnection),
    SqlServer(SqlServerConnection),
}

impl CatalogConnection {
    pub async fn connect(
        descriptor: &ConnectionDescriptor,
        trust_certificate: bool,
    ) -> Result<Self, CatalogError> {
        match Backend::for_scheme(descriptor.scheme()) {
            Some(Backend::Postgres) => Ok(CatalogConnection::Postgres(
                PostgresConnection::connect(descriptor, trust_certificate).await?,
            )),
            Some(Backend::SqlServer) => Ok(CatalogConnection::SqlServer(
                SqlServerConnection::connect(descriptor, trust_certificate).await?,
            )),
            None => Err(CatalogError::UnsupportedScheme(
                descriptor.scheme().to_string(),
            )),
        }
    }

    pub async fn server_version(&mut self) -> Result<String, CatalogError> {
        Ok(match self {
            CatalogConnection::Postgres(conn) => conn.server_version().await?,
            CatalogConnection::SqlServer(conn) => conn.server_version().await?,
        })
    }

    pub async fn table_names(&mut self) -> Result<Vec<TableInfo>, CatalogError> {
        Ok(match self {
            CatalogConnection::Postgres(conn) => conn.table_names().await?,
            CatalogConnection::SqlServer(conn) => conn.table_names().await?,
        })
    }

    pub async fn columns(&mut self, table: &TableInfo) -> Result<Vec<ColumnInfo>, CatalogError> {
        Ok(match self {
            CatalogConnection::Postgres(conn) => conn.columns(table).await?,
            CatalogConnection::SqlServer(conn) => conn.columns(table).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::build;
    use crate::models::ConnectionParams;

    #[test]
    fn test_backend_for_scheme() {
        assert_eq!(Backend::for_scheme("postgresql"), Some(Backend::Postgres));
        assert_eq!(Backend::for_scheme("Postgres"), Some(Backend::Postgres));
        assert_eq!(Backend::for_scheme("mssql"), Some(Backend::SqlServer));
        assert_eq!(Backend::for_scheme("sqlserver"), Some(Backend::SqlServer));
        assert_eq!(Backend::for_scheme("mysql"), None);
    }

    #[test]
    fn test_column_info_nullability() {
        assert_eq!(
            column_info("Title", "character varying", "YES"),
            ColumnInfo {
                name: "Title".to_string(),
                data_type: "character varying".to_string(),
                nullable: true,
            }
        );
        assert!(!column_info("AlbumId", "integer", "NO").nullable);
        assert!(column_info("Notes", "nvarchar", "yes ").nullable);
    }

    #[tokio::test]
    async fn test_unknown_scheme_never_connects() {
        let params = ConnectionParams::new("mysql", "localhost", 3306, "chinook", "root");
        let descriptor = build(&params, "john").unwrap();

        let err = CatalogConnection::connect(&descriptor, true).await.err();
        assert!(matches!(err, Some(CatalogError::UnsupportedScheme(s)) if s == "mysql"));
    }
}
