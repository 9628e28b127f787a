// ABOUTME: Shared data models for dbcred
// ABOUTME: Secret keys, caller-supplied connection parameters and resolved descriptors

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Identifies one secret in a store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretKey {
    pub service: String,
    pub account: String,
}

impl SecretKey {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }
}

/// Non-secret connection parameters, fixed at construction
///
/// The port is kept wide so that out-of-range values survive until the
/// descriptor builder rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    scheme: String,
    host: String,
    port: u32,
    database_name: String,
    account_name: String,
}

impl ConnectionParams {
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        port: u32,
        database_name: impl Into<String>,
        account_name: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
            database_name: database_name.into(),
            account_name: account_name.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u32 {
        self.port
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }
}

/// Everything a database client needs to connect, secret included
///
/// Built fresh on every resolution and never persisted. The secret is wiped
/// when the descriptor is dropped, and neither `Debug` nor `Display` print it.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ConnectionDescriptor {
    pub(crate) scheme: String,
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) database_name: String,
    pub(crate) account_name: String,
    pub(crate) secret: String,
}

impl ConnectionDescriptor {
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_name", &self.database_name)
            .field("account_name", &self.account_name)
            .field("secret", &"***")
            .finish()
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:***@{}:{}/{}",
            self.scheme,
            urlencoding::encode(&self.account_name),
            urlencoding::encode(&self.host),
            self.port,
            urlencoding::encode(&self.database_name),
        )
    }
}

/// A table reported by a schema catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub schema: String,
    pub name: String,
}

/// A column reported by a schema catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
}
