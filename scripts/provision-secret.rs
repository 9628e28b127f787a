// Script to store a database password in the platform keyring for a profile
// Run with: cargo run --bin provision-secret -- [profile] [--check | --inspect]
//
// The secret is read from DBCRED_SECRET, or from the first line of stdin.
// --check resolves the profile and prints the redacted descriptor.
// --inspect also connects and lists every table with its columns.

use anyhow::{bail, Context};
use dbcred::db::CatalogConnection;
use dbcred::{AppConfig, KeyringStore, Resolver};
use std::env::VarError;
use std::io::BufRead;
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq)]
enum Mode {
    Provision,
    Check,
    Inspect,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let (profile_name, mode) = parse_args(std::env::args().skip(1))?;

    let config = AppConfig::load().context("loading connection profiles")?;
    let profile = match &profile_name {
        Some(name) => config.profile(name)?,
        None => config.active_profile()?,
    };
    let params = profile.params();
    let resolver = Resolver::new(KeyringStore::new());

    match mode {
        Mode::Check => {
            let descriptor = resolver.resolve(&profile.service_name, &params)?;
            println!("✅ {}", descriptor);
        }
        Mode::Inspect => {
            let descriptor = resolver.resolve(&profile.service_name, &params)?;
            let mut conn = CatalogConnection::connect(&descriptor, profile.trust_certificate)
                .await
                .with_context(|| format!("connecting to {}", descriptor))?;
            drop(descriptor);

            println!("{}", conn.server_version().await?);
            for table in conn.table_names().await? {
                println!("{}.{}", table.schema, table.name);
                for column in conn.columns(&table).await? {
                    println!(
                        "    {} {}{}",
                        column.name,
                        column.data_type,
                        if column.nullable { "" } else { " NOT NULL" }
                    );
                }
            }
        }
        Mode::Provision => {
            let secret = match env_secret(std::env::var("DBCRED_SECRET"))? {
                Some(secret) => secret,
                None => {
                    let mut line = String::new();
                    std::io::stdin()
                        .lock()
                        .read_line(&mut line)
                        .context("reading secret from stdin")?;
                    line.trim_end_matches(['\r', '\n']).to_string()
                }
            };
            if secret.is_empty() {
                bail!("no secret given: set DBCRED_SECRET or pipe it on stdin");
            }

            // Check the profile builds before touching the keyring
            dbcred::build(&params, &secret)?;

            resolver.provision(&profile.service_name, &params, &secret)?;
            println!(
                "✅ Stored secret for service '{}', account '{}'",
                profile.service_name,
                params.account_name()
            );
        }
    }

    Ok(())
}

fn parse_args(args: impl Iterator<Item = String>) -> anyhow::Result<(Option<String>, Mode)> {
    let mut profile_name = None;
    let mut mode = Mode::Provision;
    for arg in args {
        match arg.as_str() {
            "--check" => mode = Mode::Check,
            "--inspect" => mode = Mode::Inspect,
            flag if flag.starts_with("--") => bail!("unknown flag: {}", flag),
            name => profile_name = Some(name.to_string()),
        }
    }
    Ok((profile_name, mode))
}

/// Only an unset variable falls back to stdin; a set but unreadable one is an error
fn env_secret(value: Result<String, VarError>) -> anyhow::Result<Option<String>> {
    match value {
        Ok(secret) => Ok(Some(secret)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => bail!("DBCRED_SECRET is set but is not valid UTF-8"),
    }
}
