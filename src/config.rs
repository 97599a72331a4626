use anyhow::{Context, Result};
use clap::Parser;
use std::{env, str::FromStr, time::Duration};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub branch_cache_ttl: Duration,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Branch export configuration API")]
pub struct Args {
    /// Host to bind to (overrides EXPORT_CONFIG_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides EXPORT_CONFIG_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides EXPORT_CONFIG_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Maximum pooled SQLite connections (overrides EXPORT_CONFIG_MAX_CONNECTIONS)
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Seconds a resolved branch id stays cached; 0 disables the cache
    /// (overrides EXPORT_CONFIG_BRANCH_CACHE_TTL_SECS)
    #[arg(long)]
    pub branch_cache_ttl_secs: Option<u64>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::merge(args, |name| env::var(name))?;
        Ok((cfg, migrate))
    }

    /// CLI values win; otherwise the environment (read through `lookup`),
    /// otherwise built-in defaults.
    pub fn merge<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let env_host = lookup("EXPORT_CONFIG_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_env(&lookup, "EXPORT_CONFIG_PORT", 3000u16)?;
        let env_db = lookup("EXPORT_CONFIG_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/catalog.db".into());
        let env_max_connections = parse_env(&lookup, "EXPORT_CONFIG_MAX_CONNECTIONS", 5u32)?;
        let env_ttl = parse_env(&lookup, "EXPORT_CONFIG_BRANCH_CACHE_TTL_SECS", 20u64)?;

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            max_connections: args.max_connections.unwrap_or(env_max_connections),
            branch_cache_ttl: Duration::from_secs(args.branch_cache_ttl_secs.unwrap_or(env_ttl)),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T, F>(lookup: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Result<String, env::VarError>,
{
    match lookup(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}
