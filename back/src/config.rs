use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, ValueEnum};

const LAMBDA_MARKER: &str = "AWS_LAMBDA_FUNCTION_NAME";

/// How the process is hosted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Deployment {
    /// Long-lived listener; the store must be reachable before binding.
    Server,
    /// Invoked on demand; the store is awaited per request instead.
    OnDemand,
}

#[derive(Clone, Debug, Parser)]
#[command(name = "mint-back", version, about = "Todo list HTTP API")]
pub struct Config {
    #[arg(long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// Comma separated list of allowed origins; empty mirrors the request origin.
    #[arg(long, env = "CORS_ORIGINS", default_value = "")]
    pub cors_origins: String,

    /// `postgres://…`, `memory://` or `ron://<path>`.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "APP_ENV", default_value = "development")]
    pub environment: String,

    #[arg(long, env = "DEPLOYMENT", value_enum)]
    pub deployment: Option<Deployment>,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    #[arg(long, env = "SSL_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    #[arg(long, env = "SSL_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,
}

impl Config {
    /// Parses the command line and environment, reading `.env` first.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    /// Configuration for tests and embedding, backed by the memory store.
    pub fn in_memory() -> Self {
        Self {
            port: 0,
            cors_origins: String::new(),
            database_url: String::from("memory://"),
            environment: String::from("test"),
            deployment: Some(Deployment::Server),
            max_connections: 1,
            tls_cert: None,
            tls_key: None,
        }
    }

    pub fn deployment(&self) -> Deployment {
        self.deployment.unwrap_or_else(|| {
            match std::env::var_os(LAMBDA_MARKER) {
                Some(_) => Deployment::OnDemand,
                None => Deployment::Server,
            }
        })
    }

    pub fn cors_origins(&self) -> Vec<String> {
        (self.cors_origins.split(','))
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::from(([0; 4], self.port))
    }

    pub fn tls(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.tls_cert.as_ref().zip(self.tls_key.as_ref())
    }
}
