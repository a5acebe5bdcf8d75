//! Command-line and environment configuration.

use std::net::{IpAddr, SocketAddr};

use clap::{Args, Parser};
use keyward_server::service::{IdentityKind, MasterKeyConfig, ServiceConfig};

use crate::TRACING_TARGET_CONFIG;

/// keyward identity and secret-custody service.
#[derive(Debug, Parser)]
#[command(name = "keyward", version, about)]
pub struct Cli {
    /// HTTP server options.
    #[command(flatten)]
    pub server: ServerConfig,

    /// Service options.
    #[command(flatten)]
    pub service: ServiceArgs,
}

/// HTTP server bind configuration.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "KEYWARD_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to bind the HTTP server to.
    #[arg(long, env = "KEYWARD_PORT", default_value_t = 8080)]
    pub port: u16,
}

impl ServerConfig {
    /// Returns the socket address to bind.
    #[must_use]
    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the server accepts connections from any interface.
    #[must_use]
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }
}

/// Service configuration supplied via flags or environment.
#[derive(Debug, Args)]
pub struct ServiceArgs {
    /// Symmetric secret for signing bearer tokens (at least 32 bytes).
    #[arg(long, env = "KEYWARD_TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: String,

    /// Access token lifetime in seconds.
    #[arg(long, env = "KEYWARD_ACCESS_TTL_SECS", default_value_t = 3_600)]
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds.
    #[arg(long, env = "KEYWARD_REFRESH_TTL_SECS", default_value_t = 604_800)]
    pub refresh_ttl_secs: u64,

    /// Concrete kind of the principal identifier.
    #[arg(long, env = "KEYWARD_IDENTITY_KIND", value_enum, default_value_t = IdentityKind::default())]
    pub identity_kind: IdentityKind,

    /// Vault encryption key options.
    #[command(flatten)]
    pub master_key: MasterKeyConfig,
}

impl ServiceArgs {
    /// Builds the service configuration, validating all inputs.
    pub fn into_service_config(self) -> anyhow::Result<ServiceConfig> {
        ServiceConfig::builder()
            .with_token_signing_secret(self.token_secret)
            .with_access_token_ttl_secs(self.access_ttl_secs)
            .with_refresh_token_ttl_secs(self.refresh_ttl_secs)
            .with_identity_kind(self.identity_kind)
            .with_master_key(self.master_key)
            .build()
            .map_err(|e| anyhow::anyhow!("invalid service configuration: {e}"))
    }
}

/// Logs the effective server configuration.
pub fn log_server_config(config: &ServerConfig) {
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        addr = %config.server_addr(),
        "server configuration"
    );
}
