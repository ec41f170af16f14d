use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::{
    controller::ExportSettings,
    topology::{SourceSpec, netbox::NetboxConfig},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// `GET {endpoint}/api/nodes_and_edges`
    Api,
    /// JSON snapshot in the same format
    File,
    /// Query NetBox directly
    Netbox,
}

/// Interactive network topology viewer with shortest-path highlighting
#[derive(Debug, Parser)]
#[command(name = "topology-viewer", version)]
pub struct Cli {
    /// Where to load the topology from
    #[arg(long, value_enum, env = "TOPOLOGY_SOURCE", default_value = "api")]
    pub source: SourceKind,

    /// Base URL of the topology API
    #[arg(long, env = "TOPOLOGY_ENDPOINT", default_value = "http://127.0.0.1:5000")]
    pub endpoint: String,

    /// Snapshot file for `--source file`
    #[arg(long, required_if_eq("source", "file"))]
    pub file: Option<PathBuf>,

    #[arg(long, env = "NETBOX_URL", required_if_eq("source", "netbox"))]
    pub netbox_url: Option<String>,

    #[arg(long, env = "NETBOX_TOKEN", hide_env_values = true, required_if_eq("source", "netbox"))]
    pub netbox_token: Option<String>,

    /// NetBox tenant whose devices are shown
    #[arg(long, env = "NETBOX_TENANT_ID", default_value_t = 5)]
    pub tenant_id: u64,

    /// Accept invalid TLS certificates from NetBox
    #[arg(long)]
    pub insecure: bool,

    /// Request timeout, e.g. `10s` or `1m 30s`
    #[arg(long, default_value = "10s")]
    pub timeout: humantime::Duration,

    /// Directory that receives network_diagram.png / network_diagram.svg
    #[arg(long, env = "TOPOLOGY_EXPORT_DIR", default_value = ".")]
    pub export_dir: PathBuf,

    /// Pixel scale of PNG exports
    #[arg(long, default_value_t = 1.0)]
    pub export_scale: f32,

    /// Log filter, e.g. `info` or `topology_viewer=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is required for this source")]
    Missing(&'static str),
    #[error("export scale must be a positive number, got {0}")]
    Scale(f32),
}

impl Cli {
    pub fn source_spec(&self) -> Result<SourceSpec, ConfigError> {
        let timeout = self.timeout.into();
        Ok(match self.source {
            SourceKind::Api => SourceSpec::Api {
                base_url: self.endpoint.clone(),
                timeout,
            },
            SourceKind::File => SourceSpec::File {
                path: self.file.clone().ok_or(ConfigError::Missing("--file"))?,
            },
            SourceKind::Netbox => SourceSpec::Netbox(NetboxConfig {
                url: self.netbox_url.clone().ok_or(ConfigError::Missing("--netbox-url"))?,
                token: self
                    .netbox_token
                    .clone()
                    .ok_or(ConfigError::Missing("--netbox-token"))?,
                tenant_id: self.tenant_id,
                insecure: self.insecure,
                timeout,
            }),
        })
    }

    pub fn export_settings(&self) -> Result<ExportSettings, ConfigError> {
        if !(self.export_scale.is_finite() && self.export_scale > 0.0) {
            return Err(ConfigError::Scale(self.export_scale));
        }
        Ok(ExportSettings {
            directory: self.export_dir.clone(),
            scale: self.export_scale,
        })
    }
}
