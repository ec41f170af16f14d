use std::{path::PathBuf, time::Duration};

use crate::topology::{
    file::FileSource,
    http::ApiSource,
    netbox::{NetboxConfig, NetboxSource},
    source::{TopologyResult, TopologySource},
};

/// Which source to fetch the topology from, resolved from the command line.
#[derive(Debug, Clone)]
pub enum SourceSpec {
    Api { base_url: String, timeout: Duration },
    File { path: PathBuf },
    Netbox(NetboxConfig),
}

impl SourceSpec {
    pub fn build_source(&self) -> TopologyResult<Box<dyn TopologySource>> {
        Ok(match self {
            SourceSpec::Api { base_url, timeout } => Box::new(ApiSource::new(base_url, *timeout)?),
            SourceSpec::File { path } => Box::new(FileSource::new(path.clone())),
            SourceSpec::Netbox(config) => Box::new(NetboxSource::new(config.clone())?),
        })
    }
}
