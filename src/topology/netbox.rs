/*!
Builds the element set straight from a NetBox instance.

Devices of one tenant that have interfaces are listed first; their interfaces and IP addresses
are then requested in batches of device ids (long id lists would make the URL too long), and
addresses are matched to interfaces by `assigned_object_id`.
*/

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{Client, Url, header};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::{
    network::element::Elements,
    topology::{
        builder::{DeviceRecord, InterfaceAddress, build_elements},
        source::{TopologyError, TopologyResult, TopologySource},
    },
};

pub const DEVICE_CHUNK: usize = 20;

#[derive(Debug, Clone)]
pub struct NetboxConfig {
    pub url: String,
    pub token: String,
    pub tenant_id: u64,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default)]
    next: Option<String>,
    results: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetboxDevice {
    pub id: u64,
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<NamedRef>,
    /// Pre-4.0 name of `role`.
    #[serde(default)]
    pub device_role: Option<NamedRef>,
    #[serde(default)]
    pub tenant: Option<NamedRef>,
}

impl NetboxDevice {
    fn into_record(self) -> Option<DeviceRecord> {
        let name = self.name?;
        let role = self
            .role
            .or(self.device_role)
            .map(|r| r.name)
            .unwrap_or_default();
        Some(DeviceRecord {
            id: self.id,
            name,
            role,
            tenant: self.tenant.map(|t| t.name),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetboxInterface {
    pub id: u64,
    pub name: String,
    pub device: NamedRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetboxIpAddress {
    pub address: String,
    #[serde(default)]
    pub assigned_object_id: Option<u64>,
    #[serde(default)]
    pub vrf: Option<NamedRef>,
    #[serde(default)]
    pub tenant: Option<NamedRef>,
}

/// Pair every address with the interface it is assigned to. Unassigned addresses are dropped.
pub fn match_addresses(
    interfaces: &[NetboxInterface],
    addresses: Vec<NetboxIpAddress>,
) -> Vec<InterfaceAddress> {
    let by_id: HashMap<u64, &NetboxInterface> = interfaces.iter().map(|i| (i.id, i)).collect();
    addresses
        .into_iter()
        .filter_map(|ip| {
            let interface = by_id.get(&ip.assigned_object_id?)?;
            Some(InterfaceAddress {
                name: interface.name.clone(),
                device: interface.device.name.clone(),
                address: ip.address,
                vrf: ip.vrf.map(|v| v.name),
                tenant: ip.tenant.map(|t| t.name),
            })
        })
        .collect()
}

pub struct NetboxSource {
    client: Client,
    config: NetboxConfig,
}

impl NetboxSource {
    pub fn new(config: NetboxConfig) -> TopologyResult<Self> {
        let mut headers = header::HeaderMap::new();
        let token = header::HeaderValue::from_str(&format!("Token {}", config.token))
            .map_err(|e| TopologyError::Netbox(format!("invalid API token: {e}")))?;
        headers.insert(header::AUTHORIZATION, token);
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        if config.insecure {
            warn!("TLS certificate verification is disabled for NetBox");
        }
        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(config.insecure)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Follow `next` links until the listing is exhausted. A link back to a page already
    /// read is an error.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> TopologyResult<Vec<T>> {
        let mut results = Vec::new();
        let mut visited = HashSet::new();
        let mut request = self.client.get(self.endpoint(path)).query(query);
        loop {
            let response = request.send().await?;
            visited.insert(response.url().clone());
            let status = response.status();
            if !status.is_success() {
                return Err(TopologyError::Status {
                    url: response.url().to_string(),
                    status,
                });
            }
            let body = response.bytes().await?;
            let page: Page<T> = serde_json::from_slice(&body)?;
            results.extend(page.results);
            let Some(next) = page.next else {
                break;
            };
            let next = Url::parse(&next)
                .map_err(|e| TopologyError::Netbox(format!("invalid next link {next}: {e}")))?;
            if visited.contains(&next) {
                return Err(TopologyError::Netbox(format!(
                    "pagination loops back to {next}"
                )));
            }
            request = self.client.get(next);
        }
        Ok(results)
    }

    pub async fn devices(&self) -> TopologyResult<HashMap<String, DeviceRecord>> {
        let query = [
            ("tenant_id", self.config.tenant_id.to_string()),
            ("interface_count__gt", "0".to_string()),
        ];
        let devices: Vec<NetboxDevice> = self.get_all("/api/dcim/devices/", &query).await?;
        Ok(devices
            .into_iter()
            .filter_map(NetboxDevice::into_record)
            .map(|d| (d.name.clone(), d))
            .collect())
    }

    async fn by_device_chunks<T: DeserializeOwned>(
        &self,
        path: &str,
        device_ids: &[u64],
    ) -> TopologyResult<Vec<T>> {
        let mut all = Vec::new();
        for chunk in device_ids.chunks(DEVICE_CHUNK) {
            let query: Vec<(&str, String)> =
                chunk.iter().map(|id| ("device_id", id.to_string())).collect();
            all.extend(self.get_all::<T>(path, &query).await?);
        }
        Ok(all)
    }

    pub async fn interface_addresses(&self, device_ids: &[u64]) -> TopologyResult<Vec<InterfaceAddress>> {
        let interfaces: Vec<NetboxInterface> =
            self.by_device_chunks("/api/dcim/interfaces/", device_ids).await?;
        let addresses: Vec<NetboxIpAddress> =
            self.by_device_chunks("/api/ipam/ip-addresses/", device_ids).await?;
        debug!(
            interfaces = interfaces.len(),
            addresses = addresses.len(),
            "NetBox interfaces fetched"
        );
        Ok(match_addresses(&interfaces, addresses))
    }
}

#[async_trait]
impl TopologySource for NetboxSource {
    fn describe(&self) -> String {
        format!("NetBox {} (tenant {})", self.config.url, self.config.tenant_id)
    }

    async fn fetch_elements(&self) -> TopologyResult<Elements> {
        let devices = self.devices().await?;
        if devices.is_empty() {
            info!(tenant = self.config.tenant_id, "No devices found");
            return Ok(Elements::default());
        }

        let mut device_ids: Vec<u64> = devices.values().map(|d| d.id).collect();
        device_ids.sort_unstable();
        let interfaces = self.interface_addresses(&device_ids).await?;
        if interfaces.is_empty() {
            info!(tenant = self.config.tenant_id, "No interfaces found");
            return Ok(Elements::default());
        }

        Ok(build_elements(&devices, &interfaces))
    }
}
