/*!
Turns NetBox devices and addressed interfaces into the element set.

One subnet node per (subnet, vrf-or-tenant) pair, one node per device, one grouping node per
vrf and per tenant, and one edge per interface address from the device to its subnet.
*/

use std::collections::{HashMap, HashSet};

use ipnetwork::IpNetwork;
use md5::{Digest, Md5};
use tracing::warn;

use crate::network::{edge::Edge, element::Elements, node::Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub id: u64,
    pub name: String,
    pub role: String,
    pub tenant: Option<String>,
}

/// An interface with one of its IP addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub name: String,
    pub device: String,
    /// Address with prefix length, e.g. `10.0.0.5/24`.
    pub address: String,
    pub vrf: Option<String>,
    pub tenant: Option<String>,
}

/// Stable `#RRGGBB` color for a group name: the first three bytes of its MD5 digest.
pub fn name_color(name: &str) -> String {
    let digest = Md5::digest(name.as_bytes());
    format!("#{:02X}{:02X}{:02X}", digest[0], digest[1], digest[2])
}

/// Network address of an interface address, `10.0.0.5/24` -> `10.0.0.0/24`.
pub fn subnet_of(address: &str) -> Option<String> {
    let network: IpNetwork = address.trim().parse().ok()?;
    Some(format!("{}/{}", network.network(), network.prefix()))
}

pub fn build_elements(
    devices: &HashMap<String, DeviceRecord>,
    interfaces: &[InterfaceAddress],
) -> Elements {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut subnets = HashSet::new();
    let mut seen_devices = HashSet::new();
    let mut vrfs = HashSet::new();
    let mut tenants = HashSet::new();

    for item in interfaces {
        let Some(subnet) = subnet_of(&item.address) else {
            warn!(address = %item.address, interface = %item.name, "Unparsable interface address, skipping");
            continue;
        };
        let Some(device) = devices.get(&item.device) else {
            warn!(device = %item.device, "Address belongs to an unknown device, skipping");
            continue;
        };

        let parent = item.vrf.as_ref().or(item.tenant.as_ref());
        let subnet_id = match parent {
            Some(parent) => format!("{subnet} {parent}"),
            None => subnet.clone(),
        };

        if subnets.insert(subnet_id.clone()) {
            let mut node = Node::new(subnet_id.as_str(), "subnet").with_label(subnet.as_str());
            if let Some(parent) = parent {
                node = node.with_parent(parent.as_str());
            }
            nodes.push(node);
        }

        if seen_devices.insert(device.name.clone()) {
            let mut node = Node::new(device.name.as_str(), device.role.as_str());
            if let Some(tenant) = &device.tenant {
                node = node.with_parent(tenant.as_str());
            }
            nodes.push(node);
        }

        if let Some(vrf) = &item.vrf
            && vrfs.insert(vrf.clone())
        {
            let mut node = Node::new(vrf.as_str(), "vrf").with_border_color(name_color(vrf));
            if let Some(tenant) = &item.tenant {
                node = node.with_parent(tenant.as_str());
            }
            nodes.push(node);
        }

        if let Some(tenant) = &item.tenant
            && tenants.insert(tenant.clone())
        {
            nodes.push(Node::new(tenant.as_str(), "tenant").with_border_color(name_color(tenant)));
        }

        edges.push(
            Edge::new(
                format!("{} - {}", device.name, subnet_id),
                device.name.as_str(),
                subnet_id.as_str(),
            )
            .with_label(format!("{} - {}", item.name, item.address)),
        );
    }

    Elements::new(nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{network::node::RoleKind, style::Rgb};

    fn device(id: u64, name: &str, role: &str, tenant: Option<&str>) -> (String, DeviceRecord) {
        (
            name.to_string(),
            DeviceRecord {
                id,
                name: name.to_string(),
                role: role.to_string(),
                tenant: tenant.map(str::to_string),
            },
        )
    }

    fn address(device: &str, name: &str, address: &str, vrf: Option<&str>, tenant: Option<&str>) -> InterfaceAddress {
        InterfaceAddress {
            name: name.to_string(),
            device: device.to_string(),
            address: address.to_string(),
            vrf: vrf.map(str::to_string),
            tenant: tenant.map(str::to_string),
        }
    }

    #[test]
    fn subnets_are_network_addresses() {
        assert_eq!(subnet_of("10.1.2.3/24").as_deref(), Some("10.1.2.0/24"));
        assert_eq!(subnet_of("2001:db8::7/64").as_deref(), Some("2001:db8::/64"));
        assert_eq!(subnet_of("192.168.0.1/32").as_deref(), Some("192.168.0.1/32"));
        assert_eq!(subnet_of("not-an-ip"), None);
    }

    #[test]
    fn colors_are_the_md5_prefix() {
        assert_eq!(name_color("Dunder-Mifflin"), "#5FBF42");
        assert_eq!(name_color("blue"), "#48D621");
        assert!(Rgb::parse_hex(&name_color("blue")).is_some());
    }

    #[test]
    fn builds_nodes_and_edges() {
        let devices = HashMap::from([
            device(1, "dmi01-akron-rtr01", "Router", Some("Dunder-Mifflin")),
            device(2, "dmi01-akron-sw01", "Access Switch", Some("Dunder-Mifflin")),
        ]);
        let interfaces = vec![
            address("dmi01-akron-rtr01", "Gi0/0", "10.0.0.1/24", Some("blue"), Some("Dunder-Mifflin")),
            address("dmi01-akron-sw01", "Vlan10", "10.0.0.2/24", Some("blue"), Some("Dunder-Mifflin")),
            address("dmi01-akron-rtr01", "Gi0/1", "192.168.1.1/30", None, Some("Dunder-Mifflin")),
            address("dmi01-akron-rtr01", "Lo0", "172.16.0.1/32", None, None),
        ];

        let elements = build_elements(&devices, &interfaces);
        let ids: Vec<&str> = elements.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "10.0.0.0/24 blue",
                "dmi01-akron-rtr01",
                "blue",
                "Dunder-Mifflin",
                "dmi01-akron-sw01",
                "192.168.1.0/30 Dunder-Mifflin",
                "172.16.0.1/32",
            ]
        );

        let subnet = &elements.nodes[0];
        assert_eq!(subnet.role, "subnet");
        assert_eq!(subnet.label.as_deref(), Some("10.0.0.0/24"));
        assert_eq!(subnet.parent.as_ref().map(|p| p.as_str()), Some("blue"));

        let vrf = &elements.nodes[2];
        assert_eq!(vrf.kind(), RoleKind::Vrf);
        assert_eq!(vrf.parent.as_ref().map(|p| p.as_str()), Some("Dunder-Mifflin"));
        assert_eq!(vrf.border_color.as_deref(), Some(name_color("blue").as_str()));

        let tenant = &elements.nodes[3];
        assert_eq!(tenant.kind(), RoleKind::Tenant);
        assert_eq!(tenant.parent, None);

        let tenant_subnet = &elements.nodes[5];
        assert_eq!(tenant_subnet.parent.as_ref().map(|p| p.as_str()), Some("Dunder-Mifflin"));
        let bare_subnet = &elements.nodes[6];
        assert_eq!(bare_subnet.parent, None);

        assert_eq!(elements.edges.len(), 4);
        let edge = &elements.edges[0];
        assert_eq!(edge.id.as_str(), "dmi01-akron-rtr01 - 10.0.0.0/24 blue");
        assert_eq!(edge.label.as_deref(), Some("Gi0/0 - 10.0.0.1/24"));
        assert_eq!(edge.source.as_str(), "dmi01-akron-rtr01");
        assert_eq!(edge.target.as_str(), "10.0.0.0/24 blue");
    }

    #[test]
    fn skips_unknown_devices_and_bad_addresses() {
        let devices = HashMap::from([device(1, "r1", "Router", None)]);
        let interfaces = vec![
            address("ghost", "eth0", "10.0.0.1/24", None, None),
            address("r1", "eth1", "garbage", None, None),
            address("r1", "eth2", "10.9.0.1/16", None, None),
        ];
        let elements = build_elements(&devices, &interfaces);
        assert_eq!(elements.nodes.len(), 2);
        assert_eq!(elements.edges.len(), 1);
        assert_eq!(elements.edges[0].id.as_str(), "r1 - 10.9.0.0/16");
    }

    #[test]
    fn nothing_in_nothing_out() {
        assert!(build_elements(&HashMap::new(), &[]).is_empty());
    }
}
