use serde::Deserialize;

use crate::network::element::ElementId;

/// Represents a node of the topology: a device, a subnet, or a grouping boundary (vrf/tenant).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    pub id: ElementId,
    /// Raw categorical tag from the data source, e.g. `subnet`, `Router`, `Access Switch`.
    pub role: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Grouping node (vrf or tenant) this node is drawn inside.
    #[serde(default)]
    pub parent: Option<ElementId>,
    #[serde(default, rename = "borderColor")]
    pub border_color: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<ElementId>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            label: None,
            parent: None,
            border_color: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<ElementId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_border_color(mut self, color: impl Into<String>) -> Self {
        self.border_color = Some(color.into());
        self
    }

    pub fn kind(&self) -> RoleKind {
        RoleKind::from_role(&self.role)
    }

    /// Grouping nodes mark boundaries and are never addressable as path endpoints.
    pub fn is_grouping(&self) -> bool {
        self.kind().is_grouping()
    }

    /// Text drawn on the node. The renderer labels nodes by id.
    pub fn display_label(&self) -> &str {
        self.id.as_str()
    }
}

/// Classification of a node's role tag used for styling and selection rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    Subnet,
    Router,
    Switch,
    Server,
    Firewall,
    Vrf,
    Tenant,
    Other,
}

impl RoleKind {
    pub fn from_role(role: &str) -> Self {
        let role = role.trim();
        if role.eq_ignore_ascii_case("subnet") {
            return RoleKind::Subnet;
        }
        if role.eq_ignore_ascii_case("vrf") {
            return RoleKind::Vrf;
        }
        if role.eq_ignore_ascii_case("tenant") {
            return RoleKind::Tenant;
        }

        let lower = role.to_ascii_lowercase();
        if lower.contains("router") {
            RoleKind::Router
        } else if lower.contains("switch") {
            RoleKind::Switch
        } else if lower.contains("firewall") {
            RoleKind::Firewall
        } else if lower.contains("server") {
            RoleKind::Server
        } else {
            RoleKind::Other
        }
    }

    pub fn is_grouping(&self) -> bool {
        matches!(self, RoleKind::Vrf | RoleKind::Tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_role_tags() {
        assert_eq!(RoleKind::from_role("subnet"), RoleKind::Subnet);
        assert_eq!(RoleKind::from_role("Router"), RoleKind::Router);
        assert_eq!(RoleKind::from_role("Core Router"), RoleKind::Router);
        assert_eq!(RoleKind::from_role("Access Switch"), RoleKind::Switch);
        assert_eq!(RoleKind::from_role("Firewall"), RoleKind::Firewall);
        assert_eq!(RoleKind::from_role("Server"), RoleKind::Server);
        assert_eq!(RoleKind::from_role("VRF"), RoleKind::Vrf);
        assert_eq!(RoleKind::from_role("tenant"), RoleKind::Tenant);
        assert_eq!(RoleKind::from_role("PDU"), RoleKind::Other);
    }

    #[test]
    fn only_vrf_and_tenant_are_grouping() {
        assert!(Node::new("blue", "vrf").is_grouping());
        assert!(Node::new("Dunder-Mifflin", "tenant").is_grouping());
        assert!(!Node::new("R1", "Router").is_grouping());
        assert!(!Node::new("10.0.0.0/24", "subnet").is_grouping());
    }
}
