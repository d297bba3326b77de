//! Database model types.

use serde::{Deserialize, Serialize};

/// The kind of inventory item a host record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Computer,
    NetworkEquipment,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Computer => "computer",
            ItemKind::NetworkEquipment => "network_equipment",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "network_equipment" => ItemKind::NetworkEquipment,
            _ => ItemKind::Computer,
        }
    }
}

/// Per-host probe options.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HostOptions {
    /// Probe the display name before falling back to configured IPs.
    pub prefer_name_over_ip: bool,
    /// Drop zero-loss events instead of emitting them.
    pub suppress_healthy_events: bool,
    /// Echo requests per probe.
    pub probe_count: u32,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            prefer_name_over_ip: true,
            suppress_healthy_events: true,
            probe_count: 5,
        }
    }
}

/// A monitored host record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub id: i64,
    /// Display name of the underlying item; probed directly when
    /// `prefer_name_over_ip` is set.
    pub name: String,
    pub item_kind: ItemKind,
    /// Configured IP addresses, in fallback order.
    pub ip_addresses: Vec<String>,
    pub options: HostOptions,
}

impl Default for Host {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            item_kind: ItemKind::Computer,
            ip_addresses: Vec::new(),
            options: HostOptions::default(),
        }
    }
}

/// Anything that can offer address candidates for a reachability check.
///
/// The coordinator resolves probe addresses through this interface only, so
/// new item kinds plug in without touching the probe pipeline.
pub trait Resolvable {
    /// Display name, if the item has a usable one.
    fn display_name(&self) -> Option<&str>;
    /// Configured IP addresses in fallback order.
    fn ip_addresses(&self) -> &[String];
}

impl Resolvable for Host {
    fn display_name(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(self.name.as_str())
        }
    }

    fn ip_addresses(&self) -> &[String] {
        &self.ip_addresses
    }
}
