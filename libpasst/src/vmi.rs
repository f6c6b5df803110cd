//! The part of the KubeVirt `VirtualMachineInstance` the binding reads.
//!
//! Everything else in the document is ignored on decoding.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineInstance {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: VirtualMachineInstanceSpec,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineInstanceSpec {
    #[serde(default)]
    pub domain: DomainSpec,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainSpec {
    #[serde(default)]
    pub devices: Devices,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Devices {
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    pub use_virtio_transitional: Option<bool>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interface {
    pub name: String,
    pub binding: Option<PluginBinding>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub pci_address: String,
    #[serde(default)]
    pub acpi_index: i32,
    #[serde(default)]
    pub ports: Vec<Port>,
}

impl Interface {
    /// Whether the interface is bound through the named network
    /// binding plugin.
    pub fn is_bound_to(&self, plugin: &str) -> bool {
        self.binding
            .as_ref()
            .map_or(false, |binding| binding.name == plugin)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct PluginBinding {
    pub name: String,
}

/// A port the VM exposes
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Port {
    #[serde(default)]
    pub name: String,
    /// `TCP` or `UDP`, empty means TCP.
    #[serde(default)]
    pub protocol: String,
    pub port: u16,
}

impl VirtualMachineInstance {
    #[fehler::throws]
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).map_err(|source| Error::Decode {
            what: "virtual machine instance",
            source,
        })?
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.spec.domain.devices.interfaces
    }

    pub fn use_virtio_transitional(&self) -> bool {
        self.spec
            .domain
            .devices
            .use_virtio_transitional
            .unwrap_or(false)
    }
}
