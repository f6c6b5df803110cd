//! JSON rendition of the libvirt domain as KubeVirt generates it.
//!
//! Keys follow the libvirt element and attribute names. Only the
//! interface list is modelled, everything else is carried in the
//! `extra` maps and written back untouched.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

const USER_DEFINED_ALIAS_PREFIX: &str = "ua-";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct DomainSpec {
    #[serde(default)]
    pub devices: Devices,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DomainSpec {
    #[fehler::throws]
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).map_err(|source| Error::Decode {
            what: "domain",
            source,
        })?
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Devices {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Interface>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interface {
    #[serde(rename = "type", default)]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<Alias>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<Mac>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acpi: Option<Acpi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<InterfaceSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<InterfaceBackend>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_forward: Vec<PortForward>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Device alias. KubeVirt marks the ones derived from VMI interface
/// names with a `ua-` prefix.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    name: String,
}

impl Alias {
    pub fn user_defined(name: &str) -> Self {
        Self {
            name: format!("{}{}", USER_DEFINED_ALIAS_PREFIX, name),
        }
    }

    /// Name without the user defined prefix.
    pub fn name(&self) -> &str {
        self.name
            .strip_prefix(USER_DEFINED_ALIAS_PREFIX)
            .unwrap_or(&self.name)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub r#type: String,
}

/// Guest side device address
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub r#type: String,
    pub domain: String,
    pub bus: String,
    pub slot: String,
    pub function: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Mac {
    pub address: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Acpi {
    pub index: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSource {
    pub device: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceBackend {
    pub r#type: String,
    pub log_file: String,
}

/// Ports of one protocol passt forwards to the guest.
///
/// Without ranges every port of the protocol is forwarded.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PortForward {
    pub proto: Protocol,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<PortForwardRange>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortForwardRange {
    pub start: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Toggle>,
}

#[derive(
    Deserialize,
    Serialize,
    Debug,
    PartialEq,
    Eq,
    Clone,
    Copy,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

#[derive(
    Deserialize,
    Serialize,
    Debug,
    PartialEq,
    Eq,
    Clone,
    Copy,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Toggle {
    Yes,
    No,
}
