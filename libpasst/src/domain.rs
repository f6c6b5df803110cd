pub mod pci;
pub mod port_forward;
pub mod schema;

use netzwerk::{Family, Netlink};

use crate::{
    error::Context, exactly_one, istio, link::discover_by_default_gateway,
    vmi, Error,
};

pub use pci::new_pci_address_field;
pub use port_forward::generate_port_forward;
pub use schema::{
    Acpi, Alias, DomainSpec, Interface, InterfaceBackend, InterfaceSource,
    Mac, Model,
};

/// Network binding plugin name registered in the KubeVirt CR.
pub const PASST_PLUGIN_NAME: &str = "passt";

/// Where passt logs, KubeVirt collects the file.
pub const PASST_LOG_FILE_PATH: &str = "/var/run/kubevirt/passt.log";

const INTERFACE_TYPE_USER: &str = "user";
const BACKEND_PASST: &str = "passt";
const MODEL_VIRTIO: &str = "virtio";
const MODEL_VIRTIO_TRANSITIONAL: &str = "virtio-transitional";
const MODEL_VIRTIO_NON_TRANSITIONAL: &str = "virtio-non-transitional";

/// Pod link of an OVN-Kubernetes primary user defined network.
const OPTIONAL_LINK_NAME: &str = "ovn-udn1";
const PRIMARY_POD_INTERFACE_NAME: &str = "eth0";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetworkConfiguratorOptions {
    pub istio_proxy_injection_enabled: bool,
    pub use_virtio_transitional: bool,
}

impl From<&vmi::VirtualMachineInstance> for NetworkConfiguratorOptions {
    fn from(vmi: &vmi::VirtualMachineInstance) -> Self {
        Self {
            istio_proxy_injection_enabled: istio::proxy_injection_enabled(vmi),
            use_virtio_transitional: vmi.use_virtio_transitional(),
        }
    }
}

/// Wires the passt bound VMI interface into the domain.
pub struct PasstNetworkConfigurator<'a, L> {
    iface: &'a vmi::Interface,
    options: NetworkConfiguratorOptions,
    netlink: &'a L,
}

impl<'a, L: Netlink> PasstNetworkConfigurator<'a, L> {
    /// Fails unless exactly one of `ifaces` uses the passt binding.
    #[fehler::throws]
    pub fn new(
        ifaces: &'a [vmi::Interface],
        options: NetworkConfiguratorOptions,
        netlink: &'a L,
    ) -> Self {
        let passt_ifaces = ifaces
            .iter()
            .filter(|iface| iface.is_bound_to(PASST_PLUGIN_NAME));

        Self {
            iface: exactly_one(passt_ifaces, "interface with passt binding")?,
            options,
            netlink,
        }
    }

    /// Returns a copy of `domain` with the passt interface replacing
    /// the one of the same alias, or appended if there is none.
    #[fehler::throws]
    pub fn mutate(&self, domain: &DomainSpec) -> DomainSpec {
        let generated = self.generate_interface().map_err(|err| {
            tracing::error!("failed to generate domain interface spec: {}", err);
            err
        })?;

        let mut domain = domain.clone();
        let interfaces = &mut domain.devices.interfaces;
        match interfaces.iter_mut().find(|iface| {
            iface
                .alias
                .as_ref()
                .map_or(false, |alias| alias.name() == self.iface.name)
        }) {
            Some(iface) => *iface = generated,
            None => interfaces.push(generated),
        }

        tracing::info!(
            "passt interface {} is added to domain spec successfully",
            self.iface.name
        );

        domain
    }

    #[fehler::throws]
    pub fn generate_interface(&self) -> Interface {
        let source_link_name = self.discover_source_link_name()?;

        let address = if self.iface.pci_address.is_empty() {
            None
        } else {
            Some(new_pci_address_field(&self.iface.pci_address)?)
        };

        let mac = if self.iface.mac_address.is_empty() {
            None
        } else {
            Some(Mac {
                address: self.iface.mac_address.clone(),
            })
        };

        let acpi = if self.iface.acpi_index > 0 {
            Some(Acpi {
                index: self.iface.acpi_index as u32,
            })
        } else {
            None
        };

        let links = discover_by_default_gateway(self.netlink, Family::All)
            .context("failed to discover default gateway link")?;
        exactly_one(links, "default gateway link")?;

        let reserved_ports: &[u16] = if self.options.istio_proxy_injection_enabled {
            istio::RESERVED_PORTS
        } else {
            &[]
        };

        Interface {
            r#type: INTERFACE_TYPE_USER.into(),
            alias: Some(Alias::user_defined(&self.iface.name)),
            model: Some(Model {
                r#type: self.model_type().into(),
            }),
            address,
            mac,
            acpi,
            source: Some(InterfaceSource {
                device: source_link_name,
            }),
            backend: Some(InterfaceBackend {
                r#type: BACKEND_PASST.into(),
                log_file: PASST_LOG_FILE_PATH.into(),
            }),
            port_forward: generate_port_forward(&self.iface.ports, reserved_ports),
            extra: Default::default(),
        }
    }

    fn model_type(&self) -> &str {
        match self.iface.model.as_str() {
            "" | MODEL_VIRTIO if self.options.use_virtio_transitional => {
                MODEL_VIRTIO_TRANSITIONAL
            }
            "" | MODEL_VIRTIO => MODEL_VIRTIO_NON_TRANSITIONAL,
            model => model,
        }
    }

    /// The pod link passt attaches to.
    ///
    /// Pods on a primary user defined network reach it through
    /// `ovn-udn1`, every other pod through `eth0`.
    #[fehler::throws]
    pub fn discover_source_link_name(&self) -> String {
        match self.netlink.link_by_name(OPTIONAL_LINK_NAME) {
            Ok(_) => OPTIONAL_LINK_NAME.into(),
            Err(err) if err.is_not_found() => PRIMARY_POD_INTERFACE_NAME.into(),
            Err(err) => fehler::throw!(Error::Capability {
                context: format!("failed to look up link {}", OPTIONAL_LINK_NAME),
                source: err,
            }),
        }
    }
}
