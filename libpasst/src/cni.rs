pub mod config;
pub mod plugin;
pub mod result;

use netzwerk::{Address, Family, Link, Namespace, Netlink, Sysctl};

use crate::{error::Context, exactly_one, link::discover_by_default_gateway, Error};

pub use config::{load_conf, NetConf};
pub use plugin::{dispatch, Reply, DEFAULT_CNI_VERSION};
pub use result::{CniResult, ErrorResult, Interface, IpConfig, VersionResult};

/// User and group id passt runs as inside virt-launcher.
pub const VIRT_LAUNCHER_USER_ID: u32 = 107;

/// Lets the unprivileged passt bind every port the VM exposes.
pub const UNPRIVILEGED_PORT_START: u16 = 0;

/// The part of the CNI invocation the setup consumes.
#[derive(Debug, Clone, Default)]
pub struct CmdArgs {
    pub container_id: String,
    pub if_name: String,
    pub stdin_data: Vec<u8>,
}

/// The CNI `ADD` command of the passt binding.
///
/// There is no `DEL` or `CHECK` counterpart: nothing is undone or
/// verified, the namespace is destroyed together with the pod.
pub struct Cmd<'a, N, S, L> {
    netns: &'a N,
    sysctl: &'a S,
    netlink: &'a L,
}

impl<'a, N, S, L> Cmd<'a, N, S, L>
where
    N: Namespace,
    S: Sysctl,
    L: Netlink,
{
    pub fn new(netns: &'a N, sysctl: &'a S, netlink: &'a L) -> Self {
        Self {
            netns,
            sysctl,
            netlink,
        }
    }

    /// Prepares the pod namespace for passt.
    ///
    /// The addresses of the default gateway link are copied onto a
    /// dummy link named after `CNI_IFNAME`, unprivileged port binding
    /// and ICMP echo sockets are allowed for virt-launcher. The
    /// original link keeps its addresses.
    #[fehler::throws]
    pub fn add(&self, args: &CmdArgs) -> CniResult {
        let conf = load_conf(&args.stdin_data)?;

        tracing::debug!(
            "ADD container {} in {}",
            args.container_id,
            self.netns.path().display()
        );

        let (link, addresses) = self.netns.run(|| self.setup(&args.if_name))?;

        tracing::info!(
            "setup for logical network {} completed successfully",
            conf.logic_network_name().unwrap_or_default()
        );

        CniResult {
            cni_version: conf.cni_version,
            interfaces: vec![Interface {
                name: link.name,
                mac: link.hardware_address,
                sandbox: self.netns.path().display().to_string(),
            }],
            ips: addresses
                .into_iter()
                .map(|address| IpConfig {
                    address: address.network,
                })
                .collect(),
        }
    }

    /// Runs inside the pod namespace.
    #[fehler::throws]
    fn setup(&self, if_name: &str) -> (Link, Vec<Address>) {
        let links = discover_by_default_gateway(self.netlink, Family::All)
            .context("failed to discover default gateway link")?;
        let link = exactly_one(links, "default gateway link")?;

        self.sysctl
            .set_unprivileged_port_start(UNPRIVILEGED_PORT_START)
            .context("failed to set unprivileged port start")?;
        self.sysctl
            .set_ping_group_range(VIRT_LAUNCHER_USER_ID, VIRT_LAUNCHER_USER_ID)
            .context("failed to set ping group range")?;

        let addresses = self
            .netlink
            .addr_list(&link, Family::All)
            .context(format!("failed to read addresses of {}", link.name))?;

        let dummy = self
            .netlink
            .link_add_dummy(if_name)
            .context(format!("failed to create dummy link {}", if_name))?;

        for address in &addresses {
            let migrated = Address {
                label: None,
                ..address.clone()
            };

            self.netlink.addr_add(&dummy, &migrated).context(format!(
                "failed to add address {} to {}",
                migrated, dummy.name
            ))?;
        }

        tracing::debug!(
            "{} addresses of {} copied to {}",
            addresses.len(),
            link.name,
            dummy.name
        );

        (link, addresses)
    }
}
