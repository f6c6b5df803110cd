//! The CNI envelope: `CNI_*` variables, the command dispatch and the
//! reply printed on stdout.
use netzwerk::{Namespace, Netlink, Sysctl};
use serde::Serialize;

use crate::{
    cni::{Cmd, CmdArgs, CniResult, ErrorResult, NetConf, VersionResult},
    Error,
};

/// Version replies carry when the configuration does not name one.
pub const DEFAULT_CNI_VERSION: &str = "1.0.0";

/// What the plugin prints on success.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Reply {
    Add(CniResult),
    Version(VersionResult),
}

/// Runs the command named by `CNI_COMMAND`.
///
/// `env` looks up the `CNI_*` variables, `open_netns` opens the
/// namespace `CNI_NETNS` points to. `DEL` and `CHECK` succeed without
/// touching anything and print nothing.
pub fn dispatch<N, S, L>(
    env: impl Fn(&str) -> Option<String>,
    stdin_data: Vec<u8>,
    open_netns: impl FnOnce(&str) -> Result<N, netzwerk::Error>,
    sysctl: &S,
    netlink: &L,
) -> Result<Option<Reply>, ErrorResult>
where
    N: Namespace,
    S: Sysctl,
    L: Netlink,
{
    let cni_version = cni_version(&stdin_data);
    let required = |name: &str| required_env(&env, name, &cni_version);
    let command = required("CNI_COMMAND")?;

    tracing::debug!("CNI_COMMAND={}", command);

    match command.as_str() {
        "ADD" => {
            let args = CmdArgs {
                container_id: required("CNI_CONTAINERID")?,
                if_name: required("CNI_IFNAME")?,
                stdin_data,
            };
            let netns_path = required("CNI_NETNS")?;
            let netns = open_netns(&netns_path).map_err(|source| {
                ErrorResult::new(
                    cni_version.as_str(),
                    &Error::Capability {
                        context: format!(
                            "failed to open network namespace {}",
                            netns_path
                        ),
                        source,
                    },
                )
            })?;

            Cmd::new(&netns, sysctl, netlink)
                .add(&args)
                .map(|result| Some(Reply::Add(result)))
                .map_err(|err| ErrorResult::new(cni_version.as_str(), &err))
        }
        "DEL" | "CHECK" => {
            let container_id = required("CNI_CONTAINERID")?;
            tracing::info!("{} for container {} ignored", command, container_id);

            Ok(None)
        }
        "VERSION" => Ok(Some(Reply::Version(VersionResult::new(cni_version)))),
        command => Err(ErrorResult::invalid_environment(
            cni_version.as_str(),
            format!("unknown CNI_COMMAND {}", command),
        )),
    }
}

/// Version to answer with, errors included.
pub fn cni_version(stdin_data: &[u8]) -> String {
    serde_json::from_slice::<NetConf>(stdin_data)
        .ok()
        .map(|conf| conf.cni_version)
        .filter(|version| !version.is_empty())
        .unwrap_or_else(|| DEFAULT_CNI_VERSION.into())
}

fn required_env(
    env: impl Fn(&str) -> Option<String>,
    name: &str,
    cni_version: &str,
) -> Result<String, ErrorResult> {
    env(name).filter(|value| !value.is_empty()).ok_or_else(|| {
        ErrorResult::invalid_environment(
            cni_version,
            format!("required env variable {} missing", name),
        )
    })
}
