use serde::{Deserialize, Serialize};

use crate::Error;

/// Network configuration handed to the plugin on stdin
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetConf {
    pub cni_version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub r#type: String,
    pub args: Option<Args>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Args {
    pub cni: Option<CniArgs>,
}

/// Arguments Multus passes through on behalf of KubeVirt
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CniArgs {
    pub logic_network_name: Option<String>,
}

impl NetConf {
    /// Name of the VMI network this attachment serves.
    pub fn logic_network_name(&self) -> Option<&str> {
        self.args
            .as_ref()
            .and_then(|args| args.cni.as_ref())
            .and_then(|cni| cni.logic_network_name.as_deref())
    }
}

#[fehler::throws]
pub fn load_conf(stdin_data: &[u8]) -> NetConf {
    let conf: NetConf =
        serde_json::from_slice(stdin_data).map_err(|source| Error::Decode {
            what: "network configuration",
            source,
        })?;

    if conf.cni_version.is_empty() {
        fehler::throw!(Error::MalformedInput(
            "network configuration: cniVersion must be set".into()
        ));
    }

    conf
}
