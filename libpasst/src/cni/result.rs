use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Versions of the CNI specification the plugin speaks.
pub const SUPPORTED_VERSIONS: &[&str] =
    &["0.3.0", "0.3.1", "0.4.0", "1.0.0", "1.1.0"];

const CODE_INVALID_ENVIRONMENT: u32 = 4;
const CODE_DECODING_FAILURE: u32 = 6;
const CODE_INVALID_CONFIGURATION: u32 = 7;
const CODE_INTERNAL: u32 = 999;

/// Success output of `ADD`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CniResult {
    pub cni_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Interface>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<IpConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Interface {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mac: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sandbox: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct IpConfig {
    pub address: IpNetwork,
}

/// Output of a failed command
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResult {
    pub cni_version: String,
    pub code: u32,
    pub msg: String,
}

impl ErrorResult {
    pub fn new(cni_version: impl Into<String>, error: &Error) -> Self {
        let code = match error {
            Error::Decode { .. } => CODE_DECODING_FAILURE,
            Error::Precondition(_) | Error::MalformedInput(_) => {
                CODE_INVALID_CONFIGURATION
            }
            Error::Capability { .. } => CODE_INTERNAL,
        };

        Self {
            cni_version: cni_version.into(),
            code,
            msg: error.to_string(),
        }
    }

    /// Error for a missing or malformed `CNI_*` variable.
    pub fn invalid_environment(
        cni_version: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self {
            cni_version: cni_version.into(),
            code: CODE_INVALID_ENVIRONMENT,
            msg: msg.into(),
        }
    }
}

/// Output of `VERSION`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionResult {
    pub cni_version: String,
    pub supported_versions: Vec<String>,
}

impl VersionResult {
    pub fn new(cni_version: impl Into<String>) -> Self {
        Self {
            cni_version: cni_version.into(),
            supported_versions: SUPPORTED_VERSIONS
                .iter()
                .map(|version| version.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_result_serialization() {
        let result = CniResult {
            cni_version: "1.0.0".into(),
            interfaces: vec![Interface {
                name: "eth0".into(),
                mac: "0a:58:0a:f4:00:05".into(),
                sandbox: "/var/run/netns/cni-1234".into(),
            }],
            ips: vec![
                IpConfig {
                    address: "10.244.0.5/24".parse().unwrap(),
                },
                IpConfig {
                    address: "fd10:244::5/64".parse().unwrap(),
                },
            ],
        };

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "cniVersion": "1.0.0",
                "interfaces": [{
                    "name": "eth0",
                    "mac": "0a:58:0a:f4:00:05",
                    "sandbox": "/var/run/netns/cni-1234",
                }],
                "ips": [
                    { "address": "10.244.0.5/24" },
                    { "address": "fd10:244::5/64" },
                ],
            })
        );
    }

    #[test]
    fn test_error_result() {
        let result = ErrorResult::new(
            "1.0.0",
            &Error::Precondition("no default gateway link found".into()),
        );

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "cniVersion": "1.0.0",
                "code": 7,
                "msg": "no default gateway link found",
            })
        );
    }

    #[test]
    fn test_error_result_capability() {
        let error = Error::Capability {
            context: "failed to create link".into(),
            source: netzwerk::Error::Command {
                args: "link add pod0 type dummy".into(),
                stderr: "RTNETLINK answers: File exists".into(),
            },
        };

        assert_eq!(ErrorResult::new("1.0.0", &error).code, 999);
    }

    #[test]
    fn test_version_result() {
        let result = VersionResult::new("1.0.0");

        assert_eq!(result.cni_version, "1.0.0");
        assert!(result.supported_versions.contains(&"0.4.0".to_string()));
    }
}
