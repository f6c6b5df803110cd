//! What the binding knows about an Istio sidecar sharing the pod.
use crate::vmi::VirtualMachineInstance;

/// Annotation requesting the Istio proxy to be injected.
pub const INJECT_SIDECAR_ANNOTATION: &str = "sidecar.istio.io/inject";

/// Ports the Envoy proxy and the Istio agent listen on.
pub const RESERVED_PORTS: &[u16] = &[
    15000, 15001, 15004, 15006, 15008, 15009, 15020, 15021, 15053, 15090,
];

pub fn proxy_injection_enabled(vmi: &VirtualMachineInstance) -> bool {
    vmi.metadata
        .annotations
        .get(INJECT_SIDECAR_ANNOTATION)
        .map_or(false, |value| value.eq_ignore_ascii_case("true"))
}
