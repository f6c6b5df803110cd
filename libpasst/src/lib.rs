//! Network binding of KubeVirt virtual machines to a passt backend.
//!
//! Two independent pipelines live here:
//!
//! * [`cni`]: the CNI `ADD` step preparing the pod network namespace
//!   (sysctls, a dummy link carrying the pod addresses);
//! * [`domain`]: the hook rewriting the libvirt domain so its
//!   interface is served by passt.
pub mod cni;
pub mod domain;
mod error;
pub mod istio;
pub mod link;
pub mod logging;
pub mod vmi;

#[cfg(test)]
mod testing;

pub use error::{exactly_one, Error};
