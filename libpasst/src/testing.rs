//! In-memory network capabilities recording every call.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    path::{Path, PathBuf},
};

use netzwerk::{
    Address, Error, Family, Link, Namespace, Netlink, Route, Sysctl,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    LinkList,
    LinkByName(String),
    RouteList(Family),
    AddrList(String),
    LinkAddDummy(String),
    AddrAdd(String, Address),
    SetUnprivilegedPortStart(u16),
    SetPingGroupRange(u32, u32),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::LinkAddDummy(_)
                | Call::AddrAdd(..)
                | Call::SetUnprivilegedPortStart(_)
                | Call::SetPingGroupRange(..)
        )
    }
}

pub fn link(index: u32, name: &str, mac: &str) -> Link {
    Link {
        index,
        name: name.into(),
        hardware_address: mac.into(),
        kind: Some("veth".into()),
    }
}

pub fn address(network: &str, label: Option<&str>) -> Address {
    Address {
        network: network.parse().unwrap(),
        label: label.map(Into::into),
    }
}

#[derive(Default)]
pub struct FakeNetwork {
    links: RefCell<Vec<Link>>,
    routes: Vec<Route>,
    addresses: RefCell<HashMap<String, Vec<Address>>>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<HashMap<&'static str, Error>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link(self, link: Link, addresses: Vec<Address>) -> Self {
        self.addresses.borrow_mut().insert(link.name.clone(), addresses);
        self.links.borrow_mut().push(link);

        self
    }

    pub fn with_route(mut self, destination: &str, link: &str) -> Self {
        self.routes.push(Route {
            destination: Some(destination.parse().unwrap()),
            gateway: None,
            link: link.into(),
        });

        self
    }

    pub fn with_default_route(mut self, link: &str) -> Self {
        self.routes.push(Route {
            destination: None,
            gateway: Some("10.244.0.1".parse().unwrap()),
            link: link.into(),
        });

        self
    }

    pub fn with_default_route6(mut self, link: &str) -> Self {
        self.routes.push(Route {
            destination: Some("::/0".parse().unwrap()),
            gateway: Some("fd10:244::1".parse().unwrap()),
            link: link.into(),
        });

        self
    }

    /// Make the next call of `operation` fail with `error`.
    pub fn failing(self, operation: &'static str, error: Error) -> Self {
        self.failures.borrow_mut().insert(operation, error);

        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(Call::is_mutation)
            .collect()
    }

    pub fn addresses_of(&self, name: &str) -> Vec<Address> {
        self.addresses
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn link(&self, name: &str) -> Option<Link> {
        self.links
            .borrow()
            .iter()
            .find(|link| link.name == name)
            .cloned()
    }

    fn record(&self, call: Call, operation: &'static str) -> Result<(), Error> {
        self.calls.borrow_mut().push(call);

        match self.failures.borrow_mut().remove(operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn matches_family(network_family: Family, family: Family) -> bool {
    family == Family::All || network_family == family
}

impl Netlink for FakeNetwork {
    fn link_list(&self) -> Result<Vec<Link>, Error> {
        self.record(Call::LinkList, "link_list")?;

        Ok(self.links.borrow().clone())
    }

    fn link_by_name(&self, name: &str) -> Result<Link, Error> {
        self.record(Call::LinkByName(name.into()), "link_by_name")?;

        self.link(name)
            .ok_or_else(|| Error::LinkNotFound(name.into()))
    }

    fn route_list(&self, family: Family) -> Result<Vec<Route>, Error> {
        self.record(Call::RouteList(family), "route_list")?;

        Ok(self
            .routes
            .iter()
            .filter(|route| {
                let route_family = match route.destination {
                    Some(ipnetwork::IpNetwork::V6(_)) => Family::V6,
                    _ => Family::V4,
                };

                matches_family(route_family, family)
            })
            .cloned()
            .collect())
    }

    fn addr_list(
        &self,
        link: &Link,
        family: Family,
    ) -> Result<Vec<Address>, Error> {
        self.record(Call::AddrList(link.name.clone()), "addr_list")?;

        Ok(self
            .addresses_of(&link.name)
            .into_iter()
            .filter(|address| matches_family(address.family(), family))
            .collect())
    }

    fn link_add_dummy(&self, name: &str) -> Result<Link, Error> {
        self.record(Call::LinkAddDummy(name.into()), "link_add_dummy")?;

        let link = Link {
            index: self.links.borrow().len() as u32 + 100,
            name: name.into(),
            hardware_address: "ee:ee:ee:ee:ee:ee".into(),
            kind: Some("dummy".into()),
        };
        self.links.borrow_mut().push(link.clone());

        Ok(link)
    }

    fn addr_add(&self, link: &Link, address: &Address) -> Result<(), Error> {
        self.record(
            Call::AddrAdd(link.name.clone(), address.clone()),
            "addr_add",
        )?;

        self.addresses
            .borrow_mut()
            .entry(link.name.clone())
            .or_default()
            .push(address.clone());

        Ok(())
    }
}

impl Sysctl for FakeNetwork {
    fn set_unprivileged_port_start(&self, port: u16) -> Result<(), Error> {
        self.record(
            Call::SetUnprivilegedPortStart(port),
            "set_unprivileged_port_start",
        )
    }

    fn set_ping_group_range(&self, low: u32, high: u32) -> Result<(), Error> {
        self.record(
            Call::SetPingGroupRange(low, high),
            "set_ping_group_range",
        )
    }
}

pub struct FakeNamespace {
    path: PathBuf,
    pub entered: Cell<usize>,
    pub exited: Cell<usize>,
}

impl FakeNamespace {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().into(),
            entered: Cell::new(0),
            exited: Cell::new(0),
        }
    }
}

impl Namespace for FakeNamespace {
    fn path(&self) -> &Path {
        &self.path
    }

    fn run<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<Error>,
    {
        self.entered.set(self.entered.get() + 1);
        let result = f();
        self.exited.set(self.exited.get() + 1);

        result
    }
}
