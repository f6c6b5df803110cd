use netzwerk::{Error, Family, Link, Netlink};

/// Find the links owning a default route of the given family.
///
/// Links are returned once each, in the order of their first default
/// route, so a dual-stack pod interface is reported a single time.
/// The number of links is not checked here; see
/// [`exactly_one`](crate::exactly_one).
#[fehler::throws]
pub fn discover_by_default_gateway(
    netlink: &impl Netlink,
    family: Family,
) -> Vec<Link> {
    let routes = netlink.route_list(family)?;

    let mut names: Vec<&str> = vec![];
    for route in routes.iter().filter(|route| route.is_default()) {
        if !names.contains(&route.link.as_str()) {
            names.push(&route.link);
        }
    }

    let links = netlink.link_list()?;

    names
        .into_iter()
        .filter_map(|name| {
            let link = links.iter().find(|link| link.name == name);
            if link.is_none() {
                tracing::debug!("default route link {} vanished", name);
            }

            link.cloned()
        })
        .collect()
}
