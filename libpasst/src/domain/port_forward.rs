use crate::{
    domain::schema::{PortForward, PortForwardRange, Protocol, Toggle},
    vmi::Port,
};

/// Builds the passt port forwarding rules of an interface.
///
/// `reserved_ports` are excluded from TCP forwarding ahead of the
/// declared ports. Ports of protocols passt cannot forward are
/// dropped with a warning. When nothing is left every TCP and UDP
/// port is forwarded.
pub fn generate_port_forward(
    ports: &[Port],
    reserved_ports: &[u16],
) -> Vec<PortForward> {
    let mut tcp: Vec<PortForwardRange> = reserved_ports
        .iter()
        .map(|&start| PortForwardRange {
            start,
            exclude: Some(Toggle::Yes),
        })
        .collect();
    let mut udp = vec![];

    for port in ports {
        let range = PortForwardRange {
            start: port.port,
            exclude: None,
        };

        match protocol(&port.protocol) {
            Some(Protocol::Tcp) => tcp.push(range),
            Some(Protocol::Udp) => udp.push(range),
            None => tracing::warn!(
                "protocol {} is not supported by passt, port {} dropped",
                port.protocol,
                port.port
            ),
        }
    }

    if tcp.is_empty() && udp.is_empty() {
        return vec![forward_all(Protocol::Tcp), forward_all(Protocol::Udp)];
    }

    let mut rules = vec![];
    if !tcp.is_empty() {
        rules.push(PortForward {
            proto: Protocol::Tcp,
            ranges: tcp,
        });
    }
    if !udp.is_empty() {
        rules.push(PortForward {
            proto: Protocol::Udp,
            ranges: udp,
        });
    }

    rules
}

fn protocol(name: &str) -> Option<Protocol> {
    if name.is_empty() || name.eq_ignore_ascii_case(Protocol::Tcp.as_ref()) {
        Some(Protocol::Tcp)
    } else if name.eq_ignore_ascii_case(Protocol::Udp.as_ref()) {
        Some(Protocol::Udp)
    } else {
        None
    }
}

fn forward_all(proto: Protocol) -> PortForward {
    PortForward {
        proto,
        ranges: vec![],
    }
}
