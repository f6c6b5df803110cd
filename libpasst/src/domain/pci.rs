use crate::{domain::schema::Address, Error};

const ADDRESS_TYPE_PCI: &str = "pci";

/// Converts `DDDD:BB:SS.F` into a libvirt PCI address.
///
/// Domain, bus and slot are hexadecimal, the function is 0 to 7.
#[fehler::throws]
pub fn new_pci_address_field(address: &str) -> Address {
    let [domain, bus, slot, function] = parse(address).ok_or_else(|| {
        Error::MalformedInput(format!("failed to parse pci address {}", address))
    })?;

    Address {
        r#type: ADDRESS_TYPE_PCI.into(),
        domain: format!("0x{}", domain),
        bus: format!("0x{}", bus),
        slot: format!("0x{}", slot),
        function: format!("0x{}", function),
    }
}

fn parse(address: &str) -> Option<[&str; 4]> {
    let (device, function) = address.split_once('.')?;

    let mut fields = device.split(':');
    let domain = fields.next()?;
    let bus = fields.next()?;
    let slot = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    let valid = is_hex(domain, 4)
        && is_hex(bus, 2)
        && is_hex(slot, 2)
        && function.len() == 1
        && matches!(function.as_bytes()[0], b'0'..=b'7');

    if valid {
        Some([domain, bus, slot, function])
    } else {
        None
    }
}

fn is_hex(field: &str, len: usize) -> bool {
    field.len() == len && field.bytes().all(|byte| byte.is_ascii_hexdigit())
}
