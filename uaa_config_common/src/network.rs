//! Figuring out which address our pod is reachable at.

use std::net::{IpAddr, Ipv4Addr, SocketAddrV4, SocketAddrV6};

use nix::{ifaddrs::getifaddrs, net::if_::InterfaceFlags};

use crate::prelude::*;

/// The DNS suffix appended to our address-derived host label.
pub const HOST_LABEL_SUFFIX: &str = "uaa-native";

/// A single address reported by the operating system for a network
/// interface. An interface with several addresses shows up several times.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterfaceAddress {
    /// The name of the interface, such as `eth0`.
    pub interface_name: String,
    /// The address, if the entry has one we understand.
    pub address: Option<IpAddr>,
    /// Is this a loopback interface?
    pub loopback: bool,
}

/// List every interface address on this host, in the order the kernel
/// reports them.
pub fn enumerate_interfaces() -> Result<Vec<InterfaceAddress>> {
    let addrs = getifaddrs().context("could not list network interfaces")?;
    Ok(addrs
        .map(|ifaddr| {
            let address = ifaddr.address.as_ref().and_then(|storage| {
                if let Some(sin) = storage.as_sockaddr_in() {
                    Some(IpAddr::V4(*SocketAddrV4::from(*sin).ip()))
                } else {
                    storage
                        .as_sockaddr_in6()
                        .map(|sin6| IpAddr::V6(*SocketAddrV6::from(*sin6).ip()))
                }
            });
            InterfaceAddress {
                interface_name: ifaddr.interface_name,
                address,
                loopback: ifaddr.flags.contains(InterfaceFlags::IFF_LOOPBACK),
            }
        })
        .collect())
}

/// Choose the IPv4 address we should advertise.
///
/// We skip entries without an address and loopback interfaces, and take the
/// first IPv4 address left. This relies on the kernel's enumeration order,
/// which is fine for a pod with a single `eth0`, but a pod with several
/// interfaces may need an explicit interface allow-list here.
pub fn select_ipv4<I>(candidates: I) -> Result<(String, Ipv4Addr)>
where
    I: IntoIterator<Item = InterfaceAddress>,
{
    candidates
        .into_iter()
        .filter(|candidate| !candidate.loopback)
        .find_map(|candidate| match candidate.address {
            Some(IpAddr::V4(addr)) => Some((candidate.interface_name, addr)),
            _ => None,
        })
        .ok_or_else(|| format_err!("could not find a non-loopback IPv4 address"))
}

/// Find the IPv4 address of this pod.
pub fn discover_ipv4() -> Result<Ipv4Addr> {
    let (interface_name, addr) = select_ipv4(enumerate_interfaces()?)?;
    info!("using address {} from interface {}", addr, interface_name);
    Ok(addr)
}

/// Turn `addr` into a host name like `10-0-0-5.uaa-native`, which routes and
/// UAA zones use to refer to this particular pod.
pub fn host_label(addr: Ipv4Addr) -> String {
    format!(
        "{}.{}",
        addr.to_string().replace('.', "-"),
        HOST_LABEL_SUFFIX
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    fn iface(name: &str, address: Option<IpAddr>, loopback: bool) -> InterfaceAddress {
        InterfaceAddress {
            interface_name: name.to_owned(),
            address,
            loopback,
        }
    }

    #[test]
    fn select_skips_loopback_missing_and_ipv6() {
        let candidates = vec![
            iface("lo", Some(IpAddr::V4(Ipv4Addr::LOCALHOST)), true),
            iface("eth0", None, false),
            iface("eth0", Some(IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1))), false),
            iface("eth0", Some(IpAddr::V4(Ipv4Addr::new(10, 244, 1, 17))), false),
            iface("eth1", Some(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 2))), false),
        ];
        let (name, addr) = select_ipv4(candidates).unwrap();
        assert_eq!(name, "eth0");
        assert_eq!(addr, Ipv4Addr::new(10, 244, 1, 17));
    }

    #[test]
    fn select_fails_without_candidates() {
        let candidates = vec![
            iface("lo", Some(IpAddr::V4(Ipv4Addr::LOCALHOST)), true),
            iface("eth0", Some(IpAddr::V6(Ipv6Addr::LOCALHOST)), false),
        ];
        assert!(select_ipv4(candidates).is_err());
        assert!(select_ipv4(Vec::<InterfaceAddress>::new()).is_err());
    }

    #[test]
    fn host_label_replaces_every_dot() {
        assert_eq!(
            host_label(Ipv4Addr::new(10, 244, 1, 17)),
            "10-244-1-17.uaa-native"
        );
    }
}
