// Local interface enumeration

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use sysinfo::Networks;

use crate::monitoring::Reading;

/// An interface and its first IPv4 address.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceAddress {
    pub name: String,
    pub ipv4: Reading<Ipv4Addr>,
}

/// Enumerate interfaces through sysinfo, sorted by name.
pub fn list_interfaces() -> Vec<InterfaceAddress> {
    let networks = Networks::new_with_refreshed_list();
    let entries = networks.iter().map(|(name, data)| {
        let addrs: Vec<IpAddr> = data.ip_networks().iter().map(|net| net.addr).collect();
        (name.clone(), addrs)
    });
    interface_entries(entries)
}

/// Collapse `(name, addresses)` pairs into sorted entries, keeping the first
/// IPv4 address of each interface or `N/A`.
pub fn interface_entries<I>(entries: I) -> Vec<InterfaceAddress>
where
    I: IntoIterator<Item = (String, Vec<IpAddr>)>,
{
    let sorted: BTreeMap<String, Vec<IpAddr>> = entries.into_iter().collect();

    sorted
        .into_iter()
        .map(|(name, addrs)| {
            let ipv4 = addrs
                .iter()
                .find_map(|addr| match addr {
                    IpAddr::V4(v4) => Some(*v4),
                    IpAddr::V6(_) => None,
                })
                .map_or(Reading::NotAvailable, Reading::Value);
            InterfaceAddress { name, ipv4 }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_sorted_with_first_ipv4() {
        let entries = vec![
            (
                "wlan0".to_string(),
                vec![
                    "fe80::1".parse().unwrap(),
                    "192.168.4.50".parse().unwrap(),
                    "10.0.0.2".parse().unwrap(),
                ],
            ),
            ("eth0".to_string(), vec!["192.168.1.100".parse().unwrap()]),
            ("docker0".to_string(), vec!["fe80::2".parse().unwrap()]),
        ];

        let list = interface_entries(entries);
        let names: Vec<&str> = list.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["docker0", "eth0", "wlan0"]);

        assert_eq!(list[0].ipv4, Reading::NotAvailable);
        assert_eq!(list[1].ipv4, Reading::Value(Ipv4Addr::new(192, 168, 1, 100)));
        assert_eq!(list[2].ipv4, Reading::Value(Ipv4Addr::new(192, 168, 4, 50)));
    }

    #[test]
    fn test_no_interfaces() {
        assert!(interface_entries(Vec::new()).is_empty());
    }
}
