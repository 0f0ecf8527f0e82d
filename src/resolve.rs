use std::net::{Ipv6Addr, SocketAddr, SocketAddrV6, ToSocketAddrs};

use crate::error::TxError;
use crate::flow_consts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Ipv4,
    Ipv6,
}

pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

#[derive(Debug)]
pub struct ResolvedAddress {
    pub family: Family,
    pub socktype: u16,
    pub protocol: u16,
    pub octets: [u8; 16],
    pub port: u16,
    pub flow_label: u32,
    pub scope_id: u32,
}

impl ResolvedAddress {
    fn from_v6(addr: &SocketAddrV6) -> ResolvedAddress {
        ResolvedAddress {
            family: Family::Ipv6,
            socktype: flow_consts::SOCK_DGRAM,
            protocol: flow_consts::PROTO_UDP,
            octets: addr.ip().octets(),
            port: addr.port(),
            flow_label: decode_flowinfo(addr.flowinfo()),
            scope_id: addr.scope_id(),
        }
    }

    pub fn socket_addr(&self, flowinfo: u32) -> SocketAddrV6 {
        SocketAddrV6::new(Ipv6Addr::from(self.octets), self.port, flowinfo, self.scope_id)
    }
}

// sin6_flowinfo is a big-endian word; the label is its low 20 bits.
pub fn decode_flowinfo(flowinfo: u32) -> u32 {
    u32::from_be(flowinfo) & flow_consts::FLOW_LABEL_MASK
}

pub fn encode_flowinfo(label: u32) -> u32 {
    (label & flow_consts::FLOW_LABEL_MASK).to_be()
}

pub fn resolve(endpoint: &Endpoint) -> Result<ResolvedAddress, TxError> {
    // Literal fast path, bare ("::1") or bracketed ("[::1]") form
    let bare = endpoint
        .host
        .trim_start_matches('[')
        .trim_end_matches(']');
    if let Ok(ip) = bare.parse::<Ipv6Addr>() {
        let addr = SocketAddrV6::new(ip, endpoint.port, 0, 0);
        return Ok(ResolvedAddress::from_v6(&addr));
    }

    // The system resolver takes no address family hint through std, so
    // filter the candidate list down to IPv6 instead.
    let candidates = (endpoint.host.as_str(), endpoint.port)
        .to_socket_addrs()
        .map_err(|e| TxError::Resolution(format!("{}: {}", endpoint.host, e)))?;

    for candidate in candidates {
        if let SocketAddr::V6(v6) = candidate {
            return Ok(ResolvedAddress::from_v6(&v6));
        }
    }

    Err(TxError::Resolution(format!(
        "no IPv6 address found for '{}'",
        endpoint.host
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_ipv6_literal() {
        let endpoint = Endpoint {
            host: "::1".to_string(),
            port: 3300,
        };
        let resolved = resolve(&endpoint).unwrap();

        assert_eq!(resolved.family, Family::Ipv6);
        assert_eq!(resolved.port, 3300);
        assert_eq!(resolved.octets, Ipv6Addr::LOCALHOST.octets());
        assert_eq!(resolved.socktype, flow_consts::SOCK_DGRAM);
        assert_eq!(resolved.protocol, flow_consts::PROTO_UDP);
    }

    #[test]
    fn resolves_bracketed_literal() {
        let endpoint = Endpoint {
            host: "[fe80::1]".to_string(),
            port: 53,
        };
        let resolved = resolve(&endpoint).unwrap();

        assert_eq!(resolved.family, Family::Ipv6);
        assert_eq!(resolved.port, 53);
    }

    #[test]
    fn accepts_full_port_range() {
        for port in [0u16, 1, 3300, 65535] {
            let endpoint = Endpoint {
                host: "::1".to_string(),
                port,
            };
            let resolved = resolve(&endpoint).unwrap();
            assert_eq!(resolved.port, port);
        }
    }

    #[test]
    fn rejects_ipv4_only_destination() {
        let endpoint = Endpoint {
            host: "127.0.0.1".to_string(),
            port: 53,
        };
        let err = resolve(&endpoint).unwrap_err();
        assert_eq!(err.stage(), "resolve");
    }

    #[test]
    fn flowinfo_round_trips_and_masks_to_20_bits() {
        assert_eq!(decode_flowinfo(encode_flowinfo(0x12345)), 0x12345);
        assert_eq!(decode_flowinfo(encode_flowinfo(0)), 0);
        // Bits above the label field are dropped before hitting the wire
        assert_eq!(decode_flowinfo(encode_flowinfo(0xFFFF_FFFF)), 0x000F_FFFF);
    }
}
