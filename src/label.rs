use std::net::UdpSocket;

use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

use crate::flow_consts;
use crate::resolve::ResolvedAddress;

type HmacSha256 = Hmac<Sha256>;

// Key for the label hash when the config file supplies none. Two senders
// with the same key assign the same label to the same destination.
const DEFAULT_LABEL_KEY: &[u8] = b"flow_sender label key v1";

// Label policy: a resolver-supplied label is read and used as-is; otherwise
// one is derived from a keyed hash of the destination tuple, per the
// stateless scheme of RFC 6437. Result is always within 20 bits.
pub fn flow_label_for(resolved: &ResolvedAddress) -> u32 {
    if resolved.flow_label != 0 {
        return resolved.flow_label & flow_consts::FLOW_LABEL_MASK;
    }

    derive_label(resolved)
}

fn label_key() -> Vec<u8> {
    match crate::utils::get_config_string("label_key") {
        Some(key) => key.into_bytes(),
        None => DEFAULT_LABEL_KEY.to_vec(),
    }
}

fn derive_label(resolved: &ResolvedAddress) -> u32 {
    let mut mac = HmacSha256::new_from_slice(&label_key()).unwrap();
    mac.update(&resolved.octets);
    mac.update(&resolved.port.to_be_bytes());
    mac.update(&resolved.scope_id.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let word = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    word & flow_consts::FLOW_LABEL_MASK
}

// struct in6_flowlabel_req
// https://github.com/torvalds/linux/blob/master/include/uapi/linux/in6.h
#[cfg(target_os = "linux")]
#[repr(C)]
struct In6FlowlabelReq {
    flr_dst: [u8; 16],
    flr_label: u32, // big-endian, same layout as sin6_flowinfo
    flr_action: u8,
    flr_share: u8,
    flr_flags: u16,
    flr_expires: u16,
    flr_linger: u16,
    flr_pad: u32,
}

// Lease the label from the kernel flow label manager and turn on
// sin6_flowinfo handling for the socket. Refusal (label 0, old kernel,
// manager disabled) downgrades to an unlabeled send, so the answer is a
// plain bool rather than an error.
#[cfg(target_os = "linux")]
pub fn attach_flow_label(socket: &UdpSocket, resolved: &ResolvedAddress, label: u32) -> bool {
    use std::os::unix::io::AsRawFd;

    if label == 0 {
        return false;
    }

    let request = In6FlowlabelReq {
        flr_dst: resolved.octets,
        flr_label: crate::resolve::encode_flowinfo(label),
        flr_action: flow_consts::IPV6_FL_A_GET,
        flr_share: flow_consts::IPV6_FL_S_ANY,
        flr_flags: flow_consts::IPV6_FL_F_CREATE,
        flr_expires: 0,
        flr_linger: 0,
        flr_pad: 0,
    };

    let fd = socket.as_raw_fd();
    let rc = unsafe {
        libc::setsockopt(
            fd,
            libc::IPPROTO_IPV6,
            flow_consts::IPV6_FLOWLABEL_MGR,
            &request as *const In6FlowlabelReq as *const libc::c_void,
            std::mem::size_of::<In6FlowlabelReq>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        return false;
    }

    let on: libc::c_int = 1;
    let rc = unsafe {
        libc::setsockopt(
            fd,
            libc::IPPROTO_IPV6,
            flow_consts::IPV6_FLOWINFO_SEND,
            &on as *const libc::c_int as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };

    rc == 0
}

#[cfg(not(target_os = "linux"))]
pub fn attach_flow_label(_socket: &UdpSocket, _resolved: &ResolvedAddress, _label: u32) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Family;

    fn resolved_to(octets: [u8; 16], port: u16, flow_label: u32) -> ResolvedAddress {
        ResolvedAddress {
            family: Family::Ipv6,
            socktype: flow_consts::SOCK_DGRAM,
            protocol: flow_consts::PROTO_UDP,
            octets,
            port,
            flow_label,
            scope_id: 0,
        }
    }

    #[test]
    fn derived_label_fits_in_20_bits() {
        let mut loopback = [0u8; 16];
        loopback[15] = 1;

        for port in [0u16, 53, 3300, 65535] {
            let label = flow_label_for(&resolved_to(loopback, port, 0));
            assert!(label <= flow_consts::FLOW_LABEL_MASK);
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let addr = resolved_to([0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x42], 3300, 0);
        let again = resolved_to([0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x42], 3300, 0);

        assert_eq!(flow_label_for(&addr), flow_label_for(&again));
    }

    #[test]
    fn distinct_ports_get_distinct_labels() {
        let octets = [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        let a = flow_label_for(&resolved_to(octets, 3300, 0));
        let b = flow_label_for(&resolved_to(octets, 3301, 0));

        // Not guaranteed by a 20-bit hash in general, but stable for these
        // fixed inputs and the compiled-in key.
        assert_ne!(a, b);
    }

    #[test]
    fn resolver_supplied_label_is_read_through() {
        let addr = resolved_to([0u8; 16], 9, 0xBEEF);
        assert_eq!(flow_label_for(&addr), 0xBEEF);
    }

    #[test]
    fn all_zero_address_still_yields_in_range_label() {
        let label = flow_label_for(&resolved_to([0u8; 16], 0, 0));
        assert!(label <= flow_consts::FLOW_LABEL_MASK);
    }
}
