use std::net::{SocketAddrV6, UdpSocket};
use std::time::Duration;

use crate::error::TxError;
use crate::flow_consts;
use crate::label;
use crate::resolve::{self, Endpoint, Family, ResolvedAddress};

// A bound socket and the family it was opened for. Only a successful bind
// produces one, and dropping it closes the descriptor on every exit path.
pub struct TxSocket {
    socket: UdpSocket,
    family: Family,
}

impl TxSocket {
    pub fn udp(&self) -> &UdpSocket {
        &self.socket
    }

    pub fn family(&self) -> Family {
        self.family
    }
}

#[derive(Debug)]
pub struct SendReport {
    pub flow_label: u32,
    pub label_pinned: bool,
    pub bytes_sent: usize,
    pub address: SocketAddrV6,
}

pub fn open_socket(family: Family) -> Result<TxSocket, TxError> {
    let socket = match family {
        Family::Ipv4 => UdpSocket::bind("0.0.0.0:0"),
        Family::Ipv6 => match crate::utils::get_config_ipv6("source_addr") {
            Some(source) => UdpSocket::bind((source, 0)),
            None => UdpSocket::bind("[::]:0"),
        },
    }
    .map_err(TxError::Socket)?;

    let timeout = crate::utils::get_config_int("send_timeout_secs")
        .unwrap_or(flow_consts::SEND_TIMEOUT_SECS);
    if timeout > 0 {
        socket
            .set_write_timeout(Some(Duration::from_secs(timeout)))
            .map_err(TxError::Socket)?;
    }

    Ok(TxSocket { socket, family })
}

pub fn send(
    sock: &TxSocket,
    resolved: &ResolvedAddress,
    flowinfo: u32,
    payload: &[u8],
) -> Result<usize, TxError> {
    if sock.family != resolved.family {
        return Err(TxError::Precondition(format!(
            "socket family {:?} does not match destination family {:?}",
            sock.family, resolved.family
        )));
    }

    let dest = resolved.socket_addr(flowinfo);
    sock.socket.send_to(payload, dest).map_err(TxError::Send)
}

// resolve -> open -> flow label -> send, in that order. The first failing
// stage aborts the rest and its error is what the caller sees.
pub fn run(host: &str, port: u16, payload: &[u8]) -> Result<SendReport, TxError> {
    let endpoint = Endpoint {
        host: host.to_string(),
        port,
    };
    let resolved = resolve::resolve(&endpoint)?;

    let sock = open_socket(resolved.family)?;

    let flow_label = label::flow_label_for(&resolved);
    let label_pinned = label::attach_flow_label(sock.udp(), &resolved, flow_label);

    // Only a kernel-accepted label rides in the outgoing sockaddr
    let flowinfo = if label_pinned {
        resolve::encode_flowinfo(flow_label)
    } else {
        0
    };
    let bytes_sent = send(&sock, &resolved, flowinfo, payload)?;

    Ok(SendReport {
        flow_label,
        label_pinned,
        bytes_sent,
        address: resolved.socket_addr(0),
    })
}
