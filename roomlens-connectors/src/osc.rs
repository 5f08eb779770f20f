//! OSC output over UDP
//!
//! Only the subset of OSC 1.0 the synth side needs: one message per frame,
//! string and float32 arguments, no bundles and no timetags.
//!
//! ## Packet Layout
//!
//! ```text
//! address      "/roomlens\0" padded to a multiple of 4
//! type tags    ",sfsf\0"     padded to a multiple of 4
//! arguments    strings NUL-terminated and padded, floats big-endian f32
//! ```

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use roomlens_core::AxisPayload;

use crate::{ConnectionStats, Connector, ConnectorError};

/// Address used when the host does not configure one
pub const DEFAULT_OSC_ADDRESS: &str = "/roomlens";

/// SuperCollider's default language port
pub const DEFAULT_OSC_PORT: u16 = 57120;

/// One OSC argument
#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    /// `s` tag
    Str(String),
    /// `f` tag
    Float(f32),
}

impl OscArg {
    fn tag(&self) -> u8 {
        match self {
            Self::Str(_) => b's',
            Self::Float(_) => b'f',
        }
    }
}

/// Address plus arguments, ready to encode
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<OscArg>,
}

impl OscMessage {
    /// Axis names in argument order
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.args.iter().step_by(2).filter_map(|arg| match arg {
            OscArg::Str(s) => Some(s.as_str()),
            OscArg::Float(_) => None,
        })
    }

    /// Encode as an OSC 1.0 packet
    pub fn encode(&self) -> Result<Vec<u8>, ConnectorError> {
        if !self.address.starts_with('/') {
            return Err(ConnectorError::Encoding(format!(
                "OSC address must start with '/': {}",
                self.address
            )));
        }

        let mut packet = Vec::with_capacity(64 + self.args.len() * 12);
        push_padded_str(&mut packet, &self.address)?;

        let mut tags = String::with_capacity(self.args.len() + 1);
        tags.push(',');
        tags.extend(self.args.iter().map(|arg| arg.tag() as char));
        push_padded_str(&mut packet, &tags)?;

        for arg in &self.args {
            match arg {
                OscArg::Str(s) => push_padded_str(&mut packet, s)?,
                OscArg::Float(v) => packet.extend_from_slice(&v.to_be_bytes()),
            }
        }
        Ok(packet)
    }
}

fn push_padded_str(packet: &mut Vec<u8>, s: &str) -> Result<(), ConnectorError> {
    if s.contains('\0') {
        return Err(ConnectorError::Encoding(format!(
            "OSC strings cannot contain NUL: {:?}",
            s
        )));
    }
    packet.extend_from_slice(s.as_bytes());
    // At least one NUL, then pad to a 4-byte boundary
    let pad = 4 - (s.len() % 4);
    packet.extend(std::iter::repeat(0u8).take(pad));
    Ok(())
}

/// Flat `[axis, value, ...]` message for a payload, sorted by axis name
pub fn prepare_osc_message(address: &str, payload: &AxisPayload) -> OscMessage {
    let args = payload
        .axes
        .iter()
        .flat_map(|(axis, value)| [OscArg::Str(axis.clone()), OscArg::Float(*value as f32)])
        .collect();

    OscMessage {
        address: address.to_string(),
        args,
    }
}

/// Anything that can deliver an OSC message
pub trait OscClient {
    /// Send one message
    fn send_message(&mut self, message: &OscMessage) -> Result<(), ConnectorError>;
}

/// OSC client over a connected UDP socket
pub struct UdpOscClient {
    socket: UdpSocket,
    target: SocketAddr,
    stats: ConnectionStats,
}

impl UdpOscClient {
    /// Bind an ephemeral local port and connect it to `target`
    pub fn connect(target: impl ToSocketAddrs) -> Result<Self, ConnectorError> {
        let target = target.to_socket_addrs()?.next().ok_or_else(|| {
            ConnectorError::Encoding("target resolved to no addresses".to_string())
        })?;

        let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local)?;
        socket.connect(target)?;

        Ok(Self {
            socket,
            target,
            stats: ConnectionStats::default(),
        })
    }

    /// Localhost on the SuperCollider default port
    pub fn localhost() -> Result<Self, ConnectorError> {
        Self::connect(("127.0.0.1", DEFAULT_OSC_PORT))
    }

    /// Where packets go
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl Connector for UdpOscClient {
    type Error = ConnectorError;

    fn send(&mut self, data: &[u8]) -> Result<(), ConnectorError> {
        match self.socket.send(data) {
            Ok(sent) => {
                self.stats.messages_sent += 1;
                self.stats.bytes_sent += sent as u64;
                Ok(())
            }
            Err(e) => {
                self.stats.messages_failed += 1;
                self.stats.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.socket.peer_addr().is_ok()
    }

    fn stats(&self) -> ConnectionStats {
        self.stats.clone()
    }
}

impl OscClient for UdpOscClient {
    fn send_message(&mut self, message: &OscMessage) -> Result<(), ConnectorError> {
        let packet = message.encode()?;
        self.send(&packet)
    }
}

/// Sends payloads to an optional bound client
pub struct OscEmitter<C: OscClient> {
    address: String,
    client: Option<C>,
}

impl<C: OscClient> OscEmitter<C> {
    /// Emitter with no client bound yet
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            client: None,
        }
    }

    /// Attach a client, replacing any previous one
    pub fn bind(&mut self, client: C) {
        self.client = Some(client);
    }

    /// Whether a client is bound
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// The bound client, if any
    pub fn client(&self) -> Option<&C> {
        self.client.as_ref()
    }

    /// Message this emitter would send for `payload`
    pub fn prepare(&self, payload: &AxisPayload) -> OscMessage {
        prepare_osc_message(&self.address, payload)
    }

    /// Send `payload`; `false` when unbound or there are no axes to send
    pub fn emit(&mut self, payload: &AxisPayload) -> Result<bool, ConnectorError> {
        let Some(client) = self.client.as_mut() else {
            return Ok(false);
        };
        if payload.is_empty() {
            return Ok(false);
        }

        let message = prepare_osc_message(&self.address, payload);
        client.send_message(&message)?;
        log_debug!("sent {} axes to {}", payload.axes.len(), self.address);
        Ok(true)
    }
}
