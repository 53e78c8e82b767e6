//! Wake-on-LAN.
//!
//! # Responsibilities
//! - Parse MAC addresses in the usual notations
//! - Build and broadcast magic packets
//! - Resolve a host's MAC from the local ARP table (arp.rs)

pub mod arp;

use serde::{Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;
use tokio::net::UdpSocket;

use crate::registry::{Connection, ConnectionConfig};

pub use arp::lookup_mac;

/// Discard port conventionally used for magic packets.
pub const WOL_PORT: u16 = 9;

#[derive(Debug, Error)]
pub enum WolError {
    #[error("Invalid MAC address format")]
    InvalidMacAddress,

    #[error("Invalid broadcast address '{0}'")]
    InvalidBroadcast(String),

    #[error("Could not resolve MAC address for host")]
    MacNotFound,

    #[error("Wake-on-LAN is only supported for SSH connections")]
    NotSsh,

    #[error("Wake-on-LAN is not enabled for this connection")]
    NotEnabled,

    #[error("No MAC address configured")]
    NoMacAddress,

    #[error("Failed to send packet: {0}")]
    Send(#[from] std::io::Error),
}

/// A 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Six 0xFF bytes followed by the address repeated sixteen times.
    pub fn magic_packet(&self) -> [u8; 102] {
        let mut packet = [0xFFu8; 102];
        for chunk in packet[6..].chunks_exact_mut(6) {
            chunk.copy_from_slice(&self.0);
        }
        packet
    }
}

impl FromStr for MacAddress {
    type Err = WolError;

    /// Accepts `AA:BB:CC:DD:EE:FF`, `AA-BB-...`, `AABB.CCDD.EEFF` and bare hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex: String = s.trim().chars().filter(|c| !matches!(c, ':' | '-' | '.')).collect();
        if hex.len() != 12 || !hex.is_ascii() {
            return Err(WolError::InvalidMacAddress);
        }

        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| WolError::InvalidMacAddress)?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", a, b, c, d, e, g)
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Broadcast a magic packet for `mac` to `broadcast:9` (default 255.255.255.255).
pub async fn send_magic_packet(mac: MacAddress, broadcast: Option<&str>) -> Result<(), WolError> {
    let ip = match broadcast.map(str::trim).filter(|b| !b.is_empty()) {
        Some(raw) => raw
            .parse::<IpAddr>()
            .map_err(|_| WolError::InvalidBroadcast(raw.to_string()))?,
        None => IpAddr::V4(Ipv4Addr::BROADCAST),
    };
    let target = SocketAddr::new(ip, WOL_PORT);

    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_broadcast(true)?;
    socket.send_to(&mac.magic_packet(), target).await?;

    tracing::info!(mac = %mac, target = %target, "Magic packet sent");
    Ok(())
}

/// Wake the host behind an SSH connection that has Wake-on-LAN enabled.
pub async fn wake(connection: &Connection) -> Result<(), WolError> {
    match &connection.config {
        ConnectionConfig::Ssh {
            wol_enabled,
            mac_address,
            broadcast_addr,
            ..
        } => {
            if !wol_enabled {
                return Err(WolError::NotEnabled);
            }
            let mac: MacAddress = mac_address.as_deref().ok_or(WolError::NoMacAddress)?.parse()?;
            send_magic_packet(mac, broadcast_addr.as_deref()).await
        }
        ConnectionConfig::Website { .. } => Err(WolError::NotSsh),
    }
}
