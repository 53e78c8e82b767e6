//! MAC discovery via the kernel ARP table.
//!
//! Only hosts that were contacted recently show up. The lookup pings the
//! host first with a TCP connect attempt so the kernel populates its entry.

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;

use super::{MacAddress, WolError};

const ARP_TABLE: &str = "/proc/net/arp";
const PRIME_TIMEOUT: Duration = Duration::from_secs(1);

/// Find the MAC for `ip` in `/proc/net/arp` formatted contents.
///
/// Incomplete entries (all-zero MAC) are skipped.
pub fn parse_arp_table(contents: &str, ip: IpAddr) -> Option<MacAddress> {
    let wanted = ip.to_string();
    contents
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let addr = fields.next()?;
            let hw = fields.nth(2)?;
            (addr == wanted).then_some(hw)
        })
        .filter_map(|hw| hw.parse::<MacAddress>().ok())
        .find(|mac| mac.octets() != [0; 6])
}

/// Resolve `host` and return the MAC the local ARP table holds for it.
pub async fn lookup_mac(host: &str) -> Result<MacAddress, WolError> {
    lookup_mac_in(host, Path::new(ARP_TABLE)).await
}

pub(crate) async fn lookup_mac_in(host: &str, table: &Path) -> Result<MacAddress, WolError> {
    let host = host.trim();
    let ip = match host.parse::<IpAddr>() {
        Ok(ip) => ip,
        Err(_) => lookup_host((host, 0))
            .await
            .map_err(|_| WolError::MacNotFound)?
            .map(|addr| addr.ip())
            .find(IpAddr::is_ipv4)
            .ok_or(WolError::MacNotFound)?,
    };

    // Any answer (even a refusal) leaves an ARP entry behind.
    let _ = timeout(PRIME_TIMEOUT, TcpStream::connect((ip, 22))).await;

    let contents = tokio::fs::read_to_string(table).await.map_err(|e| {
        tracing::debug!(error = %e, path = %table.display(), "ARP table unavailable");
        WolError::MacNotFound
    })?;

    parse_arp_table(&contents, ip).ok_or(WolError::MacNotFound)
}
