//! UDP relay configuration, IPv4 helpers and interface enumeration

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::{LsError, LsResult};

/// Loopback address in numeric form (127.0.0.1)
pub const LOOPBACK_ADDRESS: u32 = 0x7F00_0001;

/// Network settings for the UDP relay listener.
///
/// Addresses are IPv4 in the numeric form of [`Ipv4Addr`]
/// (`u32::from(Ipv4Addr::new(127, 0, 0, 1)) == 0x7F00_0001`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UdpConfig {
    /// Local interface to bind
    pub local_address: u32,
    /// Remote host to send to
    pub remote_address: u32,
    /// Local port; 0 lets the system pick
    pub local_port: u16,
    /// Remote port to send to
    pub remote_port: u16,
    /// Bind exclusively instead of sharing the address with other sockets
    pub exclusive: bool,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self::loopback(8000)
    }
}

impl UdpConfig {
    /// Send from an ephemeral loopback port to `127.0.0.1:remote_port`
    pub fn loopback(remote_port: u16) -> Self {
        Self {
            local_address: LOOPBACK_ADDRESS,
            remote_address: LOOPBACK_ADDRESS,
            local_port: 0,
            remote_port,
            exclusive: false,
        }
    }

    pub fn local_socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::from(self.local_address), self.local_port))
    }

    pub fn remote_socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::from(self.remote_address), self.remote_port))
    }
}

/// Parse a dotted-quad IPv4 string into its numeric form
pub fn ipv4_from_str(address: &str) -> LsResult<u32> {
    address
        .trim()
        .parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| LsError::InvalidAddress(address.to_string()))
}

/// Format a numeric IPv4 address as a dotted-quad string
pub fn ipv4_to_string(address: u32) -> String {
    Ipv4Addr::from(address).to_string()
}

// ═══════════════════════════════════════════════════════════════════════════════
// NETWORK INTERFACES
// ═══════════════════════════════════════════════════════════════════════════════

/// One IPv4 address of a local network interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub name: String,
    /// Numeric IPv4 address, usable as [`UdpConfig::local_address`]
    pub address: u32,
}

impl NetworkInterface {
    pub fn is_loopback(&self) -> bool {
        Ipv4Addr::from(self.address).is_loopback()
    }
}

/// IPv4 interfaces of this host in system order.
///
/// An interface with several IPv4 addresses is listed once per address.
#[cfg(unix)]
pub fn ipv4_interfaces() -> LsResult<Vec<NetworkInterface>> {
    use std::ffi::CStr;

    let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
    // SAFETY: on success `head` owns a list released by `freeifaddrs` below
    if unsafe { libc::getifaddrs(&mut head) } != 0 {
        return Err(std::io::Error::last_os_error().into());
    }

    let mut interfaces = Vec::new();
    let mut cursor = head;
    while !cursor.is_null() {
        // SAFETY: every node stays valid until `freeifaddrs`; `ifa_addr` is
        // only reinterpreted as `sockaddr_in` when its family is AF_INET
        unsafe {
            let entry = &*cursor;
            cursor = entry.ifa_next;

            if entry.ifa_addr.is_null() || i32::from((*entry.ifa_addr).sa_family) != libc::AF_INET {
                continue;
            }
            let addr = &*(entry.ifa_addr as *const libc::sockaddr_in);
            interfaces.push(NetworkInterface {
                name: CStr::from_ptr(entry.ifa_name).to_string_lossy().into_owned(),
                address: u32::from_be(addr.sin_addr.s_addr),
            });
        }
    }

    // SAFETY: `head` came from a successful `getifaddrs` and is freed once
    unsafe { libc::freeifaddrs(head) };
    Ok(interfaces)
}

#[cfg(not(unix))]
pub fn ipv4_interfaces() -> LsResult<Vec<NetworkInterface>> {
    Err(std::io::Error::from(std::io::ErrorKind::Unsupported).into())
}
