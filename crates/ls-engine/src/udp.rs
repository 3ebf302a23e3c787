//! UDP relay listener
//!
//! Sends every dispatched [`StereoColorSample`] as one 32-byte datagram
//! (see [`StereoColorSample::to_bytes`]). No authentication, no
//! retransmission: a lost datagram is simply a lost frame.
//!
//! # Binding
//!
//! - **exclusive**: plain bind; fails if another socket holds the address
//! - **shared**: `SO_REUSEADDR` + `SO_REUSEPORT` on unix so several relays
//!   (or a relay and a local monitor) can share one local port

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use ls_core::{LsResult, StereoColorSample, UdpConfig, STEREO_COLOR_WIRE_SIZE};

use crate::{RunningProcess, StereoColorListener};

/// Relays decoded samples to a remote UDP endpoint
#[derive(Debug, Default)]
pub struct UdpRelayListener {
    socket: Mutex<Option<OpenSocket>>,
    packets_sent: AtomicU64,
}

#[derive(Debug)]
struct OpenSocket {
    socket: UdpSocket,
    config: UdpConfig,
    remote: SocketAddr,
}

impl UdpRelayListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the socket described by `config`, replacing any open one
    pub fn start_udp(&self, config: UdpConfig) -> LsResult<()> {
        let local = SocketAddrV4::new(Ipv4Addr::from(config.local_address), config.local_port);

        let socket = if config.exclusive {
            UdpSocket::bind(local)?
        } else {
            bind_shared(local)?
        };

        let remote = config.remote_socket_addr();
        log::info!(
            "UDP relay open: {} → {} ({})",
            socket.local_addr()?,
            remote,
            if config.exclusive { "exclusive" } else { "shared" }
        );

        *self.socket.lock() = Some(OpenSocket { socket, config, remote });
        Ok(())
    }

    /// Close the socket. Sends become no-ops.
    pub fn stop_udp(&self) {
        if self.socket.lock().take().is_some() {
            log::info!("UDP relay closed");
        }
    }

    pub fn is_socket_open(&self) -> bool {
        self.socket.lock().is_some()
    }

    /// Configuration of the open socket
    pub fn config(&self) -> Option<UdpConfig> {
        self.socket.lock().as_ref().map(|open| open.config)
    }

    /// Bound local address of the open socket
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket
            .lock()
            .as_ref()
            .and_then(|open| open.socket.local_addr().ok())
    }

    pub fn num_packets_sent(&self) -> u64 {
        self.packets_sent.load(Ordering::Relaxed)
    }

    pub fn reset_num_packets_sent(&self) {
        self.packets_sent.store(0, Ordering::Relaxed);
    }

    /// Send one sample. Returns `Ok(false)` if no socket is open.
    pub fn send_sample(&self, sample: &StereoColorSample) -> LsResult<bool> {
        let guard = self.socket.lock();
        let Some(open) = guard.as_ref() else {
            return Ok(false);
        };

        let sent = open.socket.send_to(&sample.to_bytes(), open.remote)?;
        if sent == STEREO_COLOR_WIRE_SIZE {
            self.packets_sent.fetch_add(1, Ordering::Relaxed);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

impl StereoColorListener for UdpRelayListener {
    fn on_stereo_color(&self, _process: &dyn RunningProcess, sample: &StereoColorSample) {
        if let Err(e) = self.send_sample(sample) {
            log::debug!("UDP relay send failed: {}", e);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Shared bind
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(unix)]
fn bind_shared(addr: SocketAddrV4) -> std::io::Result<UdpSocket> {
    use std::io;
    use std::mem::size_of;
    use std::os::fd::FromRawFd;

    // SAFETY: plain BSD socket calls on a descriptor we own; ownership moves
    // into `UdpSocket` immediately so every error path closes it
    unsafe {
        let fd = libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0);
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        let socket = UdpSocket::from_raw_fd(fd);

        let one: libc::c_int = 1;
        for option in [libc::SO_REUSEADDR, libc::SO_REUSEPORT] {
            let rc = libc::setsockopt(
                fd,
                libc::SOL_SOCKET,
                option,
                &one as *const libc::c_int as *const libc::c_void,
                size_of::<libc::c_int>() as libc::socklen_t,
            );
            if rc != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        let mut sockaddr: libc::sockaddr_in = std::mem::zeroed();
        sockaddr.sin_family = libc::AF_INET as libc::sa_family_t;
        sockaddr.sin_port = addr.port().to_be();
        sockaddr.sin_addr = libc::in_addr {
            s_addr: u32::from(*addr.ip()).to_be(),
        };
        #[cfg(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "netbsd",
            target_os = "dragonfly"
        ))]
        {
            sockaddr.sin_len = size_of::<libc::sockaddr_in>() as u8;
        }

        let rc = libc::bind(
            fd,
            &sockaddr as *const libc::sockaddr_in as *const libc::sockaddr,
            size_of::<libc::sockaddr_in>() as libc::socklen_t,
        );
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(socket)
    }
}

#[cfg(not(unix))]
fn bind_shared(addr: SocketAddrV4) -> std::io::Result<UdpSocket> {
    log::debug!("Shared UDP bind not supported on this platform, binding {} normally", addr);
    UdpSocket::bind(addr)
}
