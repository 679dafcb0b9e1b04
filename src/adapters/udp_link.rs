//! UDP operator-link adapter.
//!
//! Implements [`MessagePort`] over a non-blocking UDP socket. ESP-IDF's
//! std net layer sits on lwIP BSD sockets, so the same code runs on both
//! the device and the host test harness with no cfg gating.
//!
//! ## Peer tracking
//!
//! The link is single-peer: the source address of the most recent inbound
//! datagram becomes the target for every send. A new console taking over
//! simply sends any message and inherits the peer slot. Sends before the
//! first inbound datagram are silently dropped (best-effort transport).

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};

use log::{info, warn};

use crate::app::ports::MessagePort;
use crate::error::{Error, LinkError, Result};
use crate::protocol::RawMessage;

/// Receive buffer size. Larger datagrams are truncated by the socket
/// layer; the trimmed payload is further capped at the protocol's
/// message limit.
const RECV_BUF_LEN: usize = 255;

pub struct UdpLinkAdapter {
    socket: UdpSocket,
    peer: Option<SocketAddr>,
    buf: [u8; RECV_BUF_LEN],
}

impl UdpLinkAdapter {
    /// Bind on all interfaces at `port` and switch to non-blocking mode.
    pub fn bind(port: u16) -> Result<Self> {
        let socket =
            UdpSocket::bind(("0.0.0.0", port)).map_err(|_| Error::Link(LinkError::BindFailed))?;
        socket
            .set_nonblocking(true)
            .map_err(|_| Error::Link(LinkError::BindFailed))?;

        info!("udp link: listening on port {}", port);
        Ok(Self {
            socket,
            peer: None,
            buf: [0; RECV_BUF_LEN],
        })
    }

    /// Actual bound port (useful when binding port 0 in tests).
    pub fn local_port(&self) -> u16 {
        self.socket.local_addr().map(|a| a.port()).unwrap_or(0)
    }

    /// The currently tracked console endpoint, if one has spoken yet.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl MessagePort for UdpLinkAdapter {
    fn poll_message(&mut self) -> Option<RawMessage> {
        loop {
            match self.socket.recv_from(&mut self.buf) {
                Ok((len, src)) => {
                    // Whoever spoke last is the peer.
                    self.peer = Some(src);

                    let Ok(text) = core::str::from_utf8(&self.buf[..len]) else {
                        warn!("udp link: dropping non-UTF8 datagram from {}", src);
                        continue;
                    };

                    let mut msg = RawMessage::new();
                    for c in text.trim().chars() {
                        if msg.push(c).is_err() {
                            break;
                        }
                    }
                    return Some(msg);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return None,
                Err(e) => {
                    warn!("udp link: recv error: {}", e);
                    return None;
                }
            }
        }
    }

    fn send(&mut self, text: &str) {
        let Some(peer) = self.peer else {
            // No console has spoken yet; nothing to target.
            return;
        };
        if let Err(e) = self.socket.send_to(text.as_bytes(), peer) {
            warn!("udp link: send to {} failed: {}", peer, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn console() -> UdpSocket {
        let s = UdpSocket::bind("127.0.0.1:0").unwrap();
        s.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        s
    }

    fn deliver(console: &UdpSocket, link: &mut UdpLinkAdapter, payload: &[u8]) {
        console
            .send_to(payload, ("127.0.0.1", link.local_port()))
            .unwrap();
        // Non-blocking recv needs the datagram to have landed.
        std::thread::sleep(Duration::from_millis(20));
    }

    #[test]
    fn inbound_messages_are_trimmed() {
        let mut link = UdpLinkAdapter::bind(0).unwrap();
        let console = console();

        deliver(&console, &mut link, b"  Start\r\n");
        let msg = link.poll_message().expect("datagram delivered");
        assert_eq!(msg.as_str(), "Start");
        assert!(link.poll_message().is_none());
    }

    #[test]
    fn sender_becomes_the_peer() {
        let mut link = UdpLinkAdapter::bind(0).unwrap();
        let console = console();

        assert!(link.peer().is_none());
        deliver(&console, &mut link, b"hello");
        let _ = link.poll_message().unwrap();
        assert_eq!(link.peer().unwrap(), console.local_addr().unwrap());

        link.send("Pain");
        let mut buf = [0u8; 64];
        let (len, _) = console.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"Pain");
    }

    #[test]
    fn send_without_a_peer_is_dropped() {
        let mut link = UdpLinkAdapter::bind(0).unwrap();
        // Must not panic or error.
        link.send("Pain");
    }

    #[test]
    fn non_utf8_datagrams_are_skipped() {
        let mut link = UdpLinkAdapter::bind(0).unwrap();
        let console = console();

        deliver(&console, &mut link, &[0xFF, 0xFE, 0xFD]);
        deliver(&console, &mut link, b"OK");
        let msg = link.poll_message().expect("valid datagram after junk");
        assert_eq!(msg.as_str(), "OK");
    }

    #[test]
    fn oversized_payload_is_capped() {
        let mut link = UdpLinkAdapter::bind(0).unwrap();
        let console = console();

        let big = [b'x'; 200];
        deliver(&console, &mut link, &big);
        let msg = link.poll_message().unwrap();
        assert_eq!(msg.len(), crate::protocol::MAX_MESSAGE_LEN);
    }
}
