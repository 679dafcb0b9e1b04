//! Adapters — the outer hexagonal ring.
//!
//! Each adapter binds one or more port traits from [`crate::app::ports`]
//! to a concrete mechanism: real peripherals, the UDP operator link, the
//! serial log. The domain core never imports anything from here.

pub mod hardware;
pub mod hotspot;
pub mod log_sink;
pub mod udp_link;
