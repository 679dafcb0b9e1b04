//! System configuration parameters
//!
//! All tunable parameters for the TractionBox trainer. Values are
//! compiled-in defaults today; the struct is serde-derived so a future
//! provisioning channel can hot-swap it without touching call sites.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Sequence ---
    /// Extra displacement (same units as the encoder reading) the trainee
    /// must pull past the suspension-entry baseline to satisfy the
    /// `Continue` branch.
    pub pull_margin: f32,
    /// Whether an operator `Stop` cancels the active run in addition to
    /// locking the brake. `false` preserves the legacy behavior: brake
    /// locks, run stays live ("pause").
    pub stop_cancels_sequence: bool,
    /// Optional bound on acknowledgement waits, in control ticks.
    /// `None` = wait forever (accepted risk: an unresponsive console
    /// leaves the brake engaged until power-cycle). When set, expiry
    /// fail-safes: brake release, run aborted.
    pub ack_timeout_ticks: Option<u32>,
    /// Fixed seed for the threshold table (reproducible trials).
    /// `None` = seed from the boot clock.
    pub threshold_seed: Option<u64>,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub poll_interval_ms: u32,
    /// Wind-back motor pulse length for the `Winding` command (milliseconds)
    pub wind_back_ms: u32,

    // --- Hotspot / link ---
    /// SoftAP SSID the operator console joins.
    pub hotspot_ssid: String,
    /// SoftAP WPA2 password.
    pub hotspot_password: String,
    /// UDP listen port for the operator link.
    pub listen_port: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Sequence
            pull_margin: 0.5,
            stop_cancels_sequence: false,
            ack_timeout_ticks: None,
            threshold_seed: None,

            // Timing
            poll_interval_ms: 20, // 50 Hz
            wind_back_ms: 1500,

            // Hotspot / link
            hotspot_ssid: String::from("tractionBox"),
            hotspot_password: String::from("12345678"),
            listen_port: 4210,
        }
    }
}
