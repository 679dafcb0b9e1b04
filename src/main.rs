//! TractionBox Firmware — Main Entry Point
//!
//! Hexagonal architecture driven by a single polled control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    UdpLinkAdapter    LogEventSink             │
//! │  (Sensor+Actuator)  (MessagePort)     (EventSink)              │
//! │  HotspotAdapter                                                │
//! │  (soft-AP bring-up)                                            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Sequence FSM · Threshold table · Message dispatch     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod error;
mod pins;

pub mod app;
mod adapters;
mod drivers;
pub mod protocol;
pub mod sequence;

// ── Imports ───────────────────────────────────────────────────
use anyhow::{Context, Result};
use log::info;

use adapters::hardware::HardwareAdapter;
use adapters::hotspot::HotspotAdapter;
use adapters::log_sink::LogEventSink;
use adapters::udp_link::UdpLinkAdapter;
use app::service::AppService;
use config::SystemConfig;
use drivers::encoder::EncoderDriver;
use drivers::motor::WindMotor;
use drivers::servo_brake::ServoBrake;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  TractionBox v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();

    // ── 4. Hotspot + UDP link ─────────────────────────────────
    let peripherals = esp_idf_svc::hal::peripherals::Peripherals::take()
        .context("peripherals already taken")?;
    let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
    let nvs = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;

    let mut hotspot = HotspotAdapter::new(&config.hotspot_ssid, &config.hotspot_password)
        .context("hotspot credentials")?;
    hotspot
        .start(peripherals.modem, sysloop, nvs)
        .context("hotspot bring-up")?;

    let mut link = UdpLinkAdapter::bind(config.listen_port).context("udp link")?;
    info!("operator link ready on UDP {}", config.listen_port);

    // ── 5. Hardware adapter ───────────────────────────────────
    let mut hw = HardwareAdapter::new(
        EncoderDriver::new(),
        ServoBrake::new(),
        WindMotor::new(),
        config.wind_back_ms,
    );
    // Power-on spool position is displacement 0.
    hw.zero_encoder();

    // ── 6. Application service ────────────────────────────────
    // SAFETY: esp_timer_get_time is a monotonic counter read; boot-time
    // value seeds the threshold RNG unless the config pins a seed.
    let boot_seed = unsafe { esp_idf_svc::sys::esp_timer_get_time() } as u64;

    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config.clone(), boot_seed);
    app.start(&mut sink);

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    let interval = std::time::Duration::from_millis(u64::from(config.poll_interval_ms));
    loop {
        app.poll(&mut hw, &mut link, &mut sink);
        std::thread::sleep(interval);
    }
}
