//! WiFi soft-AP (hotspot) adapter.
//!
//! The device publishes its own access point; the operator console joins
//! it and then speaks to the UDP link. There is no station mode and no
//! reconnection policy — the AP either comes up at boot or boot fails.
//!
//! ## cfg gating
//!
//! - **`espidf` feature**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other builds**: simulation stubs for host-side tests.

use core::fmt;
use log::info;

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotspotError {
    InvalidSsid,
    InvalidPassword,
    DriverInit,
    StartFailed,
}

impl fmt::Display for HotspotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2)")
            }
            Self::DriverInit => write!(f, "WiFi driver initialization failed"),
            Self::StartFailed => write!(f, "soft-AP start failed"),
        }
    }
}

impl core::error::Error for HotspotError {}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), HotspotError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(HotspotError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), HotspotError> {
    if password.len() < 8 || password.len() > 64 {
        return Err(HotspotError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Hotspot adapter
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotspotState {
    Down,
    Up,
}

// EspWifi carries non-Debug driver handles, so Debug only exists on host
// builds (where the tests need it).
#[cfg_attr(not(feature = "espidf"), derive(Debug))]
pub struct HotspotAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    state: HotspotState,
    #[cfg(feature = "espidf")]
    wifi: Option<esp_idf_svc::wifi::EspWifi<'static>>,
}

impl HotspotAdapter {
    /// Validate credentials and construct the adapter (AP not yet up).
    pub fn new(ssid: &str, password: &str) -> Result<Self, HotspotError> {
        validate_ssid(ssid)?;
        validate_password(password)?;

        let mut s = heapless::String::new();
        s.push_str(ssid).map_err(|()| HotspotError::InvalidSsid)?;
        let mut p = heapless::String::new();
        p.push_str(password)
            .map_err(|()| HotspotError::InvalidPassword)?;

        Ok(Self {
            ssid: s,
            password: p,
            state: HotspotState::Down,
            #[cfg(feature = "espidf")]
            wifi: None,
        })
    }

    pub fn state(&self) -> HotspotState {
        self.state
    }

    pub fn is_up(&self) -> bool {
        self.state == HotspotState::Up
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    // ── Platform-specific ─────────────────────────────────────

    /// Bring the access point up. Consumes the modem peripheral; the AP
    /// stays up for the lifetime of the adapter.
    #[cfg(feature = "espidf")]
    pub fn start(
        &mut self,
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: esp_idf_svc::nvs::EspDefaultNvsPartition,
    ) -> Result<(), HotspotError> {
        use esp_idf_svc::wifi::{AccessPointConfiguration, AuthMethod, Configuration, EspWifi};

        let mut wifi =
            EspWifi::new(modem, sysloop, Some(nvs)).map_err(|_| HotspotError::DriverInit)?;

        let ap = AccessPointConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|()| HotspotError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|()| HotspotError::InvalidPassword)?,
            auth_method: AuthMethod::WPA2Personal,
            channel: 1,
            ..Default::default()
        };
        wifi.set_configuration(&Configuration::AccessPoint(ap))
            .map_err(|_| HotspotError::DriverInit)?;
        wifi.start().map_err(|_| HotspotError::StartFailed)?;

        self.wifi = Some(wifi);
        self.state = HotspotState::Up;
        info!("hotspot: AP '{}' up", self.ssid);
        Ok(())
    }

    #[cfg(not(feature = "espidf"))]
    pub fn start(&mut self) -> Result<(), HotspotError> {
        self.state = HotspotState::Up;
        info!("hotspot(sim): AP '{}' up", self.ssid);
        Ok(())
    }

    pub fn stop(&mut self) {
        #[cfg(feature = "espidf")]
        if let Some(wifi) = self.wifi.as_mut() {
            let _ = wifi.stop();
        }
        self.state = HotspotState::Down;
        info!("hotspot: AP down");
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_ssid() {
        assert_eq!(
            HotspotAdapter::new("", "password123").unwrap_err(),
            HotspotError::InvalidSsid
        );
    }

    #[test]
    fn rejects_short_password() {
        assert_eq!(
            HotspotAdapter::new("tractionBox", "short").unwrap_err(),
            HotspotError::InvalidPassword
        );
    }

    #[test]
    fn accepts_default_credentials() {
        let cfg = crate::config::SystemConfig::default();
        let a = HotspotAdapter::new(&cfg.hotspot_ssid, &cfg.hotspot_password).unwrap();
        assert_eq!(a.state(), HotspotState::Down);
        assert_eq!(a.ssid(), cfg.hotspot_ssid);
    }

    #[test]
    fn start_stop_roundtrip() {
        let mut a = HotspotAdapter::new("tractionBox", "12345678").unwrap();
        a.start().unwrap();
        assert!(a.is_up());
        a.stop();
        assert!(!a.is_up());
    }
}
