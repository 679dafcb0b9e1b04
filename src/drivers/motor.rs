//! Wind-back motor driver (single-direction DC motor, low-side MOSFET).
//!
//! The motor only ever runs as a timed pulse in response to the operator's
//! `Winding` command, re-spooling the tether between runs. The pulse
//! blocks the control loop for its duration; `Winding` is only issued
//! while no run is in progress, so nothing time-critical is starved.

use std::thread;
use std::time::Duration;

use log::info;

use crate::drivers::hw_init;
use crate::pins;

pub struct WindMotor {
    pulses: u32,
}

impl WindMotor {
    pub fn new() -> Self {
        hw_init::gpio_write(pins::WIND_MOTOR_GPIO, false);
        Self { pulses: 0 }
    }

    /// Run the motor for `duration_ms`, then stop. Blocking.
    pub fn pulse(&mut self, duration_ms: u32) {
        info!("wind motor: pulsing for {}ms", duration_ms);
        hw_init::gpio_write(pins::WIND_MOTOR_GPIO, true);
        thread::sleep(Duration::from_millis(u64::from(duration_ms)));
        hw_init::gpio_write(pins::WIND_MOTOR_GPIO, false);
        self.pulses += 1;
    }

    /// Total pulses since boot.
    pub fn pulse_count(&self) -> u32 {
        self.pulses
    }
}
