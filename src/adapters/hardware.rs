//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the encoder and both actuator drivers, exposing them through
//! [`SensorPort`] and [`ActuatorPort`]. This is the only module in the
//! system that touches actual hardware. On non-espidf builds the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::encoder::EncoderDriver;
use crate::drivers::motor::WindMotor;
use crate::drivers::servo_brake::ServoBrake;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    encoder: EncoderDriver,
    brake: ServoBrake,
    motor: WindMotor,
    wind_back_ms: u32,
}

impl HardwareAdapter {
    pub fn new(
        encoder: EncoderDriver,
        brake: ServoBrake,
        motor: WindMotor,
        wind_back_ms: u32,
    ) -> Self {
        Self {
            encoder,
            brake,
            motor,
            wind_back_ms,
        }
    }

    /// Re-baseline the encoder; the current spool position becomes
    /// displacement 0.
    pub fn zero_encoder(&mut self) {
        self.encoder.zero();
    }

    pub fn brake_state(&self) -> crate::drivers::servo_brake::BrakeState {
        self.brake.state()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_distance(&mut self) -> f32 {
        self.encoder.read_distance()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn lock(&mut self) {
        self.brake.lock();
    }

    fn weak_hold(&mut self) {
        self.brake.weak_hold();
    }

    fn release(&mut self) {
        self.brake.release();
    }

    fn rewind(&mut self) {
        self.motor.pulse(self.wind_back_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::servo_brake::BrakeState;

    fn adapter() -> HardwareAdapter {
        HardwareAdapter::new(EncoderDriver::new(), ServoBrake::new(), WindMotor::new(), 1)
    }

    #[test]
    fn actuator_port_drives_the_brake() {
        let mut hw = adapter();
        hw.lock();
        assert_eq!(hw.brake_state(), BrakeState::Locked);
        hw.weak_hold();
        assert_eq!(hw.brake_state(), BrakeState::WeakHold);
        hw.release();
        assert_eq!(hw.brake_state(), BrakeState::Released);
    }

    #[test]
    fn sensor_port_reads_the_encoder() {
        let mut hw = adapter();
        hw.zero_encoder();
        assert!(hw.read_distance().abs() < f32::EPSILON);
    }
}
