//! Brake servo driver (standard 50 Hz hobby servo on the brake lever).
//!
//! Three discrete positions: full lock, weak hold, released. The servo has
//! no feedback channel, so the driver's in-memory state is the only record
//! of the commanded position.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real LEDC PWM via the hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrakeState {
    Locked,
    WeakHold,
    Released,
}

pub struct ServoBrake {
    state: BrakeState,
}

impl ServoBrake {
    /// New driver, commanding the released position so power-on never
    /// traps the trainee against an engaged brake.
    pub fn new() -> Self {
        let mut brake = Self {
            state: BrakeState::Released,
        };
        brake.release();
        brake
    }

    pub fn lock(&mut self) {
        hw_init::ledc_set_servo_us(pins::SERVO_LOCK_US);
        self.state = BrakeState::Locked;
    }

    pub fn weak_hold(&mut self) {
        hw_init::ledc_set_servo_us(pins::SERVO_WEAK_US);
        self.state = BrakeState::WeakHold;
    }

    pub fn release(&mut self) {
        hw_init::ledc_set_servo_us(pins::SERVO_RELEASE_US);
        self.state = BrakeState::Released;
    }

    pub fn state(&self) -> BrakeState {
        self.state
    }

    pub fn is_engaged(&self) -> bool {
        !matches!(self.state, BrakeState::Released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_released() {
        let brake = ServoBrake::new();
        assert_eq!(brake.state(), BrakeState::Released);
        assert!(!brake.is_engaged());
    }

    #[test]
    fn positions_track_commands() {
        let mut brake = ServoBrake::new();
        brake.lock();
        assert_eq!(brake.state(), BrakeState::Locked);
        assert!(brake.is_engaged());

        brake.weak_hold();
        assert_eq!(brake.state(), BrakeState::WeakHold);
        assert!(brake.is_engaged());

        brake.release();
        assert_eq!(brake.state(), BrakeState::Released);
    }
}
