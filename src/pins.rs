//! GPIO / peripheral pin assignments for the TractionBox main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Spool encoder (quadrature, PCNT-counted)
// ---------------------------------------------------------------------------

/// Encoder channel A — pulse input to the pulse counter unit.
pub const ENCODER_A_GPIO: i32 = 4;
/// Encoder channel B — direction discriminator for the same unit.
pub const ENCODER_B_GPIO: i32 = 5;

/// Quadrature counts per displacement unit. The sequence thresholds are
/// expressed in these units, so the slot ranges and this constant must be
/// calibrated together against the physical spool.
pub const ENCODER_COUNTS_PER_UNIT: f32 = 40.0;

// ---------------------------------------------------------------------------
// Brake servo (standard 50 Hz hobby servo on the brake lever)
// ---------------------------------------------------------------------------

/// LEDC PWM output driving the brake servo signal line.
pub const SERVO_PWM_GPIO: i32 = 6;

/// Servo PWM base frequency (standard hobby-servo refresh).
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC timer resolution for the servo channel. 14-bit at 50 Hz gives
/// ~1.2 µs of pulse-width granularity.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;

/// Pulse width for full brake lock (lever hard against the spool).
pub const SERVO_LOCK_US: u32 = 2_300;
/// Pulse width for the partial weak-hold position.
pub const SERVO_WEAK_US: u32 = 1_700;
/// Pulse width for the released (free-running) position.
pub const SERVO_RELEASE_US: u32 = 1_000;

// ---------------------------------------------------------------------------
// Wind-back motor (single-direction DC motor via low-side MOSFET)
// ---------------------------------------------------------------------------

/// Digital output: HIGH = motor winding the tether back onto the spool.
pub const WIND_MOTOR_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// UART debug
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
