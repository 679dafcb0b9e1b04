//! One-shot hardware peripheral initialization.
//!
//! Configures the quadrature pulse counter, the servo LEDC channel and the
//! wind-back motor GPIO using raw ESP-IDF sys calls. Called once from
//! `main()` before the control loop starts.
//!
//! Gating is by the `espidf` cargo feature (the ESP-IDF crates are
//! optional so host tests never build them); the non-espidf versions are
//! in-memory stubs.

#[cfg(feature = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(feature = "espidf")]
use log::info;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    PcntInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed,
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PcntInitFailed(rc) => write!(f, "PCNT unit init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed => write!(f, "LEDC timer/channel config failed"),
        }
    }
}

#[cfg(feature = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_pcnt()?;
        init_gpio_outputs()?;
        init_ledc();
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(feature = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── Pulse counter (quadrature encoder) ────────────────────────

#[cfg(feature = "espidf")]
static mut PCNT_UNIT: pcnt_unit_handle_t = core::ptr::null_mut();

/// SAFETY: PCNT_UNIT is written once during init_pcnt() before any read;
/// all later access happens on the single main-loop task.
#[cfg(feature = "espidf")]
unsafe fn pcnt_unit() -> pcnt_unit_handle_t {
    unsafe { PCNT_UNIT }
}

#[cfg(feature = "espidf")]
unsafe fn init_pcnt() -> Result<(), HwInitError> {
    let unit_cfg = pcnt_unit_config_t {
        low_limit: i16::MIN as i32,
        high_limit: i16::MAX as i32,
        ..Default::default()
    };
    // SAFETY: PCNT_UNIT is only written here, once at boot.
    let ret = unsafe { pcnt_new_unit(&unit_cfg, &raw mut PCNT_UNIT) };
    if ret != ESP_OK {
        return Err(HwInitError::PcntInitFailed(ret));
    }

    let filter_cfg = pcnt_glitch_filter_config_t { max_glitch_ns: 1_000 };
    unsafe { pcnt_unit_set_glitch_filter(pcnt_unit(), &filter_cfg) };

    // Single-channel quadrature: count edges on A, direction from B.
    let chan_cfg = pcnt_chan_config_t {
        edge_gpio_num: pins::ENCODER_A_GPIO,
        level_gpio_num: pins::ENCODER_B_GPIO,
        ..Default::default()
    };
    let mut chan: pcnt_channel_handle_t = core::ptr::null_mut();
    let ret = unsafe { pcnt_new_channel(pcnt_unit(), &chan_cfg, &mut chan) };
    if ret != ESP_OK {
        return Err(HwInitError::PcntInitFailed(ret));
    }

    unsafe {
        pcnt_channel_set_edge_action(
            chan,
            pcnt_channel_edge_action_t_PCNT_CHANNEL_EDGE_ACTION_INCREASE,
            pcnt_channel_edge_action_t_PCNT_CHANNEL_EDGE_ACTION_DECREASE,
        );
        pcnt_channel_set_level_action(
            chan,
            pcnt_channel_level_action_t_PCNT_CHANNEL_LEVEL_ACTION_KEEP,
            pcnt_channel_level_action_t_PCNT_CHANNEL_LEVEL_ACTION_INVERSE,
        );

        pcnt_unit_enable(pcnt_unit());
        pcnt_unit_clear_count(pcnt_unit());
        pcnt_unit_start(pcnt_unit());
    }

    info!(
        "hw_init: PCNT configured (A=GPIO{}, B=GPIO{})",
        pins::ENCODER_A_GPIO,
        pins::ENCODER_B_GPIO
    );
    Ok(())
}

#[cfg(feature = "espidf")]
pub fn pcnt_read() -> i32 {
    let mut count: i32 = 0;
    // SAFETY: PCNT_UNIT is written once during init_pcnt() before this is
    // called; single-threaded main-loop access guaranteed.
    let ret = unsafe { pcnt_unit_get_count(pcnt_unit(), &mut count) };
    if ret != ESP_OK {
        return 0;
    }
    count
}

#[cfg(not(feature = "espidf"))]
pub fn pcnt_read() -> i32 {
    0
}

// ── GPIO outputs ──────────────────────────────────────────────

#[cfg(feature = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::WIND_MOTOR_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    unsafe { gpio_set_level(pins::WIND_MOTOR_GPIO, 0) };

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(feature = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(feature = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── LEDC servo PWM ────────────────────────────────────────────

#[cfg(feature = "espidf")]
unsafe fn init_ledc() {
    // Timer 0: brake servo (50 Hz, 14-bit).
    // SAFETY: Called from single main-task context via init_peripherals().
    let timer0 = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_14_BIT,
        freq_hz: pins::SERVO_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    unsafe {
        ledc_timer_config(&timer0);
    }

    // Channel 0: servo signal.
    unsafe {
        ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: ledc_channel_t_LEDC_CHANNEL_0,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: pins::SERVO_PWM_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        });
    }

    info!("hw_init: LEDC configured (servo=CH0)");
}

pub const LEDC_CH_SERVO: u32 = 0;

/// Servo frame period at 50 Hz, in microseconds.
const SERVO_PERIOD_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;

/// Convert a servo pulse width to a 14-bit LEDC duty value.
pub const fn servo_us_to_duty(pulse_us: u32) -> u32 {
    pulse_us * (1 << pins::SERVO_PWM_RESOLUTION_BITS) / SERVO_PERIOD_US
}

#[cfg(feature = "espidf")]
pub fn ledc_set_servo_us(pulse_us: u32) {
    // SAFETY: LEDC channel 0 was configured in init_ledc(); duty register
    // writes are race-free since only the main loop calls this function.
    unsafe {
        ledc_set_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            LEDC_CH_SERVO,
            servo_us_to_duty(pulse_us),
        );
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, LEDC_CH_SERVO);
    }
}

#[cfg(not(feature = "espidf"))]
pub fn ledc_set_servo_us(_pulse_us: u32) {}
