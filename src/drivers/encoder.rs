//! Spool displacement encoder (quadrature, PCNT-counted).
//!
//! The pulse counter hardware tracks quadrature edges in the background;
//! this driver converts the running count into a displacement reading in
//! the same units the sequence thresholds use.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the PCNT unit configured by `hw_init`.
//! On host/test: the hardware read is a stub returning 0; an explicit
//! simulation setter lets tests inject counts.

#[cfg(feature = "espidf")]
use crate::drivers::hw_init;
use crate::pins;

pub struct EncoderDriver {
    counts_per_unit: f32,
    /// Count captured by the last [`zero`](Self::zero) call.
    zero_offset: i32,
    #[cfg(not(feature = "espidf"))]
    sim_counts: i32,
}

impl EncoderDriver {
    pub fn new() -> Self {
        Self {
            counts_per_unit: pins::ENCODER_COUNTS_PER_UNIT,
            zero_offset: 0,
            #[cfg(not(feature = "espidf"))]
            sim_counts: 0,
        }
    }

    /// Displacement since the last zero, in threshold units. Negative when
    /// the spool has wound back past the zero point.
    pub fn read_distance(&mut self) -> f32 {
        let raw = self.read_counts();
        (raw - self.zero_offset) as f32 / self.counts_per_unit
    }

    /// Re-baseline: the current position becomes displacement 0.
    pub fn zero(&mut self) {
        self.zero_offset = self.read_counts();
    }

    fn read_counts(&self) -> i32 {
        #[cfg(feature = "espidf")]
        {
            hw_init::pcnt_read()
        }
        #[cfg(not(feature = "espidf"))]
        {
            self.sim_counts
        }
    }

    /// Inject a raw count for host tests.
    #[cfg(not(feature = "espidf"))]
    pub fn set_sim_counts(&mut self, counts: i32) {
        self.sim_counts = counts;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_scale_to_distance_units() {
        let mut enc = EncoderDriver::new();
        enc.set_sim_counts((pins::ENCODER_COUNTS_PER_UNIT * 12.0) as i32);
        let d = enc.read_distance();
        assert!((d - 12.0).abs() < 0.05, "distance {d}");
    }

    #[test]
    fn zero_rebaselines() {
        let mut enc = EncoderDriver::new();
        enc.set_sim_counts(400);
        enc.zero();
        assert!(enc.read_distance().abs() < f32::EPSILON);

        enc.set_sim_counts(400 + (pins::ENCODER_COUNTS_PER_UNIT * 3.0) as i32);
        assert!((enc.read_distance() - 3.0).abs() < 0.05);
    }

    #[test]
    fn wound_back_reads_negative() {
        let mut enc = EncoderDriver::new();
        enc.set_sim_counts(0);
        enc.zero();
        enc.set_sim_counts(-(pins::ENCODER_COUNTS_PER_UNIT as i32));
        assert!(enc.read_distance() < 0.0);
    }
}
