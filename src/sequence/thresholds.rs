//! Threshold table lifecycle.
//!
//! Ten candidate 4-tuples of strictly ascending pull distances, generated
//! once at boot from fixed per-slot ranges. One tuple is drawn uniformly
//! at random each time the operator starts a run; the table itself is
//! never regenerated or mutated afterwards.

use rand::Rng;

use crate::protocol::EventLabel;

/// Number of candidate threshold sets generated at boot.
pub const TABLE_LEN: usize = 10;

/// Per-slot generation ranges, half-open, in encoder distance units.
/// Disjoint ranges guarantee strict ascent without rejection sampling.
pub const SLOT_RANGES: [(f32, f32); 4] = [
    (5.0, 15.0),  // pain onset
    (15.0, 25.0), // pain escalation
    (25.0, 35.0), // high damping
    (35.0, 45.0), // low damping
];

// ---------------------------------------------------------------------------
// Stage identity
// ---------------------------------------------------------------------------

/// The four ordered threshold checkpoints within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Stage {
    Pain = 0,
    Pain2 = 1,
    HighDamp = 2,
    LowDamp = 3,
}

impl Stage {
    /// Threshold-ascending evaluation order.
    pub const ALL: [Stage; 4] = [Stage::Pain, Stage::Pain2, Stage::HighDamp, Stage::LowDamp];

    /// Wire label announced when this stage fires.
    pub const fn label(self) -> EventLabel {
        match self {
            Self::Pain => EventLabel::Pain,
            Self::Pain2 => EventLabel::Pain2,
            Self::HighDamp => EventLabel::HighDamp,
            Self::LowDamp => EventLabel::LowDamp,
        }
    }
}

// ---------------------------------------------------------------------------
// ThresholdSet
// ---------------------------------------------------------------------------

/// One ordered 4-tuple of strictly increasing pull distances.
/// Immutable once drawn; owned exclusively by the active run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSet {
    pub pain: f32,
    pub pain2: f32,
    pub high_damp: f32,
    pub low_damp: f32,
}

impl ThresholdSet {
    pub const fn for_stage(&self, stage: Stage) -> f32 {
        match stage {
            Stage::Pain => self.pain,
            Stage::Pain2 => self.pain2,
            Stage::HighDamp => self.high_damp,
            Stage::LowDamp => self.low_damp,
        }
    }

    /// Strict-ascent invariant (`t0 < t1 < t2 < t3`).
    pub fn is_ascending(&self) -> bool {
        self.pain < self.pain2 && self.pain2 < self.high_damp && self.high_damp < self.low_damp
    }
}

// ---------------------------------------------------------------------------
// ThresholdTable
// ---------------------------------------------------------------------------

/// Fixed table of candidate threshold sets. Generated once, read-only.
pub struct ThresholdTable {
    entries: [ThresholdSet; TABLE_LEN],
}

impl ThresholdTable {
    /// Fill the table from the documented per-slot ranges. Called exactly
    /// once at boot; no regeneration operation exists.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let mut entries = [ThresholdSet {
            pain: 0.0,
            pain2: 0.0,
            high_damp: 0.0,
            low_damp: 0.0,
        }; TABLE_LEN];

        for entry in &mut entries {
            *entry = ThresholdSet {
                pain: rng.gen_range(SLOT_RANGES[0].0..SLOT_RANGES[0].1),
                pain2: rng.gen_range(SLOT_RANGES[1].0..SLOT_RANGES[1].1),
                high_damp: rng.gen_range(SLOT_RANGES[2].0..SLOT_RANGES[2].1),
                low_damp: rng.gen_range(SLOT_RANGES[3].0..SLOT_RANGES[3].1),
            };
        }

        Self { entries }
    }

    /// Draw one entry uniformly at random for a new run.
    /// Returns the index alongside the copy for logging.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> (usize, ThresholdSet) {
        let idx = rng.gen_range(0..TABLE_LEN);
        (idx, self.entries[idx])
    }

    pub fn entries(&self) -> &[ThresholdSet] {
        &self.entries
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    proptest! {
        #[test]
        fn generation_invariants_hold_for_any_seed(seed in any::<u64>()) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let table = ThresholdTable::generate(&mut rng);
            for set in table.entries() {
                prop_assert!(set.is_ascending());
                prop_assert!(set.pain >= 5.0 && set.pain < 15.0);
                prop_assert!(set.pain2 >= 15.0 && set.pain2 < 25.0);
                prop_assert!(set.high_damp >= 25.0 && set.high_damp < 35.0);
                prop_assert!(set.low_damp >= 35.0 && set.low_damp < 45.0);
            }
        }
    }
}
