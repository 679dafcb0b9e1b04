//! Shared mutable context threaded through every phase handler.
//!
//! `SeqContext` is the single struct the phase handlers read from and
//! write to: the latest displacement sample, the active run's threshold
//! set and stage progress, the pending acknowledgement (while suspended),
//! and the per-tick outputs (wire labels to send, brake actions to apply).
//! The service writes the sample and routed ack before each tick and
//! drains the outputs after it.

use heapless::Vec;

use crate::config::SystemConfig;
use crate::protocol::{AckLabel, AckSet, EventLabel};
use crate::sequence::thresholds::{Stage, ThresholdSet};

// ---------------------------------------------------------------------------
// Brake actions (written by phase handlers; applied by the service)
// ---------------------------------------------------------------------------

/// Discrete brake actuation request. The servo has no feedback channel,
/// so requests are edge-triggered commands, not a level to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrakeAction {
    /// Full lock.
    Lock,
    /// Partial hold — resistance without a hard stop.
    WeakHold,
    /// Free-running.
    Release,
}

// ---------------------------------------------------------------------------
// Pending acknowledgement
// ---------------------------------------------------------------------------

/// What the suspended sequence does once a matching ack arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckFollowUp {
    /// Release the brake and resume threshold tracking.
    Release,
    /// The LowDamp choice point: `OK1` releases, `Continue` suspends on
    /// the pull condition instead.
    LowDampBranch,
}

/// Correlation state held only while a wait is in progress. Lifetime is
/// exactly one suspension: created on entry, dropped on resolution.
#[derive(Debug, Clone, Copy)]
pub struct PendingAck {
    /// Labels that resolve this wait.
    pub accept: AckSet,
    /// Action taken on resolution.
    pub follow_up: AckFollowUp,
    /// Ticks spent waiting so far (drives the optional timeout).
    pub waited_ticks: u32,
}

impl PendingAck {
    pub const fn new(accept: AckSet, follow_up: AckFollowUp) -> Self {
        Self {
            accept,
            follow_up,
            waited_ticks: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// SeqContext
// ---------------------------------------------------------------------------

/// Worst case one tick fires Pain, Pain2 and a damping stage back-to-back.
pub const OUTBOX_CAP: usize = 4;
pub const BRAKE_CAP: usize = 4;

/// The shared context passed to every phase handler function.
pub struct SeqContext {
    // -- Timing --
    /// Ticks elapsed since the current phase was entered.
    pub ticks_in_phase: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,

    // -- Input --
    /// Latest displacement sample. Written before each tick.
    pub sample: f32,
    /// Ack label routed to the pending wait this tick, if any.
    /// At most one per tick; non-matching labels are discarded.
    pub offered_ack: Option<AckLabel>,

    // -- Run state --
    /// Whether a scripted run is live.
    pub active: bool,
    /// Threshold set drawn for this run.
    pub thresholds: Option<ThresholdSet>,
    /// Highest stage fired so far; monotonically non-decreasing within a
    /// run, so a stage can never refire on later samples.
    pub stage_reached: Option<Stage>,
    /// Suspension state while awaiting an acknowledgement.
    pub pending: Option<PendingAck>,
    /// Displacement recorded on entering the pull wait.
    pub pull_baseline: f32,

    // -- Outputs (drained by the service after each tick) --
    /// Wire labels to send to the operator console.
    pub outbox: Vec<EventLabel, OUTBOX_CAP>,
    /// Brake actions to apply, in order.
    pub brake: Vec<BrakeAction, BRAKE_CAP>,
    /// Label that resolved the last wait (completion record).
    pub last_ack: Option<AckLabel>,
    /// Set when a bounded wait expired and the run was aborted.
    pub timed_out: bool,

    // -- Configuration --
    pub config: SystemConfig,
}

impl SeqContext {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            ticks_in_phase: 0,
            total_ticks: 0,
            sample: 0.0,
            offered_ack: None,
            active: false,
            thresholds: None,
            stage_reached: None,
            pending: None,
            pull_baseline: 0.0,
            outbox: Vec::new(),
            brake: Vec::new(),
            last_ack: None,
            timed_out: false,
            config,
        }
    }

    /// Arm a fresh run with a newly drawn threshold set. Resets stage
    /// progress and clears any leftover suspension from a previous run.
    pub fn begin_run(&mut self, thresholds: ThresholdSet) {
        self.thresholds = Some(thresholds);
        self.stage_reached = None;
        self.pending = None;
        self.offered_ack = None;
        self.timed_out = false;
        self.active = true;
    }

    /// Tear down the run (operator cancel or timeout fail-safe).
    pub fn end_run(&mut self) {
        self.active = false;
        self.pending = None;
        self.offered_ack = None;
    }

    /// Whether `stage` has already fired this run.
    pub fn crossed(&self, stage: Stage) -> bool {
        self.stage_reached.is_some_and(|r| stage <= r)
    }

    /// Queue a wire label; the outbox is sized for the worst-case tick,
    /// so overflow indicates a handler bug.
    pub fn send_label(&mut self, label: EventLabel) {
        debug_assert!(!self.outbox.is_full(), "outbox overflow");
        let _ = self.outbox.push(label);
    }

    /// Queue a brake action.
    pub fn drive_brake(&mut self, action: BrakeAction) {
        debug_assert!(!self.brake.is_full(), "brake queue overflow");
        let _ = self.brake.push(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> ThresholdSet {
        ThresholdSet {
            pain: 10.0,
            pain2: 20.0,
            high_damp: 30.0,
            low_damp: 40.0,
        }
    }

    #[test]
    fn begin_run_resets_progress() {
        let mut ctx = SeqContext::new(SystemConfig::default());
        ctx.stage_reached = Some(Stage::LowDamp);
        ctx.pending = Some(PendingAck::new(
            AckSet::only(AckLabel::Ok),
            AckFollowUp::Release,
        ));

        ctx.begin_run(set());
        assert!(ctx.active);
        assert_eq!(ctx.stage_reached, None);
        assert!(ctx.pending.is_none());
    }

    #[test]
    fn crossed_is_cumulative() {
        let mut ctx = SeqContext::new(SystemConfig::default());
        ctx.begin_run(set());

        assert!(!ctx.crossed(Stage::Pain));
        ctx.stage_reached = Some(Stage::HighDamp);
        assert!(ctx.crossed(Stage::Pain));
        assert!(ctx.crossed(Stage::Pain2));
        assert!(ctx.crossed(Stage::HighDamp));
        assert!(!ctx.crossed(Stage::LowDamp));
    }
}
