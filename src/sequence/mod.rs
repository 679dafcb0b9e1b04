//! Function-pointer state machine for the scripted resistance sequence.
//!
//! Classic embedded FSM pattern: a fixed table of phase descriptors, each
//! a set of plain `fn` pointers over a shared [`SeqContext`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  PhaseTable                                                 │
//! │  ┌──────────┬──────────┬─────────┬───────────────────────┐  │
//! │  │ PhaseId  │ on_enter │ on_exit │ on_update             │  │
//! │  ├──────────┼──────────┼─────────┼───────────────────────┤  │
//! │  │ Idle     │ fn(ctx)  │ fn(ctx) │ fn(ctx) -> Option<>   │  │
//! │  │ Tracking │ fn(ctx)  │ fn(ctx) │ fn(ctx) -> Option<>   │  │
//! │  │ AwaitAck │ fn(ctx)  │ fn(ctx) │ fn(ctx) -> Option<>   │  │
//! │  │ AwaitPull│ fn(ctx)  │ fn(ctx) │ fn(ctx) -> Option<>   │  │
//! │  └──────────┴──────────┴─────────┴───────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The original firmware suspended inside a re-entrant UDP drain loop while
//! waiting for acknowledgements, which swallowed any control command that
//! arrived mid-wait. Here every wait is an explicit phase driven by the
//! same single poll step that dispatches inbound messages, so a suspended
//! sequence never steals messages from the command path.

pub mod context;
pub mod states;
pub mod thresholds;

use context::SeqContext;
use log::info;

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

/// Enumeration of all sequence phases.
/// Must stay in sync with the table built in [`states::build_phase_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PhaseId {
    /// No run armed.
    Idle = 0,
    /// Comparing the sample against the remaining thresholds.
    Tracking = 1,
    /// Suspended until a matching acknowledgement label arrives.
    AwaitAck = 2,
    /// Suspended until the trainee pulls past the recorded baseline.
    AwaitPull = 3,
}

impl PhaseId {
    /// Total number of phases — sizes the table array.
    pub const COUNT: usize = 4;

    /// Convert a raw index back to `PhaseId`. Panics on out-of-range in
    /// debug builds; returns `Idle` in release (safe fallback: no run).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Tracking,
            2 => Self::AwaitAck,
            3 => Self::AwaitPull,
            _ => {
                debug_assert!(false, "invalid phase index: {idx}");
                Self::Idle
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions, run once per transition.
pub type PhaseActionFn = fn(&mut SeqContext);

/// Per-tick update handler. Returns `Some(next)` to transition, `None` to stay.
pub type PhaseUpdateFn = fn(&mut SeqContext) -> Option<PhaseId>;

// ---------------------------------------------------------------------------
// Phase descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single phase.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct PhaseDescriptor {
    pub id: PhaseId,
    pub name: &'static str,
    pub on_enter: Option<PhaseActionFn>,
    pub on_exit: Option<PhaseActionFn>,
    pub on_update: PhaseUpdateFn,
}

// ---------------------------------------------------------------------------
// Sequence engine
// ---------------------------------------------------------------------------

/// The sequence state machine engine.
///
/// Owns the phase table and is driven by [`tick`](Self::tick) from the
/// single control loop; all run state lives in the [`SeqContext`] threaded
/// through every handler call.
pub struct SequenceFsm {
    /// Fixed-size table indexed by `PhaseId as usize`.
    table: [PhaseDescriptor; PhaseId::COUNT],
    /// Index of the currently active phase.
    current: usize,
    /// Monotonically increasing tick counter.
    tick_count: u64,
    /// Tick at which the current phase was entered.
    phase_entry_tick: u64,
}

impl SequenceFsm {
    /// Construct with the given phase table, starting in `initial`.
    pub fn new(table: [PhaseDescriptor; PhaseId::COUNT], initial: PhaseId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            phase_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting phase.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut SeqContext) {
        info!("sequence starting in phase: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance by one tick: run the current phase's `on_update` and apply
    /// at most one transition.
    pub fn tick(&mut self, ctx: &mut SeqContext) {
        self.tick_count += 1;
        ctx.ticks_in_phase = self.tick_count - self.phase_entry_tick;
        ctx.total_ticks = self.tick_count;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition (used by the service for `Start`
    /// re-arming and `Stop` cancellation, regardless of phase).
    pub fn force_transition(&mut self, next: PhaseId, ctx: &mut SeqContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current phase's identity.
    pub fn current_phase(&self) -> PhaseId {
        PhaseId::from_index(self.current)
    }

    /// How many ticks the machine has been in the current phase.
    pub fn ticks_in_current_phase(&self) -> u64 {
        self.tick_count - self.phase_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: PhaseId, ctx: &mut SeqContext) {
        let next_idx = next_id as usize;

        info!(
            "sequence phase: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.phase_entry_tick = self.tick_count;
        ctx.ticks_in_phase = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::context::SeqContext;
    use super::thresholds::ThresholdSet;
    use super::*;
    use crate::config::SystemConfig;

    fn make_ctx() -> SeqContext {
        SeqContext::new(SystemConfig::default())
    }

    fn make_fsm() -> SequenceFsm {
        SequenceFsm::new(states::build_phase_table(), PhaseId::Idle)
    }

    fn fixed_set() -> ThresholdSet {
        ThresholdSet {
            pain: 10.0,
            pain2: 20.0,
            high_damp: 30.0,
            low_damp: 40.0,
        }
    }

    #[test]
    fn starts_in_idle() {
        let fsm = make_fsm();
        assert_eq!(fsm.current_phase(), PhaseId::Idle);
    }

    #[test]
    fn tick_increments_counter() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        fsm.tick(&mut ctx);
        assert_eq!(fsm.ticks_in_current_phase(), 1);
        fsm.tick(&mut ctx);
        assert_eq!(fsm.ticks_in_current_phase(), 2);
    }

    #[test]
    fn idle_stays_put_without_a_run() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.sample = 100.0; // sample alone must not arm anything
        for _ in 0..5 {
            fsm.tick(&mut ctx);
        }
        assert_eq!(fsm.current_phase(), PhaseId::Idle);
        assert!(ctx.outbox.is_empty());
    }

    #[test]
    fn armed_run_tracks_thresholds() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        ctx.begin_run(fixed_set());
        fsm.force_transition(PhaseId::Tracking, &mut ctx);

        ctx.sample = 0.0;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_phase(), PhaseId::Tracking);
        assert!(ctx.outbox.is_empty());
    }

    #[test]
    fn phase_id_from_index_roundtrip() {
        for i in 0..PhaseId::COUNT {
            let id = PhaseId::from_index(i);
            assert_eq!(id as usize, i);
        }
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn phase_id_from_invalid_index_returns_idle() {
        let id = PhaseId::from_index(99);
        assert_eq!(id, PhaseId::Idle);
    }
}
