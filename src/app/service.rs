//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the sequence state machine, the threshold table and
//! the shared context, and exposes a clean, hardware-agnostic API. All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!  MessagePort ◀──▶│        AppService          │
//! ActuatorPort ◀── │  Sequence FSM · Thresholds │
//!                  └────────────────────────────┘
//! ```
//!
//! One [`poll`](AppService::poll) is one control cycle: drain the link,
//! sample the encoder, tick the sequence, flush outputs. Because a wait is
//! a phase rather than a blocking loop, control commands arriving while a
//! run is suspended are dispatched here like any other message instead of
//! being swallowed by the waiter.

use log::info;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::SystemConfig;
use crate::protocol::{self, ControlCommand, Inbound, MAX_REPLY_LEN, RawMessage};
use crate::sequence::context::{BrakeAction, SeqContext};
use crate::sequence::states::build_phase_table;
use crate::sequence::thresholds::{ThresholdSet, ThresholdTable};
use crate::sequence::{PhaseId, SequenceFsm};

use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, MessagePort, SensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: SequenceFsm,
    ctx: SeqContext,
    /// Generated once at construction, read-only afterwards.
    table: ThresholdTable,
    /// Drives the per-run uniform draw.
    rng: SmallRng,
    poll_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// `boot_seed` feeds table generation and per-run draws unless the
    /// config pins an explicit `threshold_seed` (reproducible trials).
    /// Does **not** start the machine — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, boot_seed: u64) -> Self {
        let seed = config.threshold_seed.unwrap_or(boot_seed);
        let mut rng = SmallRng::seed_from_u64(seed);
        let table = ThresholdTable::generate(&mut rng);
        let ctx = SeqContext::new(config);
        let fsm = SequenceFsm::new(build_phase_table(), PhaseId::Idle);

        Self {
            fsm,
            ctx,
            table,
            rng,
            poll_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the machine in its initial phase (Idle).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_phase()));
        info!("AppService started in {:?}", self.fsm.current_phase());
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full control cycle: drain link → read encoder → sequence
    /// tick → flush outputs.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn poll(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        link: &mut impl MessagePort,
        sink: &mut impl EventSink,
    ) {
        self.poll_count += 1;

        // Capture the phase before the drain: command dispatch may force
        // a transition (`Start` re-arm, cancelling `Stop`), and those
        // changes belong in the PhaseChanged event too.
        let prev = self.fsm.current_phase();

        // 1. Drain all pending inbound messages in arrival order.
        while let Some(msg) = link.poll_message() {
            self.handle_message(&msg, hw, link, sink);
        }

        // 2. Latest displacement sample.
        self.ctx.sample = hw.read_distance();

        // 3. Sequence tick (pure phase logic).
        self.fsm.tick(&mut self.ctx);
        let now = self.fsm.current_phase();

        // 4. Apply whatever the tick produced.
        self.flush_outputs(hw, link, sink);

        if now != prev {
            sink.emit(&AppEvent::PhaseChanged { from: prev, to: now });
        }
        if let Some(label) = self.ctx.last_ack.take() {
            sink.emit(&AppEvent::AckReceived(label));
        }
        if self.ctx.timed_out {
            self.ctx.timed_out = false;
            sink.emit(&AppEvent::AckTimedOut);
        }
    }

    // ── Message dispatch ──────────────────────────────────────

    /// Dispatch one inbound message: unconditional raw echo, then either a
    /// control command (with `ACK:` reply), an acknowledgement routed to
    /// the pending wait, or the generic echo path. Malformed input is
    /// never a fault.
    pub fn handle_message(
        &mut self,
        msg: &RawMessage,
        hw: &mut impl ActuatorPort,
        link: &mut impl MessagePort,
        sink: &mut impl EventSink,
    ) {
        // Raw echo first — the console uses it for link monitoring.
        link.send(msg);

        match protocol::classify(msg) {
            Inbound::Command(cmd) => {
                match cmd {
                    ControlCommand::Start => self.start_sequence(sink),
                    ControlCommand::Stop => self.stop_sequence(hw, sink),
                    ControlCommand::Winding => {
                        hw.rewind();
                        sink.emit(&AppEvent::RewindRequested);
                    }
                }
                Self::send_ack_reply(link, msg);
            }
            Inbound::Ack(label) => {
                if let Some(pending) = self.ctx.pending {
                    // First matching label wins; everything else that
                    // arrives during the wait is discarded. Labels
                    // consumed by a wait get no ACK reply (the legacy
                    // wait path bypassed the responder too).
                    if pending.accept.contains(label) && self.ctx.offered_ack.is_none() {
                        self.ctx.offered_ack = Some(label);
                    } else {
                        info!("wait in progress, discarding {:?}", label);
                    }
                } else {
                    // No wait pending: an ack label is just another
                    // message on the generic path.
                    Self::send_ack_reply(link, msg);
                }
            }
            Inbound::Other => Self::send_ack_reply(link, msg),
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Arm a new run: draw a threshold set uniformly at random, reset
    /// stage progress, enter Tracking. Fire-and-forget — no wait.
    pub fn start_sequence(&mut self, sink: &mut impl EventSink) {
        let (idx, set) = self.table.draw(&mut self.rng);
        self.ctx.begin_run(set);
        self.fsm.force_transition(PhaseId::Tracking, &mut self.ctx);
        sink.emit(&AppEvent::SequenceArmed { table_index: idx });
        info!("sequence armed: table entry #{idx}");
    }

    /// Operator `Stop`: always full brake lock; run cancellation is the
    /// configured `stop_cancels_sequence` behavior.
    pub fn stop_sequence(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.lock();
        let cancelled = self.ctx.config.stop_cancels_sequence;
        if cancelled {
            self.ctx.end_run();
            self.fsm.force_transition(PhaseId::Idle, &mut self.ctx);
        }
        sink.emit(&AppEvent::Stopped { cancelled });
        info!("stop processed (cancelled={cancelled})");
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current sequence phase.
    pub fn phase(&self) -> PhaseId {
        self.fsm.current_phase()
    }

    /// Whether a scripted run is live.
    pub fn is_run_active(&self) -> bool {
        self.ctx.active
    }

    /// Threshold set owned by the active run, if any.
    pub fn active_thresholds(&self) -> Option<ThresholdSet> {
        self.ctx.thresholds
    }

    /// Highest stage fired in the current run.
    pub fn stage_reached(&self) -> Option<crate::sequence::thresholds::Stage> {
        self.ctx.stage_reached
    }

    /// The boot-time threshold table (read-only).
    pub fn threshold_table(&self) -> &ThresholdTable {
        &self.table
    }

    /// Total control cycles executed since startup.
    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }

    // ── Internal ──────────────────────────────────────────────

    /// Drain the tick's outputs into the ports.
    fn flush_outputs(
        &mut self,
        hw: &mut impl ActuatorPort,
        link: &mut impl MessagePort,
        sink: &mut impl EventSink,
    ) {
        for label in &self.ctx.outbox {
            link.send(label.as_str());
            sink.emit(&AppEvent::LabelSent(*label));
        }
        self.ctx.outbox.clear();

        for action in &self.ctx.brake {
            match action {
                BrakeAction::Lock => hw.lock(),
                BrakeAction::WeakHold => hw.weak_hold(),
                BrakeAction::Release => hw.release(),
            }
            sink.emit(&AppEvent::BrakeDriven(*action));
        }
        self.ctx.brake.clear();
    }

    fn send_ack_reply(link: &mut impl MessagePort, msg: &str) {
        let mut reply: heapless::String<MAX_REPLY_LEN> = heapless::String::new();
        let _ = reply.push_str("ACK: ");
        let _ = reply.push_str(msg);
        link.send(&reply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSink;
    impl EventSink for NullSink {
        fn emit(&mut self, _event: &AppEvent) {}
    }

    #[test]
    fn pinned_seed_reproduces_the_table() {
        let config = SystemConfig {
            threshold_seed: Some(42),
            ..SystemConfig::default()
        };
        let a = AppService::new(config.clone(), 1);
        let b = AppService::new(config, 999); // boot seed ignored when pinned
        assert_eq!(a.threshold_table().entries(), b.threshold_table().entries());
    }

    #[test]
    fn start_sequence_draws_from_the_table() {
        let mut app = AppService::new(SystemConfig::default(), 7);
        let mut sink = NullSink;
        app.start(&mut sink);
        app.start_sequence(&mut sink);

        assert!(app.is_run_active());
        assert_eq!(app.phase(), PhaseId::Tracking);
        let set = app.active_thresholds().expect("run owns a threshold set");
        assert!(app.threshold_table().entries().contains(&set));
        assert_eq!(app.stage_reached(), None);
    }
}
