//! Concrete phase handler functions and table builder.
//!
//! Each phase is defined by plain `fn` pointers — no closures, no dynamic
//! dispatch, no heap. The run's control flow:
//!
//! ```text
//!  IDLE ──[Start armed]──▶ TRACKING ──[HighDamp/LowDamp fires]──▶ AWAIT-ACK
//!    ▲                        ▲  ▲                                  │  │
//!    │                        │  └────────[OK / OK1 / OK2]──────────┘  │
//!    │                        │                                        │
//!    │                        └──[pulled past baseline, "Keep" sent]   │
//!    │                                       ▲                         │
//!    │                                       └────── AWAIT-PULL ◀──[Continue]
//!    │
//!    └──[run cancelled / wait timed out]── any phase
//! ```
//!
//! Pain and Pain2 fire inline during TRACKING (notify only). A single
//! sample can fire several stages back-to-back within one tick, but the
//! tick ends the moment a stage suspends: later stages are only reachable
//! on a later tick, after that wait resolves.

use log::{info, warn};

use super::context::{AckFollowUp, BrakeAction, PendingAck, SeqContext};
use super::thresholds::Stage;
use super::{PhaseId, PhaseDescriptor};
use crate::protocol::{AckLabel, AckSet, EventLabel};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static phase table. Called once at startup.
pub fn build_phase_table() -> [PhaseDescriptor; PhaseId::COUNT] {
    [
        // Index 0 — Idle
        PhaseDescriptor {
            id: PhaseId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — Tracking
        PhaseDescriptor {
            id: PhaseId::Tracking,
            name: "Tracking",
            on_enter: None,
            on_exit: None,
            on_update: tracking_update,
        },
        // Index 2 — AwaitAck
        PhaseDescriptor {
            id: PhaseId::AwaitAck,
            name: "AwaitAck",
            on_enter: None,
            on_exit: None,
            on_update: await_ack_update,
        },
        // Index 3 — AwaitPull
        PhaseDescriptor {
            id: PhaseId::AwaitPull,
            name: "AwaitPull",
            on_enter: Some(await_pull_enter),
            on_exit: None,
            on_update: await_pull_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE phase
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut SeqContext) {
    ctx.pending = None;
    ctx.offered_ack = None;
    info!("IDLE: no run armed, polling encoder only");
}

fn idle_update(_ctx: &mut SeqContext) -> Option<PhaseId> {
    // Arming happens through the service (`Start` command), which
    // force-transitions into Tracking after drawing a threshold set.
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  TRACKING phase — compare the sample against the remaining thresholds
// ═══════════════════════════════════════════════════════════════════════════

fn tracking_update(ctx: &mut SeqContext) -> Option<PhaseId> {
    if !ctx.active {
        return Some(PhaseId::Idle);
    }
    let Some(set) = ctx.thresholds else {
        return Some(PhaseId::Idle);
    };

    // Ascending evaluation; stages are cumulative, so a sample past t2
    // fires t0..t2 back-to-back within this tick. The loop stops either
    // at the first uncrossed threshold above the sample or the moment a
    // stage suspends.
    for stage in Stage::ALL {
        if ctx.crossed(stage) {
            continue;
        }
        if ctx.sample < set.for_stage(stage) {
            break;
        }

        ctx.stage_reached = Some(stage);
        ctx.send_label(stage.label());
        info!(
            "TRACKING: stage {:?} fired at {:.1} (threshold {:.1})",
            stage,
            ctx.sample,
            set.for_stage(stage)
        );

        match stage {
            Stage::Pain | Stage::Pain2 => {}
            Stage::HighDamp => {
                ctx.drive_brake(BrakeAction::Lock);
                ctx.pending = Some(PendingAck::new(
                    AckSet::only(AckLabel::Ok),
                    AckFollowUp::Release,
                ));
                return Some(PhaseId::AwaitAck);
            }
            Stage::LowDamp => {
                ctx.drive_brake(BrakeAction::WeakHold);
                ctx.pending = Some(PendingAck::new(
                    AckSet::either(AckLabel::Ok1, AckLabel::Continue),
                    AckFollowUp::LowDampBranch,
                ));
                return Some(PhaseId::AwaitAck);
            }
        }
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAIT-ACK phase — suspended on an acknowledgement label
// ═══════════════════════════════════════════════════════════════════════════

fn await_ack_update(ctx: &mut SeqContext) -> Option<PhaseId> {
    // `Stop` with cancellation enabled may have torn the run down
    // underneath the wait.
    if !ctx.active {
        return Some(PhaseId::Idle);
    }
    let Some(mut pending) = ctx.pending else {
        // A wait phase without correlation state is a handler bug; fall
        // back to tracking rather than stalling the run.
        debug_assert!(false, "AwaitAck without PendingAck");
        return Some(PhaseId::Tracking);
    };

    if let Some(label) = ctx.offered_ack.take() {
        if pending.accept.contains(label) {
            ctx.pending = None;
            ctx.last_ack = Some(label);
            info!("AWAIT-ACK: resolved by {:?}", label);

            return Some(match pending.follow_up {
                AckFollowUp::Release => {
                    ctx.drive_brake(BrakeAction::Release);
                    PhaseId::Tracking
                }
                AckFollowUp::LowDampBranch => {
                    if label == AckLabel::Continue {
                        PhaseId::AwaitPull
                    } else {
                        ctx.drive_brake(BrakeAction::Release);
                        PhaseId::Tracking
                    }
                }
            });
        }
        // Non-member ack label during a wait: silently discarded, the
        // wait continues.
    }

    pending.waited_ticks += 1;
    if let Some(limit) = ctx.config.ack_timeout_ticks {
        if pending.waited_ticks >= limit {
            warn!(
                "AWAIT-ACK: no acknowledgement after {} ticks, failing safe",
                pending.waited_ticks
            );
            ctx.drive_brake(BrakeAction::Release);
            ctx.timed_out = true;
            ctx.end_run();
            return Some(PhaseId::Idle);
        }
    }

    ctx.pending = Some(pending);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAIT-PULL phase — suspended on a displacement condition
// ═══════════════════════════════════════════════════════════════════════════

fn await_pull_enter(ctx: &mut SeqContext) {
    ctx.pull_baseline = ctx.sample;
    info!(
        "AWAIT-PULL: baseline {:.1}, target {:.1}",
        ctx.pull_baseline,
        ctx.pull_baseline + ctx.config.pull_margin
    );
}

fn await_pull_update(ctx: &mut SeqContext) -> Option<PhaseId> {
    if !ctx.active {
        return Some(PhaseId::Idle);
    }

    if ctx.sample >= ctx.pull_baseline + ctx.config.pull_margin {
        ctx.send_label(EventLabel::Keep);
        ctx.pending = Some(PendingAck::new(
            AckSet::only(AckLabel::Ok2),
            AckFollowUp::Release,
        ));
        return Some(PhaseId::AwaitAck);
    }

    // The pull wait honours the same optional bound as ack waits; the
    // brake would otherwise stay in weak-hold forever on a stalled trainee.
    if let Some(limit) = ctx.config.ack_timeout_ticks {
        if ctx.ticks_in_phase >= u64::from(limit) {
            warn!("AWAIT-PULL: no pull after {} ticks, failing safe", limit);
            ctx.drive_brake(BrakeAction::Release);
            ctx.timed_out = true;
            ctx.end_run();
            return Some(PhaseId::Idle);
        }
    }

    None
}
