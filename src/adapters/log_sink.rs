//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production). A future trace-buffer or
//! console adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(phase) => {
                info!("START | initial_phase={:?}", phase);
            }
            AppEvent::SequenceArmed { table_index } => {
                info!("ARM   | table_entry=#{}", table_index);
            }
            AppEvent::PhaseChanged { from, to } => {
                info!("PHASE | {:?} -> {:?}", from, to);
            }
            AppEvent::LabelSent(label) => {
                info!("SEND  | '{}'", label.as_str());
            }
            AppEvent::AckReceived(label) => {
                info!("ACK   | '{}'", label.as_str());
            }
            AppEvent::AckTimedOut => {
                warn!("ACK   | wait timed out, run aborted fail-safe");
            }
            AppEvent::BrakeDriven(action) => {
                info!("BRAKE | {:?}", action);
            }
            AppEvent::Stopped { cancelled } => {
                info!("STOP  | cancelled={}", cancelled);
            }
            AppEvent::RewindRequested => {
                info!("WIND  | rewind pulse requested");
            }
        }
    }
}
