//! Wire protocol — line-delimited text labels exchanged with the operator
//! console over the UDP link.
//!
//! The vocabulary is deliberately tiny and case-sensitive:
//!
//! | Direction | Labels                                      |
//! |-----------|---------------------------------------------|
//! | inbound   | `Start`, `Stop`, `Winding` (control)        |
//! | inbound   | `OK`, `OK1`, `OK2`, `Continue` (acks)       |
//! | outbound  | `Pain`, `Pain2`, `HighDamp`, `LowDamp`, `Keep` |
//!
//! Matching is exact after the transport has trimmed whitespace: `"ok"`,
//! `"OK "` and `"Ok1"` are *not* acknowledgements, they fall into the
//! generic-echo path like any other unrecognized message.

use heapless::String;

/// Longest inbound message the link will deliver (datagrams are truncated
/// at the transport, matching the original 255-byte receive buffer minus
/// headroom for the `ACK: ` reply prefix).
pub const MAX_MESSAGE_LEN: usize = 64;

/// Reply buffer: `"ACK: "` + original message.
pub const MAX_REPLY_LEN: usize = MAX_MESSAGE_LEN + 5;

/// A trimmed inbound message as delivered by the [`MessagePort`](crate::app::ports::MessagePort).
pub type RawMessage = String<MAX_MESSAGE_LEN>;

// ---------------------------------------------------------------------------
// Control commands
// ---------------------------------------------------------------------------

/// Operator control commands dispatched outside the sequence machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Arm a new sequence run (draws a fresh threshold set).
    Start,
    /// Full brake lock; run cancellation is a config switch.
    Stop,
    /// Wind the tether back onto the spool.
    Winding,
}

impl ControlCommand {
    pub fn parse(msg: &str) -> Option<Self> {
        match msg {
            "Start" => Some(Self::Start),
            "Stop" => Some(Self::Stop),
            "Winding" => Some(Self::Winding),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Stop => "Stop",
            Self::Winding => "Winding",
        }
    }
}

// ---------------------------------------------------------------------------
// Acknowledgement labels
// ---------------------------------------------------------------------------

/// Inbound acknowledgement labels a suspended sequence can be blocked on.
/// Discriminants are one-hot so an [`AckSet`] is a plain bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AckLabel {
    Ok = 0b0001,
    Ok1 = 0b0010,
    Ok2 = 0b0100,
    Continue = 0b1000,
}

impl AckLabel {
    pub fn parse(msg: &str) -> Option<Self> {
        match msg {
            "OK" => Some(Self::Ok),
            "OK1" => Some(Self::Ok1),
            "OK2" => Some(Self::Ok2),
            "Continue" => Some(Self::Continue),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Ok1 => "OK1",
            Self::Ok2 => "OK2",
            Self::Continue => "Continue",
        }
    }

    /// Bitmask of this label within an [`AckSet`].
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

/// A non-empty set of acceptable acknowledgement labels for one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckSet(u8);

impl AckSet {
    /// Set accepting exactly one label.
    pub const fn only(label: AckLabel) -> Self {
        Self(label.mask())
    }

    /// Set accepting either of two labels.
    pub const fn either(a: AckLabel, b: AckLabel) -> Self {
        Self(a.mask() | b.mask())
    }

    pub const fn contains(self, label: AckLabel) -> bool {
        self.0 & label.mask() != 0
    }

    /// Exact-match membership test on a raw message.
    pub fn matches(self, msg: &str) -> Option<AckLabel> {
        AckLabel::parse(msg).filter(|l| self.contains(*l))
    }
}

// ---------------------------------------------------------------------------
// Outbound event labels
// ---------------------------------------------------------------------------

/// Labels the sequence controller sends to the operator console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLabel {
    Pain,
    Pain2,
    HighDamp,
    LowDamp,
    Keep,
}

impl EventLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pain => "Pain",
            Self::Pain2 => "Pain2",
            Self::HighDamp => "HighDamp",
            Self::LowDamp => "LowDamp",
            Self::Keep => "Keep",
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound classification
// ---------------------------------------------------------------------------

/// What an inbound message turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    Command(ControlCommand),
    Ack(AckLabel),
    /// Anything else: echoed with a generic `ACK:` reply, never a fault.
    Other,
}

pub fn classify(msg: &str) -> Inbound {
    if let Some(cmd) = ControlCommand::parse(msg) {
        Inbound::Command(cmd)
    } else if let Some(ack) = AckLabel::parse(msg) {
        Inbound::Ack(ack)
    } else {
        Inbound::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_commands_parse_exactly() {
        assert_eq!(ControlCommand::parse("Start"), Some(ControlCommand::Start));
        assert_eq!(ControlCommand::parse("Stop"), Some(ControlCommand::Stop));
        assert_eq!(
            ControlCommand::parse("Winding"),
            Some(ControlCommand::Winding)
        );
        assert_eq!(ControlCommand::parse("start"), None);
        assert_eq!(ControlCommand::parse("STOP"), None);
    }

    #[test]
    fn ack_labels_are_case_and_whitespace_sensitive() {
        assert_eq!(AckLabel::parse("OK"), Some(AckLabel::Ok));
        assert_eq!(AckLabel::parse("ok"), None);
        assert_eq!(AckLabel::parse("OK "), None);
        assert_eq!(AckLabel::parse("Ok1"), None);
        assert_eq!(AckLabel::parse("OK1"), Some(AckLabel::Ok1));
        assert_eq!(AckLabel::parse("Continue"), Some(AckLabel::Continue));
        assert_eq!(AckLabel::parse("continue"), None);
    }

    #[test]
    fn ack_set_membership() {
        let set = AckSet::either(AckLabel::Ok1, AckLabel::Continue);
        assert!(set.contains(AckLabel::Ok1));
        assert!(set.contains(AckLabel::Continue));
        assert!(!set.contains(AckLabel::Ok));
        assert!(!set.contains(AckLabel::Ok2));

        assert_eq!(set.matches("Continue"), Some(AckLabel::Continue));
        assert_eq!(set.matches("OK"), None);
        assert_eq!(set.matches("garbage"), None);
    }

    #[test]
    fn only_set_rejects_near_misses() {
        let set = AckSet::only(AckLabel::Ok);
        assert_eq!(set.matches("OK"), Some(AckLabel::Ok));
        assert_eq!(set.matches("OK1"), None);
        assert_eq!(set.matches("ok"), None);
        assert_eq!(set.matches("OK "), None);
    }

    #[test]
    fn classify_routes_each_vocabulary() {
        assert_eq!(
            classify("Start"),
            Inbound::Command(ControlCommand::Start)
        );
        assert_eq!(classify("OK2"), Inbound::Ack(AckLabel::Ok2));
        assert_eq!(classify("Hello"), Inbound::Other);
        assert_eq!(classify(""), Inbound::Other);
    }

    #[test]
    fn event_labels_render_wire_strings() {
        assert_eq!(EventLabel::Pain.as_str(), "Pain");
        assert_eq!(EventLabel::Pain2.as_str(), "Pain2");
        assert_eq!(EventLabel::HighDamp.as_str(), "HighDamp");
        assert_eq!(EventLabel::LowDamp.as_str(), "LowDamp");
        assert_eq!(EventLabel::Keep.as_str(), "Keep");
    }
}
