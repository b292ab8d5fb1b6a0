//! Message identifiers and well-known UBX class codes.
//!
//! Every UBX message is named by a `(class, id)` pair. The class groups
//! related messages (navigation results, configuration, monitoring...), the
//! id selects one message within the class.

use std::fmt;

/// Navigation results (position, velocity, time, satellite info).
pub const NAV: u8 = 0x01;

/// Receiver manager messages (raw measurements, almanac, ephemeris).
pub const RXM: u8 = 0x02;

/// Printf-style information messages.
pub const INF: u8 = 0x04;

/// Ack/Nack replies to CFG input messages.
pub const ACK: u8 = 0x05;

/// Configuration input messages.
pub const CFG: u8 = 0x06;

/// Monitoring messages (communication status, CPU load, stack usage).
pub const MON: u8 = 0x0A;

/// AssistNow aiding messages.
pub const AID: u8 = 0x0B;

/// Timing messages.
pub const TIM: u8 = 0x0D;

/// Data logging messages.
pub const LOG: u8 = 0x21;

/// The `(class, id)` pair identifying a message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId {
    /// Message class.
    pub class: u8,
    /// Message id within the class.
    pub id: u8,
}

impl MessageId {
    /// Create a message identifier.
    pub const fn new(class: u8, id: u8) -> Self {
        Self { class, id }
    }

    /// Human-readable name of the class, e.g. `"NAV"`.
    pub fn class_name(&self) -> &'static str {
        class_name(self.class)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}/0x{:02X}", self.class, self.id)
    }
}

impl From<(u8, u8)> for MessageId {
    fn from((class, id): (u8, u8)) -> Self {
        Self::new(class, id)
    }
}

/// Returns a human-readable name for a class code.
pub fn class_name(class: u8) -> &'static str {
    match class {
        NAV => "NAV",
        RXM => "RXM",
        INF => "INF",
        ACK => "ACK",
        CFG => "CFG",
        MON => "MON",
        AID => "AID",
        TIM => "TIM",
        LOG => "LOG",
        _ => "UNKNOWN",
    }
}
