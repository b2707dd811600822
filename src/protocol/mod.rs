//! Wire protocol: vocabulary, batch formatting, and message framing.
//!
//! - Terminator-delimited framing over a byte stream, tolerant of partial
//!   reads and writes
//! - Record/reply formatting with `|` field and `;` record delimiters
//! - Typed tokenizing of server replies

pub mod framing;
pub mod wire;

pub use framing::{write_message, MessageReader};
pub use wire::{
    format_bets, ServerReply, APUESTA, BET_DELIMITER, FIELD_DELIMITER, FIN_APUESTA, GANADORES,
    MAX_PACKET_SIZE, MESSAGE_DELIMITER,
};
