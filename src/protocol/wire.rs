//! Wire vocabulary: delimiters, tokens, and reply tokenizing.
//!
//! One message per exchange: `<payload bytes>` followed by a single
//! terminator byte. Fields within a record or reply are joined with
//! [`FIELD_DELIMITER`], records (and trailing markers) with
//! [`BET_DELIMITER`]. There is no length prefix; the receiver scans for the
//! terminator.

use crate::batch::Bet;

/// End-of-message byte.
pub const MESSAGE_DELIMITER: u8 = b'\n';

/// Separates fields within one record or reply.
pub const FIELD_DELIMITER: &str = "|";

/// Separates records and trailing markers within one message.
pub const BET_DELIMITER: &str = ";";

/// Ceiling on accumulated raw record text per message.
pub const MAX_PACKET_SIZE: usize = 8000;

/// Record token.
pub const APUESTA: &str = "APUESTA";

/// End-of-batch marker.
pub const FIN_APUESTA: &str = "FINAPUESTA";

/// Results token: a query client-to-server, an announcement server-to-client.
pub const GANADORES: &str = "GANADORES";

/// Render a batch of records for the wire.
///
/// Records are joined with the bet delimiter; an empty slice yields an empty
/// string without error.
pub fn format_bets(bets: &[Bet]) -> String {
    bets.iter()
        .map(Bet::to_wire)
        .collect::<Vec<_>>()
        .join(BET_DELIMITER)
}

/// A server reply, tokenized into its protocol meaning.
///
/// Malformed or unrecognized replies are a representable case
/// ([`ServerReply::Unknown`]) rather than an indexing panic, so reply
/// interpretation is exhaustive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerReply {
    /// Batch acknowledgement: how many records the server accepted.
    Acknowledgement { accepted: u64 },
    /// Results announcement: the winning document ids. An empty payload
    /// field means zero winners.
    Winners { documents: Vec<String> },
    /// Anything else; kept raw for logging.
    Unknown { raw: String },
}

impl ServerReply {
    /// Tokenize one reply payload.
    pub fn parse(raw: &str) -> Self {
        let Some((token, rest)) = raw.split_once(FIELD_DELIMITER) else {
            return Self::Unknown {
                raw: raw.to_string(),
            };
        };

        if token == GANADORES {
            let documents = if rest.is_empty() {
                Vec::new()
            } else {
                rest.split(FIELD_DELIMITER).map(str::to_string).collect()
            };
            return Self::Winners { documents };
        }

        // Any other token is an acknowledgement whose first payload field is
        // the accepted count.
        let count = rest.split(FIELD_DELIMITER).next().unwrap_or("");
        match count.parse() {
            Ok(accepted) => Self::Acknowledgement { accepted },
            Err(_) => Self::Unknown {
                raw: raw.to_string(),
            },
        }
    }
}
