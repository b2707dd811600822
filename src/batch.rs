//! Bet records and size-bounded batch assembly.

use crate::error::{BetwireError, Result};
use crate::protocol::wire::{APUESTA, FIELD_DELIMITER, MAX_PACKET_SIZE};
use crate::source::LineSource;

/// One bet record. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bet {
    pub agency_id: String,
    pub first_name: String,
    pub last_name: String,
    pub document_id: String,
    pub birthdate: String,
    pub number: String,
}

impl Bet {
    /// Parse one raw comma-separated line.
    ///
    /// The line carries exactly 5 fields (first name, last name, document,
    /// birthdate, number); the agency id comes from configuration. A wrong
    /// field count is fatal for the run; there is no partial-record
    /// skipping.
    pub fn parse(agency_id: &str, line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 5 {
            return Err(BetwireError::MalformedRecord {
                line: line.to_string(),
            });
        }
        Ok(Self {
            agency_id: agency_id.to_string(),
            first_name: fields[0].to_string(),
            last_name: fields[1].to_string(),
            document_id: fields[2].to_string(),
            birthdate: fields[3].to_string(),
            number: fields[4].to_string(),
        })
    }

    /// Render this record for the wire.
    pub fn to_wire(&self) -> String {
        [
            APUESTA,
            self.agency_id.as_str(),
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.document_id.as_str(),
            self.birthdate.as_str(),
            self.number.as_str(),
        ]
        .join(FIELD_DELIMITER)
    }
}

/// An ordered, non-empty run of records plus the last-batch flag.
#[derive(Debug, Clone)]
pub struct Batch {
    pub bets: Vec<Bet>,
    /// Set on the last batch derivable from the source for this run.
    pub is_final: bool,
}

/// Pulls raw lines from a source and groups them into bounded batches.
///
/// Batches are bounded two ways: at most `max_amount` records, and at most
/// [`MAX_PACKET_SIZE`] bytes of accumulated raw record text. A line that
/// would push past the size ceiling is deferred to the next batch, never
/// dropped. The accumulated-size counter is owned and reset by the caller's
/// loop, one reset per batch.
#[derive(Debug)]
pub struct Batcher<S> {
    source: S,
    agency_id: String,
    max_amount: usize,
    /// Line deferred by the size ceiling, consumed first on the next call.
    carry: Option<String>,
    exhausted: bool,
}

impl<S: LineSource> Batcher<S> {
    /// Build a batcher. A zero `max_amount` is a configuration error,
    /// surfaced before any I/O.
    pub fn new(source: S, agency_id: impl Into<String>, max_amount: usize) -> Result<Self> {
        if max_amount == 0 {
            return Err(BetwireError::Config(
                "batch_max_amount must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            source,
            agency_id: agency_id.into(),
            max_amount,
            carry: None,
            exhausted: false,
        })
    }

    /// Assemble the next batch.
    ///
    /// Returns `None` once the source has nothing more to offer (ran dry
    /// with zero records collected). A returned batch with `is_final` set is
    /// the last one this source can produce.
    pub fn next_batch(&mut self, packet_size: &mut usize) -> Result<Option<Batch>> {
        let mut bets = Vec::new();

        while bets.len() < self.max_amount && !self.dry() {
            let line = match self.carry.take() {
                Some(line) => line,
                None => match self.source.next_line()? {
                    Some(line) => line,
                    None => {
                        self.exhausted = true;
                        break;
                    }
                },
            };

            // A line that would overflow the packet closes this batch small
            // and waits for the next one. A single over-limit record still
            // goes out alone.
            if !bets.is_empty() && *packet_size + line.len() > MAX_PACKET_SIZE {
                self.carry = Some(line);
                break;
            }

            *packet_size += line.len();
            bets.push(Bet::parse(&self.agency_id, &line)?);
        }

        if bets.is_empty() {
            return Ok(None);
        }
        Ok(Some(Batch {
            bets,
            is_final: self.dry(),
        }))
    }

    fn dry(&self) -> bool {
        self.exhausted && self.carry.is_none()
    }
}
