//! Submission session: the per-batch request/reply cycle and the blocking
//! wait for the results announcement.
//!
//! The session owns the connection for its whole lifetime; nothing else reads
//! or writes it. Exchanges are strictly sequential: one request, then one
//! reply, with no pipelining. Cancellation is polled once per loop iteration, before the
//! next batch is pulled, so an in-flight request/reply pair always completes
//! (or fails) before cancellation takes effect.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::batch::{Batch, Batcher};
use crate::error::Result;
use crate::protocol::framing::{write_message, MessageReader};
use crate::protocol::wire::{
    format_bets, ServerReply, BET_DELIMITER, FIELD_DELIMITER, FIN_APUESTA, GANADORES,
};
use crate::source::LineSource;

/// How a session run ended, short of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// All data submitted and the results announcement received.
    Completed { winners: usize },
    /// An interrupt was observed at a checkpoint; the run stopped cleanly.
    Cancelled,
}

/// Owns the connection and drives one submission run over it.
pub struct SubmissionSession<S> {
    stream: S,
    reader: MessageReader,
    client_id: String,
}

impl<S: AsyncRead + AsyncWrite + Unpin> SubmissionSession<S> {
    /// Wrap an established connection.
    pub fn new(stream: S, client_id: impl Into<String>) -> Self {
        Self {
            stream,
            reader: MessageReader::new(),
            client_id: client_id.into(),
        }
    }

    /// Send every batch the source yields, then wait for the winners.
    ///
    /// The final batch goes out with a compound trailer (end-of-batch marker
    /// plus the results query), saving a round trip. With nothing pending at
    /// all, only the query is sent. Any I/O failure is fatal to the run; the
    /// connection is released when the session is dropped.
    pub async fn run<L>(
        &mut self,
        batcher: &mut Batcher<L>,
        cancel: &CancellationToken,
    ) -> Result<SessionOutcome>
    where
        L: LineSource,
    {
        loop {
            if cancel.is_cancelled() {
                info!(
                    action = "shutdown",
                    result = "success",
                    client_id = %self.client_id,
                );
                return Ok(SessionOutcome::Cancelled);
            }

            // The accumulated-size counter lives in this loop: one reset per
            // batch, handed to the batcher by reference.
            let mut packet_size = 0usize;
            match batcher.next_batch(&mut packet_size)? {
                None => {
                    // Nothing left to send: query for the results on its own.
                    let query = format!("{GANADORES}{FIELD_DELIMITER}{}", self.client_id);
                    write_message(&mut self.stream, &query).await?;
                    let winners = self.await_winners().await?;
                    return Ok(SessionOutcome::Completed { winners });
                }
                Some(batch) if batch.is_final => {
                    let message = format!(
                        "{}{BET_DELIMITER}{FIN_APUESTA}{BET_DELIMITER}{GANADORES}{FIELD_DELIMITER}{}",
                        format_bets(&batch.bets),
                        self.client_id,
                    );
                    write_message(&mut self.stream, &message).await?;
                    debug!(action = "final_batch_sent", records = batch.bets.len());

                    // The reply owed to the compound message may already be
                    // the results announcement.
                    if let Some(winners) = self.read_final_reply(batch.bets.len()).await? {
                        return Ok(SessionOutcome::Completed { winners });
                    }
                    let winners = self.await_winners().await?;
                    return Ok(SessionOutcome::Completed { winners });
                }
                Some(batch) => {
                    self.submit_batch(&batch).await?;
                }
            }
        }
    }

    /// Send one non-final batch and read its acknowledgement.
    async fn submit_batch(&mut self, batch: &Batch) -> Result<()> {
        let message = format!("{}{BET_DELIMITER}{FIN_APUESTA}", format_bets(&batch.bets));
        write_message(&mut self.stream, &message).await?;

        let raw = self.reader.read_message(&mut self.stream).await?;
        match ServerReply::parse(&raw) {
            ServerReply::Acknowledgement { accepted } => {
                // The accepted count is informational; it is not validated
                // against the number of records sent.
                info!(
                    action = "batch_sent",
                    result = "success",
                    sent = batch.bets.len(),
                    accepted,
                );
            }
            ServerReply::Winners { documents } => {
                warn!(
                    action = "batch_sent",
                    result = "anomaly",
                    reason = "results announced before submission finished",
                    winners = documents.len(),
                );
            }
            ServerReply::Unknown { raw } => {
                warn!(action = "batch_sent", result = "anomaly", reply = %raw);
            }
        }
        Ok(())
    }

    /// Read the one reply owed to the compound final message. Returns the
    /// winner count if the announcement arrived in that slot.
    async fn read_final_reply(&mut self, sent: usize) -> Result<Option<usize>> {
        let raw = self.reader.read_message(&mut self.stream).await?;
        match ServerReply::parse(&raw) {
            ServerReply::Acknowledgement { accepted } => {
                info!(action = "batch_sent", result = "success", sent, accepted);
                Ok(None)
            }
            ServerReply::Winners { documents } => {
                let winners = documents.len();
                info!(action = "winners_query", result = "success", winners);
                Ok(Some(winners))
            }
            ServerReply::Unknown { raw } => {
                warn!(action = "batch_sent", result = "anomaly", reply = %raw);
                Ok(None)
            }
        }
    }

    /// Block until the results announcement arrives.
    ///
    /// Other tokens showing up here are logged anomalies; the wait goes on.
    async fn await_winners(&mut self) -> Result<usize> {
        loop {
            let raw = self.reader.read_message(&mut self.stream).await?;
            match ServerReply::parse(&raw) {
                ServerReply::Winners { documents } => {
                    let winners = documents.len();
                    info!(action = "winners_query", result = "success", winners);
                    return Ok(winners);
                }
                other => {
                    warn!(action = "winners_query", result = "anomaly", reply = ?other);
                }
            }
        }
    }
}
