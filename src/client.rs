//! Client orchestrator.
//!
//! Wires configuration, record source, connection, and session together and
//! turns every failure into a clean shutdown: resources are released on each
//! exit path and the outcome is reported through structured log events.

use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::batch::Batcher;
use crate::config::{ClientConfig, SourceConfig};
use crate::error::{BetwireError, Result};
use crate::session::{SessionOutcome, SubmissionSession};
use crate::source::{ArchiveLineSource, LineSource, PlainLineSource};

/// The bet submission client.
pub struct Client {
    config: ClientConfig,
}

impl Client {
    /// Build a client. The configuration is validated up front, before any
    /// I/O.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run one full submission: open the source, connect, drive the session
    /// to completion, release everything.
    ///
    /// A dial failure ends the run cleanly with no retry and no backoff. On
    /// success an optional grace period keeps the connection open briefly
    /// for late server-side delivery before it is closed.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<SessionOutcome> {
        let source = self.open_source()?;
        let mut batcher = Batcher::new(
            source,
            self.config.client_id.clone(),
            self.config.batch_max_amount,
        )?;

        let stream = match TcpStream::connect(&self.config.server_address).await {
            Ok(stream) => stream,
            Err(e) => {
                error!(
                    action = "connect",
                    result = "fail",
                    client_id = %self.config.client_id,
                    error = %e,
                );
                return Err(BetwireError::Connect {
                    addr: self.config.server_address.clone(),
                    source: e,
                });
            }
        };

        let mut session = SubmissionSession::new(stream, self.config.client_id.clone());
        match session.run(&mut batcher, cancel).await {
            Ok(outcome) => {
                if let (SessionOutcome::Completed { .. }, Some(grace)) =
                    (&outcome, self.config.grace_period())
                {
                    tokio::time::sleep(grace).await;
                }
                drop(session);
                info!(
                    action = "close_connection",
                    result = "success",
                    client_id = %self.config.client_id,
                );
                Ok(outcome)
            }
            Err(e) => {
                drop(session);
                error!(
                    action = "close_connection",
                    result = "fail",
                    client_id = %self.config.client_id,
                    error = %e,
                );
                Err(e)
            }
        }
    }

    fn open_source(&self) -> Result<Box<dyn LineSource + Send>> {
        match &self.config.source {
            SourceConfig::Plain { path } => Ok(Box::new(PlainLineSource::open(path)?)),
            SourceConfig::Archive { path } => Ok(Box::new(ArchiveLineSource::open(
                path,
                &self.config.client_id,
            )?)),
        }
    }
}
