//! # betwire
//!
//! Async client for a newline-framed bet submission wire protocol.
//!
//! The client reads bet records from a local source, packs them into size-
//! and count-bounded batches, and exchanges them with the server over one
//! TCP connection, one request and one reply at a time. After the last
//! batch it blocks until the winners announcement arrives.
//!
//! ## Architecture
//!
//! - **Framing** ([`protocol::framing`]): newline-terminated messages over a
//!   byte stream, tolerant of partial reads and writes
//! - **Batching** ([`batch`]): bounded batch assembly with carry-over of the
//!   line that would overflow a packet
//! - **Session** ([`SubmissionSession`]): request/reply per batch, compound
//!   final trailer, blocking winners wait
//! - **Shutdown** ([`shutdown`]): signal-driven cancellation polled at safe
//!   checkpoints
//!
//! ## Example
//!
//! ```ignore
//! use betwire::{Client, ClientConfig, SessionOutcome};
//!
//! #[tokio::main]
//! async fn main() -> betwire::Result<()> {
//!     let config = ClientConfig::from_json_file("client.json")?;
//!     let client = Client::new(config)?;
//!
//!     let cancel = betwire::shutdown::shutdown_token();
//!     match client.run(&cancel).await? {
//!         SessionOutcome::Completed { winners } => println!("{winners} winners"),
//!         SessionOutcome::Cancelled => println!("interrupted"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod protocol;
pub mod shutdown;
pub mod source;

mod client;
mod session;

pub use client::Client;
pub use config::{ClientConfig, SourceConfig};
pub use error::{BetwireError, Result};
pub use session::{SessionOutcome, SubmissionSession};
