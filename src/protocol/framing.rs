//! Message framing over a byte stream.
//!
//! A message is the payload followed by one terminator byte. The transport
//! may deliver data in arbitrary chunk sizes, so both directions recover from
//! partial progress:
//! - writes resume with the remaining unsent suffix until everything is out,
//! - reads accumulate chunks until the terminator shows up, keeping any bytes
//!   past it for the next message.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::wire::MESSAGE_DELIMITER;
use crate::error::{BetwireError, Result};

/// Chunk size for socket reads.
const READ_CHUNK_SIZE: usize = 1024;

/// Write one framed message: the payload plus the terminator byte.
///
/// Returns only once every byte has been handed to the transport, or an error
/// occurred. A short write is resumed with the unsent suffix; a write that
/// reports zero progress is treated as a closed connection.
pub async fn write_message<W>(writer: &mut W, payload: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::with_capacity(payload.len() + 1);
    buf.extend_from_slice(payload.as_bytes());
    buf.push(MESSAGE_DELIMITER);

    let mut written = 0;
    while written < buf.len() {
        let n = writer.write(&buf[written..]).await?;
        if n == 0 {
            return Err(BetwireError::ConnectionClosed);
        }
        written += n;
    }
    writer.flush().await?;
    Ok(())
}

/// Buffer for reading terminator-delimited messages off a stream.
///
/// Bytes past a terminator are retained for the next call, so back-to-back
/// messages arriving in one chunk are not lost.
#[derive(Debug, Default)]
pub struct MessageReader {
    buffer: BytesMut,
}

impl MessageReader {
    /// Create an empty reader.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
        }
    }

    /// Read one message, stripping the terminator.
    ///
    /// Accumulates as many reads as it takes for the terminator byte to
    /// appear in the buffered data. EOF or an I/O error before the terminator
    /// is an I/O failure, distinct from a clean message boundary.
    pub async fn read_message<R>(&mut self, reader: &mut R) -> Result<String>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            if let Some(pos) = self
                .buffer
                .iter()
                .position(|&b| b == MESSAGE_DELIMITER)
            {
                let mut payload = self.buffer.split_to(pos + 1);
                payload.truncate(pos);
                return String::from_utf8(payload.to_vec())
                    .map_err(|e| BetwireError::Protocol(format!("non-UTF-8 payload: {e}")));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let n = reader.read(&mut chunk).await?;
            if n == 0 {
                return Err(BetwireError::ConnectionClosed);
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }

    /// Number of buffered bytes not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
