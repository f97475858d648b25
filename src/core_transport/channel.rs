use std::io::ErrorKind;
use std::time::Duration;

use log::debug;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::constants::{MAX_LINE_LENGTH, TRANSFER_CHUNK_SIZE};

/// Transport failures, split so callers can tell an aborted peer from an
/// orderly close that arrived mid-message.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("connection reset by peer")]
    Reset,

    #[error("connection closed before the message completed")]
    Closed,

    #[error("socket error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::ConnectionReset | ErrorKind::BrokenPipe => ChannelError::Reset,
            ErrorKind::UnexpectedEof => ChannelError::Closed,
            _ => ChannelError::Io(err),
        }
    }
}

/// One connection's wire: CR+LF line traffic plus raw byte regions for the
/// negotiated file payloads. Reads are buffered; a payload that arrived in
/// the same packet as its SIZE line is picked up from the buffer first.
pub struct Channel {
    stream: BufReader<TcpStream>,
}

impl Channel {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Reads one line, stripping the CR+LF (a bare LF is tolerated).
    /// Returns `Ok(None)` on an orderly close between messages. A line
    /// still unterminated at `MAX_LINE_LENGTH` bytes is an error.
    pub async fn read_line(&mut self) -> Result<Option<String>, ChannelError> {
        let mut line = String::new();
        let n = (&mut self.stream)
            .take(MAX_LINE_LENGTH as u64)
            .read_line(&mut line)
            .await?;
        if n == 0 {
            return Ok(None);
        }
        if n == MAX_LINE_LENGTH && !line.ends_with('\n') {
            return Err(ChannelError::Io(std::io::Error::new(
                ErrorKind::InvalidData,
                "line exceeds the maximum length",
            )));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Collects exactly `len` raw bytes. With `idle_timeout` armed the read
    /// gives up once the peer stays silent that long and returns the short
    /// buffer; without one it runs until the count is met. An orderly close
    /// mid-payload is `ChannelError::Closed`.
    pub async fn read_exact_bytes(
        &mut self,
        len: u64,
        idle_timeout: Option<Duration>,
    ) -> Result<Vec<u8>, ChannelError> {
        let want = len as usize;
        let mut payload = Vec::with_capacity(want.min(64 * 1024));
        let mut chunk = [0u8; TRANSFER_CHUNK_SIZE];

        while payload.len() < want {
            let room = (want - payload.len()).min(chunk.len());
            let read = match idle_timeout {
                Some(limit) => match timeout(limit, self.stream.read(&mut chunk[..room])).await {
                    Ok(result) => result?,
                    Err(_) => {
                        debug!(
                            "payload read idled out after {} of {} bytes",
                            payload.len(),
                            want
                        );
                        return Ok(payload);
                    }
                },
                None => self.stream.read(&mut chunk[..room]).await?,
            };
            if read == 0 {
                return Err(ChannelError::Closed);
            }
            payload.extend_from_slice(&chunk[..read]);
        }

        Ok(payload)
    }

    /// Writes one response line, appending CR+LF.
    pub async fn write_line(&mut self, text: &str) -> Result<(), ChannelError> {
        self.stream.write_all(text.as_bytes()).await?;
        self.stream.write_all(b"\r\n").await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Writes a raw payload region with no framing around it.
    pub async fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), ChannelError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
