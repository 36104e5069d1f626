//! Newline-delimited transport over standard I/O.
//!
//! Each line carries one payload (a single request or a batch). Blank lines
//! are skipped and each response is written on its own line. At most
//! `max_message_size` bytes of a line are buffered; the rest of an oversized
//! line is read and discarded.

use async_trait::async_trait;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};
use tracing::{debug, info};

use super::{Transport, TransportResult};
use crate::config::server::DEFAULT_MAX_MESSAGE_SIZE;
use crate::error::transport::TransportError;

/// Line-oriented transport over any buffered reader and writer.
#[derive(Debug)]
pub struct StdioTransport<R, W> {
    reader: R,
    writer: W,
    max_message_size: usize,
    line: Vec<u8>,
}

impl StdioTransport<BufReader<Stdin>, Stdout> {
    /// Creates a transport over the process's stdin and stdout.
    pub fn stdio(max_message_size: usize) -> Self {
        Self::new(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            max_message_size,
        )
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a transport over `reader` and `writer`.
    pub fn new(reader: R, writer: W, max_message_size: usize) -> Self {
        Self {
            reader,
            writer,
            max_message_size,
            line: Vec::new(),
        }
    }

    /// Creates a transport with the default message bound.
    pub fn with_default_limit(reader: R, writer: W) -> Self {
        Self::new(reader, writer, DEFAULT_MAX_MESSAGE_SIZE)
    }

    /// Returns the writer, consuming the transport.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Outcome of reading one line.
enum Frame {
    /// The line fit; its trimmed bytes are in the line buffer.
    Complete,
    /// The trimmed line exceeded the bound.
    Oversized(usize),
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Reads up to the next newline or EOF. Returns `None` at EOF.
    ///
    /// Leading whitespace is never buffered. Bytes past the bound are only
    /// counted; they make the line oversized unless they are all whitespace.
    async fn read_frame(&mut self) -> TransportResult<Option<Frame>> {
        self.line.clear();
        let mut read_any = false;
        let mut overflow = 0usize;
        let mut overflow_content = false;

        loop {
            let chunk = self.reader.fill_buf().await?;
            if chunk.is_empty() {
                if !read_any {
                    return Ok(None);
                }
                break;
            }
            read_any = true;

            let (segment, consumed, complete) = match chunk.iter().position(|&b| b == b'\n') {
                Some(pos) => (&chunk[..pos], pos + 1, true),
                None => (chunk, chunk.len(), false),
            };

            let segment = if self.line.is_empty() && overflow == 0 {
                segment.trim_ascii_start()
            } else {
                segment
            };
            let room = self.max_message_size.saturating_sub(self.line.len());
            let (kept, extra) = segment.split_at(segment.len().min(room));
            self.line.extend_from_slice(kept);
            overflow += extra.len();
            overflow_content |= extra.iter().any(|b| !b.is_ascii_whitespace());

            self.reader.consume(consumed);
            if complete {
                break;
            }
        }

        if overflow_content {
            return Ok(Some(Frame::Oversized(self.line.len() + overflow)));
        }

        let content = self.line.trim_ascii_end().len();
        self.line.truncate(content);
        Ok(Some(Frame::Complete))
    }
}

#[async_trait]
impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> TransportResult<Option<Vec<u8>>> {
        loop {
            match self.read_frame().await? {
                None => {
                    info!("EOF on input, closing transport");
                    return Ok(None);
                }
                Some(Frame::Oversized(size)) => {
                    self.line.clear();
                    return Err(TransportError::MessageTooLarge {
                        size,
                        max_size: self.max_message_size,
                    });
                }
                Some(Frame::Complete) if self.line.is_empty() => continue,
                Some(Frame::Complete) => {
                    debug!(bytes = self.line.len(), "Message received");
                    return Ok(Some(std::mem::take(&mut self.line)));
                }
            }
        }
    }

    async fn send(&mut self, body: String) -> TransportResult<()> {
        let mut framed = body.into_bytes();
        framed.push(b'\n');

        self.writer
            .write_all(&framed)
            .await
            .map_err(|e| TransportError::WriteError(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| TransportError::WriteError(e.to_string()))
    }
}
