//! Client side of a single server connection
//!
//! A connection owns the socket, the buffered reader and the protocol
//! version from the greeting. It is strictly sequential: one request is
//! written, then its whole response is read before the next request.
//!
//! Transport failures, timeouts and malformed frames leave the stream in an
//! unknown position, so they move the connection to `Failed` and every
//! later call is refused. An `ACK` reply ends the response cleanly and the
//! connection stays usable.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use rmpdc_core::error::{Result, RmpdcError};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, trace, warn};

use crate::command::{Command, CommandList};
use crate::parser::{self, Line, ProtocolVersion};
use crate::response::{BinaryChunk, Pair};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest binary chunk accepted from the server
pub const MAX_BINARY_CHUNK: usize = 64 * 1024 * 1024;

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Ready,
    /// Unrecoverable, with the reason
    Failed(String),
    Closed,
}

/// One reply line, with `ACK` already turned into an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Pair(Pair),
    ListOk,
    Ok,
}

pub struct Connection {
    reader: BufReader<BoxedReader>,
    writer: BoxedWriter,
    version: ProtocolVersion,
    timeout: Duration,
    state: ConnectionState,
    peer: String,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("peer", &self.peer)
            .field("version", &self.version)
            .field("state", &self.state)
            .finish()
    }
}

impl Connection {
    /// Connect to `host:port`, or to a local socket when `host` is an
    /// absolute path or an `@`-prefixed abstract socket name
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        if host.starts_with('/') {
            return Self::connect_unix(host, timeout).await;
        }
        if let Some(name) = host.strip_prefix('@') {
            return Self::connect_unix(&format!("\0{}", name), timeout).await;
        }

        let peer = format!("{}:{}", host, port);
        debug!("Connecting to {}", peer);
        let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| RmpdcError::Timeout)??;
        stream.set_nodelay(true)?;
        Self::from_stream(stream, peer, timeout).await
    }

    #[cfg(unix)]
    async fn connect_unix(path: &str, timeout: Duration) -> Result<Self> {
        let peer = path.replace('\0', "@");
        debug!("Connecting to socket {}", peer);
        let stream = tokio::time::timeout(timeout, tokio::net::UnixStream::connect(path))
            .await
            .map_err(|_| RmpdcError::Timeout)??;
        Self::from_stream(stream, peer, timeout).await
    }

    #[cfg(not(unix))]
    async fn connect_unix(path: &str, _timeout: Duration) -> Result<Self> {
        Err(RmpdcError::Argument(format!(
            "local sockets are not supported on this platform: {}",
            path
        )))
    }

    /// Wrap an established stream and read the greeting
    pub async fn from_stream<S>(stream: S, peer: impl Into<String>, timeout: Duration) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let mut connection = Self {
            reader: BufReader::new(Box::new(reader) as BoxedReader),
            writer: Box::new(writer),
            version: ProtocolVersion::default(),
            timeout,
            state: ConnectionState::Ready,
            peer: peer.into(),
        };

        let greeting = connection.read_line().await?;
        connection.version = parser::parse_greeting(&greeting).map_err(|e| connection.fail(e))?;
        debug!("Connected to {} (protocol {})", connection.peer, connection.version);
        Ok(connection)
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_usable(&self) -> bool {
        self.state == ConnectionState::Ready
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Record a fatal error and hand it back
    pub(crate) fn fail(&mut self, error: RmpdcError) -> RmpdcError {
        if error.is_fatal() && self.state == ConnectionState::Ready {
            warn!("Connection to {} failed: {}", self.peer, error);
            self.state = ConnectionState::Failed(error.to_string());
        }
        error
    }

    fn ensure_ready(&self) -> Result<()> {
        match &self.state {
            ConnectionState::Ready => Ok(()),
            ConnectionState::Failed(reason) => Err(RmpdcError::InvalidState(format!(
                "connection to {} failed earlier: {}",
                self.peer, reason
            ))),
            ConnectionState::Closed => Err(RmpdcError::InvalidState(format!(
                "connection to {} is closed",
                self.peer
            ))),
        }
    }

    async fn write_all(&mut self, payload: &[u8]) -> Result<()> {
        let timeout = self.timeout;
        let writer = &mut self.writer;
        let write = async move {
            writer.write_all(payload).await?;
            writer.flush().await
        };
        match tokio::time::timeout(timeout, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(self.fail(e.into())),
            Err(_) => Err(self.fail(RmpdcError::Timeout)),
        }
    }

    async fn read_line(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        let read = tokio::time::timeout(self.timeout, self.reader.read_until(b'\n', &mut buf)).await;
        match read {
            Err(_) => return Err(self.fail(RmpdcError::Timeout)),
            Ok(Err(e)) => return Err(self.fail(e.into())),
            Ok(Ok(0)) => return Err(self.fail(RmpdcError::Closed)),
            Ok(Ok(_)) => {}
        }

        if buf.last() != Some(&b'\n') {
            return Err(self.fail(RmpdcError::Closed));
        }
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        match String::from_utf8(buf) {
            Ok(line) => {
                trace!("<- {}", line);
                Ok(line)
            }
            Err(_) => Err(self.fail(RmpdcError::Protocol("response line is not valid UTF-8".to_owned()))),
        }
    }

    pub async fn send(&mut self, command: &Command) -> Result<()> {
        self.ensure_ready()?;
        let line = command.to_line()?;
        debug!("-> {}", command);
        self.write_all(line.as_bytes()).await
    }

    pub async fn send_list(&mut self, list: &CommandList) -> Result<()> {
        self.ensure_ready()?;
        let payload = list.to_payload()?;
        debug!("-> command list of {} commands", list.len());
        self.write_all(payload.as_bytes()).await
    }

    /// Read the next reply line
    pub async fn next_reply(&mut self) -> Result<Reply> {
        self.ensure_ready()?;
        let line = self.read_line().await?;
        let parsed = parser::parse_line(&line).map_err(|e| self.fail(e));
        match parsed? {
            Line::Ok => Ok(Reply::Ok),
            Line::ListOk => Ok(Reply::ListOk),
            Line::Ack(error) => {
                debug!("Server error: {}", error);
                Err(RmpdcError::Server(error))
            }
            Line::Pair(key, value) => Ok(Reply::Pair(Pair::new(key, value))),
        }
    }

    /// Next pair of the current response, `None` once `OK` arrives
    pub async fn next_pair(&mut self) -> Result<Option<Pair>> {
        match self.next_reply().await? {
            Reply::Pair(pair) => Ok(Some(pair)),
            Reply::Ok => Ok(None),
            Reply::ListOk => Err(self.fail(RmpdcError::Protocol(
                "unexpected list_OK outside a command list".to_owned(),
            ))),
        }
    }

    /// Collect every pair up to the terminating `OK`
    pub async fn read_pairs(&mut self) -> Result<Vec<Pair>> {
        let mut pairs = Vec::new();
        while let Some(pair) = self.next_pair().await? {
            pairs.push(pair);
        }
        Ok(pairs)
    }

    /// Wait for `OK`, discarding any pairs
    pub async fn read_ok(&mut self) -> Result<()> {
        let pairs = self.read_pairs().await?;
        if !pairs.is_empty() {
            trace!("Discarded {} response pairs", pairs.len());
        }
        Ok(())
    }

    pub async fn run(&mut self, command: &Command) -> Result<Vec<Pair>> {
        self.send(command).await?;
        self.read_pairs().await
    }

    /// Run a command list and return the pairs of each command
    pub async fn run_list(&mut self, list: &CommandList) -> Result<Vec<Vec<Pair>>> {
        if list.is_empty() {
            return Ok(Vec::new());
        }

        self.send_list(list).await?;
        let mut responses = Vec::with_capacity(list.len());
        let mut current = Vec::new();
        loop {
            match self.next_reply().await? {
                Reply::Pair(pair) => current.push(pair),
                Reply::ListOk => responses.push(std::mem::take(&mut current)),
                Reply::Ok => break,
            }
        }

        if responses.len() != list.len() || !current.is_empty() {
            return Err(self.fail(RmpdcError::Protocol(format!(
                "expected {} list_OK replies, got {}",
                list.len(),
                responses.len()
            ))));
        }
        Ok(responses)
    }

    /// Read one binary response after a chunked request was sent
    ///
    /// An `OK` without a `binary` field yields an empty chunk; `readpicture`
    /// answers that way when the file has no embedded picture.
    pub async fn read_binary_chunk(&mut self) -> Result<BinaryChunk> {
        let mut size = None;
        let mut mime_type = None;

        loop {
            let pair = match self.next_pair().await? {
                Some(pair) => pair,
                None => {
                    return Ok(BinaryChunk {
                        size,
                        mime_type,
                        data: Bytes::new(),
                    });
                }
            };

            match pair.key.as_str() {
                "size" => size = Some(self.parse_frame_number(&pair)?),
                "type" => mime_type = Some(pair.value),
                "binary" => {
                    let length = self.parse_frame_number(&pair)?;
                    let data = self.read_binary_payload(length).await?;
                    return Ok(BinaryChunk { size, mime_type, data });
                }
                other => trace!("Ignoring binary header field: {}", other),
            }
        }
    }

    fn parse_frame_number(&mut self, pair: &Pair) -> Result<u64> {
        pair.value.parse().map_err(|_| {
            self.fail(RmpdcError::Protocol(format!(
                "invalid '{}' in binary response: {:?}",
                pair.key, pair.value
            )))
        })
    }

    async fn read_binary_payload(&mut self, length: u64) -> Result<Bytes> {
        let length = match usize::try_from(length) {
            Ok(n) if n <= MAX_BINARY_CHUNK => n,
            _ => {
                return Err(self.fail(RmpdcError::Protocol(format!(
                    "binary chunk of {} bytes exceeds the {} byte limit",
                    length, MAX_BINARY_CHUNK
                ))));
            }
        };

        // Payload, then the newline that closes it
        let mut data = vec![0u8; length + 1];
        match tokio::time::timeout(self.timeout, self.reader.read_exact(&mut data)).await {
            Err(_) => return Err(self.fail(RmpdcError::Timeout)),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(self.fail(RmpdcError::Closed));
            }
            Ok(Err(e)) => return Err(self.fail(e.into())),
            Ok(Ok(_)) => {}
        }
        if data.pop() != Some(b'\n') {
            return Err(self.fail(RmpdcError::Protocol(
                "binary payload not followed by a newline".to_owned(),
            )));
        }

        match self.next_reply().await? {
            Reply::Ok => Ok(Bytes::from(data)),
            other => Err(self.fail(RmpdcError::Protocol(format!(
                "expected OK after binary payload, got {:?}",
                other
            )))),
        }
    }

    /// Say goodbye and shut the socket down
    pub async fn close(&mut self) -> Result<()> {
        if self.state == ConnectionState::Ready {
            let line = Command::new("close").to_line()?;
            // The server hangs up without replying
            if let Err(e) = self.write_all(line.as_bytes()).await {
                debug!("Failed to send close to {}: {}", self.peer, e);
            }
        }
        self.state = ConnectionState::Closed;
        if let Err(e) = self.writer.shutdown().await {
            debug!("Shutdown of {} failed: {}", self.peer, e);
        }
        Ok(())
    }
}
