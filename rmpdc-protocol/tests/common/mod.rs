//! Scripted mock daemon for integration tests
//!
//! `MockServer` binds to port 0, greets every client and hands each request
//! to a handler closure. A command list (`command_list_ok_begin` up to
//! `command_list_end`) is delivered as one request with its lines joined by
//! `\n`. Every request is recorded so tests can check what was sent.

#![allow(dead_code)]

use std::fmt::Write as FmtWrite;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rmpdc_core::config::ServerConfig;
use rmpdc_protocol::Connection;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const GREETING: &str = "OK MPD 0.24.0\n";
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(2);

/// What the mock does with one request
pub enum Action {
    Reply(Vec<u8>),
    /// Never answer, for timeout tests
    Silent,
    /// Drop the socket
    Hangup,
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        Action::Reply(s.into_bytes())
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        Action::Reply(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Action {
    fn from(b: Vec<u8>) -> Self {
        Action::Reply(b)
    }
}

type Handler = Arc<dyn Fn(&str) -> Action + Send + Sync>;

pub struct MockServer {
    port: u16,
    received: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start<F, A>(handler: F) -> Self
    where
        F: Fn(&str) -> A + Send + Sync + 'static,
        A: Into<Action>,
    {
        Self::start_with_greeting(GREETING, handler).await
    }

    pub async fn start_with_greeting<F, A>(greeting: &str, handler: F) -> Self
    where
        F: Fn(&str) -> A + Send + Sync + 'static,
        A: Into<Action>,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler = Arc::new(move |request: &str| handler(request).into());
        let greeting = greeting.to_string();

        let log = Arc::clone(&received);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&log);
                let greeting = greeting.clone();
                tokio::spawn(async move {
                    serve(stream, &greeting, handler, log).await;
                });
            }
        });

        Self { port, received, task }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Requests seen so far, in order
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            name: "mock".to_string(),
            hostname: "127.0.0.1".to_string(),
            port: self.port,
            password: None,
        }
    }

    pub async fn connect(&self) -> Connection {
        Connection::connect("127.0.0.1", self.port, CLIENT_TIMEOUT)
            .await
            .unwrap()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(stream: TcpStream, greeting: &str, handler: Handler, log: Arc<Mutex<Vec<String>>>) {
    let (read_half, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    if writer.write_all(greeting.as_bytes()).await.is_err() {
        return;
    }

    let mut list: Option<Vec<String>> = None;
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let trimmed = line.trim_end_matches('\n').to_string();

        let request = if let Some(lines) = list.as_mut() {
            let end = trimmed == "command_list_end";
            lines.push(trimmed);
            if !end {
                continue;
            }
            list.take().unwrap_or_default().join("\n")
        } else if trimmed == "command_list_ok_begin" || trimmed == "command_list_begin" {
            list = Some(vec![trimmed]);
            continue;
        } else {
            trimmed
        };

        log.lock().unwrap().push(request.clone());
        match handler(&request) {
            Action::Reply(bytes) => {
                if writer.write_all(&bytes).await.is_err() {
                    return;
                }
            }
            Action::Silent => {}
            Action::Hangup => return,
        }
    }
}

/// Builds daemon replies
#[derive(Default)]
pub struct Reply {
    buffer: Vec<u8>,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: &str, value: impl std::fmt::Display) -> Self {
        let mut line = String::new();
        writeln!(line, "{}: {}", key, value).unwrap();
        self.buffer.extend_from_slice(line.as_bytes());
        self
    }

    pub fn list_ok(mut self) -> Self {
        self.buffer.extend_from_slice(b"list_OK\n");
        self
    }

    /// `binary: <n>`, the raw bytes and the closing newline
    pub fn binary(mut self, data: &[u8]) -> Self {
        self = self.field("binary", data.len());
        self.buffer.extend_from_slice(data);
        self.buffer.push(b'\n');
        self
    }

    pub fn ok(mut self) -> Vec<u8> {
        self.buffer.extend_from_slice(b"OK\n");
        self.buffer
    }
}

pub fn ack(code: u32, index: u32, command: &str, message: &str) -> String {
    format!("ACK [{}@{}] {{{}}} {}\n", code, index, command, message)
}

/// Offset argument of an `albumart`/`readpicture` request
pub fn request_offset(request: &str) -> usize {
    request
        .rsplit(' ')
        .next()
        .and_then(|offset| offset.parse().ok())
        .unwrap_or_else(|| panic!("no offset in request: {request}"))
}

/// Reply to a chunked picture request the way the daemon does
pub fn picture_chunk(data: &[u8], chunk_size: usize, offset: usize, mime_type: Option<&str>) -> Vec<u8> {
    let end = (offset + chunk_size).min(data.len());
    let start = offset.min(end);
    let mut reply = Reply::new().field("size", data.len());
    if let Some(mime_type) = mime_type {
        reply = reply.field("type", mime_type);
    }
    reply.binary(&data[start..end]).ok()
}

/// Deterministic test payload with every byte value, newlines included
pub fn test_picture(len: usize) -> Vec<u8> {
    let mut data: Vec<u8> = b"\xFF\xD8\xFF\xE0".to_vec();
    data.extend((0..len.saturating_sub(4)).map(|i| (i % 256) as u8));
    data.truncate(len);
    data
}
