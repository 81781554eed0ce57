//! Telnet session with the spot feed: connect, log in, then hand the socket
//! over for non-blocking reads.

use super::spot_store::SPOT_CAPACITY;
use crate::config::TelnetConfig;
use std::io::ErrorKind;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(5);

const LOGIN_OK_MARKER: &str = "Hello ";
const LOGIN_FAILED_MARKER: &str = "Login failed";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("connection to {0} timed out")]
    ConnectTimeout(String),
    #[error("server closed the connection during login")]
    Closed,
    #[error("login rejected by server")]
    LoginRejected,
    #[error("no login confirmation within {0:?}")]
    LoginTimeout(Duration),
    #[error("telnet I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Credentials problem rather than a connectivity problem
    pub fn is_login_failure(&self) -> bool {
        matches!(self, SessionError::LoginRejected | SessionError::LoginTimeout(_))
    }
}

/// Spot feed availability as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Connecting,
    Connected,
    Unavailable,
    LoginFailed,
}

impl From<&SessionError> for FeedStatus {
    fn from(err: &SessionError) -> Self {
        if err.is_login_failure() {
            FeedStatus::LoginFailed
        } else {
            FeedStatus::Unavailable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Authenticating,
    Connected,
    Failed,
}

/// Drives a single connect + login attempt. Retry timing is the scheduler's job.
pub struct SessionManager {
    state: SessionState,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Mark a previously established session as gone
    pub fn disconnected(&mut self) {
        self.state = SessionState::Disconnected;
    }

    /// Connect and authenticate. Blocks the loop for at most
    /// `CONNECT_TIMEOUT + LOGIN_TIMEOUT`.
    pub async fn attempt_session(
        &mut self,
        config: &TelnetConfig,
    ) -> Result<TelnetSession, SessionError> {
        let result = self.connect_and_login(config).await;
        self.state = match &result {
            Ok(_) => SessionState::Connected,
            Err(_) => SessionState::Failed,
        };
        result
    }

    async fn connect_and_login(
        &mut self,
        config: &TelnetConfig,
    ) -> Result<TelnetSession, SessionError> {
        let addr = format!("{}:{}", config.host, config.port);
        self.state = SessionState::Connecting;
        tracing::info!("Connecting to {}...", addr);

        let mut stream = match timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(SessionError::Connect { addr, source }),
            Err(_) => return Err(SessionError::ConnectTimeout(addr)),
        };

        self.state = SessionState::Authenticating;
        tracing::info!("Connected, logging in as {}", config.username);
        let leftover = login(&mut stream, &config.username, &config.password, LOGIN_TIMEOUT).await?;
        tracing::info!("Logged in to {}", addr);

        Ok(TelnetSession { stream, leftover })
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Answer the login and password prompts, then wait for the server's verdict.
/// On success the "show last spots" command has been sent and any bytes read
/// past the greeting are returned so no spot line is lost.
pub async fn login<S>(
    stream: &mut S,
    username: &str,
    password: &str,
    limit: Duration,
) -> Result<Vec<u8>, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut handshake = Handshake {
        stream,
        pending: Vec::new(),
    };

    let outcome = timeout(limit, handshake.run(username, password)).await;
    match outcome {
        Ok(Ok(())) => Ok(handshake.pending),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(SessionError::LoginTimeout(limit)),
    }
}

struct Handshake<'a, S> {
    stream: &'a mut S,
    pending: Vec<u8>,
}

impl<S> Handshake<'_, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn run(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        // "login:" then "password:"
        self.read_until(b':').await?;
        self.send_line(username).await?;
        self.read_until(b':').await?;
        self.send_line(password).await?;

        self.await_verdict().await?;
        self.send_line(&format!("sh/dx {}", SPOT_CAPACITY)).await?;
        Ok(())
    }

    /// Scan server output for the login verdict. An unterminated line is
    /// checked too, so a greeting without a newline still counts.
    async fn await_verdict(&mut self) -> Result<(), SessionError> {
        loop {
            let newline = self.pending.iter().position(|&b| b == b'\n');
            let end = newline.map_or(self.pending.len(), |pos| pos + 1);
            let text = String::from_utf8_lossy(&self.pending[..end]).into_owned();

            if text.contains(LOGIN_OK_MARKER) {
                tracing::debug!("login response: {}", text.trim_end());
                self.pending.drain(..end);
                return Ok(());
            }
            if text.contains(LOGIN_FAILED_MARKER) {
                return Err(SessionError::LoginRejected);
            }

            if newline.is_some() {
                tracing::debug!("login response: {}", text.trim_end());
                self.pending.drain(..end);
            } else {
                self.fill().await?;
            }
        }
    }

    async fn read_until(&mut self, delimiter: u8) -> Result<Vec<u8>, SessionError> {
        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == delimiter) {
                return Ok(self.pending.drain(..=pos).collect());
            }
            self.fill().await?;
        }
    }

    /// Read one chunk into `pending`
    async fn fill(&mut self) -> Result<(), SessionError> {
        let mut chunk = [0u8; 512];
        let n = self.stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(SessionError::Closed);
        }
        self.pending.extend_from_slice(&chunk[..n]);
        Ok(())
    }

    async fn send_line(&mut self, line: &str) -> Result<(), SessionError> {
        self.stream.write_all(format!("{}\r\n", line).as_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

/// Bytes drained from the socket in one poll
#[derive(Debug, Default)]
pub struct Drained {
    pub bytes: Vec<u8>,
    /// False once the peer closed the connection or the socket failed
    pub open: bool,
}

/// An authenticated feed connection, read without waiting
pub struct TelnetSession {
    stream: TcpStream,
    leftover: Vec<u8>,
}

impl TelnetSession {
    /// Read everything the socket has buffered right now and return
    pub fn drain(&mut self) -> Drained {
        let mut bytes = std::mem::take(&mut self.leftover);
        let mut chunk = [0u8; 1024];

        loop {
            match self.stream.try_read(&mut chunk) {
                Ok(0) => {
                    tracing::warn!("Connection closed by server");
                    return Drained { bytes, open: false };
                }
                Ok(n) => bytes.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    return Drained { bytes, open: true };
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("Read error: {}", e);
                    return Drained { bytes, open: false };
                }
            }
        }
    }
}
