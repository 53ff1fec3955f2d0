//! Downstream feed protocol
//!
//! The live-submission path offers an article to the configured posting
//! host with a one-line command, reads numeric-coded replies, and streams
//! the wire-rendered article on acceptance. The traits here are the seam
//! the delivery pipeline is tested through.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Server wants the article streamed.
pub const SEND_IT: u16 = 238;
/// Server accepted the streamed article.
pub const TOOK_IT: u16 = 239;
/// Server wants an authentication exchange first.
pub const AUTH_NEEDED: u16 = 335;
/// Server rejected the article; do not retry the same content.
pub const REJECTED: u16 = 435;
/// Server wants the article again later; do not retry the same content.
pub const RESEND_LATER: u16 = 436;
/// Server already has the article.
pub const HAVE_IT: u16 = 437;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REPLY_TIMEOUT: Duration = Duration::from_secs(60);

/// Leading numeric code of a reply line, or 0 when there is none.
pub fn reply_code(line: &str) -> u16 {
    let digits: &str = &line[..line.bytes().take_while(u8::is_ascii_digit).count()];
    digits.parse().unwrap_or(0)
}

/// One open exchange with a feed peer.
pub trait FeedLink: Send {
    /// Send raw protocol text, already CRLF-terminated.
    async fn send(&mut self, text: &str) -> io::Result<()>;

    /// Read one reply line, trailing line break removed.
    async fn read_line(&mut self) -> io::Result<String>;

    /// Perform one credential exchange.
    async fn authenticate(&mut self) -> io::Result<()>;
}

/// A configured downstream posting host.
pub trait FeedPeer: Send + Sync {
    type Link: FeedLink;

    /// Open a connection and consume the greeting.
    async fn open(&self) -> io::Result<Self::Link>;
}

/// [`FeedPeer`] over a plain TCP connection.
#[derive(Debug, Clone)]
pub struct TcpFeedPeer {
    addr: String,
    credentials: Option<(String, String)>,
}

impl TcpFeedPeer {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            credentials: None,
        }
    }

    /// Credentials for the AUTHINFO exchange, used when the peer challenges
    /// an offer.
    pub fn with_credentials(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.credentials = Some((user.into(), pass.into()));
        self
    }
}

impl FeedPeer for TcpFeedPeer {
    type Link = TcpFeedLink;

    async fn open(&self) -> io::Result<TcpFeedLink> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;
        let mut link = TcpFeedLink {
            stream: BufReader::new(stream),
            credentials: self.credentials.clone(),
        };
        let greeting = link.read_line().await?;
        match reply_code(&greeting) {
            200 | 201 => Ok(link),
            _ => Err(io::Error::other(format!(
                "unexpected greeting from {}: {greeting}",
                self.addr
            ))),
        }
    }
}

/// One open TCP exchange with a feed peer.
#[derive(Debug)]
pub struct TcpFeedLink {
    stream: BufReader<TcpStream>,
    credentials: Option<(String, String)>,
}

impl FeedLink for TcpFeedLink {
    async fn send(&mut self, text: &str) -> io::Result<()> {
        trace!("sending {} bytes", text.len());
        self.stream.get_mut().write_all(text.as_bytes()).await?;
        self.stream.get_mut().flush().await
    }

    async fn read_line(&mut self) -> io::Result<String> {
        let read = async {
            let mut bytes = Vec::with_capacity(512);
            self.stream.read_until(b'\n', &mut bytes).await?;
            if bytes.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed by peer",
                ));
            }
            let line = String::from_utf8_lossy(&bytes).trim_end().to_string();
            trace!("received: {line}");
            Ok(line)
        };
        timeout(REPLY_TIMEOUT, read)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "reply timed out"))?
    }

    async fn authenticate(&mut self) -> io::Result<()> {
        let Some((user, pass)) = self.credentials.clone() else {
            return Err(io::Error::other("peer wants authentication but no credentials are configured"));
        };
        self.send(&format!("AUTHINFO USER {user}\r\n")).await?;
        let mut line = self.read_line().await?;
        if reply_code(&line) == 381 {
            self.send(&format!("AUTHINFO PASS {pass}\r\n")).await?;
            line = self.read_line().await?;
        }
        if reply_code(&line) == 281 {
            Ok(())
        } else {
            Err(io::Error::other(format!("authentication failed: {line}")))
        }
    }
}
