//! Local spool and audit trail
//!
//! The spool holds wire-rendered articles that could not be delivered
//! immediately, for a separate process to retry. Writes go through an
//! exclusively-created temporary file and an atomic rename so a concurrent
//! spool reader never observes a partial article.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// The incoming-article spool directory.
#[derive(Debug, Clone)]
pub struct Spool {
    dir: PathBuf,
}

impl Spool {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The spool root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an article into the spool root.
    pub async fn deposit(&self, text: &str) -> io::Result<PathBuf> {
        self.deposit_in(None, text).await
    }

    /// Write an article into the spool, optionally under a subdirectory
    /// (used for hook-directed quarantine). Returns the final path.
    pub async fn deposit_in(&self, subdir: Option<&str>, text: &str) -> io::Result<PathBuf> {
        let dir = match subdir {
            Some(sub) => self.dir.join(sub),
            None => self.dir.clone(),
        };
        fs::create_dir_all(&dir).await?;

        let (mut file, tmp) = loop {
            let tmp = dir.join(format!(".in.{:08x}", rand::random::<u32>()));
            let mut opts = OpenOptions::new();
            opts.write(true).create_new(true);
            #[cfg(unix)]
            opts.mode(0o664);
            match opts.open(&tmp).await {
                Ok(file) => break (file, tmp),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err),
            }
        };
        file.write_all(text.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        loop {
            let name = dir.join(format!(
                "art-{}-{:08x}",
                Utc::now().timestamp(),
                rand::random::<u32>()
            ));
            let mut opts = OpenOptions::new();
            opts.write(true).create_new(true);
            #[cfg(unix)]
            opts.mode(0o664);
            match opts.open(&name).await {
                Ok(_) => {
                    fs::rename(&tmp, &name).await?;
                    debug!(path = %name.display(), "article spooled");
                    return Ok(name);
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

/// Per-message audit trail of accepted posts.
///
/// Failures here are logged and swallowed; the audit trail never fails a
/// submission that the downstream server already took.
#[derive(Debug, Clone)]
pub struct Tracker {
    dir: PathBuf,
}

impl Tracker {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Record the final wire form of an accepted article.
    pub async fn record(&self, message_id: &str, wire: &str) {
        if let Err(err) = self.write(message_id, wire).await {
            warn!(message_id, error = %err, "audit trail write failed");
        }
    }

    async fn write(&self, message_id: &str, wire: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let name = format!("track.{}", message_id.replace('/', "_"));
        fs::write(self.dir.join(name), wire).await
    }
}
