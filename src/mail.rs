//! Moderator mail delivery
//!
//! Articles routed to a moderated group leave through a mail transport: a
//! command template with one `%s` substitution point for the recipient,
//! run as a subprocess with the rendered article on its standard input.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SubmitError};

/// Delivery seam for moderator mail.
pub trait MailTransport: Send + Sync {
    /// Deliver `message` to `address`. Failures are permanent; there is no
    /// spool fallback on the mail path.
    async fn deliver(&self, address: &str, message: &str) -> Result<()>;
}

/// [`MailTransport`] over a sendmail-style command template.
#[derive(Debug, Clone)]
pub struct CommandMailer {
    template: String,
}

impl CommandMailer {
    /// `template` is a shell command with `%s` standing for the recipient
    /// address, e.g. `/usr/sbin/sendmail -oi -oem %s`.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl MailTransport for CommandMailer {
    async fn deliver(&self, address: &str, message: &str) -> Result<()> {
        let command = self.template.replace("%s", address);
        debug!(%address, "starting mailer");

        let mut child = Command::new("/bin/sh")
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|_| SubmitError::Delivery {
                message: "Can't start mailer".to_string(),
                permanent: true,
            })?;

        let mut stdin = child.stdin.take().expect("stdin was piped");
        let write = async {
            stdin.write_all(message.as_bytes()).await?;
            stdin.shutdown().await
        };
        if write.await.is_err() {
            return Err(SubmitError::Delivery {
                message: "Can't send text to mailer".to_string(),
                permanent: true,
            });
        }
        drop(stdin);

        let status = child.wait().await.map_err(|_| SubmitError::Delivery {
            message: "Can't send text to mailer".to_string(),
            permanent: true,
        })?;
        if !status.success() {
            return Err(SubmitError::Delivery {
                message: format!(
                    "Mailer exited with status {} -- Article might not have been mailed",
                    status.code().unwrap_or(-1)
                ),
                permanent: true,
            });
        }
        Ok(())
    }
}
