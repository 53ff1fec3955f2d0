//! The submission pipeline
//!
//! [`Submitter::submit`] takes one raw article through validation, routing,
//! and delivery: moderator mail for a moderation target, direct spooling
//! when configured, otherwise a live offer to the downstream feed peer with
//! the local spool as the fallback for every transient failure. Each
//! article reaches exactly one terminal outcome; a transient live failure
//! never silently drops the article.

use tracing::{debug, info, warn};

use crate::article::{
    check_from, check_included_text, count_lines, process_headers, split_off_headers, Hdr,
};
use crate::config::{AccessConfig, ClientInfo, SubmitMode};
use crate::error::{Result, SubmitError};
use crate::feed::{
    reply_code, FeedLink, FeedPeer, AUTH_NEEDED, HAVE_IT, REJECTED, RESEND_LATER, SEND_IT, TOOK_IT,
};
use crate::groups::{check_followup_to, check_newsgroups, GroupCatalog, HookVerdict, PostingHook};
use crate::mail::MailTransport;
use crate::msgid::generate_message_id;
use crate::spool::{Spool, Tracker};
use crate::wire::{dot_stuff, render_article};

/// Terminal outcome of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The downstream server took the article
    Accepted,
    /// The article went to the local spool for later delivery
    AcceptedAndSpooled,
    /// The article went to a moderator by mail
    Mailed,
    /// The posting hook discarded the article
    Dropped,
}

/// A successful submission: the outcome and the article's identifier,
/// echoed or synthesized.
#[derive(Debug, Clone)]
pub struct Submission {
    pub outcome: DeliveryOutcome,
    pub message_id: String,
}

/// How one live-submission attempt ended, before fallback wiring.
enum LiveError {
    /// Report to the submitter as-is
    Permanent(SubmitError),
    /// Eligible for the spool fallback
    Transient(String),
}

/// The article submission pipeline.
pub struct Submitter<C, P, M> {
    config: AccessConfig,
    catalog: C,
    peer: P,
    mailer: M,
    spool: Spool,
    hook: Option<Box<dyn PostingHook>>,
    tracker: Option<Tracker>,
}

impl<C, P, M> Submitter<C, P, M>
where
    C: GroupCatalog,
    P: FeedPeer,
    M: MailTransport,
{
    pub fn new(config: AccessConfig, catalog: C, peer: P, mailer: M, spool: Spool) -> Self {
        Self {
            config,
            catalog,
            peer,
            mailer,
            spool,
            hook: None,
            tracker: None,
        }
    }

    /// Install a dynamic posting hook.
    pub fn with_hook(mut self, hook: Box<dyn PostingHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Keep an audit trail of accepted posts.
    pub fn with_tracker(mut self, tracker: Tracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Validate, route, and deliver one raw article.
    pub async fn submit(
        &self,
        raw: &str,
        client: &ClientInfo,
        mode: SubmitMode,
    ) -> Result<Submission> {
        let (mut headers, body) = split_off_headers(raw)?;
        let lines = count_lines(body);
        if self.config.check_included_text {
            check_included_text(body, lines)?;
        }

        let id_domain = self
            .config
            .domain
            .as_deref()
            .unwrap_or(&self.config.path_host);
        let generated = generate_message_id(id_domain);
        process_headers(&mut headers, lines, &generated, mode, &self.config, client)?;

        // Control messages may legitimately carry no body text.
        if headers.get(Hdr::Control).is_none()
            && body.trim_matches(|c: char| c.is_ascii_whitespace()).is_empty()
        {
            return Err(SubmitError::Header("Article is empty".to_string()));
        }

        let message_id = headers
            .get(Hdr::MessageId)
            .unwrap_or(generated.as_str())
            .to_string();

        let target = check_newsgroups(
            &mut headers,
            &self.config,
            client,
            &self.catalog,
            self.hook.as_deref(),
        )?;

        check_from(headers.get(Hdr::From).unwrap_or_default())?;

        check_followup_to(
            &headers,
            &self.config,
            client,
            &self.catalog,
            self.hook.as_deref(),
        )?;

        if self.config.max_article_size > 0 && body.len() > self.config.max_article_size {
            return Err(SubmitError::Policy(format!(
                "Article is bigger than local limit of {} bytes",
                self.config.max_article_size
            )));
        }

        if let Some(hook) = &self.hook {
            match hook.filter(&headers, body) {
                HookVerdict::Accept => {}
                HookVerdict::Drop(reason) => {
                    info!(message_id, reason, "article dropped by posting hook");
                    return Ok(Submission {
                        outcome: DeliveryOutcome::Dropped,
                        message_id,
                    });
                }
                HookVerdict::Spool(reason) => {
                    info!(message_id, reason, "article quarantined by posting hook");
                    let subdir = if target.is_some() { "spam/mod" } else { "spam" };
                    let wire = render_article(&headers, body, true);
                    self.spool
                        .deposit_in(Some(subdir), &wire)
                        .await
                        .map_err(|err| SubmitError::Spool(err.to_string()))?;
                    return Ok(Submission {
                        outcome: DeliveryOutcome::AcceptedAndSpooled,
                        message_id,
                    });
                }
                HookVerdict::Reject(reason) => {
                    return Err(SubmitError::Policy(reason));
                }
            }
        }

        if let Some(group) = &target {
            let Some(address) = self.catalog.moderator_address(group) else {
                return Err(SubmitError::Delivery {
                    message: format!(
                        "No mailing address for \"{group}\" -- ask your news administrator to fix this"
                    ),
                    permanent: true,
                });
            };
            debug!(message_id, group, %address, "mailing to moderator");
            let message = format!("To: {address}\n{}", render_article(&headers, body, false));
            self.mailer.deliver(&address, &message).await?;
            return Ok(Submission {
                outcome: DeliveryOutcome::Mailed,
                message_id,
            });
        }

        let wire = render_article(&headers, body, true);

        if self.config.spool_first || self.config.offline_post {
            self.spool
                .deposit(&wire)
                .await
                .map_err(|err| SubmitError::Spool(err.to_string()))?;
            return Ok(Submission {
                outcome: DeliveryOutcome::AcceptedAndSpooled,
                message_id,
            });
        }

        match self.live_submit(&message_id, &wire).await {
            Ok(()) => {
                if let Some(tracker) = &self.tracker {
                    tracker.record(&message_id, &wire).await;
                }
                Ok(Submission {
                    outcome: DeliveryOutcome::Accepted,
                    message_id,
                })
            }
            Err(LiveError::Permanent(err)) => Err(err),
            Err(LiveError::Transient(reason)) => {
                warn!(message_id, reason, "live submission failed, spooling");
                match self.spool.deposit(&wire).await {
                    Ok(_) => Ok(Submission {
                        outcome: DeliveryOutcome::AcceptedAndSpooled,
                        message_id,
                    }),
                    Err(_) => Err(SubmitError::Spool(reason)),
                }
            }
        }
    }

    /// One attempt against the downstream feed peer.
    async fn live_submit(&self, message_id: &str, wire: &str) -> std::result::Result<(), LiveError> {
        let transient =
            |err: std::io::Error| LiveError::Transient(format!("Can't send article to server: {err}"));

        let mut link = self.peer.open().await.map_err(transient)?;
        let offer = format!("IHAVE {message_id}\r\n");
        link.send(&offer).await.map_err(transient)?;
        let mut reply = link.read_line().await.map_err(transient)?;

        if reply_code(&reply) == AUTH_NEEDED {
            link.authenticate().await.map_err(transient)?;
            link.send(&offer).await.map_err(transient)?;
            reply = link.read_line().await.map_err(transient)?;
        }

        match reply_code(&reply) {
            SEND_IT => {}
            HAVE_IT => {
                return Err(LiveError::Permanent(SubmitError::Delivery {
                    message: reply,
                    permanent: true,
                }));
            }
            _ => return Err(LiveError::Transient(reply)),
        }

        let mut payload = dot_stuff(wire);
        if !payload.ends_with('\n') {
            payload.push_str("\r\n");
        }
        payload.push_str(".\r\n");
        link.send(&payload).await.map_err(transient)?;

        let final_reply = link.read_line().await.map_err(transient)?;
        let _ = link.send("QUIT\r\n").await;

        match reply_code(&final_reply) {
            TOOK_IT => Ok(()),
            REJECTED | RESEND_LATER => Err(LiveError::Permanent(SubmitError::Delivery {
                message: final_reply,
                permanent: false,
            })),
            _ => Err(LiveError::Transient(final_reply)),
        }
    }
}
