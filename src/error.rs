//! Submission error types

use thiserror::Error;

/// Errors produced by the article submission pipeline.
///
/// Every error renders as a single bounded line suitable for an NNTP status
/// reply. The [`is_permanent`](SubmitError::is_permanent) flag tells the
/// embedding session whether the client may retry the same article: transient
/// delivery failures are absorbed by the local spool fallback and only
/// surface here when the fallback itself fails.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// Structural header problem: duplicate, obsolete, missing required
    /// header, unsettable header, or no blank-line body separator.
    #[error("{0}")]
    Header(String),

    /// Malformed control message, message identifier, or address.
    #[error("{0}")]
    Grammar(String),

    /// Policy rejection: distribution denied, newsgroup forbidden or
    /// renamed, included-text ratio, size limit, unauthorized approval.
    #[error("{0}")]
    Policy(String),

    /// Rejected by the downstream feed peer or the mail transport.
    ///
    /// `permanent` is false exactly for the explicit reject/resend final
    /// codes, where the caller must not retry the same content.
    #[error("{message}")]
    Delivery {
        /// Verbatim server or transport diagnostic
        message: String,
        /// Whether the rejection is final for this article
        permanent: bool,
    },

    /// A transient delivery failure whose local-spool fallback also failed.
    #[error("{0} and can't write text to local spool file")]
    Spool(String),
}

impl SubmitError {
    /// Whether the embedding session should treat this rejection as final.
    pub fn is_permanent(&self) -> bool {
        !matches!(
            self,
            SubmitError::Delivery {
                permanent: false,
                ..
            }
        )
    }
}

/// Result type alias using SubmitError
pub type Result<T> = std::result::Result<T, SubmitError>;
