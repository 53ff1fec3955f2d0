#![doc = include_str!("../README.md")]

/// Header grammar table, splitter, processor, and body heuristics
pub mod article;
/// Posting policy and client identity
pub mod config;
/// Control-message validation
pub mod control;
/// Bounded diagnostic strings
pub mod diag;
/// Distribution deny-list and wildcard matching
pub mod distrib;
mod error;
/// Downstream feed protocol
pub mod feed;
/// Newsgroup classification and routing
pub mod groups;
/// Moderator mail delivery
pub mod mail;
/// Message-identifier and domain grammar
pub mod msgid;
/// Local spool and audit trail
pub mod spool;
/// The submission pipeline
pub mod submit;
/// Output rendering and wire folding
pub mod wire;

pub use article::{split_off_headers, ArticleHeaders, Hdr, HeaderKind, HeaderSpec};
pub use config::{AccessConfig, ClientInfo, SubmitMode};
pub use error::{Result, SubmitError};
pub use feed::{FeedLink, FeedPeer, TcpFeedPeer};
pub use groups::{GroupCatalog, GroupClass, HookVerdict, PostingHook, StaticCatalog};
pub use mail::{CommandMailer, MailTransport};
pub use msgid::{generate_message_id, is_valid_domain, is_valid_message_id};
pub use spool::{Spool, Tracker};
pub use submit::{DeliveryOutcome, Submission, Submitter};
