//! Submission policy configuration
//!
//! [`AccessConfig`] carries the per-access-realm posting policy: which
//! headers get defaulted, how the Path is rewritten, where articles may go,
//! and which delivery shortcuts apply. [`ClientInfo`] identifies the
//! submitting connection for one article.

/// Path tail appended when the submitter did not supply a Path header.
/// The downstream server prepends its own host name on acceptance.
pub const PATHMASTER: &str = "not-for-mail";

/// Fallback complaint mailbox when no complaints address is configured.
pub const NEWSMASTER: &str = "usenet";

/// Feed-mode vs. interactive-post-mode semantics for one submission.
///
/// Feed mode (server-to-server transfer) trusts headers the client set,
/// requires Date/Message-ID/Path to already be present, and skips the
/// interactive defaulting of Organization, Lines, and the posting-trace
/// headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// Interactive reader posting
    Post,
    /// Server-to-server feed transfer
    Feed,
}

impl SubmitMode {
    /// True for server-to-server feed semantics.
    pub fn is_feed(self) -> bool {
        matches!(self, SubmitMode::Feed)
    }
}

/// Posting policy for the access realm a client connected under.
#[must_use]
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Canonical host name used in the visible Path
    pub path_host: String,

    /// Domain used for the X-Trace host field; falls back to `path_host`
    pub domain: Option<String>,

    /// Host used to qualify the complaint-address fallback mailbox
    pub from_host: Option<String>,

    /// Virtual-hosting path segment, prefixed onto the Path whenever the
    /// resulting visible hostname differs from `path_host`
    pub virtual_path: Option<String>,

    /// Default Organization header for interactive posts
    pub organization: Option<String>,

    /// X-Complaints-To address; `newsmaster@from_host` when absent
    pub complaints: Option<String>,

    /// Substitute an authenticated Sender (and strip unauthenticated ones)
    pub add_sender: bool,

    /// Stamp a local-time Date instead of UTC when defaulting
    pub localtime: bool,

    /// Trim a client-supplied Path to its last hop
    pub strip_path: bool,

    /// Add NNTP-Posting-Host for interactive posts
    pub add_posting_host: bool,

    /// Add NNTP-Posting-Date for interactive posts
    pub add_posting_date: bool,

    /// Strip Cc/Bcc/To from interactive posts
    pub strip_post_cc: bool,

    /// Apply the included-text ratio heuristic
    pub check_included_text: bool,

    /// Whether this realm may carry an Approved header
    pub allow_approved: bool,

    /// Whether local-only group classes are postable from here
    pub local_posting: bool,

    /// Reject bodies larger than this many bytes; 0 disables the cap
    pub max_article_size: usize,

    /// Write straight to the incoming spool instead of live submission
    pub spool_first: bool,

    /// Session is offline-only; all posts go to the spool
    pub offline_post: bool,

    /// Wildcard patterns of groups this realm may post to; `None` means
    /// unrestricted
    pub post_allow_list: Option<Vec<String>>,

    /// Fold `to.*` group names down to the literal group `to`
    pub merge_to_groups: bool,

    /// Separator characters for the Newsgroups header
    pub group_separators: String,
}

impl AccessConfig {
    /// Create a policy for the given canonical path host, everything else
    /// at its defaults.
    pub fn new(path_host: impl Into<String>) -> Self {
        Self {
            path_host: path_host.into(),
            domain: None,
            from_host: None,
            virtual_path: None,
            organization: None,
            complaints: None,
            add_sender: false,
            localtime: false,
            strip_path: false,
            add_posting_host: true,
            add_posting_date: true,
            strip_post_cc: true,
            check_included_text: false,
            allow_approved: false,
            local_posting: false,
            max_article_size: 0,
            spool_first: false,
            offline_post: false,
            post_allow_list: None,
            merge_to_groups: false,
            group_separators: ",".to_string(),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self::new("localhost")
    }
}

/// Identity of the submitting connection for one article.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Resolved client host name
    pub host: String,
    /// Client IP address as presented
    pub ip: String,
    /// Authenticated user name, if any
    pub user: Option<String>,
    /// Whether the connection authenticated successfully
    pub authenticated: bool,
}

impl ClientInfo {
    /// An unauthenticated client.
    pub fn new(host: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ip: ip.into(),
            user: None,
            authenticated: false,
        }
    }

    /// An authenticated client with the given user name.
    pub fn authenticated(
        host: impl Into<String>,
        ip: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            ip: ip.into(),
            user: Some(user.into()),
            authenticated: true,
        }
    }
}
