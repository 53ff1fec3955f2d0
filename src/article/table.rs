//! Static header grammar table
//!
//! One [`HeaderSpec`] per recognized header, in the fixed order output paths
//! render them. The table is immutable for the process lifetime and safely
//! shared across concurrent submissions; all per-article state lives in
//! [`ArticleHeaders`](super::ArticleHeaders).

/// Acceptance class of a recognized header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// Must be populated once processing completes
    Required,
    /// Ordinary header
    Standard,
    /// Historic header; its presence is always an error
    Obsolete,
}

/// Static acceptance policy for one recognized header.
#[derive(Debug)]
pub struct HeaderSpec {
    /// Canonical header name, also the rendered spelling
    pub name: &'static str,
    /// Whether a client submission may supply this header itself
    pub settable: bool,
    /// Acceptance class
    pub kind: HeaderKind,
}

/// Number of recognized headers.
pub const HEADER_COUNT: usize = 36;

/// Index of a recognized header in [`HEADER_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Hdr {
    Path,
    From,
    Newsgroups,
    Subject,
    Control,
    Supersedes,
    FollowupTo,
    Date,
    Organization,
    Lines,
    Sender,
    Approved,
    Distribution,
    Expires,
    MessageId,
    References,
    ReplyTo,
    NntpPostingHost,
    MimeVersion,
    ContentType,
    ContentTransferEncoding,
    XTrace,
    XComplaintsTo,
    NntpPostingDate,
    Xref,
    InjectorInfo,
    Summary,
    Keywords,
    DateReceived,
    Received,
    Posted,
    PostingVersion,
    RelayVersion,
    Cc,
    Bcc,
    To,
}

impl Hdr {
    /// Position of this header in [`HEADER_TABLE`].
    pub const fn idx(self) -> usize {
        self as usize
    }

    /// The static spec for this header.
    pub fn spec(self) -> &'static HeaderSpec {
        &HEADER_TABLE[self.idx()]
    }
}

use HeaderKind::{Obsolete, Required, Standard};

const fn spec(name: &'static str, settable: bool, kind: HeaderKind) -> HeaderSpec {
    HeaderSpec {
        name,
        settable,
        kind,
    }
}

/// The header grammar table, in render order.
pub static HEADER_TABLE: [HeaderSpec; HEADER_COUNT] = [
    spec("Path", true, Standard),
    spec("From", true, Required),
    spec("Newsgroups", true, Required),
    spec("Subject", true, Required),
    spec("Control", true, Standard),
    spec("Supersedes", true, Standard),
    spec("Followup-To", true, Standard),
    spec("Date", true, Standard),
    spec("Organization", true, Standard),
    spec("Lines", true, Standard),
    spec("Sender", true, Standard),
    spec("Approved", true, Standard),
    spec("Distribution", true, Standard),
    spec("Expires", true, Standard),
    spec("Message-ID", true, Standard),
    spec("References", true, Standard),
    spec("Reply-To", true, Standard),
    spec("NNTP-Posting-Host", false, Standard),
    spec("Mime-Version", true, Standard),
    spec("Content-Type", true, Standard),
    spec("Content-Transfer-Encoding", true, Standard),
    spec("X-Trace", false, Standard),
    spec("X-Complaints-To", false, Standard),
    spec("NNTP-Posting-Date", false, Standard),
    spec("Xref", false, Standard),
    spec("Injector-Info", false, Standard),
    spec("Summary", true, Standard),
    spec("Keywords", true, Standard),
    spec("Date-Received", false, Obsolete),
    spec("Received", false, Obsolete),
    spec("Posted", false, Obsolete),
    spec("Posting-Version", false, Obsolete),
    spec("Relay-Version", false, Obsolete),
    spec("Cc", true, Standard),
    spec("Bcc", true, Standard),
    spec("To", true, Standard),
];

/// Case-insensitive lookup of a header name against the table.
pub fn lookup(name: &str) -> Option<usize> {
    HEADER_TABLE
        .iter()
        .position(|spec| spec.name.eq_ignore_ascii_case(name))
}
