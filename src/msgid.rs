//! Message-identifier and domain grammar
//!
//! Character-level validation of `<local@domain>` identifiers. The grammar
//! gates what gets echoed into trace headers and spool file names, so it is
//! deliberately strict: RFC 2822 `atext`-style character classes, non-empty
//! dot segments, and a hard length cap.
//!
//! Two legacy toggles survive from deployed software:
//!
//! - *strip*: surrounding whitespace is removed before validation;
//! - *lax*: a doubled dot in the local part is tolerated, and a second `@`
//!   is tolerated when the identifier carries the literal `yEnc` marker
//!   (multipart binary posting agents generate both).

use uuid::Uuid;

/// Maximum accepted length of a message identifier, in octets.
pub const MAX_MESSAGE_ID_LEN: usize = 250;

/// Characters permitted in unquoted local parts and domain labels:
/// printable ASCII minus whitespace, angle brackets, `@`, `,`, `;`, `"`,
/// parentheses, backslash, and square brackets.
fn atext(b: u8) -> bool {
    (33..=126).contains(&b)
        && !matches!(
            b,
            b'<' | b'>' | b'@' | b',' | b';' | b'"' | b'(' | b')' | b'\\' | b'[' | b']'
        )
}

/// Dot-segment rule: no leading or trailing dot, and no empty segment.
/// Lax mode tolerates a single doubled dot but never a tripled one.
fn dots_ok(s: &str, lax: bool) -> bool {
    if s.starts_with('.') || s.ends_with('.') {
        return false;
    }
    if lax {
        !s.contains("...")
    } else {
        !s.contains("..")
    }
}

/// Validate the left-hand side of an address: non-empty `atext` runs in
/// non-empty dot segments. `lax` tolerates one doubled dot.
pub fn is_valid_local(local: &str, lax: bool) -> bool {
    !local.is_empty() && local.bytes().all(atext) && dots_ok(local, lax)
}

/// Validate the right-hand side of a message identifier.
///
/// Accepts either a dotted sequence of `atext` labels or a bracketed
/// literal `[...]` whose interior is unconstrained except for control
/// characters, whitespace, and nested brackets.
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() {
        return false;
    }
    let bytes = domain.as_bytes();
    if bytes[0] == b'[' {
        if bytes.len() < 2 || bytes[bytes.len() - 1] != b']' {
            return false;
        }
        let inner = &bytes[1..bytes.len() - 1];
        return inner
            .iter()
            .all(|&b| (33..=126).contains(&b) && b != b'[' && b != b']');
    }
    dots_ok(domain, false) && bytes.iter().all(|&b| atext(b))
}

/// Validate a message identifier as `<local@domain>`.
///
/// `strip` removes surrounding whitespace first; `lax` enables the legacy
/// relaxations described in the module docs. The domain dot rule is never
/// relaxed.
pub fn is_valid_message_id(id: &str, strip: bool, lax: bool) -> bool {
    let id = if strip {
        id.trim_matches(|c: char| c.is_ascii_whitespace())
    } else {
        id
    };

    if id.len() > MAX_MESSAGE_ID_LEN {
        return false;
    }
    if id.len() < 2 || !id.starts_with('<') || !id.ends_with('>') {
        return false;
    }

    let interior = &id[1..id.len() - 1];
    let Some(at) = interior.find('@') else {
        return false;
    };

    let (local, domain) = (&interior[..at], &interior[at + 1..]);
    if !is_valid_local(local, lax) || domain.is_empty() {
        return false;
    }

    // Bracketed literals keep their own character rules, including @ and
    // angle brackets inside the brackets.
    if domain.starts_with('[') {
        return is_valid_domain(domain);
    }

    match domain.find('@') {
        None => is_valid_domain(domain),
        // Legacy multipart encoders stuff a second @ after a yEnc marker;
        // tolerated in lax mode only, and only once.
        Some(at2) => {
            let (marker, rest) = (&domain[..at2], &domain[at2 + 1..]);
            lax && marker.contains("yEnc")
                && !rest.contains('@')
                && marker.bytes().all(atext)
                && dots_ok(marker, false)
                && is_valid_domain(rest)
        }
    }
}

/// Synthesize a fresh, grammar-valid message identifier under `domain`.
pub fn generate_message_id(domain: &str) -> String {
    format!("<{}@{}>", Uuid::new_v4().simple(), domain)
}
