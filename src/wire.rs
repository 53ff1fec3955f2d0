//! Output rendering and wire folding
//!
//! Every output path (live submission, moderator mail, spool, audit trail)
//! renders the same way: populated recognized headers in table order with
//! their original separator style, then unrecognized headers verbatim in
//! capture order, a blank line, and the body. The feed and spool forms
//! additionally fold bare line breaks to CRLF.

use crate::article::{ArticleHeaders, HEADER_COUNT, HEADER_TABLE};

/// Rewrite every bare `\n` not already preceded by `\r` into `\r\n`.
pub fn to_wire(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut prev = '\0';
    for c in text.chars() {
        if c == '\n' && prev != '\r' {
            out.push('\r');
        }
        out.push(c);
        prev = c;
    }
    out
}

/// Prefix a dot to every line that starts with one, so the article body
/// cannot terminate the data stream early.
pub fn dot_stuff(wire: &str) -> String {
    let mut out = String::with_capacity(wire.len() + 8);
    let mut at_line_start = true;
    for c in wire.chars() {
        if at_line_start && c == '.' {
            out.push('.');
        }
        out.push(c);
        at_line_start = c == '\n';
    }
    out
}

/// Render the header block, including the terminating blank line.
///
/// A captured value that began with whitespace keeps its original separator
/// (`Name:<value>`); anything else gets the canonical `Name: value` form.
pub fn render_headers(headers: &ArticleHeaders, crlf: bool) -> String {
    let mut out = String::new();
    for idx in 0..HEADER_COUNT {
        let Some(raw) = headers.slot(idx).raw() else {
            continue;
        };
        out.push_str(HEADER_TABLE[idx].name);
        out.push(':');
        if !raw.starts_with(' ') && !raw.starts_with('\t') {
            out.push(' ');
        }
        out.push_str(raw);
        out.push('\n');
    }
    for line in headers.other() {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    if crlf {
        to_wire(&out)
    } else {
        out
    }
}

/// Render the whole article the way the spool and audit paths store it.
pub fn render_article(headers: &ArticleHeaders, body: &str, crlf: bool) -> String {
    let mut out = render_headers(headers, crlf);
    if crlf {
        out.push_str(&to_wire(body));
    } else {
        out.push_str(body);
    }
    out
}
