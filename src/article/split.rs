//! Header block splitter
//!
//! Slices a raw article into its header section and body. Recognized headers
//! are captured into per-article [`HeaderSlot`]s, everything else is kept
//! verbatim and in order so output paths can replay it unchanged.

use crate::article::table::{self, HeaderKind, Hdr, HEADER_COUNT, HEADER_TABLE};
use crate::error::{Result, SubmitError};

/// Captured value of one recognized header.
///
/// `raw` holds the text exactly as submitted after the colon, leading
/// whitespace and embedded continuation line breaks included, so the
/// original separator style survives into rendered output. Carriage
/// returns are stripped at capture; line breaks are bare `\n` internally.
#[derive(Debug, Default, Clone)]
pub struct HeaderSlot {
    raw: Option<String>,
}

impl HeaderSlot {
    /// Whether this header occurred in the article or was synthesized.
    pub fn is_set(&self) -> bool {
        self.raw.is_some()
    }

    /// The captured text, untrimmed.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// The captured text trimmed of surrounding whitespace, or `None`
    /// when the header is absent or all-whitespace.
    pub fn value(&self) -> Option<&str> {
        match self.raw.as_deref() {
            Some(raw) => {
                let trimmed = raw.trim_matches(|c: char| c.is_ascii_whitespace());
                (!trimmed.is_empty()).then_some(trimmed)
            }
            None => None,
        }
    }
}

/// Per-article header state: one slot per recognized header plus the
/// ordered list of unrecognized header lines.
#[derive(Debug, Clone)]
pub struct ArticleHeaders {
    slots: [HeaderSlot; HEADER_COUNT],
    other: Vec<String>,
}

impl Default for ArticleHeaders {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| HeaderSlot::default()),
            other: Vec::new(),
        }
    }
}

impl ArticleHeaders {
    /// Trimmed value of a recognized header, if populated.
    pub fn get(&self, h: Hdr) -> Option<&str> {
        self.slots[h.idx()].value()
    }

    /// Untrimmed captured text of a recognized header.
    pub fn raw(&self, h: Hdr) -> Option<&str> {
        self.slots[h.idx()].raw()
    }

    /// Whether a recognized header is populated.
    pub fn is_set(&self, h: Hdr) -> bool {
        self.slots[h.idx()].is_set()
    }

    /// Replace a recognized header with synthesized text.
    pub fn set(&mut self, h: Hdr, value: impl Into<String>) {
        self.slots[h.idx()].raw = Some(value.into());
    }

    /// Remove a recognized header.
    pub fn clear(&mut self, h: Hdr) {
        self.slots[h.idx()].raw = None;
    }

    /// Slot access by table index, populated slots only.
    pub fn slot(&self, idx: usize) -> &HeaderSlot {
        &self.slots[idx]
    }

    /// The unrecognized header lines, in capture order.
    pub fn other(&self) -> &[String] {
        &self.other
    }

    /// Drop populated slots whose value trims to nothing, so later stages
    /// treat all-whitespace headers as absent.
    pub fn drop_blank_values(&mut self) {
        for slot in &mut self.slots {
            if slot.is_set() && slot.value().is_none() {
                slot.raw = None;
            }
        }
    }
}

/// What the previous captured line was, for continuation folding.
#[derive(Clone, Copy)]
enum Last {
    None,
    Slot(usize),
    Other,
}

/// Split a raw article into captured headers and the body text.
///
/// Lines are LF-delimited with an optional trailing carriage return. A line
/// starting with whitespace continues the previous header. A line matching
/// `Name:` case-insensitively against the header table is captured into its
/// slot; a second occurrence is a duplicate error and an obsolete header is
/// always an error. Every other line lands in the unrecognized list. An
/// empty line ends the header block; its absence is an error.
pub fn split_off_headers(raw: &str) -> Result<(ArticleHeaders, &str)> {
    let mut headers = ArticleHeaders::default();
    let mut last = Last::None;
    let mut rest = raw;

    while !rest.is_empty() {
        let (line_full, next, had_newline) = match rest.find('\n') {
            Some(i) => (&rest[..i], &rest[i + 1..], true),
            None => (rest, "", false),
        };
        let line = line_full.strip_suffix('\r').unwrap_or(line_full);

        if line.is_empty() {
            return Ok((headers, next));
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            match last {
                Last::Slot(idx) => {
                    let raw = headers.slots[idx].raw.as_mut().unwrap();
                    raw.push('\n');
                    raw.push_str(line);
                }
                Last::Other => {
                    let prev = headers.other.last_mut().unwrap();
                    prev.push('\n');
                    prev.push_str(line);
                }
                // A continuation with nothing to continue; keep it verbatim.
                Last::None => {
                    headers.other.push(line.to_string());
                    last = Last::Other;
                }
            }
        } else {
            let matched = line
                .find(':')
                .and_then(|colon| table::lookup(&line[..colon]).map(|idx| (idx, colon)));
            match matched {
                Some((idx, colon)) => {
                    let spec = &HEADER_TABLE[idx];
                    if spec.kind == HeaderKind::Obsolete {
                        return Err(SubmitError::Header(format!(
                            "Obsolete \"{}\" header",
                            spec.name
                        )));
                    }
                    if headers.slots[idx].is_set() {
                        return Err(SubmitError::Header(format!(
                            "Duplicate \"{}\" header",
                            spec.name
                        )));
                    }
                    headers.slots[idx].raw = Some(line[colon + 1..].to_string());
                    last = Last::Slot(idx);
                }
                None => {
                    headers.other.push(line.to_string());
                    last = Last::Other;
                }
            }
        }

        rest = if had_newline { next } else { "" };
    }

    Err(SubmitError::Header(
        "Article has no body -- just headers".to_string(),
    ))
}
