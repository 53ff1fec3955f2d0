//! Body line counting and the included-text heuristic

use crate::error::{Result, SubmitError};

/// Bodies shorter than this many lines skip the included-text check.
const INCLUDED_TEXT_MIN_LINES: usize = 20;

/// Number of lines in the body, counted as newline terminators.
pub fn count_lines(body: &str) -> usize {
    body.bytes().filter(|&b| b == b'\n').count()
}

/// Quoting-abuse heuristic over the body.
///
/// The first character of each line adjusts a quote counter: `>`, `|`, and
/// `:` increment it, `<` decrements it so diff-style output is not
/// penalized. The article is rejected when more than half its lines look
/// quoted; exactly half is accepted. Bodies under twenty lines always pass.
pub fn check_included_text(body: &str, lines: usize) -> Result<()> {
    if lines < INCLUDED_TEXT_MIN_LINES {
        return Ok(());
    }
    let mut included: i64 = 0;
    for line in body.split('\n') {
        match line.as_bytes().first() {
            Some(b'>') | Some(b'|') | Some(b':') => included += 1,
            Some(b'<') => included -= 1,
            _ => {}
        }
    }
    if included * 2 > lines as i64 {
        return Err(SubmitError::Policy(
            "Article not posted -- more included text than new text".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(quoted: usize, plain: usize) -> String {
        let mut out = String::new();
        for _ in 0..quoted {
            out.push_str("> quoted line\n");
        }
        for _ in 0..plain {
            out.push_str("a new line\n");
        }
        out
    }

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("one\ntwo\n"), 2);
        assert_eq!(count_lines("one\ntwo"), 1);
    }

    #[test]
    fn test_short_body_exempt() {
        let text = body(19, 0);
        assert_eq!(count_lines(&text), 19);
        assert!(check_included_text(&text, 19).is_ok());
    }

    #[test]
    fn test_mostly_quoted_rejected() {
        let text = body(11, 9);
        let err = check_included_text(&text, 20).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Article not posted -- more included text than new text"
        );
    }

    #[test]
    fn test_exactly_half_accepted() {
        let text = body(10, 10);
        assert!(check_included_text(&text, 20).is_ok());
    }

    #[test]
    fn test_pipe_and_colon_count_as_quotes() {
        let mut text = String::new();
        for _ in 0..6 {
            text.push_str("| piped\n");
        }
        for _ in 0..5 {
            text.push_str(": cited\n");
        }
        for _ in 0..9 {
            text.push_str("fresh\n");
        }
        assert!(check_included_text(&text, 20).is_err());
    }

    #[test]
    fn test_diff_lines_offset_quotes() {
        let mut text = String::new();
        for _ in 0..11 {
            text.push_str("> old\n");
        }
        for _ in 0..5 {
            text.push_str("< removed\n");
        }
        for _ in 0..4 {
            text.push_str("ctx\n");
        }
        // 11 - 5 = 6 quoted out of 20
        assert!(check_included_text(&text, 20).is_ok());
    }
}
