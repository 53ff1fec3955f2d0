//! Distribution validation
//!
//! Each token of a Distribution header is matched against a deny-list of
//! shell-style wildcard patterns. A single match rejects the whole header.

use crate::diag;
use crate::error::{Result, SubmitError};

/// Distributions never accepted from submitters.
const BAD_DISTRIBS: [&str; 2] = ["*cities*", "local"];

/// Token separators within a Distribution header.
const SEPARATORS: [char; 3] = [' ', '\t', ','];

/// Shell-style wildcard match: `*` any run, `?` any one character,
/// `[...]` a character set with optional leading `^` negation and `a-b`
/// ranges, `\` escaping the next pattern character.
pub fn wildmat(text: &str, pattern: &str) -> bool {
    do_match(text.as_bytes(), pattern.as_bytes())
}

fn do_match(text: &[u8], pat: &[u8]) -> bool {
    let mut ti = 0;
    let mut pi = 0;

    while pi < pat.len() {
        match pat[pi] {
            b'*' => {
                while pi < pat.len() && pat[pi] == b'*' {
                    pi += 1;
                }
                if pi == pat.len() {
                    return true;
                }
                return (ti..=text.len()).any(|start| do_match(&text[start..], &pat[pi..]));
            }
            b'?' => {
                if ti == text.len() {
                    return false;
                }
                ti += 1;
                pi += 1;
            }
            b'[' => {
                if ti == text.len() {
                    return false;
                }
                let Some((matched, next)) = match_set(text[ti], pat, pi + 1) else {
                    return false;
                };
                if !matched {
                    return false;
                }
                ti += 1;
                pi = next;
            }
            b'\\' => {
                pi += 1;
                if pi == pat.len() || ti == text.len() || text[ti] != pat[pi] {
                    return false;
                }
                ti += 1;
                pi += 1;
            }
            c => {
                if ti == text.len() || text[ti] != c {
                    return false;
                }
                ti += 1;
                pi += 1;
            }
        }
    }
    ti == text.len()
}

/// Match one byte against the set starting just past `[`. Returns the match
/// result and the index past the closing `]`, or `None` on an unterminated
/// set.
fn match_set(b: u8, pat: &[u8], mut pi: usize) -> Option<(bool, usize)> {
    let negate = pi < pat.len() && pat[pi] == b'^';
    if negate {
        pi += 1;
    }

    let mut matched = false;
    let mut first = true;
    while pi < pat.len() {
        if pat[pi] == b']' && !first {
            return Some((matched != negate, pi + 1));
        }
        first = false;
        let lo = pat[pi];
        if pi + 2 < pat.len() && pat[pi + 1] == b'-' && pat[pi + 2] != b']' {
            if (lo..=pat[pi + 2]).contains(&b) {
                matched = true;
            }
            pi += 3;
        } else {
            if b == lo {
                matched = true;
            }
            pi += 1;
        }
    }
    None
}

/// Check every token of a Distribution header against the deny-list.
pub fn check_distribution(value: &str) -> Result<()> {
    let mut tokens = value
        .split(SEPARATORS)
        .filter(|t| !t.is_empty())
        .peekable();
    if tokens.peek().is_none() {
        return Err(SubmitError::Policy(
            "Can't parse Distribution line.".to_string(),
        ));
    }
    for token in tokens {
        for pattern in BAD_DISTRIBS {
            if wildmat(token, pattern) {
                return Err(SubmitError::Policy(format!(
                    "Illegal distribution \"{}\"",
                    diag::bound(token, 0, diag::DISPLAY_WIDTH)
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildmat_literals_and_stars() {
        assert!(wildmat("world", "world"));
        assert!(!wildmat("world", "word"));
        assert!(wildmat("na-cities-east", "*cities*"));
        assert!(wildmat("cities", "*cities*"));
        assert!(!wildmat("city", "*cities*"));
    }

    #[test]
    fn test_wildmat_question_and_sets() {
        assert!(wildmat("abc", "a?c"));
        assert!(!wildmat("ac", "a?c"));
        assert!(wildmat("ab3", "ab[0-9]"));
        assert!(!wildmat("abx", "ab[0-9]"));
        assert!(wildmat("abx", "ab[^0-9]"));
        assert!(wildmat("a*c", "a\\*c"));
        assert!(!wildmat("abc", "a\\*c"));
    }

    #[test]
    fn test_clean_distribution_passes() {
        assert!(check_distribution("world").is_ok());
        assert!(check_distribution("world, usa\tfr").is_ok());
    }

    #[test]
    fn test_denied_token_named() {
        let err = check_distribution("world,local").unwrap_err();
        assert_eq!(err.to_string(), "Illegal distribution \"local\"");
        let err = check_distribution("na-cities-east").unwrap_err();
        assert_eq!(err.to_string(), "Illegal distribution \"na-cities-east\"");
    }

    #[test]
    fn test_unparseable_distribution() {
        let err = check_distribution(" ,\t").unwrap_err();
        assert_eq!(err.to_string(), "Can't parse Distribution line.");
    }
}
