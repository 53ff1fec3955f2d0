//! Bounded diagnostic strings
//!
//! Error lines quote offending header values, which can be arbitrarily long
//! and can contain line breaks. [`bound`] shortens a value to a fixed display
//! width without losing the interesting fragment, and [`join`] splices
//! multi-line values onto one line.

/// Default display budget for a quoted value inside an error line.
pub const DISPLAY_WIDTH: usize = 80;

/// Turn any `\r` or `\n` in the text into spaces, splicing folded
/// multi-line headers back into a single line.
pub fn join(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Shorten `text` to fit a diagnostic display budget of `width` columns.
///
/// `focus` is the character offset of the interesting part of the value
/// (pass 0 when the whole value matters). Three truncation modes keep the
/// fragment visible:
///
/// - the start of the value plus a trailing ellipsis when the focus sits
///   near the front,
/// - the start plus an ellipsis plus the last ten characters when the focus
///   is at the very end,
/// - a double ellipsis bracketing ten characters around the focus otherwise.
///
/// Budgets below 20 columns cannot hold both ellipses and a fragment and
/// are raised to 20.
pub fn bound(text: &str, focus: usize, width: usize) -> String {
    let width = width.max(20);
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();

    if n < width - 1 {
        return join(text);
    }

    let focus = if focus > n { 0 } else { focus };

    let mut out = String::with_capacity(width);
    if focus < width - 4 {
        out.extend(&chars[..width - 4]);
        out.push_str("...");
    } else if n - focus < 10 {
        out.extend(&chars[..width - 14]);
        out.push_str("...");
        out.extend(&chars[n - 10..]);
    } else {
        out.extend(&chars[..width - 17]);
        out.push_str("...");
        let start = focus - 5;
        let take = (width - 4) - (width - 17) - 3;
        let end = (start + take).min(n);
        out.extend(&chars[start..end]);
        out.push_str("...");
    }
    join(&out)
}
