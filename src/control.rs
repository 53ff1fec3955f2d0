//! Control-message validation

use crate::diag;
use crate::error::{Result, SubmitError};

/// Verbs accepted in a Control header. Matching is case-sensitive.
const CONTROL_VERBS: [&str; 9] = [
    "cancel",
    "sendsys",
    "senduuname",
    "version",
    "checkgroups",
    "ihave",
    "sendme",
    "newgroup",
    "rmgroup",
];

/// Validate the text of a Control header.
///
/// Only the first whitespace-delimited token selects the verb; trailing
/// arguments never affect recognition. `cancel` additionally requires a
/// target message identifier as its second token.
pub fn check_control(ctrl: &str) -> Result<()> {
    let mut tokens = ctrl.split_ascii_whitespace();
    let Some(verb) = tokens.next() else {
        return Err(SubmitError::Grammar("Empty control message".to_string()));
    };

    if verb == "cancel" {
        if tokens.next().is_none() {
            return Err(SubmitError::Grammar(
                "Message-ID missing in cancel".to_string(),
            ));
        }
        return Ok(());
    }

    if CONTROL_VERBS.contains(&verb) {
        Ok(())
    } else {
        Err(SubmitError::Grammar(format!(
            "\"{}\" is not a valid control message",
            diag::bound(verb, 0, diag::DISPLAY_WIDTH)
        )))
    }
}

/// Whether a Control header names a `newgroup` request, which is allowed
/// to target no existing newsgroup.
pub fn is_newgroup(ctrl: &str) -> bool {
    ctrl.split_ascii_whitespace().next() == Some("newgroup")
}
