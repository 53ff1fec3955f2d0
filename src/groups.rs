//! Newsgroup classification and routing
//!
//! Resolves each token of a Newsgroups header against the active group
//! catalog, enforces posting permission, selects the moderation target, and
//! derives a default Distribution from the matched groups.

use std::collections::HashMap;

use crate::article::{ArticleHeaders, Hdr};
use crate::config::{AccessConfig, ClientInfo};
use crate::control::is_newgroup;
use crate::diag;
use crate::distrib::wildmat;
use crate::error::{Result, SubmitError};

/// Moderation/access class of one newsgroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupClass {
    /// Open for posting
    Ok,
    /// Posts go to the moderator unless approved
    Moderated,
    /// Articles are filed but local postings are refused
    Ignore,
    /// Not for local postings
    NoLocal,
    /// Group exists but is excluded from this server
    Excluded,
    /// Renamed; postings must use the new name
    Alias,
}

/// Outcome of the pluggable post-validation filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookVerdict {
    /// Deliver normally
    Accept,
    /// Silently discard, with an operator-facing reason
    Drop(String),
    /// Divert to a quarantine spool subdirectory
    Spool(String),
    /// Reject back to the submitter
    Reject(String),
}

/// Dynamic posting policy, consulted after header and newsgroup validation.
///
/// Absent by default; when installed it replaces the static allowed-post
/// list and may veto or divert individual submissions.
pub trait PostingHook: Send + Sync {
    /// Per-group authorization for open groups; a `Some` return vetoes the
    /// post with the given reason.
    fn authorize(&self, group: &str, client: &ClientInfo) -> Option<String>;

    /// Whole-article filter, run once after validation and before delivery.
    fn filter(&self, headers: &ArticleHeaders, body: &str) -> HookVerdict;
}

/// The active newsgroup catalog.
pub trait GroupCatalog: Send + Sync {
    /// Moderation/access class of a group, or `None` when unknown.
    fn classify(&self, group: &str) -> Option<GroupClass>;

    /// Default distribution tag of the hierarchy a group belongs to.
    fn distribution_default(&self, group: &str) -> Option<String>;

    /// Moderator submission address for a moderated group.
    fn moderator_address(&self, group: &str) -> Option<String>;
}

struct GroupEntry {
    class: GroupClass,
    distribution: Option<String>,
    moderator: Option<String>,
}

/// In-memory [`GroupCatalog`] for small deployments and tests.
#[derive(Default)]
pub struct StaticCatalog {
    groups: HashMap<String, GroupEntry>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group with the given class.
    pub fn insert(&mut self, group: impl Into<String>, class: GroupClass) {
        self.groups.insert(
            group.into(),
            GroupEntry {
                class,
                distribution: None,
                moderator: None,
            },
        );
    }

    /// Attach a hierarchy distribution tag to a registered group.
    pub fn set_distribution(&mut self, group: &str, distribution: impl Into<String>) {
        if let Some(entry) = self.groups.get_mut(group) {
            entry.distribution = Some(distribution.into());
        }
    }

    /// Attach a moderator address to a registered group.
    pub fn set_moderator(&mut self, group: &str, address: impl Into<String>) {
        if let Some(entry) = self.groups.get_mut(group) {
            entry.moderator = Some(address.into());
        }
    }
}

impl GroupCatalog for StaticCatalog {
    fn classify(&self, group: &str) -> Option<GroupClass> {
        self.groups.get(group).map(|e| e.class)
    }

    fn distribution_default(&self, group: &str) -> Option<String> {
        self.groups.get(group).and_then(|e| e.distribution.clone())
    }

    fn moderator_address(&self, group: &str) -> Option<String> {
        self.groups.get(group).and_then(|e| e.moderator.clone())
    }
}

/// Validate the Newsgroups header and pick the moderation target.
///
/// Per token: optional `to.` hierarchy folding, the allowed-post list when
/// no dynamic hook is installed, then catalog classification. Unknown
/// groups are skipped silently; at least one token must resolve unless the
/// article is a `newgroup` control message. Per-token failures queue and
/// the first detected one wins. On success, a Distribution default derived
/// from the matched groups is installed when the header was absent.
///
/// Returns the moderation target group, if any.
pub fn check_newsgroups<C: GroupCatalog + ?Sized>(
    headers: &mut ArticleHeaders,
    config: &AccessConfig,
    client: &ClientInfo,
    catalog: &C,
    hook: Option<&dyn PostingHook>,
) -> Result<Option<String>> {
    let value = headers
        .get(Hdr::Newsgroups)
        .unwrap_or_default()
        .to_string();
    let newgroup = headers.get(Hdr::Control).is_some_and(is_newgroup);
    let approved = headers.get(Hdr::Approved).is_some();

    let (target, distributions) =
        validate_group_list(&value, approved, newgroup, true, config, client, catalog, hook)?;

    if headers.get(Hdr::Distribution).is_none() && !distributions.is_empty() {
        headers.set(Hdr::Distribution, distributions.join(","));
    }

    Ok(target)
}

/// Validate a Followup-To header with the same per-token rules as the
/// Newsgroups header, without moderation-target capture or Distribution
/// defaulting. The literal value `poster` is always accepted.
pub fn check_followup_to<C: GroupCatalog + ?Sized>(
    headers: &ArticleHeaders,
    config: &AccessConfig,
    client: &ClientInfo,
    catalog: &C,
    hook: Option<&dyn PostingHook>,
) -> Result<()> {
    let Some(value) = headers.get(Hdr::FollowupTo) else {
        return Ok(());
    };
    if value == "poster" {
        return Ok(());
    }
    let value = value.to_string();
    let newgroup = headers.get(Hdr::Control).is_some_and(is_newgroup);
    let approved = headers.get(Hdr::Approved).is_some();
    validate_group_list(&value, approved, newgroup, false, config, client, catalog, hook)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn validate_group_list<C: GroupCatalog + ?Sized>(
    value: &str,
    approved: bool,
    newgroup: bool,
    capture_target: bool,
    config: &AccessConfig,
    client: &ClientInfo,
    catalog: &C,
    hook: Option<&dyn PostingHook>,
) -> Result<(Option<String>, Vec<String>)> {
    let mut tokens = value
        .split(|c| config.group_separators.contains(c))
        .filter(|t| !t.is_empty())
        .peekable();
    if tokens.peek().is_none() {
        return Err(SubmitError::Policy(
            "Can't parse newsgroups line".to_string(),
        ));
    }

    // First detected terminal error wins; later ones never overwrite it.
    let mut queued: Option<String> = None;
    fn queue(slot: &mut Option<String>, msg: String) {
        if slot.is_none() {
            *slot = Some(msg);
        }
    }

    let mut target: Option<String> = None;
    let mut found_one = false;
    let mut distributions: Vec<String> = Vec::new();

    for token in tokens {
        let group = if config.merge_to_groups && token.starts_with("to.") {
            "to"
        } else {
            token
        };

        if hook.is_none() {
            if let Some(patterns) = &config.post_allow_list {
                if !patterns.iter().any(|p| wildmat(group, p)) {
                    queue(
                        &mut queued,
                        format!("You are not allowed to post to {group}"),
                    );
                }
            }
        }

        let Some(class) = catalog.classify(group) else {
            continue;
        };
        found_one = true;

        if let Some(dist) = catalog.distribution_default(group) {
            if !distributions.contains(&dist) {
                distributions.push(dist);
            }
        }

        match class {
            GroupClass::Ok => {
                if let Some(hook) = hook {
                    if let Some(reason) = hook.authorize(group, client) {
                        queue(&mut queued, reason);
                    }
                }
            }
            GroupClass::Moderated => {
                if !approved && capture_target && target.is_none() {
                    target = Some(group.to_string());
                }
            }
            GroupClass::Ignore | GroupClass::NoLocal => {
                if !config.local_posting {
                    queue(
                        &mut queued,
                        format!("Postings to \"{group}\" are not allowed here."),
                    );
                }
            }
            GroupClass::Excluded => {}
            GroupClass::Alias => {
                queue(
                    &mut queued,
                    format!("The newsgroup \"{group}\" has been renamed."),
                );
            }
        }
    }

    if let Some(msg) = queued {
        return Err(SubmitError::Policy(msg));
    }
    if !found_one && !newgroup {
        return Err(SubmitError::Policy(format!(
            "No valid newsgroups in \"{}\"",
            diag::bound(value, 0, diag::DISPLAY_WIDTH)
        )));
    }
    // Approved without the privilege is an error whatever the classes of
    // the named groups, but only surfaces when nothing else already has.
    if approved && !config.allow_approved {
        return Err(SubmitError::Policy(
            "You are not allowed to approve postings".to_string(),
        ));
    }

    Ok((target, distributions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::split_off_headers;

    fn catalog() -> StaticCatalog {
        let mut cat = StaticCatalog::new();
        cat.insert("misc.test", GroupClass::Ok);
        cat.insert("misc.moderated", GroupClass::Moderated);
        cat.set_moderator("misc.moderated", "mod@example.com");
        cat.insert("misc.second-mod", GroupClass::Moderated);
        cat.insert("local.private", GroupClass::NoLocal);
        cat.insert("misc.gone", GroupClass::Alias);
        cat.insert("misc.excluded", GroupClass::Excluded);
        cat.insert("fr.test", GroupClass::Ok);
        cat.set_distribution("fr.test", "fr");
        cat
    }

    fn headers_for(newsgroups: &str, extra: &str) -> ArticleHeaders {
        let raw = format!(
            "From: a@b.c\nNewsgroups: {newsgroups}\nSubject: s\n{extra}\nbody\n"
        );
        split_off_headers(&raw).unwrap().0
    }

    fn client() -> ClientInfo {
        ClientInfo::new("client.example.com", "203.0.113.7")
    }

    #[test]
    fn test_open_group_accepted() {
        let mut headers = headers_for("misc.test", "");
        let config = AccessConfig::default();
        let target =
            check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap();
        assert!(target.is_none());
    }

    #[test]
    fn test_first_moderated_group_is_target() {
        let mut headers = headers_for("misc.test,misc.moderated,misc.second-mod", "");
        let config = AccessConfig::default();
        let target =
            check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap();
        assert_eq!(target.as_deref(), Some("misc.moderated"));
    }

    #[test]
    fn test_approved_suppresses_moderation() {
        let mut headers = headers_for("misc.moderated", "Approved: mod@example.com\n");
        let mut config = AccessConfig::default();
        config.allow_approved = true;
        let target =
            check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap();
        assert!(target.is_none());
    }

    #[test]
    fn test_unauthorized_approval_rejected() {
        let mut headers = headers_for("misc.moderated", "Approved: mod@example.com\n");
        let config = AccessConfig::default();
        let err =
            check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap_err();
        assert_eq!(err.to_string(), "You are not allowed to approve postings");
    }

    #[test]
    fn test_unauthorized_approval_rejected_even_for_open_groups() {
        let mut headers = headers_for("misc.test", "Approved: someone@example.com\n");
        let config = AccessConfig::default();
        let err =
            check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap_err();
        assert_eq!(err.to_string(), "You are not allowed to approve postings");

        let mut headers = headers_for("misc.test", "Approved: someone@example.com\n");
        let mut config = AccessConfig::default();
        config.allow_approved = true;
        assert!(check_newsgroups(&mut headers, &config, &client(), &catalog(), None).is_ok());
    }

    #[test]
    fn test_per_token_error_masks_approval_error() {
        let mut headers = headers_for("misc.gone", "Approved: someone@example.com\n");
        let config = AccessConfig::default();
        let err =
            check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The newsgroup \"misc.gone\" has been renamed."
        );
    }

    #[test]
    fn test_renamed_group_rejected() {
        let mut headers = headers_for("misc.gone", "");
        let config = AccessConfig::default();
        let err =
            check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The newsgroup \"misc.gone\" has been renamed."
        );
    }

    #[test]
    fn test_nolocal_needs_local_posting() {
        let mut headers = headers_for("local.private", "");
        let config = AccessConfig::default();
        let err =
            check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Postings to \"local.private\" are not allowed here."
        );

        let mut headers = headers_for("local.private", "");
        let mut config = AccessConfig::default();
        config.local_posting = true;
        assert!(check_newsgroups(&mut headers, &config, &client(), &catalog(), None).is_ok());
    }

    #[test]
    fn test_excluded_group_is_silent() {
        let mut headers = headers_for("misc.excluded,misc.test", "");
        let config = AccessConfig::default();
        assert!(check_newsgroups(&mut headers, &config, &client(), &catalog(), None).is_ok());
    }

    #[test]
    fn test_unknown_groups_skipped_but_one_must_resolve() {
        let mut headers = headers_for("does.not.exist,misc.test", "");
        let config = AccessConfig::default();
        assert!(check_newsgroups(&mut headers, &config, &client(), &catalog(), None).is_ok());

        let mut headers = headers_for("does.not.exist", "");
        let err =
            check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No valid newsgroups in \"does.not.exist\""
        );
    }

    #[test]
    fn test_newgroup_control_tolerates_no_match() {
        let mut headers = headers_for("does.not.exist", "Control: newgroup does.not.exist\n");
        let config = AccessConfig::default();
        assert!(check_newsgroups(&mut headers, &config, &client(), &catalog(), None).is_ok());
    }

    #[test]
    fn test_distribution_default_synthesized() {
        let mut headers = headers_for("fr.test", "");
        let config = AccessConfig::default();
        check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap();
        assert_eq!(headers.get(Hdr::Distribution), Some("fr"));

        // An explicit Distribution is left alone.
        let mut headers = headers_for("fr.test", "Distribution: world\n");
        check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap();
        assert_eq!(headers.get(Hdr::Distribution), Some("world"));
    }

    #[test]
    fn test_allow_list_enforced_without_hook() {
        let mut headers = headers_for("misc.test", "");
        let mut config = AccessConfig::default();
        config.post_allow_list = Some(vec!["fr.*".to_string()]);
        let err =
            check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap_err();
        assert_eq!(err.to_string(), "You are not allowed to post to misc.test");

        let mut headers = headers_for("fr.test", "");
        assert!(check_newsgroups(&mut headers, &config, &client(), &catalog(), None).is_ok());
    }

    #[test]
    fn test_first_error_wins() {
        // The allow-list failure on the first token masks the rename error
        // on the second.
        let mut headers = headers_for("misc.test,misc.gone", "");
        let mut config = AccessConfig::default();
        config.post_allow_list = Some(vec!["fr.*".to_string()]);
        let err =
            check_newsgroups(&mut headers, &config, &client(), &catalog(), None).unwrap_err();
        assert_eq!(err.to_string(), "You are not allowed to post to misc.test");
    }

    #[test]
    fn test_to_hierarchy_folding() {
        let mut cat = catalog();
        cat.insert("to", GroupClass::Ok);
        let mut headers = headers_for("to.some-peer", "");
        let mut config = AccessConfig::default();
        config.merge_to_groups = true;
        assert!(check_newsgroups(&mut headers, &config, &client(), &cat, None).is_ok());
    }

    #[test]
    fn test_followup_to_poster_accepted() {
        let headers = headers_for("misc.test", "Followup-To: poster\n");
        let config = AccessConfig::default();
        assert!(check_followup_to(&headers, &config, &client(), &catalog(), None).is_ok());
    }

    #[test]
    fn test_followup_to_runs_full_group_validation() {
        let config = AccessConfig::default();

        let headers = headers_for("misc.test", "Followup-To: misc.moderated\n");
        assert!(check_followup_to(&headers, &config, &client(), &catalog(), None).is_ok());

        let headers = headers_for("misc.test", "Followup-To: misc.gone\n");
        let err =
            check_followup_to(&headers, &config, &client(), &catalog(), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The newsgroup \"misc.gone\" has been renamed."
        );

        let headers = headers_for("misc.test", "Followup-To: does.not.exist\n");
        let err =
            check_followup_to(&headers, &config, &client(), &catalog(), None).unwrap_err();
        assert_eq!(err.to_string(), "No valid newsgroups in \"does.not.exist\"");
    }

    #[test]
    fn test_followup_to_respects_allow_list() {
        let headers = headers_for("fr.test", "Followup-To: misc.test\n");
        let mut config = AccessConfig::default();
        config.post_allow_list = Some(vec!["fr.*".to_string()]);
        let err =
            check_followup_to(&headers, &config, &client(), &catalog(), None).unwrap_err();
        assert_eq!(err.to_string(), "You are not allowed to post to misc.test");
    }

    struct VetoHook;

    impl PostingHook for VetoHook {
        fn authorize(&self, group: &str, _client: &ClientInfo) -> Option<String> {
            (group == "misc.test").then(|| "posting vetoed by policy".to_string())
        }

        fn filter(&self, _headers: &ArticleHeaders, _body: &str) -> HookVerdict {
            HookVerdict::Accept
        }
    }

    #[test]
    fn test_hook_replaces_allow_list_and_may_veto() {
        let mut config = AccessConfig::default();
        config.post_allow_list = Some(vec!["nothing.*".to_string()]);

        // Hook present: the static allow list is ignored, the veto applies.
        let mut headers = headers_for("fr.test", "");
        assert!(
            check_newsgroups(&mut headers, &config, &client(), &catalog(), Some(&VetoHook))
                .is_ok()
        );

        let mut headers = headers_for("misc.test", "");
        let err =
            check_newsgroups(&mut headers, &config, &client(), &catalog(), Some(&VetoHook))
                .unwrap_err();
        assert_eq!(err.to_string(), "posting vetoed by policy");
    }
}
