//! Header processing
//!
//! Fills in or rejects headers in a fixed order once the splitter has
//! captured them. Interactive posts get policy defaults (Date, Path,
//! Message-ID, Organization, Lines, posting-trace headers); feed-mode
//! submissions must already carry Date, Message-ID, and Path and keep the
//! headers they set.

use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::article::split::ArticleHeaders;
use crate::article::table::{HeaderKind, Hdr, HEADER_TABLE};
use crate::config::{AccessConfig, ClientInfo, SubmitMode, NEWSMASTER, PATHMASTER};
use crate::control::check_control;
use crate::distrib::check_distribution;
use crate::error::{Result, SubmitError};
use crate::msgid;

/// How far into the future a supplied Date may point, in seconds.
const DATE_FUZZ_SECS: i64 = 300;

/// Parse a header date: RFC 2822, tolerating a trailing `GMT` zone name or
/// a parenthesized zone comment.
fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = match value.rfind('(') {
        Some(i) if value.ends_with(')') => value[..i].trim_end(),
        _ => value.trim_end(),
    };
    DateTime::parse_from_rfc2822(value).ok().or_else(|| {
        let value = value.strip_suffix(" GMT")?;
        DateTime::parse_from_rfc2822(&format!("{value} +0000")).ok()
    })
}

/// Syntax check for the From header: an addr-spec, optionally wrapped in
/// `Name <addr>` angle brackets or followed by a parenthesized display name.
pub fn check_from(value: &str) -> Result<()> {
    let addr = match (value.rfind('<'), value.rfind('>')) {
        (Some(lt), Some(gt)) if lt < gt => &value[lt + 1..gt],
        _ => value
            .split_once('(')
            .map_or(value, |(a, _)| a)
            .trim_matches(|c: char| c.is_ascii_whitespace()),
    };
    let valid = addr
        .split_once('@')
        .is_some_and(|(local, domain)| {
            msgid::is_valid_local(local, false) && msgid::is_valid_domain(domain)
        });
    if valid {
        Ok(())
    } else {
        Err(SubmitError::Grammar(
            "From: address not in Internet syntax".to_string(),
        ))
    }
}

fn trace_host(config: &AccessConfig) -> &str {
    config.domain.as_deref().unwrap_or(&config.path_host)
}

fn from_host(config: &AccessConfig) -> &str {
    config.from_host.as_deref().unwrap_or(&config.path_host)
}

fn rewrite_path(headers: &mut ArticleHeaders, config: &AccessConfig) {
    let mut path = match headers.get(Hdr::Path) {
        Some(value) => {
            let mut hops = value.to_string();
            if config.strip_path {
                hops = match hops.rfind('!') {
                    Some(i) if i + 1 < hops.len() => hops[i + 1..].to_string(),
                    Some(_) => PATHMASTER.to_string(),
                    None => hops,
                };
            }
            hops
        }
        None => PATHMASTER.to_string(),
    };
    if let Some(vhost) = &config.virtual_path {
        // Prefix unless the article already enters through the canonical
        // host for this realm.
        let first_hop = path.split('!').next().unwrap_or("");
        if first_hop != config.path_host {
            path = format!("{vhost}!{path}");
        }
    }
    headers.set(Hdr::Path, path);
}

/// Run the full header pass over a split article.
///
/// `line_count` is the counted body line total and `generated_id` the
/// identifier to install when the submission did not supply one. On success
/// every required header is populated and every synthesized header is in
/// place; on error the article is unusable and must be discarded.
pub fn process_headers(
    headers: &mut ArticleHeaders,
    line_count: usize,
    generated_id: &str,
    mode: SubmitMode,
    config: &AccessConfig,
    client: &ClientInfo,
) -> Result<()> {
    // System headers are only trusted from a peer feed.
    if !mode.is_feed() {
        for (idx, spec) in HEADER_TABLE.iter().enumerate() {
            if !spec.settable && spec.kind != HeaderKind::Obsolete && headers.slot(idx).is_set() {
                return Err(SubmitError::Header(format!(
                    "Can't set system \"{}\" header",
                    spec.name
                )));
            }
        }
    }

    headers.drop_blank_values();

    if !mode.is_feed() {
        if config.add_sender && client.authenticated {
            if let Some(user) = &client.user {
                let sender = if user.contains('@') {
                    user.clone()
                } else {
                    format!("{user}@{}", from_host(config))
                };
                headers.set(Hdr::Sender, sender);
            }
        } else {
            headers.clear(Hdr::Sender);
        }
    }

    let now = Utc::now();
    match headers.get(Hdr::Date) {
        None if mode.is_feed() => {
            return Err(SubmitError::Header("Missing \"Date\" header".to_string()));
        }
        None => {
            let stamp = if config.localtime {
                Local::now().format("%a, %-d %b %Y %H:%M:%S %z").to_string()
            } else {
                now.format("%a, %-d %b %Y %H:%M:%S +0000 (UTC)").to_string()
            };
            headers.set(Hdr::Date, stamp);
        }
        Some(value) => {
            let Some(date) = parse_date(value) else {
                return Err(SubmitError::Header(
                    "Can't parse \"Date\" header".to_string(),
                ));
            };
            if date.timestamp() > now.timestamp() + DATE_FUZZ_SECS {
                return Err(SubmitError::Header(
                    "Article posted in the future".to_string(),
                ));
            }
        }
    }

    if let Some(ctrl) = headers.get(Hdr::Control) {
        check_control(ctrl)?;
    } else if let Some(rest) = headers.get(Hdr::Subject).and_then(|s| s.strip_prefix("cmsg ")) {
        let ctrl = rest.trim_start().to_string();
        check_control(&ctrl)?;
        headers.set(Hdr::Control, ctrl);
    }

    match headers.get(Hdr::MessageId) {
        None if mode.is_feed() => {
            return Err(SubmitError::Header(
                "Missing \"Message-ID\" header".to_string(),
            ));
        }
        None => headers.set(Hdr::MessageId, generated_id),
        Some(id) => {
            if !msgid::is_valid_message_id(id, true, mode.is_feed()) {
                return Err(SubmitError::Header(
                    "Can't parse \"Message-ID\" header".to_string(),
                ));
            }
        }
    }

    if mode.is_feed() {
        if headers.get(Hdr::Path).is_none() {
            return Err(SubmitError::Header("Missing \"Path\" header".to_string()));
        }
    } else {
        rewrite_path(headers, config);
    }

    if let Some(expires) = headers.get(Hdr::Expires) {
        if parse_date(expires).is_none() {
            return Err(SubmitError::Header(
                "Can't parse \"Expires\" header".to_string(),
            ));
        }
    }

    if let Some(dist) = headers.get(Hdr::Distribution) {
        // Tokenization works on a copy; the header itself stays intact.
        let dist = dist.to_string();
        check_distribution(&dist)?;
    }

    if !mode.is_feed() {
        if headers.get(Hdr::Organization).is_none() {
            if let Some(org) = &config.organization {
                headers.set(Hdr::Organization, org.clone());
            }
        }
        headers.set(Hdr::Lines, line_count.to_string());
        if config.add_posting_host {
            headers.set(Hdr::NntpPostingHost, client.host.clone());
        }
        if config.add_posting_date {
            headers.set(
                Hdr::NntpPostingDate,
                now.format("%a, %-d %b %Y %H:%M:%S +0000 (UTC)").to_string(),
            );
        }
    }

    headers.set(
        Hdr::XTrace,
        format!(
            "{} {} {} {} ({})",
            trace_host(config),
            now.timestamp(),
            std::process::id(),
            client.ip,
            now.format("%-d %b %Y %H:%M:%S GMT"),
        ),
    );

    let complaints = match &config.complaints {
        Some(addr) => addr.clone(),
        None => format!("{NEWSMASTER}@{}", from_host(config)),
    };
    headers.set(Hdr::XComplaintsTo, complaints);

    if config.strip_post_cc && !mode.is_feed() {
        headers.clear(Hdr::Cc);
        headers.clear(Hdr::Bcc);
        headers.clear(Hdr::To);
    }

    for (idx, spec) in HEADER_TABLE.iter().enumerate() {
        if spec.kind == HeaderKind::Required && !headers.slot(idx).is_set() {
            return Err(SubmitError::Header(format!(
                "Required \"{}\" header is missing",
                spec.name
            )));
        }
    }

    Ok(())
}
