//! Message-identifier grammar corpus
//!
//! The full accept/reject table, exercised across all four combinations of
//! the strip-whitespace and lax-syntax modes, plus the mode-specific cases.

use nntp_inject::{is_valid_domain, is_valid_message_id};

/// Identifiers rejected no matter which modes are enabled.
const ALWAYS_BAD: &[&str] = &[
    "",
    "<invalid@test",
    "invalid@test>",
    "<inva\x7flid@test>",
    "<inva lid@test>",
    "<invalid@te\tst>",
    "<invalid>",
    "<inva\r\nlid@test>",
    "<inva(lid@test>",
    "<inva;lid@test>",
    "<inva\"lid@test>",
    "<inva>lid@test>",
    "<inva<lid@test>",
    "<>",
    "<a@>",
    "<inva...lid@test>",
    "<invalid@yEnc@twice@test>",
    "<invalid.@test>",
    "<invalid@>",
    "<@invalid>",
    "<invalid@test.>",
    "<inva[lid@test>",
    "<invalid@t[es]t>",
    "<valid@[t@].[e<s].t>",
];

/// Identifiers accepted no matter which modes are enabled.
const ALWAYS_GOOD: &[&str] = &[
    "<valid@test>",
    "<v4l.#%-{T`?*!.id@te|st>",
    "<a@b>",
    "<a.valid.id@testing.fr>",
    "<valid@[te.st]>",
    "<valid@[te;s@<t]>",
];

fn over_length_id() -> String {
    let mut local = String::new();
    while local.len() < 250 {
        local.push_str("1234567890");
    }
    format!("<{local}@1234567890>")
}

#[test]
fn corpus_holds_in_every_mode() {
    for strip in [false, true] {
        for lax in [false, true] {
            for id in ALWAYS_BAD {
                assert!(
                    !is_valid_message_id(id, strip, lax),
                    "accepted {id:?} (strip={strip}, lax={lax})"
                );
            }
            assert!(
                !is_valid_message_id(&over_length_id(), strip, lax),
                "accepted over-length ID (strip={strip}, lax={lax})"
            );
            for id in ALWAYS_GOOD {
                assert!(
                    is_valid_message_id(id, strip, lax),
                    "rejected {id:?} (strip={strip}, lax={lax})"
                );
            }
        }
    }
}

#[test]
fn domain_corpus() {
    for domain in ["", "@test", "inva\x7flid", "inva lid", "inva\r\nlid", "inva\"lid"] {
        assert!(!is_valid_domain(domain), "accepted {domain:?}");
    }
    for domain in ["test", "v4l.#%-{T`?*!.id.te|st", "[te.st]", "[te;s@<t]"] {
        assert!(is_valid_domain(domain), "rejected {domain:?}");
    }
}

#[test]
fn domain_agrees_with_message_id_right_hand_side() {
    let domains = [
        "",
        "@test",
        "inva lid",
        "inva\"lid",
        "test",
        "v4l.#%-{T`?*!.id.te|st",
        "[te.st]",
        "[te;s@<t]",
        "te..st",
        "test.",
        ".test",
    ];
    for domain in domains {
        let id = format!("<a@{domain}>");
        assert_eq!(
            is_valid_domain(domain),
            is_valid_message_id(&id, false, false),
            "disagreement on {domain:?}"
        );
    }
}

#[test]
fn stripping_surrounding_whitespace() {
    assert!(is_valid_message_id(" \t\t <valid@test>\t  ", true, false));
    assert!(!is_valid_message_id(" \t\t <invalid@test>\t  ", false, false));
}

#[test]
fn lax_syntax_relaxations() {
    // A second @ is tolerated only behind the yEnc marker, only in lax mode.
    assert!(is_valid_message_id("<valid@yEnc@test>", false, true));
    assert!(!is_valid_message_id("<invalid@yEnc@test>", false, false));

    // A doubled dot is tolerated in the local part only, in lax mode only.
    assert!(is_valid_message_id("<va..lid@test>", false, true));
    assert!(!is_valid_message_id("<inva..lid@test>", false, false));
    assert!(!is_valid_message_id("<invalid@te..st>", false, true));
}

#[test]
fn length_cap_is_exact() {
    // 250 octets in total is the longest accepted form.
    let local = "a".repeat(250 - "<@test>".len());
    let id = format!("<{local}@test>");
    assert_eq!(id.len(), 250);
    assert!(is_valid_message_id(&id, false, false));

    let id = format!("<a{local}@test>");
    assert_eq!(id.len(), 251);
    assert!(!is_valid_message_id(&id, false, false));
}
