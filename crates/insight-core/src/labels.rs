//! Parser for the `[domain:X][tag:Y]` summary prefix convention.
//!
//! Summary producers may prepend coarse classification labels to a summary's
//! text, e.g. `[domain:payments][tag:latefee_rev] Partner 'X': ...`. The
//! convention is intentionally minimal: two bracketed segments at the very
//! start of the string, parsed independently, with `"unknown"` as the
//! fallback for anything absent or malformed.

/// Fallback value for a label that is absent or malformed.
pub const UNKNOWN_LABEL: &str = "unknown";

const DOMAIN_PREFIX: &str = "[domain:";
const TAG_PREFIX: &str = "[tag:";

/// Coarse classification labels carried in a summary's leading text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    /// Domain label, e.g. `"payments"`.
    pub domain: String,
    /// Tag label, e.g. `"latefee_rev"`.
    pub tag: String,
}

impl Labels {
    /// Both labels set to [`UNKNOWN_LABEL`].
    pub fn unknown() -> Self {
        Self {
            domain: UNKNOWN_LABEL.to_string(),
            tag: UNKNOWN_LABEL.to_string(),
        }
    }

    /// Extracts `(domain, tag)` from a summary string.
    ///
    /// A summary that does not start with `[domain:` yields
    /// `("unknown", "unknown")`. Domain and tag are parsed independently:
    /// a missing or malformed `[tag:..]` segment degrades only the tag.
    pub fn parse(summary: &str) -> Self {
        let Some(rest) = summary.strip_prefix(DOMAIN_PREFIX) else {
            return Self::unknown();
        };
        let Some(domain_end) = rest.find(']') else {
            return Self::unknown();
        };
        let domain = label_or_unknown(&rest[..domain_end]);

        let tag = match rest[domain_end + 1..].strip_prefix(TAG_PREFIX) {
            Some(tail) => match tail.find(']') {
                Some(tag_end) => label_or_unknown(&tail[..tag_end]),
                None => UNKNOWN_LABEL.to_string(),
            },
            None => UNKNOWN_LABEL.to_string(),
        };

        Self { domain, tag }
    }
}

fn label_or_unknown(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_prefix() {
        let labels = Labels::parse("[domain:payments][tag:latefee_rev] Partner 'X': ...");
        assert_eq!(labels.domain, "payments");
        assert_eq!(labels.tag, "latefee_rev");
    }

    #[test]
    fn untagged_summary_is_unknown() {
        let labels = Labels::parse("no tags here");
        assert_eq!(labels.domain, "unknown");
        assert_eq!(labels.tag, "unknown");
    }

    #[test]
    fn domain_without_tag_degrades_tag_only() {
        let labels = Labels::parse("[domain:overdue] total overdue amount 42.00");
        assert_eq!(labels.domain, "overdue");
        assert_eq!(labels.tag, "unknown");
    }

    #[test]
    fn malformed_tag_segment_degrades_tag_only() {
        let labels = Labels::parse("[domain:autopay][tag:partner_autopay Partner 'Y'");
        assert_eq!(labels.domain, "autopay");
        assert_eq!(labels.tag, "unknown");
    }

    #[test]
    fn unclosed_domain_is_unknown() {
        let labels = Labels::parse("[domain:payments no closing bracket");
        assert_eq!(labels.domain, "unknown");
        assert_eq!(labels.tag, "unknown");
    }

    #[test]
    fn prefix_must_be_leading() {
        let labels = Labels::parse("intro [domain:payments][tag:x]");
        assert_eq!(labels.domain, "unknown");
        assert_eq!(labels.tag, "unknown");
    }

    #[test]
    fn empty_label_values_fall_back() {
        let labels = Labels::parse("[domain:][tag: ] text");
        assert_eq!(labels.domain, "unknown");
        assert_eq!(labels.tag, "unknown");
    }

    #[test]
    fn labels_are_trimmed() {
        let labels = Labels::parse("[domain: statement ][tag: total_stmt ] All partners: ...");
        assert_eq!(labels.domain, "statement");
        assert_eq!(labels.tag, "total_stmt");
    }
}
