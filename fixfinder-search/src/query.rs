//! Query optimiser: cheap, deterministic rewriting of the user's query
//! before it is fanned out to the sources.
//!
//! No network, no model calls. The only rewrite is prefixing
//! `"how to fix "` to problem descriptions that carry no repair vocabulary,
//! which steers general search engines toward repair guides.

use crate::text;

/// Prefix added to problem descriptions without repair intent.
pub const REPAIR_PREFIX: &str = "how to fix ";

/// Words ignored when counting meaningful terms.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "it", "to", "of", "and", "in", "for", "on", "my", "i",
];

/// Vocabulary that already signals repair intent. Matched as substrings so
/// phrases like "not working" and inflections like "fixing" count.
const REPAIR_KEYWORDS: &[&str] = &[
    "fix",
    "repair",
    "solve",
    "solution",
    "broken",
    "not working",
    "issue",
    "problem",
    "error",
    "how to",
    "help",
    "stuck",
];

/// Tokens that mark the query as describing a fault. Matched as whole tokens.
const PROBLEM_INDICATORS: &[&str] = &[
    "not", "broken", "stopped", "wont", "won't", "doesn't", "doesnt", "cant", "can't", "failed",
    "error", "issue",
];

/// Meaningful terms must be longer than this many characters.
const MIN_TERM_CHARS: usize = 2;

/// Fewer meaningful terms than this and the query passes through untouched.
const MIN_MEANINGFUL_TERMS: usize = 2;

/// Optimise a raw query for searching.
///
/// 1. Trim; append non-blank `context` after a single space.
/// 2. Count meaningful terms (not stop words, longer than two characters).
/// 3. If the query has no repair vocabulary, has at least two meaningful
///    terms and contains a problem indicator, prefix [`REPAIR_PREFIX`].
///
/// Re-optimising an optimised query is a no-op, because the prefix itself
/// is repair vocabulary.
pub fn optimize(query: &str, context: Option<&str>) -> String {
    let mut combined = query.trim().to_string();
    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        if !combined.is_empty() {
            combined.push(' ');
        }
        combined.push_str(context);
    }

    let normalised = combined.replace('\u{2019}', "'").to_lowercase();
    let tokens: Vec<String> = text::tokens(&normalised).collect();

    let meaningful = tokens
        .iter()
        .filter(|t| t.chars().count() > MIN_TERM_CHARS && !STOP_WORDS.contains(&t.as_str()))
        .count();
    if meaningful < MIN_MEANINGFUL_TERMS {
        return combined;
    }

    if has_repair_intent(&normalised) {
        return combined;
    }

    let describes_problem = tokens
        .iter()
        .any(|t| PROBLEM_INDICATORS.contains(&t.as_str()));
    if describes_problem {
        tracing::trace!(query = %combined, "adding repair prefix");
        format!("{REPAIR_PREFIX}{combined}")
    } else {
        combined
    }
}

/// Whether the lower-cased query already contains repair vocabulary.
pub fn has_repair_intent(lowercase_query: &str) -> bool {
    REPAIR_KEYWORDS
        .iter()
        .any(|keyword| lowercase_query.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_description_gets_prefix() {
        assert_eq!(
            optimize("washing machine won't drain", None),
            "how to fix washing machine won't drain"
        );
    }

    #[test]
    fn curly_apostrophe_counts_as_indicator() {
        assert_eq!(
            optimize("dishwasher won\u{2019}t start", None),
            "how to fix dishwasher won\u{2019}t start"
        );
    }

    #[test]
    fn repair_intent_left_alone() {
        let query = "how to repair a cracked phone screen";
        assert_eq!(optimize(query, None), query);
        assert_eq!(
            optimize("laptop fan not working", None),
            "laptop fan not working"
        );
    }

    #[test]
    fn no_problem_indicator_left_alone() {
        assert_eq!(optimize("laptop screen cracked", None), "laptop screen cracked");
    }

    #[test]
    fn short_query_passes_through() {
        // Only one meaningful term: "tv" is too short, "it" and "is" are stop words.
        assert_eq!(optimize("tv not", None), "tv not");
        assert_eq!(optimize("  it is not  ", None), "it is not");
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(optimize("  toaster  ", None), "toaster");
    }

    #[test]
    fn context_is_appended_and_can_trigger_prefix() {
        assert_eq!(
            optimize("samsung fridge", Some("stopped cooling overnight")),
            "how to fix samsung fridge stopped cooling overnight"
        );
        assert_eq!(optimize("samsung fridge", Some("   ")), "samsung fridge");
    }

    #[test]
    fn indicator_must_be_a_whole_token() {
        // "nothing" contains "not" but is not a problem indicator.
        assert_eq!(
            optimize("nothing displays on monitor", None),
            "nothing displays on monitor"
        );
    }

    #[test]
    fn optimising_twice_does_not_double_prefix() {
        for query in [
            "printer stopped feeding paper",
            "car doesn't start cold mornings",
            "laptop screen cracked",
            "kettle",
        ] {
            let once = optimize(query, None);
            let twice = optimize(&once, None);
            assert_eq!(once, twice, "query {query:?} changed on second pass");
            assert!(twice.matches(REPAIR_PREFIX).count() <= 1);
        }
    }

    #[test]
    fn deterministic() {
        let a = optimize("garage door opener failed", Some("chamberlain"));
        let b = optimize("garage door opener failed", Some("chamberlain"));
        assert_eq!(a, b);
    }
}
