use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder substituted for patent/publication identifiers before LLM calls.
pub const PATENT_PLACEHOLDER: &str = "PATENT";

/// Per-jurisdiction identifier patterns, ordered so that the more specific
/// formats win at a shared start position (e.g. old US serials before the
/// post-2001 publication format). The table is joined into a single
/// case-insensitive alternation used by both the split rule and the
/// substitution passes.
const PATENT_ID_PATTERNS: &[&str] = &[
    // WO publications: WO 2016/066651 A1, WO03/064345
    r"WO\s?\d{2,4}/\d+(?:\s?[A-Z]\d?\b)?",
    // PCT application numbers: PCT/EP2010/061015
    r"PCT/[A-Z]{2}\d{2,4}/\d+",
    // EP publications, digits optionally grouped: EP 1 234 567 A1, EP0987654B1
    r"EP\s?\d+[\s-]?\d+[\s-]?\d+(?:\s?[A-Z]\d?\b)?",
    // Old US serial numbers: US 12/345678
    r"US\s?\d{2}/\d+",
    // Post-2001 US publications: US 2010/0024077 A1, US-2010-0024077
    r"US[\s-]?[A-Z]{0,2}\s?\d{4}[-/]?\d+(?:\s?[A-Z]\d?\b)?",
    // JP with old-era (Heisei/Showa) prefixes or new numbering: JP H11-123456, JP 2004-123456
    r"JP[\s-]?[HS]?\d{1,4}[-/]\d{4,}(?:\s?[A-Z]\d?\b)?",
    // CN publications: CN 101234567 A
    r"CN\s?\d{6,}(?:\s?[A-Z]\d?\b)?",
    // DE applications, digits optionally grouped: DE 10 2004 049466 A1
    r"DE\s?\d+[\s-]?\d+[\s-]?\d+(?:\s?[A-Z]\d?\b)?",
    // GB publications: GB 2345678 A
    r"GB\s?\d+[\s-]?\d+[\s-]?\d+(?:\s?[A-Z]\d?\b)?",
    // Generic phrasing: "Application No. 2004-123456", "Publication Number 2010/0024077"
    r"(?:Patent\s)?(?:Application|Publication)\s(?:No\.?|Number)\s?[A-Z]{0,2}\s?\d[\d/,.\-]*\d",
];

static PATENT_ID_ALTERNATION: Lazy<String> = Lazy::new(|| PATENT_ID_PATTERNS.join("|"));

/// Separator-capturing pattern: group 1 is the `[,;.\s]` character preceding
/// the identifier, group 2 the identifier itself.
pub(crate) static PATENT_SPLIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)([,;.\s])({})", &*PATENT_ID_ALTERNATION)).unwrap()
});

/// Identifier at the start of a chunk (no separator available to anchor on).
static PATENT_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^\s*(?:{})", &*PATENT_ID_ALTERNATION)).unwrap()
});

static PATENT_ANYWHERE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i){}", &*PATENT_ID_ALTERNATION)).unwrap());

/// Replace every patent identifier in `text` with [`PATENT_PLACEHOLDER`],
/// preserving the separator character immediately preceding it. Identifiers
/// at the start of the string are replaced without a separator anchor.
pub fn substitute_patent_numbers(text: &str) -> String {
    let replaced = PATENT_SPLIT_RE.replace_all(text, format!("${{1}}{}", PATENT_PLACEHOLDER));
    let replaced = PATENT_START_RE.replace(&replaced, PATENT_PLACEHOLDER);
    replaced.trim().to_string()
}

/// Whether `text` contains any recognized patent/publication identifier.
pub fn contains_patent_identifier(text: &str) -> bool {
    PATENT_ANYWHERE_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_wo_mid_string() {
        assert_eq!(
            substitute_patent_numbers("disclosed in WO 2016/066651 A1 and elsewhere"),
            "disclosed in PATENT and elsewhere"
        );
    }

    #[test]
    fn test_substitute_at_start() {
        assert_eq!(
            substitute_patent_numbers("WO 2016/066651 A1 describes a compound"),
            "PATENT describes a compound"
        );
    }

    #[test]
    fn test_substitute_preserves_separator() {
        assert_eq!(
            substitute_patent_numbers("see also,EP 1 234 567 A1 for details"),
            "see also,PATENT for details"
        );
    }

    #[test]
    fn test_substitute_us_old_format() {
        assert_eq!(
            substitute_patent_numbers("filed as US 12/345678 earlier"),
            "filed as PATENT earlier"
        );
    }

    #[test]
    fn test_substitute_us_publication() {
        assert_eq!(
            substitute_patent_numbers("published as US 2010/0024077 A1 in 2010"),
            "published as PATENT in 2010"
        );
    }

    #[test]
    fn test_substitute_pct() {
        assert_eq!(
            substitute_patent_numbers("the application PCT/EP2010/061015 claims"),
            "the application PATENT claims"
        );
    }

    #[test]
    fn test_substitute_jp_old_era() {
        assert_eq!(
            substitute_patent_numbers("see JP H11-123456 for the prior art"),
            "see PATENT for the prior art"
        );
    }

    #[test]
    fn test_substitute_generic_phrase() {
        assert_eq!(
            substitute_patent_numbers("described in Application No. 2004-123456 above"),
            "described in PATENT above"
        );
    }

    #[test]
    fn test_substitute_multiple() {
        let text = "WO 2016/066651 A1 and DE 10 2004 049466 A1 both disclose it";
        let result = substitute_patent_numbers(text);
        assert!(!contains_patent_identifier(&result));
        assert_eq!(result.matches(PATENT_PLACEHOLDER).count(), 2);
    }

    #[test]
    fn test_no_identifier_passthrough() {
        let text = "a plain sentence with no identifiers at all";
        assert_eq!(substitute_patent_numbers(text), text);
    }

    #[test]
    fn test_contains_patent_identifier() {
        assert!(contains_patent_identifier("see WO 2016/066651 A1"));
        assert!(contains_patent_identifier("cited CN 101234567 A there"));
        assert!(!contains_patent_identifier("no patents here"));
    }
}
