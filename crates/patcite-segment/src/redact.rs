use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length of a whitespace-delimited token before it is treated as a
/// chemical/molecular formula. Every placeholder emitted by this module is
/// at most this long, so a second pass is a no-op.
pub const DEFAULT_MAX_TOKEN_LEN: usize = 20;

static SEQUENCE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bSEQ\s*ID\s*NOS?\.?\s*:?\s*\d+").unwrap());

static BASE_PAIR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?[\s-]?bp\b").unwrap());

static POSITION_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpositions?\s+\d+\s*(?:to|-)\s*\d+").unwrap());

// Ratio form must be substituted before the single-value form, otherwise the
// single-value pattern would consume half of the ratio.
static WT_RATIO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:\.\d+)?\s?wt\.?\s?%\s?/\s?\d+(?:\.\d+)?\s?wt\.?\s?%").unwrap()
});

static WT_SINGLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?\s?wt\.?\s?%").unwrap());

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

/// Replace sequence identifiers: `SEQ ID NO: 148` → `SEQUENCE_ID`.
pub fn redact_sequence_ids(text: &str) -> String {
    SEQUENCE_ID_RE.replace_all(text, "SEQUENCE_ID").into_owned()
}

/// Replace base-pair counts: `330-bp` → `BASEPAIR`.
pub fn redact_base_pairs(text: &str) -> String {
    BASE_PAIR_RE.replace_all(text, "BASEPAIR").into_owned()
}

/// Replace positional ranges: `positions 137 to 968` → `POSITION_RANGE`.
pub fn redact_position_ranges(text: &str) -> String {
    POSITION_RANGE_RE.replace_all(text, "POSITION_RANGE").into_owned()
}

/// Replace weight-percentage values, ratio form first:
/// `60wt%/40wt%` → `[A_DEFINED_RATIO]`, `2.5wt%` → `[A_CERTAIN_AMOUNT]`.
pub fn redact_weight_percentages(text: &str) -> String {
    let ratio = WT_RATIO_RE.replace_all(text, "[A_DEFINED_RATIO]");
    WT_SINGLE_RE.replace_all(&ratio, "[A_CERTAIN_AMOUNT]").into_owned()
}

/// Replace any whitespace-delimited token longer than `max_len` characters
/// with `FORMULA`, preserving the surrounding whitespace.
pub fn redact_long_tokens(text: &str, max_len: usize) -> String {
    TOKEN_RE
        .replace_all(text, |caps: &regex::Captures| {
            let token = &caps[0];
            if token.chars().count() > max_len {
                "FORMULA".to_string()
            } else {
                token.to_string()
            }
        })
        .into_owned()
}

/// Full redaction pass for text destined for the accession-extraction prompt.
pub fn redact_for_accessions(text: &str) -> String {
    redact_for_accessions_with_max_len(text, DEFAULT_MAX_TOKEN_LEN)
}

/// [`redact_for_accessions`] with a custom formula-token length limit.
pub fn redact_for_accessions_with_max_len(text: &str, max_len: usize) -> String {
    let text = redact_weight_percentages(text);
    let text = redact_sequence_ids(&text);
    let text = redact_base_pairs(&text);
    let text = redact_position_ranges(&text);
    redact_long_tokens(&text, max_len)
}
