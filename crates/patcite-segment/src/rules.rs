use once_cell::sync::Lazy;
use regex::Regex;

use crate::patent::PATENT_SPLIT_RE;

/// Marker prepended to chunks introduced by an example phrase.
pub const EXAMPLE_MARKER: &str = "EXAMPLE";
/// Marker prepended to chunks introduced by the word "embodiment".
pub const EMBODIMENT_MARKER: &str = "EMBODIMENT";

/// One structural split rule.
///
/// `apply` must return a single-element vec containing the unmodified input
/// when it finds no split point, and 2+ elements only on a genuine match.
#[derive(Clone, Copy)]
pub struct SplitRule {
    pub name: &'static str,
    pub apply: fn(&str) -> Vec<String>,
}

impl std::fmt::Debug for SplitRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitRule").field("name", &self.name).finish()
    }
}

/// The default rule list, in evaluation order.
pub fn default_rules() -> Vec<SplitRule> {
    vec![
        SplitRule { name: "patent_number", apply: split_on_patent_number },
        SplitRule { name: "dot_double_newline", apply: split_on_dot_double_newline },
        SplitRule { name: "punctuation_dash", apply: split_on_punctuation_dash },
        SplitRule { name: "figure_enumeration", apply: split_on_figure_enumeration },
        SplitRule { name: "numbered_list_item", apply: split_on_numbered_list_item },
        SplitRule { name: "lettered_list_item", apply: split_on_lettered_list_item },
        SplitRule { name: "or_newline_dash", apply: split_on_or_newline_dash },
        SplitRule { name: "z_b", apply: split_on_z_b },
        SplitRule { name: "arrow", apply: split_on_arrow },
        SplitRule { name: "example_phrase", apply: split_on_example_phrase },
        SplitRule { name: "embodiment", apply: split_on_embodiment },
    ]
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn finish(parts: Vec<String>, original: &str) -> Vec<String> {
    if parts.len() > 1 {
        parts
    } else {
        vec![original.to_string()]
    }
}

/// Split immediately before each patent identifier. The separator and the
/// identifier stay at the head of the following part; the final substitution
/// pass collapses them into the `PATENT` placeholder.
pub fn split_on_patent_number(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut last = 0;
    for caps in PATENT_SPLIT_RE.captures_iter(text) {
        let sep_start = caps.get(1).map(|m| m.start()).unwrap_or(0);
        let before = text[last..sep_start].trim();
        if !before.is_empty() {
            parts.push(before.to_string());
        }
        last = sep_start;
    }
    let remainder = text[last..].trim();
    if !remainder.is_empty() {
        parts.push(remainder.to_string());
    }
    finish(parts, text)
}

/// Split on a period followed by two or more newlines (paragraph break).
/// Every resulting part is normalized to end with terminal punctuation.
pub fn split_on_dot_double_newline(text: &str) -> Vec<String> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\n{2,}").unwrap());
    let normalized = normalize_newlines(text);
    let mut parts = Vec::new();
    for raw in RE.split(&normalized) {
        let p = raw.trim();
        if p.is_empty() {
            continue;
        }
        if p.ends_with('.') || p.ends_with('?') || p.ends_with('!') {
            parts.push(p.to_string());
        } else {
            parts.push(format!("{}.", p));
        }
    }
    finish(parts, text)
}

/// Split at punctuation followed by a newline and a dash. Punctuation stays
/// with the preceding part, the dash starts the next part.
pub fn split_on_punctuation_dash(text: &str) -> Vec<String> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.,:;])\n(-)").unwrap());
    let normalized = normalize_newlines(text);
    let mut parts = Vec::new();
    let mut last = 0;
    for caps in RE.captures_iter(&normalized) {
        let punct_end = caps.get(1).map(|m| m.end()).unwrap_or(0);
        let dash_start = caps.get(2).map(|m| m.start()).unwrap_or(0);
        let before = normalized[last..punct_end].trim();
        if !before.is_empty() {
            parts.push(before.to_string());
        }
        last = dash_start;
    }
    let remainder = normalized[last..].trim();
    if !remainder.is_empty() {
        parts.push(remainder.to_string());
    }
    finish(parts, text)
}

/// Split before figure enumerations like `Fig. 3`, `FIGURE 12` when preceded
/// by punctuation and an optional newline.
pub fn split_on_figure_enumeration(text: &str) -> Vec<String> {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"([.,:;])\n*((?:FIG|FIGURE|Fig)\.?\s[0-9]{1,3})").unwrap());
    split_after_punctuation(text, &RE)
}

/// Split before numbered list items like `1.` or `(2)` preceded by
/// punctuation and a newline.
pub fn split_on_numbered_list_item(text: &str) -> Vec<String> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.,:;])\n(\(?[0-9]{1,2}\)?\.?)").unwrap());
    split_after_punctuation(text, &RE)
}

/// Split before lettered list items like `a)` preceded by punctuation and
/// one or more newlines.
pub fn split_on_lettered_list_item(text: &str) -> Vec<String> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.,:;])\n+([a-zA-Z]\))").unwrap());
    split_after_punctuation(text, &RE)
}

/// Shared boundary arithmetic for the punctuation-anchored rules: the
/// punctuation ends the first part, capture group 2 starts the next one.
fn split_after_punctuation(text: &str, re: &Regex) -> Vec<String> {
    let normalized = normalize_newlines(text);
    let mut parts = Vec::new();
    let mut last = 0;
    for caps in re.captures_iter(&normalized) {
        let punct_end = caps.get(1).map(|m| m.end()).unwrap_or(0);
        let item_start = caps.get(2).map(|m| m.start()).unwrap_or(0);
        let before = normalized[last..punct_end].trim();
        if !before.is_empty() {
            parts.push(before.to_string());
        }
        last = item_start;
    }
    let remainder = normalized[last..].trim();
    if !remainder.is_empty() {
        parts.push(remainder.to_string());
    }
    finish(parts, text)
}

/// Split after a trailing ` or` followed by a dash-prefixed continuation.
pub fn split_on_or_newline_dash(text: &str) -> Vec<String> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\sor)(\n-\s)").unwrap());
    let normalized = normalize_newlines(text);
    let mut parts = Vec::new();
    let mut last = 0;
    for caps in RE.captures_iter(&normalized) {
        let or_end = caps.get(1).map(|m| m.end()).unwrap_or(0);
        let dash_start = caps.get(2).map(|m| m.start()).unwrap_or(0);
        let before = normalized[last..or_end].trim();
        if !before.is_empty() {
            parts.push(before.to_string());
        }
        last = dash_start;
    }
    let remainder = normalized[last..].trim();
    if !remainder.is_empty() {
        parts.push(remainder.to_string());
    }
    finish(parts, text)
}

/// Split immediately before the German " z. B. " (e.g.) phrase.
pub fn split_on_z_b(text: &str) -> Vec<String> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" z\. B\. ").unwrap());
    let mut parts = Vec::new();
    let mut last = 0;
    for m in RE.find_iter(text) {
        let split = m.start() + 1;
        let before = text[last..split].trim();
        if !before.is_empty() {
            parts.push(before.to_string());
        }
        last = split;
    }
    let remainder = text[last..].trim();
    if !remainder.is_empty() {
        parts.push(remainder.to_string());
    }
    finish(parts, text)
}

/// Split around a standalone ` --> ` process-step arrow, discarding the
/// arrow token itself.
pub fn split_on_arrow(text: &str) -> Vec<String> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s--\s?>\s*").unwrap());
    let mut parts = Vec::new();
    let mut last = 0;
    for m in RE.find_iter(text) {
        let before = text[last..m.start()].trim();
        if !before.is_empty() {
            parts.push(before.to_string());
        }
        last = m.end();
    }
    let remainder = text[last..].trim();
    if !remainder.is_empty() {
        parts.push(remainder.to_string());
    }
    finish(parts, text)
}

/// Split before example phrases, prefixing each introduced chunk with the
/// `EXAMPLE` marker so downstream consumers know it is exemplary.
pub fn split_on_example_phrase(text: &str) -> Vec<String> {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\b(?:for example|as an example|e\.g\.)").unwrap());
    split_before_marker(text, &RE, EXAMPLE_MARKER)
}

/// Split before the word "embodiment", prefixing the following chunk with
/// the `EMBODIMENT` marker.
pub fn split_on_embodiment(text: &str) -> Vec<String> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bembodiment").unwrap());
    split_before_marker(text, &RE, EMBODIMENT_MARKER)
}

fn split_before_marker(text: &str, re: &Regex, marker: &str) -> Vec<String> {
    // A match at position 0 cannot open a new part; it would re-split forever.
    let starts: Vec<usize> = re
        .find_iter(text)
        .map(|m| m.start())
        .filter(|&s| s > 0)
        .collect();
    if starts.is_empty() {
        return vec![text.to_string()];
    }
    let mut parts = Vec::new();
    let head = text[..starts[0]].trim();
    if !head.is_empty() {
        parts.push(head.to_string());
    }
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let segment = text[start..end].trim();
        if !segment.is_empty() {
            parts.push(format!("{} {}", marker, segment));
        }
    }
    finish(parts, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_double_newline_basic() {
        let parts = split_on_dot_double_newline("First sentence.\n\nSecond sentence.");
        assert_eq!(parts, vec!["First sentence.", "Second sentence."]);
    }

    #[test]
    fn test_dot_double_newline_appends_terminal_punctuation() {
        let parts = split_on_dot_double_newline("First part.\n\n\nSecond without dot");
        assert_eq!(parts, vec!["First part.", "Second without dot."]);
    }

    #[test]
    fn test_dot_double_newline_no_match_returns_input() {
        let text = "no paragraph break here.\nsingle newline only";
        assert_eq!(split_on_dot_double_newline(text), vec![text.to_string()]);
    }

    #[test]
    fn test_dot_double_newline_handles_crlf() {
        let parts = split_on_dot_double_newline("First.\r\n\r\nSecond.");
        assert_eq!(parts, vec!["First.", "Second."]);
    }

    #[test]
    fn test_patent_number_split() {
        let parts =
            split_on_patent_number("The compound is known from WO 2016/066651 A1 and related art.");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "The compound is known from");
        assert!(parts[1].starts_with("WO 2016/066651 A1"));
    }

    #[test]
    fn test_patent_number_no_match() {
        let text = "no identifiers in this sentence";
        assert_eq!(split_on_patent_number(text), vec![text.to_string()]);
    }

    #[test]
    fn test_punctuation_dash() {
        let parts = split_on_punctuation_dash("the following:\n- first item;\n- second item");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "the following:");
        assert_eq!(parts[1], "- first item;");
        assert_eq!(parts[2], "- second item");
    }

    #[test]
    fn test_figure_enumeration() {
        let parts = split_on_figure_enumeration("as shown above.\nFig. 3 depicts the assembly");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "as shown above.");
        assert!(parts[1].starts_with("Fig. 3"));
    }

    #[test]
    fn test_numbered_list_item() {
        let parts = split_on_numbered_list_item("steps are:\n(1) mix the solution,\n(2) heat it");
        assert_eq!(parts.len(), 3);
        assert!(parts[1].starts_with("(1)"));
        assert!(parts[2].starts_with("(2)"));
    }

    #[test]
    fn test_lettered_list_item() {
        let parts = split_on_lettered_list_item("comprising:\n\na) a first layer;\nb) a second layer");
        assert_eq!(parts.len(), 3);
        assert!(parts[1].starts_with("a)"));
        assert!(parts[2].starts_with("b)"));
    }

    #[test]
    fn test_or_newline_dash() {
        let parts = split_on_or_newline_dash("a metal salt or\n- an organic acid");
        assert_eq!(parts, vec!["a metal salt or", "- an organic acid"]);
    }

    #[test]
    fn test_z_b() {
        let parts = split_on_z_b("Metalle z. B. Eisen und Kupfer");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "Metalle");
        assert!(parts[1].starts_with("z. B."));
    }

    #[test]
    fn test_arrow_dropped() {
        let parts = split_on_arrow("precursor --> intermediate --> product");
        assert_eq!(parts, vec!["precursor", "intermediate", "product"]);
    }

    #[test]
    fn test_example_phrase_marker() {
        let parts = split_on_example_phrase("Binders are suitable, for example starch or gelatin.");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "Binders are suitable,");
        assert!(parts[1].starts_with("EXAMPLE for example"));
    }

    #[test]
    fn test_example_phrase_at_start_is_not_split() {
        let text = "for example starch may be used";
        assert_eq!(split_on_example_phrase(text), vec![text.to_string()]);
    }

    #[test]
    fn test_embodiment_marker() {
        let parts = split_on_embodiment("A second embodiment follows.");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "A second");
        assert_eq!(parts[1], "EMBODIMENT embodiment follows.");
    }

    #[test]
    fn test_rules_return_input_when_unmatched() {
        let text = "plain text without any structure";
        for rule in default_rules() {
            assert_eq!((rule.apply)(text), vec![text.to_string()], "rule {}", rule.name);
        }
    }
}
