//! Post-extraction correction heuristics for LLM-produced NPL references.
//!
//! Each heuristic is a value-in/value-out transform over [`NplReference`];
//! the corrector folds them in a fixed order and reports whether any fired.
//! Every heuristic is total: it never fails, it just declines to fire.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::NplReference;
use crate::date::{DATE_SENTINEL, DateExtractor};

/// Journal-name indicator words. A short title starting with one of these is
/// almost always a misplaced journal name, not an article title.
const JOURNAL_INDICATORS: &[&str] =
    &["the", "j.", "journal", "nature", "science", "biochemistry"];

/// Characters that cannot occur in a well-formed URL.
const URL_DISALLOWED: &[char] = &[
    ' ', '"', '\'', '<', '>', '{', '}', '|', '\\', '^', '~', '[', ']',
];

static URL_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?://|ftps?://|www\.|[a-z0-9-]+(?:\.[a-z0-9-]+)+/)").unwrap()
});

static CANONICAL_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8}$").unwrap());

/// Applies the ordered correction pipeline to extracted references.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCorrector {
    dates: DateExtractor,
}

impl ReferenceCorrector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_extractor(dates: DateExtractor) -> Self {
        Self { dates }
    }

    /// Run every heuristic in order. Returns the corrected record and
    /// whether any heuristic changed it.
    pub fn correct(&self, reference: NplReference) -> (NplReference, bool) {
        let heuristics: [fn(&Self, &NplReference) -> Option<NplReference>; 7] = [
            Self::swap_short_title_to_publisher,
            Self::repair_doi_url,
            Self::clean_url_characters,
            Self::clear_author_echoed_title,
            Self::standardize_date,
            Self::drop_short_publisher,
            Self::drop_short_title,
        ];

        let mut current = reference;
        let mut corrected = false;
        for heuristic in heuristics {
            if let Some(next) = heuristic(self, &current) {
                current = next;
                corrected = true;
            }
        }
        (current, corrected)
    }

    /// Heuristic 1: a non-empty title of fewer than 4 words that starts with
    /// a journal indicator, with an empty publisher, is moved to the
    /// publisher field.
    fn swap_short_title_to_publisher(&self, r: &NplReference) -> Option<NplReference> {
        let title = r.title.trim();
        let word_count = title.split_whitespace().count();
        if word_count == 0 || word_count >= 4 || !r.publisher.trim().is_empty() {
            return None;
        }
        let lower = title.to_lowercase();
        if !JOURNAL_INDICATORS.iter().any(|ind| lower.starts_with(ind)) {
            return None;
        }
        tracing::debug!(title, "moving short title to publisher field");
        let mut fixed = r.clone();
        fixed.publisher = title.to_string();
        fixed.title = String::new();
        Some(fixed)
    }

    /// Heuristic 2: rewrite `doi:`-prefixed and bare DOI url fields to the
    /// canonical `https://doi.org/` form.
    fn repair_doi_url(&self, r: &NplReference) -> Option<NplReference> {
        let url = r.url.trim();
        if url.is_empty() {
            return None;
        }
        let repaired = if url.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("doi:")) {
            format!("https://doi.org/{}", url[4..].trim())
        } else if url.starts_with("10.") && !url.to_lowercase().starts_with("http") {
            format!("https://doi.org/{}", url)
        } else {
            return None;
        };
        tracing::debug!(from = url, to = %repaired, "repaired DOI url");
        let mut fixed = r.clone();
        fixed.url = repaired;
        Some(fixed)
    }

    /// Heuristic 3: split the url on disallowed characters and keep the
    /// first fragment that still looks like a URL; drop the field entirely
    /// when no fragment qualifies.
    fn clean_url_characters(&self, r: &NplReference) -> Option<NplReference> {
        let url = r.url.trim();
        if url.is_empty() {
            return None;
        }
        let best = url
            .split(|c: char| URL_DISALLOWED.contains(&c))
            .find(|frag| frag.len() >= 5 && frag.contains('.') && URL_START_RE.is_match(frag))
            .unwrap_or("");
        if best == url {
            return None;
        }
        tracing::debug!(from = url, to = best, "cleaned malformed url");
        let mut fixed = r.clone();
        fixed.url = best.to_string();
        Some(fixed)
    }

    /// Heuristic 4: a single author whose name was echoed into the title
    /// means the title field is junk; clear it.
    fn clear_author_echoed_title(&self, r: &NplReference) -> Option<NplReference> {
        if r.author.len() != 1 || r.title.trim().is_empty() {
            return None;
        }
        let author = r.author[0].trim().to_lowercase();
        if author.len() < 2 || !r.title.to_lowercase().contains(&author) {
            return None;
        }
        tracing::debug!(author = %r.author[0], "clearing title that echoes the author");
        let mut fixed = r.clone();
        fixed.title = String::new();
        Some(fixed)
    }

    /// Heuristic 5: normalize the publication date to the canonical 8-digit
    /// form. Fields already canonical are left alone; unparseable dates are
    /// logged and passed through.
    fn standardize_date(&self, r: &NplReference) -> Option<NplReference> {
        let date = r.publication_date.trim();
        if date.is_empty() || CANONICAL_DATE_RE.is_match(date) {
            return None;
        }
        let canonical = self.dates.extract(date);
        if canonical == DATE_SENTINEL {
            tracing::warn!(date, "could not standardize publication date");
            return None;
        }
        let mut fixed = r.clone();
        fixed.publication_date = canonical;
        Some(fixed)
    }

    /// Heuristic 6: a publisher shorter than 4 characters is noise.
    fn drop_short_publisher(&self, r: &NplReference) -> Option<NplReference> {
        let publisher = r.publisher.trim();
        if publisher.is_empty() || publisher.chars().count() >= 4 {
            return None;
        }
        let mut fixed = r.clone();
        fixed.publisher = String::new();
        Some(fixed)
    }

    /// Heuristic 7: same rule applied to the title.
    fn drop_short_title(&self, r: &NplReference) -> Option<NplReference> {
        let title = r.title.trim();
        if title.is_empty() || title.chars().count() >= 4 {
            return None;
        }
        let mut fixed = r.clone();
        fixed.title = String::new();
        Some(fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corrector() -> ReferenceCorrector {
        ReferenceCorrector::with_date_extractor(DateExtractor::with_bounds(1900, 2026))
    }

    fn reference() -> NplReference {
        NplReference {
            title: "A full-length article title with many words".to_string(),
            author: vec!["Smith, J.".to_string()],
            publisher: "Journal of Testing".to_string(),
            publication_date: "15012025".to_string(),
            volume: "42".to_string(),
            pages: "100-110".to_string(),
            url: "https://doi.org/10.1000/xyz".to_string(),
        }
    }

    #[test]
    fn test_title_publisher_swap() {
        let mut r = reference();
        r.title = "Nature".to_string();
        r.publisher = String::new();
        let (fixed, corrected) = corrector().correct(r);
        assert!(corrected);
        assert_eq!(fixed.publisher, "Nature");
        assert_eq!(fixed.title, "");
    }

    #[test]
    fn test_swap_skipped_for_long_title() {
        let mut r = reference();
        r.title = "Nature of the chemical bond explained".to_string();
        r.publisher = String::new();
        let (fixed, _) = corrector().correct(r);
        assert_eq!(fixed.title, "Nature of the chemical bond explained");
    }

    #[test]
    fn test_swap_skipped_when_publisher_present() {
        let mut r = reference();
        r.title = "Nature".to_string();
        let (fixed, _) = corrector().correct(r);
        assert_eq!(fixed.title, "Nature");
        assert_eq!(fixed.publisher, "Journal of Testing");
    }

    #[test]
    fn test_doi_prefix_repair() {
        let mut r = reference();
        r.url = "doi:10.1002/mds.26125".to_string();
        let (fixed, corrected) = corrector().correct(r);
        assert!(corrected);
        assert_eq!(fixed.url, "https://doi.org/10.1002/mds.26125");
    }

    #[test]
    fn test_bare_doi_completion() {
        let mut r = reference();
        r.url = "10.1016/j.cell.2019.01.001".to_string();
        let (fixed, _) = corrector().correct(r);
        assert_eq!(fixed.url, "https://doi.org/10.1016/j.cell.2019.01.001");
    }

    #[test]
    fn test_url_cleanup_keeps_first_valid_fragment() {
        let mut r = reference();
        r.url = "https://example.org/paper.pdf\\junk after".to_string();
        let (fixed, _) = corrector().correct(r);
        assert_eq!(fixed.url, "https://example.org/paper.pdf");
    }

    #[test]
    fn test_url_cleanup_discards_hopeless_url() {
        let mut r = reference();
        r.url = "not a [real] url".to_string();
        let (fixed, _) = corrector().correct(r);
        assert_eq!(fixed.url, "");
    }

    #[test]
    fn test_author_echoed_title_cleared() {
        let mut r = reference();
        r.author = vec!["Kowalski".to_string()];
        r.title = "Kowalski et al. study".to_string();
        let (fixed, corrected) = corrector().correct(r);
        assert!(corrected);
        assert_eq!(fixed.title, "");
    }

    #[test]
    fn test_author_in_title_needs_single_author() {
        let mut r = reference();
        r.author = vec!["Kowalski".to_string(), "Nowak".to_string()];
        r.title = "Kowalski and Nowak study results".to_string();
        let (fixed, _) = corrector().correct(r);
        assert_eq!(fixed.title, "Kowalski and Nowak study results");
    }

    #[test]
    fn test_date_standardized() {
        let mut r = reference();
        r.publication_date = "15 January 2025".to_string();
        let (fixed, corrected) = corrector().correct(r);
        assert!(corrected);
        assert_eq!(fixed.publication_date, "15012025");
    }

    #[test]
    fn test_unparseable_date_passes_through() {
        let mut r = reference();
        r.publication_date = "no date in this field".to_string();
        let (fixed, _) = corrector().correct(r);
        assert_eq!(fixed.publication_date, "no date in this field");
    }

    #[test]
    fn test_short_publisher_dropped() {
        let mut r = reference();
        r.publisher = "ab".to_string();
        let (fixed, corrected) = corrector().correct(r);
        assert!(corrected);
        assert_eq!(fixed.publisher, "");
    }

    #[test]
    fn test_short_title_dropped() {
        let mut r = reference();
        r.title = "xyz".to_string();
        let (fixed, corrected) = corrector().correct(r);
        assert!(corrected);
        assert_eq!(fixed.title, "");
    }

    #[test]
    fn test_no_corrections_reports_false() {
        let (fixed, corrected) = corrector().correct(reference());
        assert!(!corrected);
        assert_eq!(fixed, reference());
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            {
                let mut r = reference();
                r.title = "Nature".to_string();
                r.publisher = String::new();
                r.url = "doi:10.1002/mds.26125".to_string();
                r.publication_date = "19 January 2025".to_string();
                r
            },
            {
                let mut r = reference();
                r.url = "broken url{with junk".to_string();
                r.publication_date = "Mai 2008".to_string();
                r
            },
        ];
        let c = corrector();
        for r in samples {
            let (once, _) = c.correct(r);
            let (twice, changed_again) = c.correct(once.clone());
            assert!(!changed_again);
            assert_eq!(once, twice);
        }
    }
}
