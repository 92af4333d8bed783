//! Skip-condition battery for corrected NPL references.
//!
//! LLM output includes plenty of husks: records carrying only a date, only
//! a title, or a standards-body name in the wrong field. Each condition is
//! checked in a fixed order and the first hit wins.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::NplReference;

static STANDARDS_BODIES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:3GPP|IEEE)\b").unwrap());

/// Why a reference was filtered out, for logging and skip statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    StandardsBodyInDate,
    StandardsBodyInPublisher,
    TitleOnly,
    PublisherAndDateOnly,
    Empty,
    DateOnly,
    AuthorEchoedInTitle,
    AuthorAndDateOnly,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SkipReason::StandardsBodyInDate => "standards body in date field",
            SkipReason::StandardsBodyInPublisher => "standards body in publisher field",
            SkipReason::TitleOnly => "title only",
            SkipReason::PublisherAndDateOnly => "publisher and date only",
            SkipReason::Empty => "completely empty",
            SkipReason::DateOnly => "date only",
            SkipReason::AuthorEchoedInTitle => "author echoed in title",
            SkipReason::AuthorAndDateOnly => "author and date only",
        };
        f.write_str(label)
    }
}

fn has_content(value: &str) -> bool {
    !value.trim().is_empty()
}

fn authors_have_content(authors: &[String]) -> bool {
    authors.iter().any(|a| has_content(a))
}

/// Decide whether `reference` should be dropped. Returns the first matching
/// skip condition, or `None` to keep the reference.
pub fn skip_reason(reference: &NplReference) -> Option<SkipReason> {
    let author = authors_have_content(&reference.author);
    let title = has_content(&reference.title);
    let date = has_content(&reference.publication_date);
    let publisher = has_content(&reference.publisher);
    let volume = has_content(&reference.volume);
    let pages = has_content(&reference.pages);
    let url = has_content(&reference.url);

    let author_string = reference.author.join(", ").trim().to_string();

    // Author and date present with nothing else to anchor the citation.
    let is_bare_citation = author && date && !publisher && !volume && !pages && !url;

    if date && STANDARDS_BODIES_RE.is_match(&reference.publication_date) {
        return Some(SkipReason::StandardsBodyInDate);
    }
    if publisher && STANDARDS_BODIES_RE.is_match(&reference.publisher) {
        return Some(SkipReason::StandardsBodyInPublisher);
    }
    if !author && title && !publisher && !date && !volume && !pages && !url {
        return Some(SkipReason::TitleOnly);
    }
    if publisher && date && !author && !title && !volume && !pages && !url {
        return Some(SkipReason::PublisherAndDateOnly);
    }
    if !author && !title && !date && !publisher && !volume && !pages && !url {
        return Some(SkipReason::Empty);
    }
    if !author && !title && date && !publisher && !volume && !pages && !url {
        return Some(SkipReason::DateOnly);
    }
    if is_bare_citation
        && title
        && reference
            .title
            .to_lowercase()
            .contains(&author_string.to_lowercase())
    {
        return Some(SkipReason::AuthorEchoedInTitle);
    }
    if is_bare_citation && !title {
        return Some(SkipReason::AuthorAndDateOnly);
    }

    None
}
