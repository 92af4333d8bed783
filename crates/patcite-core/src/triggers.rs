//! Per-paragraph gating before any LLM call.
//!
//! A paragraph is only worth an LLM round-trip if it shows one of the
//! trigger signals: a plausible publication year, an existing `<nplcit`
//! tag, a biological-database keyword, a DOI, or a 3GPP/IEEE standard
//! identifier. The detected standard identifiers are also fed into the
//! standards-extraction prompt as candidates.

use once_cell::sync::Lazy;
use regex::Regex;

/// Years 1900-2099 on word boundaries; extraction bounds are enforced
/// downstream by the date extractor.
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

static GENBANK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:CAS|genbank|Genbank|GenBank|Uniprot|Swissprot|PDB|RefSeq|NCBI)\b").unwrap()
});

static DOI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:10\.[1-9]\d{3,8}/[-._;()/:A-Z0-9]+|https?://(?:dx\.)?doi\.org/10\.\d{4,9}/[-._;()/:A-Z0-9]+)\b",
    )
    .unwrap()
});

static THREEGPP_PRESENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b3GPP\b").unwrap());

static THREEGPP_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:TS|TR)\s*\d{1,3}(?:\.\d{1,3})?|CR\s*\d{1,4}|[RS][PSCN\d]-?\d{6,7})\b",
    )
    .unwrap()
});

static IEEE_PRESENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bIEEE\b").unwrap());

static IEEE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bP?\d{3,4}(?:\.[A-Za-z0-9]+)+\b").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Trigger signals detected in one paragraph.
#[derive(Debug, Clone, Default)]
pub struct TriggerScan {
    pub has_year: bool,
    pub nplcit_count: usize,
    pub has_genbank: bool,
    pub has_doi: bool,
    pub threegpp: Vec<String>,
    pub ieee: Vec<String>,
}

impl TriggerScan {
    /// Scan a paragraph. `raw_xml` is the verbatim inner XML (for the
    /// `<nplcit` tag count), `text` the tag-stripped rendition.
    pub fn scan(raw_xml: &str, text: &str) -> Self {
        TriggerScan {
            has_year: YEAR_RE.is_match(text),
            nplcit_count: raw_xml.matches("<nplcit").count(),
            has_genbank: GENBANK_RE.is_match(text),
            has_doi: DOI_RE.is_match(text),
            threegpp: extract_3gpp_identifiers(text),
            ieee: extract_ieee_identifiers(text),
        }
    }

    /// Whether any trigger fired at all.
    pub fn any(&self) -> bool {
        self.has_year
            || self.nplcit_count > 0
            || self.has_genbank
            || self.has_doi
            || self.has_standards()
    }

    /// NPL extraction runs on year or DOI evidence.
    pub fn wants_npl(&self) -> bool {
        self.has_year || self.has_doi
    }

    /// Accession extraction runs on biological-database keywords.
    pub fn wants_accessions(&self) -> bool {
        self.has_genbank
    }

    pub fn has_standards(&self) -> bool {
        !self.threegpp.is_empty() || !self.ieee.is_empty()
    }
}

/// Candidate 3GPP identifiers (TS/TR specs, change requests, contribution
/// codes), uppercased with collapsed whitespace. Empty unless the literal
/// `3GPP` appears in the text.
pub fn extract_3gpp_identifiers(text: &str) -> Vec<String> {
    if !THREEGPP_PRESENT_RE.is_match(text) {
        return Vec::new();
    }
    THREEGPP_ID_RE
        .find_iter(text)
        .map(|m| WHITESPACE_RE.replace_all(m.as_str().trim(), " ").to_uppercase())
        .collect()
}

/// Candidate IEEE standard/project numbers. Empty unless the literal
/// `IEEE` appears in the text.
pub fn extract_ieee_identifiers(text: &str) -> Vec<String> {
    if !IEEE_PRESENT_RE.is_match(text) {
        return Vec::new();
    }
    IEEE_ID_RE
        .find_iter(text)
        .map(|m| m.as_str().to_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_trigger() {
        let scan = TriggerScan::scan("", "published in 2015 by the institute");
        assert!(scan.has_year);
        assert!(scan.wants_npl());
    }

    #[test]
    fn test_no_year_trigger_inside_longer_number() {
        let scan = TriggerScan::scan("", "part number 120154 only");
        assert!(!scan.has_year);
    }

    #[test]
    fn test_nplcit_count() {
        let raw = r#"text <nplcit id="a"/> more <nplcit id="b"/>"#;
        let scan = TriggerScan::scan(raw, "text more");
        assert_eq!(scan.nplcit_count, 2);
        assert!(scan.any());
    }

    #[test]
    fn test_genbank_trigger() {
        let scan = TriggerScan::scan("", "deposited under GenBank accession AB123456");
        assert!(scan.has_genbank);
        assert!(scan.wants_accessions());
    }

    #[test]
    fn test_doi_trigger() {
        let scan = TriggerScan::scan("", "available at doi 10.1002/mds.26125 online");
        assert!(scan.has_doi);
        assert!(scan.wants_npl());
    }

    #[test]
    fn test_3gpp_identifiers() {
        let ids = extract_3gpp_identifiers("the 3GPP specification TS 23.501 and TR 38.901 apply");
        assert_eq!(ids, vec!["TS 23.501", "TR 38.901"]);
    }

    #[test]
    fn test_3gpp_requires_body_mention() {
        let ids = extract_3gpp_identifiers("specification TS 23.501 applies");
        assert!(ids.is_empty());
    }

    #[test]
    fn test_ieee_identifiers() {
        let ids = extract_ieee_identifiers("compliant with IEEE 802.11be wireless standard");
        assert_eq!(ids, vec!["802.11BE"]);
    }

    #[test]
    fn test_ieee_requires_body_mention() {
        let ids = extract_ieee_identifiers("compliant with 802.11be only");
        assert!(ids.is_empty());
    }

    #[test]
    fn test_nothing_triggers_on_plain_text() {
        let scan = TriggerScan::scan("", "a paragraph about mechanical fasteners");
        assert!(!scan.any());
    }
}
