//! Paragraph segmentation for LLM-based citation extraction from patent text.
//!
//! A paragraph is decomposed by an ordered list of structural split rules,
//! applied through cascading recursion, into chunks small enough for one LLM
//! call each. Patent/publication identifiers are collapsed into a `PATENT`
//! placeholder, and a separate redaction pass removes biological/chemical
//! clutter from text destined for the accession-extraction prompt.

pub mod patent;
pub mod redact;
pub mod rules;
pub mod splitter;

pub use patent::{PATENT_PLACEHOLDER, contains_patent_identifier, substitute_patent_numbers};
pub use redact::{DEFAULT_MAX_TOKEN_LEN, redact_for_accessions, redact_for_accessions_with_max_len};
pub use rules::{EMBODIMENT_MARKER, EXAMPLE_MARKER, SplitRule, default_rules};
pub use splitter::{
    DEFAULT_MAX_DEPTH, DEFAULT_THRESHOLD, ParagraphSplitter, SplitterConfig, SplitterConfigBuilder,
};
