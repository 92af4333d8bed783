//! Core domain types and text heuristics for patent citation extraction.

use serde::{Deserialize, Serialize};

pub mod config_file;
pub mod corrections;
pub mod date;
pub mod filters;
pub mod llm;
pub mod triggers;

// Re-export for convenience
pub use corrections::ReferenceCorrector;
pub use date::{DATE_SENTINEL, DateExtractor};
pub use filters::{SkipReason, skip_reason};
pub use llm::{LlmClient, LlmError};
pub use triggers::TriggerScan;

/// A non-patent-literature reference as extracted by the LLM.
///
/// Every field defaults to empty so partially filled LLM output
/// deserializes without errors; absence and emptiness are equivalent
/// throughout the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NplReference {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Vec<String>,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub publication_date: String,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub pages: String,
    #[serde(default)]
    pub url: String,
}

/// A biological/chemical database accession identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accession {
    /// Database type, e.g. "GenBank", "CAS", "Uniprot".
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: String,
}

impl Accession {
    /// An accession is only usable with both a real type and an id.
    pub fn is_valid(&self) -> bool {
        let kind = self.kind.trim();
        !kind.is_empty() && !kind.eq_ignore_ascii_case("none") && !self.id.trim().is_empty()
    }
}

/// A technical-standard reference (3GPP, IEEE, ISO, W3C).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardReference {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub standardisation_body: String,
    #[serde(default)]
    pub accession_number: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub publication_date: String,
    #[serde(default)]
    pub url: String,
}
