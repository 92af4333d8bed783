//! JSON schemas embedded into the extraction prompts.

use once_cell::sync::Lazy;
use serde_json::{Value, json};

pub(crate) static NPL_REFERENCES_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "references": {
                "type": "array",
                "description": "A list of non-patent literature references found in the text.",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "The main title of the article or document."
                        },
                        "author": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "A list of authors' names."
                        },
                        "publisher": {
                            "type": "string",
                            "description": "The journal, conference name, or publisher."
                        },
                        "publication_date": {
                            "type": "string",
                            "description": "The date of publication, in any format."
                        },
                        "volume": {
                            "type": "string",
                            "description": "The volume number of the publication (if applicable)."
                        },
                        "pages": {
                            "type": "string",
                            "description": "The page range or single page number (if applicable)."
                        },
                        "url": {
                            "type": "string",
                            "description": "A URL or DOI associated with the reference."
                        }
                    },
                    "required": [
                        "title", "author", "publisher", "publication_date",
                        "volume", "pages", "url"
                    ]
                }
            }
        },
        "required": ["references"]
    })
});

pub(crate) static ACCESSION_IDS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "accessions": {
                "type": "array",
                "description": "A list of accession IDs (CAS numbers, GenBank, etc.) found in the text.",
                "items": {
                    "type": "object",
                    "properties": {
                        "type": {
                            "type": "string",
                            "description": "The type of accession ID (e.g., CAS, Uniprot, GenBank)."
                        },
                        "id": {
                            "type": "string",
                            "description": "The unique accession number."
                        }
                    },
                    "required": ["type", "id"]
                }
            }
        },
        "required": ["accessions"]
    })
});

pub(crate) static STANDARDS_REFERENCES_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "references": {
                "type": "array",
                "description": "A list of standard references found in the text.",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "A short descriptive text following or associated with the standard (if present, else empty string)."
                        },
                        "standardisation_body": {
                            "type": "string",
                            "enum": ["3GPP", "IEEE", "ISO", "W3C"],
                            "description": "The organization name. Must be one of the enumerated values."
                        },
                        "accession_number": {
                            "type": "string",
                            "description": "The alphanumeric code uniquely identifying the standard (e.g., TS 23.501, 802.11be)."
                        },
                        "version": {
                            "type": "string",
                            "description": "The version or edition of the standard (if present, else empty string)."
                        }
                    },
                    "required": ["title", "standardisation_body", "accession_number", "version"]
                }
            }
        },
        "required": ["references"]
    })
});

/// Pretty-print a schema for embedding in a prompt.
pub(crate) fn format_schema(schema: &Value) -> String {
    serde_json::to_string_pretty(schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_are_objects() {
        assert!(NPL_REFERENCES_SCHEMA.is_object());
        assert!(ACCESSION_IDS_SCHEMA.is_object());
        assert!(STANDARDS_REFERENCES_SCHEMA.is_object());
    }

    #[test]
    fn test_format_schema_is_pretty() {
        let formatted = format_schema(&ACCESSION_IDS_SCHEMA);
        assert!(formatted.contains('\n'));
        assert!(formatted.contains("\"accessions\""));
    }
}
