//! Patent-application XML ingestion.
//!
//! Streams over a document's `<p num="…">` elements and yields, for each,
//! the verbatim inner XML (needed downstream to count existing `<nplcit`
//! tags) together with a tag-stripped plain-text rendition for the LLM
//! pipeline. Paragraphs without a `num` attribute are skipped.

use std::path::Path;

use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use thiserror::Error;

static XML_TAGS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One numbered paragraph from a patent-application document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    /// The `num` attribute, e.g. "0042".
    pub num: String,
    /// Verbatim inner XML, nested tags included.
    pub raw_xml: String,
    /// Tag-stripped, entity-unescaped, trimmed text.
    pub text: String,
}

/// Extract all numbered paragraphs from an XML document string.
pub fn extract_paragraphs(xml: &str) -> Result<Vec<Paragraph>, IngestError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) if e.name().as_ref() == b"p" => {
                let num = e
                    .try_get_attribute("num")
                    .ok()
                    .flatten()
                    .map(|attr| String::from_utf8_lossy(&attr.value).to_string());
                // Span of the verbatim inner content, nested markup and
                // entities untouched.
                let span = reader.read_to_end(e.name())?;
                let raw = &xml[span.start as usize..span.end as usize];
                if let Some(num) = num {
                    paragraphs.push(Paragraph {
                        num,
                        text: strip_tags(raw),
                        raw_xml: raw.to_string(),
                    });
                }
            }
            Event::Empty(ref e) if e.name().as_ref() == b"p" => {
                let num = e
                    .try_get_attribute("num")
                    .ok()
                    .flatten()
                    .map(|attr| String::from_utf8_lossy(&attr.value).to_string());
                if let Some(num) = num {
                    paragraphs.push(Paragraph {
                        num,
                        raw_xml: String::new(),
                        text: String::new(),
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Read and extract paragraphs from an XML file.
pub fn paragraphs_from_file(path: &Path) -> Result<Vec<Paragraph>, IngestError> {
    let xml = std::fs::read_to_string(path)?;
    extract_paragraphs(&xml)
}

/// Remove markup and decode entities from raw inner XML.
fn strip_tags(raw: &str) -> String {
    let stripped = XML_TAGS_RE.replace_all(raw, "");
    match quick_xml::escape::unescape(&stripped) {
        Ok(unescaped) => unescaped.trim().to_string(),
        Err(_) => stripped.trim().to_string(),
    }
}
