//! Aggregation of extracted citations and serialization to the
//! `ep-citation-catalog` XML schema.
//!
//! All citation kinds share one sequential counter, so `ref-ncitNNNN`
//! identifiers reflect the order of discovery across the whole document.
//! NPL references are deduplicated globally on their author/title/
//! publisher/date key.

use std::collections::HashSet;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

use patcite_core::{Accession, NplReference, StandardReference};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
struct NplCitation {
    seq: usize,
    paragraph_num: String,
    reference: NplReference,
}

#[derive(Debug, Clone)]
struct AccessionCitation {
    seq: usize,
    paragraph_num: String,
    accession: Accession,
}

#[derive(Debug, Clone)]
struct StandardCitation {
    seq: usize,
    paragraph_num: String,
    standard: StandardReference,
}

/// Citation counts for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub npl: usize,
    pub accessions: usize,
    pub standards: usize,
}

impl CatalogSummary {
    pub fn total(&self) -> usize {
        self.npl + self.accessions + self.standards
    }
}

/// Unified collection of all citations extracted from one document.
#[derive(Debug, Clone)]
pub struct CitationCatalog {
    npl: Vec<NplCitation>,
    accessions: Vec<AccessionCitation>,
    standards: Vec<StandardCitation>,
    next_seq: usize,
    npl_keys: HashSet<(String, String, String, String)>,
}

impl Default for CitationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CitationCatalog {
    pub fn new() -> Self {
        Self {
            npl: Vec::new(),
            accessions: Vec::new(),
            standards: Vec::new(),
            next_seq: 1,
            npl_keys: HashSet::new(),
        }
    }

    fn take_seq(&mut self) -> usize {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Add an NPL reference, deduplicating on the lowercased author-string/
    /// title/publisher/date key. Returns the assigned citation id, or `None`
    /// for a duplicate.
    pub fn add_npl_reference(
        &mut self,
        reference: NplReference,
        paragraph_num: &str,
    ) -> Option<String> {
        let key = (
            reference.author.join(", ").trim().to_lowercase(),
            reference.title.trim().to_lowercase(),
            reference.publisher.trim().to_lowercase(),
            reference.publication_date.trim().to_lowercase(),
        );
        if !self.npl_keys.insert(key) {
            return None;
        }
        let seq = self.take_seq();
        self.npl.push(NplCitation {
            seq,
            paragraph_num: paragraph_num.to_string(),
            reference,
        });
        Some(citation_id(seq))
    }

    /// Add a biological/chemical accession identifier.
    pub fn add_accession(&mut self, accession: Accession, paragraph_num: &str) -> String {
        let seq = self.take_seq();
        self.accessions.push(AccessionCitation {
            seq,
            paragraph_num: paragraph_num.to_string(),
            accession,
        });
        citation_id(seq)
    }

    /// Add a technical-standard reference.
    pub fn add_standard(&mut self, standard: StandardReference, paragraph_num: &str) -> String {
        let seq = self.take_seq();
        self.standards.push(StandardCitation {
            seq,
            paragraph_num: paragraph_num.to_string(),
            standard,
        });
        citation_id(seq)
    }

    pub fn is_empty(&self) -> bool {
        self.summary().total() == 0
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            npl: self.npl.len(),
            accessions: self.accessions.len(),
            standards: self.standards.len(),
        }
    }

    /// Render the `ep-citation-catalog` document, citations ordered by their
    /// sequential id.
    pub fn to_xml_string(&self) -> Result<String, CatalogError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("ep-citation-catalog")))?;

        enum Entry<'a> {
            Npl(&'a NplCitation),
            Accession(&'a AccessionCitation),
            Standard(&'a StandardCitation),
        }
        let mut entries: Vec<(usize, Entry)> = Vec::new();
        entries.extend(self.npl.iter().map(|c| (c.seq, Entry::Npl(c))));
        entries.extend(self.accessions.iter().map(|c| (c.seq, Entry::Accession(c))));
        entries.extend(self.standards.iter().map(|c| (c.seq, Entry::Standard(c))));
        entries.sort_by_key(|(seq, _)| *seq);

        for (seq, entry) in entries {
            let npl_type = match entry {
                Entry::Npl(_) => "s",
                Entry::Accession(_) => "e",
                Entry::Standard(_) => "t",
            };
            let mut nplcit = BytesStart::new("nplcit");
            nplcit.push_attribute(("id", citation_id(seq).as_str()));
            nplcit.push_attribute(("npl-type", npl_type));
            nplcit.push_attribute(("crossrefid", crossref_id(seq).as_str()));
            writer.write_event(Event::Start(nplcit))?;

            match entry {
                Entry::Npl(citation) => write_article(&mut writer, &citation.reference)?,
                Entry::Accession(citation) => write_online(&mut writer, &citation.accession)?,
                Entry::Standard(citation) => write_standard(&mut writer, &citation.standard)?,
            }

            writer.write_event(Event::End(BytesEnd::new("nplcit")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("ep-citation-catalog")))?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    /// Serialize and write the catalog to `path`.
    pub fn save_to_file(&self, path: &Path) -> Result<(), CatalogError> {
        let xml = self.to_xml_string()?;
        std::fs::write(path, xml)?;
        let summary = self.summary();
        tracing::info!(
            path = %path.display(),
            npl = summary.npl,
            accessions = summary.accessions,
            standards = summary.standards,
            "citation catalog saved"
        );
        Ok(())
    }

    /// Paragraph numbers that contributed at least one citation.
    pub fn paragraph_numbers(&self) -> Vec<&str> {
        let mut nums: Vec<&str> = self
            .npl
            .iter()
            .map(|c| c.paragraph_num.as_str())
            .chain(self.accessions.iter().map(|c| c.paragraph_num.as_str()))
            .chain(self.standards.iter().map(|c| c.paragraph_num.as_str()))
            .collect();
        nums.sort_unstable();
        nums.dedup();
        nums
    }
}

fn citation_id(seq: usize) -> String {
    format!("ref-ncit{:04}", seq)
}

fn crossref_id(seq: usize) -> String {
    format!("ncit{:04}", seq)
}

type XmlWriter = Writer<Vec<u8>>;

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), CatalogError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_empty_element(writer: &mut XmlWriter, name: &str) -> Result<(), CatalogError> {
    writer.write_event(Event::Empty(BytesStart::new(name)))?;
    Ok(())
}

fn write_article(writer: &mut XmlWriter, reference: &NplReference) -> Result<(), CatalogError> {
    writer.write_event(Event::Start(BytesStart::new("article")))?;

    for author_name in &reference.author {
        writer.write_event(Event::Start(BytesStart::new("author")))?;
        write_text_element(writer, "name", author_name)?;
        writer.write_event(Event::End(BytesEnd::new("author")))?;
    }

    write_text_element(writer, "atl", &reference.title)?;

    writer.write_event(Event::Start(BytesStart::new("serial")))?;
    write_text_element(writer, "sertitle", &reference.publisher)?;
    writer.write_event(Event::Start(BytesStart::new("pubdate")))?;
    write_text_element(writer, "sdate", &reference.publication_date)?;
    write_empty_element(writer, "edate")?;
    writer.write_event(Event::End(BytesEnd::new("pubdate")))?;
    if !reference.volume.is_empty() {
        write_text_element(writer, "vid", &reference.volume)?;
    }
    writer.write_event(Event::End(BytesEnd::new("serial")))?;

    if !reference.pages.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("location")))?;
        writer.write_event(Event::Start(BytesStart::new("pp")))?;
        let (first, last) = split_pages(&reference.pages);
        write_text_element(writer, "ppf", first)?;
        write_text_element(writer, "ppl", last)?;
        writer.write_event(Event::End(BytesEnd::new("pp")))?;
        writer.write_event(Event::End(BytesEnd::new("location")))?;
    }

    if !reference.url.is_empty() {
        write_text_element(writer, "url", &reference.url)?;
    }

    writer.write_event(Event::End(BytesEnd::new("article")))?;
    Ok(())
}

/// Split a page range like `3790-3799` into first/last page.
fn split_pages(pages: &str) -> (&str, &str) {
    match pages.split_once('-') {
        Some((first, last)) => (first.trim(), last.trim()),
        None => (pages.trim(), ""),
    }
}

fn write_online(writer: &mut XmlWriter, accession: &Accession) -> Result<(), CatalogError> {
    writer.write_event(Event::Start(BytesStart::new("online")))?;
    write_text_element(writer, "online-title", &accession.kind)?;
    write_text_element(writer, "absno", &accession.id)?;
    write_empty_element(writer, "avail")?;
    writer.write_event(Event::End(BytesEnd::new("online")))?;
    Ok(())
}

fn write_standard(writer: &mut XmlWriter, standard: &StandardReference) -> Result<(), CatalogError> {
    writer.write_event(Event::Start(BytesStart::new("standard")))?;
    write_text_element(writer, "std-title", &standard.title)?;
    write_text_element(writer, "std-body", &standard.standardisation_body)?;
    write_text_element(writer, "std-number", &standard.accession_number)?;
    if !standard.version.is_empty() {
        write_text_element(writer, "std-version", &standard.version)?;
    }
    writer.write_event(Event::End(BytesEnd::new("standard")))?;
    Ok(())
}
