//! The per-document extraction pipeline: ingest paragraphs, gate on
//! triggers, split into chunks, call the LLM per chunk, correct and filter
//! the results, and aggregate everything into a catalog.

use patcite_catalog::CitationCatalog;
use patcite_core::{LlmClient, ReferenceCorrector, TriggerScan, skip_reason};
use patcite_ingest::extract_paragraphs;
use patcite_segment::{ParagraphSplitter, redact_for_accessions};

/// Counters reported after processing one document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentStats {
    pub paragraphs: usize,
    pub triggered: usize,
    pub chunks: usize,
    pub npl_added: usize,
    pub npl_skipped: usize,
    pub npl_corrected: usize,
    pub accessions_added: usize,
    pub standards_added: usize,
}

pub struct Pipeline {
    client: LlmClient,
    splitter: ParagraphSplitter,
    corrector: ReferenceCorrector,
}

impl Pipeline {
    pub fn new(client: LlmClient, splitter: ParagraphSplitter) -> Self {
        Self {
            client,
            splitter,
            corrector: ReferenceCorrector::new(),
        }
    }

    pub fn client(&self) -> &LlmClient {
        &self.client
    }

    /// Process one patent-application XML document into a citation catalog.
    /// Paragraphs are handled sequentially; a failed LLM call is logged and
    /// skipped rather than aborting the document.
    pub async fn process_document(
        &self,
        xml: &str,
    ) -> anyhow::Result<(CitationCatalog, DocumentStats)> {
        let paragraphs = extract_paragraphs(xml)?;
        let mut catalog = CitationCatalog::new();
        let mut stats = DocumentStats {
            paragraphs: paragraphs.len(),
            ..Default::default()
        };

        for paragraph in &paragraphs {
            let scan = TriggerScan::scan(&paragraph.raw_xml, &paragraph.text);
            if !scan.any() {
                continue;
            }
            stats.triggered += 1;

            let chunks = self.splitter.split_and_clean(&paragraph.text);
            stats.chunks += chunks.len();

            if scan.wants_npl() {
                for chunk in &chunks {
                    self.extract_npl_into(chunk, &paragraph.num, &mut catalog, &mut stats)
                        .await;
                }
            }

            if scan.wants_accessions() {
                for chunk in &chunks {
                    let redacted = redact_for_accessions(chunk);
                    self.extract_accessions_into(&redacted, &paragraph.num, &mut catalog, &mut stats)
                        .await;
                }
            }

            if scan.has_standards() {
                for chunk in &chunks {
                    self.extract_standards_into(chunk, &scan, &paragraph.num, &mut catalog, &mut stats)
                        .await;
                }
            }
        }

        Ok((catalog, stats))
    }

    async fn extract_npl_into(
        &self,
        chunk: &str,
        paragraph_num: &str,
        catalog: &mut CitationCatalog,
        stats: &mut DocumentStats,
    ) {
        let references = match self.client.extract_npl_references(chunk).await {
            Ok(references) => references,
            Err(error) => {
                tracing::warn!(paragraph = paragraph_num, %error, "NPL extraction failed");
                return;
            }
        };
        for reference in references {
            let (corrected, was_corrected) = self.corrector.correct(reference);
            if was_corrected {
                stats.npl_corrected += 1;
            }
            if let Some(reason) = skip_reason(&corrected) {
                tracing::debug!(paragraph = paragraph_num, %reason, "skipping NPL reference");
                stats.npl_skipped += 1;
                continue;
            }
            if catalog.add_npl_reference(corrected, paragraph_num).is_some() {
                stats.npl_added += 1;
            }
        }
    }

    async fn extract_accessions_into(
        &self,
        chunk: &str,
        paragraph_num: &str,
        catalog: &mut CitationCatalog,
        stats: &mut DocumentStats,
    ) {
        let accessions = match self.client.extract_accessions(chunk).await {
            Ok(accessions) => accessions,
            Err(error) => {
                tracing::warn!(paragraph = paragraph_num, %error, "accession extraction failed");
                return;
            }
        };
        for accession in accessions {
            if !accession.is_valid() {
                tracing::debug!(
                    paragraph = paragraph_num,
                    kind = %accession.kind,
                    id = %accession.id,
                    "skipping accession with missing type or id"
                );
                continue;
            }
            catalog.add_accession(accession, paragraph_num);
            stats.accessions_added += 1;
        }
    }

    async fn extract_standards_into(
        &self,
        chunk: &str,
        scan: &TriggerScan,
        paragraph_num: &str,
        catalog: &mut CitationCatalog,
        stats: &mut DocumentStats,
    ) {
        let standards = match self
            .client
            .extract_standards(chunk, &scan.threegpp, &scan.ieee)
            .await
        {
            Ok(standards) => standards,
            Err(error) => {
                tracing::warn!(paragraph = paragraph_num, %error, "standards extraction failed");
                return;
            }
        };
        for standard in standards {
            catalog.add_standard(standard, paragraph_num);
            stats.standards_added += 1;
        }
    }
}
