//! The three structured-extraction operations, each a deterministic prompt
//! around a static JSON schema.

use serde_json::Value;

use super::json::{clean_llm_response, robust_json_extract};
use super::schema::{
    ACCESSION_IDS_SCHEMA, NPL_REFERENCES_SCHEMA, STANDARDS_REFERENCES_SCHEMA, format_schema,
};
use super::{LlmClient, LlmError};
use crate::{Accession, NplReference, StandardReference};

const EXTRACTION_SYSTEM_PROMPT: &str = "You are a highly deterministic data extraction engine. \
Your ONLY task is to output a single, valid JSON object that strictly adheres to the provided \
JSON Schema. Do not include any conversational text, explanations, or extraneous characters.";

impl LlmClient {
    /// Extract non-patent publication references from one text chunk.
    pub async fn extract_npl_references(
        &self,
        paragraph: &str,
    ) -> Result<Vec<NplReference>, LlmError> {
        let user_prompt = format!(
            "From the following text, extract all non-patent publication references.\n\
             Ensure the output is a single JSON object that strictly conforms to the JSON schema provided below.\n\
             \n\
             Mandatory rules:\n\
             - If no references are found, return a json object with an empty 'references' array.\n\
             - If there are multiple authors, provide them in a comma (,) separated array of strings.\n\
             - Ensure every key is followed by a colon (:), even if the value is an empty string (\"\").\n\
             - The key and its value MUST be separated by a colon (:), NOT a comma (,) in the JSON object. \
               For example, it must be \"volume\": \"42\", not \"volume\", \"42\".\n\
             - Only references with a date should be extracted.\n\
             - Please do not extract patent applications and publications.\n\
             \n\
             --- JSON SCHEMA ---\n{schema}\n--- END OF JSON SCHEMA ---\n\
             \n\
             --- TEXT TO ANALYZE ---\n{paragraph}\n--- END OF TEXT ---\n\
             \n\
             ONLY output the JSON object. Do not output anything else.",
            schema = format_schema(&NPL_REFERENCES_SCHEMA),
        );

        let response = self.chat(Some(EXTRACTION_SYSTEM_PROMPT), &user_prompt, None).await?;
        let value = robust_json_extract(&clean_llm_response(&response))?;
        Ok(collect_items(&value, "references"))
    }

    /// Extract biological/chemical accession identifiers from one text chunk.
    pub async fn extract_accessions(&self, paragraph: &str) -> Result<Vec<Accession>, LlmError> {
        let user_prompt = format!(
            "From the following text, extract all biological and chemical database accession IDs \
             (e.g., Genbank, Uniprot, Swissprot, PDB, RefSeq, NCBI, CAS, EMBL) and their corresponding database type.\n\
             Ensure the output is a single JSON object that strictly conforms to the JSON schema provided below.\n\
             \n\
             --- JSON SCHEMA ---\n{schema}\n--- END OF JSON SCHEMA ---\n\
             \n\
             --- TEXT TO ANALYZE ---\n{paragraph}\n--- END OF TEXT ---\n\
             \n\
             ONLY output the JSON object. Do not output anything else.",
            schema = format_schema(&ACCESSION_IDS_SCHEMA),
        );

        let response = self.chat(Some(EXTRACTION_SYSTEM_PROMPT), &user_prompt, None).await?;
        let value = robust_json_extract(&response)?;
        Ok(collect_items(&value, "accessions"))
    }

    /// Extract standards references, guided by the regex-detected candidate
    /// identifiers from the trigger scan.
    pub async fn extract_standards(
        &self,
        paragraph: &str,
        threegpp: &[String],
        ieee: &[String],
    ) -> Result<Vec<StandardReference>, LlmError> {
        let system_prompt = "You are a highly deterministic data extraction engine.\n\
            Your ONLY task is to output a single valid JSON object that conforms EXACTLY to the provided JSON Schema.\n\
            \n\
            CRITICAL RULES:\n\
            - Use ONLY the information explicitly present within the 'TEXT TO ANALYZE' block.\n\
            - DO NOT infer or hallucinate standards not explicitly written in the text.\n\
            - DO NOT include any explanations, commentary, or text outside the JSON object.";

        let user_prompt = format!(
            "The text may contain references to standards from the following lists:\n\
             \n\
             3GPP candidate standards: {threegpp}\n\
             IEEE candidate standards: {ieee}\n\
             \n\
             If any of these standards are indeed mentioned in the text, extract them as structured references.\n\
             \n\
             RULES:\n\
             - If no references are found, return a JSON object with an empty \"references\" array.\n\
             - Every key must appear in the JSON output, even if its value is an empty string \"\".\n\
             - Only include references explicitly appearing in the current text.\n\
             - Do not merge, infer, or deduplicate across previous requests.\n\
             \n\
             --- JSON SCHEMA ---\n{schema}\n--- END OF JSON SCHEMA ---\n\
             \n\
             --- TEXT TO ANALYZE ---\n{paragraph}\n--- END OF TEXT ---\n\
             \n\
             ONLY output the JSON object. Do not output anything else.",
            threegpp = serde_json::to_string(threegpp).unwrap_or_else(|_| "[]".into()),
            ieee = serde_json::to_string(ieee).unwrap_or_else(|_| "[]".into()),
            schema = format_schema(&STANDARDS_REFERENCES_SCHEMA),
        );

        let response = self.chat(Some(system_prompt), &user_prompt, None).await?;
        let value = robust_json_extract(&response)?;
        Ok(collect_items(&value, "references"))
    }
}

/// Deserialize the array under `key` item by item, dropping entries that do
/// not fit the expected shape instead of failing the whole response.
fn collect_items<T: serde::de::DeserializeOwned>(value: &Value, key: &str) -> Vec<T> {
    let Some(items) = value[key].as_array() else {
        tracing::warn!(key, "LLM response is missing the expected array");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                tracing::warn!(%error, "skipping malformed item in LLM response");
                None
            }
        })
        .collect()
}
