use crate::patent::substitute_patent_numbers;
use crate::rules::{SplitRule, default_rules};

/// Target maximum chunk size, in characters.
pub const DEFAULT_THRESHOLD: usize = 1000;

/// Recursion guard for the cascade. The rule list shrinks on every level, so
/// real inputs never get close; the guard caps pathological rule sets.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Configuration for [`ParagraphSplitter`].
///
/// The rule list is an explicit, ordered sequence injected at construction —
/// rule order is visible and each rule is testable in isolation.
#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub(crate) threshold: usize,
    pub(crate) max_depth: usize,
    pub(crate) rules: Vec<SplitRule>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_depth: DEFAULT_MAX_DEPTH,
            rules: default_rules(),
        }
    }
}

impl SplitterConfig {
    pub fn builder() -> SplitterConfigBuilder {
        SplitterConfigBuilder::default()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

/// Builder for [`SplitterConfig`].
#[derive(Debug, Clone, Default)]
pub struct SplitterConfigBuilder {
    threshold: Option<usize>,
    max_depth: Option<usize>,
    rules: Option<Vec<SplitRule>>,
}

impl SplitterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Replace the default rule list with a custom ordered sequence.
    pub fn rules(mut self, rules: Vec<SplitRule>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn build(self) -> SplitterConfig {
        SplitterConfig {
            threshold: self.threshold.unwrap_or(DEFAULT_THRESHOLD),
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            rules: self.rules.unwrap_or_else(default_rules),
        }
    }
}

/// Decomposes one long text block into an ordered sequence of chunks small
/// enough for independent LLM calls.
///
/// Rules are tried in order: a rule that produces 2+ parts hands each part to
/// the *remaining* rules recursively; a rule that finds nothing falls through
/// to the next rule on the original text. When no rule matches, the text is
/// returned unsplit — never an error, even above the threshold.
#[derive(Debug, Clone, Default)]
pub struct ParagraphSplitter {
    config: SplitterConfig,
}

impl ParagraphSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SplitterConfig) -> Self {
        Self { config }
    }

    /// Split `text` into cleaned chunks with patent identifiers replaced by
    /// the `PATENT` placeholder.
    ///
    /// Empty or whitespace-only input yields an empty vec. Text at or under
    /// the threshold is returned as a single substituted chunk.
    pub fn split_and_clean(&self, text: &str) -> Vec<String> {
        let clean = text.trim();
        if clean.is_empty() {
            return Vec::new();
        }
        if char_len(clean) <= self.config.threshold {
            let substituted = substitute_patent_numbers(clean);
            return if substituted.is_empty() { Vec::new() } else { vec![substituted] };
        }

        let parts = self.cascade(clean, &self.config.rules, 0);

        let mut output = Vec::new();
        for part in parts {
            if char_len(&part) > self.config.threshold {
                tracing::warn!(
                    chars = char_len(&part),
                    threshold = self.config.threshold,
                    "chunk still exceeds threshold after splitting"
                );
            }
            let substituted = substitute_patent_numbers(&part);
            if !substituted.is_empty() {
                output.push(substituted);
            }
        }
        output
    }

    fn cascade(&self, text: &str, rules: &[SplitRule], depth: usize) -> Vec<String> {
        if depth >= self.config.max_depth {
            tracing::warn!(depth, "split recursion limit reached");
            return vec![text.to_string()];
        }
        for (i, rule) in rules.iter().enumerate() {
            let parts = (rule.apply)(text);
            if parts.len() > 1 {
                tracing::debug!(rule = rule.name, parts = parts.len(), "split rule matched");
                let rest = &rules[i + 1..];
                return parts
                    .iter()
                    .flat_map(|p| self.cascade(p, rest, depth + 1))
                    .collect();
            }
        }
        vec![text.to_string()]
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
