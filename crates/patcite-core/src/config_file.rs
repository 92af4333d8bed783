use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub llm: Option<LlmSection>,
    pub splitter: Option<SplitterSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmSection {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub max_retries: Option<u32>,
    pub initial_delay_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitterSection {
    pub threshold: Option<usize>,
}

/// Platform config directory path: `<config_dir>/patcite/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("patcite").join("config.toml"))
}

/// Load config by cascading CWD `.patcite.toml` over the platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".patcite.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        llm: Some(LlmSection {
            endpoint: overlay
                .llm
                .as_ref()
                .and_then(|l| l.endpoint.clone())
                .or_else(|| base.llm.as_ref().and_then(|l| l.endpoint.clone())),
            model: overlay
                .llm
                .as_ref()
                .and_then(|l| l.model.clone())
                .or_else(|| base.llm.as_ref().and_then(|l| l.model.clone())),
            max_retries: overlay
                .llm
                .as_ref()
                .and_then(|l| l.max_retries)
                .or_else(|| base.llm.as_ref().and_then(|l| l.max_retries)),
            initial_delay_secs: overlay
                .llm
                .as_ref()
                .and_then(|l| l.initial_delay_secs)
                .or_else(|| base.llm.as_ref().and_then(|l| l.initial_delay_secs)),
        }),
        splitter: Some(SplitterSection {
            threshold: overlay
                .splitter
                .as_ref()
                .and_then(|s| s.threshold)
                .or_else(|| base.splitter.as_ref().and_then(|s| s.threshold)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigFile {
            llm: Some(LlmSection {
                endpoint: Some("http://localhost:9999/v1/chat/completions".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            parsed.llm.unwrap().endpoint.unwrap(),
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn test_absent_fields_deserialize_as_none() {
        let toml_str = "[llm]\nmodel = \"some-model\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let llm = parsed.llm.unwrap();
        assert_eq!(llm.model.as_deref(), Some("some-model"));
        assert!(llm.endpoint.is_none());
        assert!(parsed.splitter.is_none());
    }

    #[test]
    fn test_merge_overlay_wins() {
        let base = ConfigFile {
            llm: Some(LlmSection {
                model: Some("base-model".to_string()),
                max_retries: Some(5),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            llm: Some(LlmSection {
                model: Some("overlay-model".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        let llm = merged.llm.unwrap();
        assert_eq!(llm.model.as_deref(), Some("overlay-model"));
        // Base values survive when the overlay leaves them unset.
        assert_eq!(llm.max_retries, Some(5));
    }

    #[test]
    fn test_merge_splitter_threshold() {
        let base = ConfigFile {
            splitter: Some(SplitterSection { threshold: Some(800) }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.splitter.unwrap().threshold, Some(800));
    }
}
