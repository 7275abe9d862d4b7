//! Settings loading from deadfile.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Settings file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "deadfile.toml";

/// Main configuration structure for deadfile.toml.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DeadfileConfig {
    /// Candidate file extensions, with or without leading dot.
    pub extensions: Option<Vec<String>>,
    /// Directory names pruned from the walk.
    pub exclude: Option<Vec<String>>,
    /// Worker count.
    pub jobs: Option<usize>,
    /// Alias config file, relative to the project root.
    pub tsconfig: Option<String>,
    /// Extra framework-exempt file names.
    pub exempt: Option<Vec<String>>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl DeadfileConfig {
    /// True when `[output] format = "json"`.
    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// Loads configuration from deadfile.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<DeadfileConfig>> {
    let path = root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg = parse_config(&content)?;
    Ok(Some(cfg))
}

/// Parse settings text.
pub fn parse_config(content: &str) -> Result<DeadfileConfig> {
    toml::from_str(content).context("Invalid deadfile.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let cfg = parse_config(
            r#"
extensions = ["tsx", ".ts", "js"]
exclude = ["node_modules", "coverage"]
jobs = 4
tsconfig = "tsconfig.base.json"
exempt = ["template.tsx"]

[output]
format = "json"
"#,
        )
        .unwrap();

        assert_eq!(
            cfg.extensions,
            Some(vec!["tsx".to_string(), ".ts".to_string(), "js".to_string()])
        );
        assert_eq!(cfg.exclude.as_ref().map(Vec::len), Some(2));
        assert_eq!(cfg.jobs, Some(4));
        assert_eq!(cfg.tsconfig.as_deref(), Some("tsconfig.base.json"));
        assert_eq!(cfg.exempt, Some(vec!["template.tsx".to_string()]));
        assert!(cfg.wants_json());
    }

    #[test]
    fn test_empty_config() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg, DeadfileConfig::default());
        assert!(!cfg.wants_json());
    }

    #[test]
    fn test_invalid_config() {
        assert!(parse_config("jobs = \"many\"").is_err());
        assert!(parse_config("unknown_key = 1").is_err());
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = std::env::temp_dir().join(format!("deadfile_config_missing_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        assert!(load_config(&dir).unwrap().is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_root() {
        let dir = std::env::temp_dir().join(format!("deadfile_config_load_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE_NAME), "jobs = 2\n").unwrap();

        let cfg = load_config(&dir).unwrap().unwrap();
        assert_eq!(cfg.jobs, Some(2));

        std::fs::remove_dir_all(&dir).ok();
    }
}
