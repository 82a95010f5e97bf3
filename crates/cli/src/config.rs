use anyhow::{anyhow, Context, Result};
use gardener_graph::OutputFormat;
use gardener_solver::Language;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of a `--config` TOML file; every key is optional
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GardenerConfig {
    pub language: Option<String>,
    pub jobs: Option<usize>,
    pub recursive_limit: Option<usize>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    pub format: Option<String>,
}

impl GardenerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.jobs == Some(0) {
            return Err(anyhow!("jobs must be at least 1"));
        }
        if let Some(language) = &self.language {
            language.parse::<Language>()?;
        }
        if let Some(format) = &self.format {
            format.parse::<OutputFormat>()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_config() {
        let config = GardenerConfig::parse(
            r#"
            language = "python"
            jobs = 4
            recursive_limit = 3
            exclude = ["build/", "\\.pb\\.h$"]
            include_paths = ["/usr/include"]
            format = "xml"
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            GardenerConfig {
                language: Some("python".into()),
                jobs: Some(4),
                recursive_limit: Some(3),
                exclude: vec!["build/".into(), r"\.pb\.h$".into()],
                include_paths: vec![PathBuf::from("/usr/include")],
                format: Some("xml".into()),
            }
        );
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(GardenerConfig::parse("").unwrap(), GardenerConfig::default());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(GardenerConfig::parse("jobs = 0").is_err());
        assert!(GardenerConfig::parse(r#"language = "cobol""#).is_err());
        assert!(GardenerConfig::parse(r#"format = "png""#).is_err());
        assert!(GardenerConfig::parse("threads = 2").is_err());
    }
}
