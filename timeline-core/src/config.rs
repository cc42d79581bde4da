use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default branch colors, cycled in order of first appearance
pub const DEFAULT_BRANCH_PALETTE: [&str; 6] = [
    "#0969da",
    "#1a7f37",
    "#bf8700",
    "#8250df",
    "#cf222e",
    "#1b7c83",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("branch palette must contain at least one color")]
    EmptyPalette,
}

/// Timeline configuration, usually read from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub timeline: TimelineSection,
    pub palette: PaletteConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSection {
    /// Cap on merged/closed PRs shown; `None` or 0 keeps everything
    pub max_past_prs: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub branches: Vec<String>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            branches: DEFAULT_BRANCH_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl TimelineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: TimelineConfig = toml::from_str(source).context("Invalid timeline config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "loaded timeline config");
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.palette.branches.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(())
    }

    /// Effective past-PR cap (0 means unlimited)
    pub fn max_past_prs(&self) -> Option<usize> {
        self.timeline.max_past_prs.filter(|&n| n > 0)
    }

    /// Override the file value with a command-line flag, if given
    pub fn with_max_past_prs(mut self, max: Option<usize>) -> Self {
        if max.is_some() {
            self.timeline.max_past_prs = max;
        }
        self
    }
}
