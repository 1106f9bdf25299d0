//! Sitemap rendering configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{SitemapError, SitemapResult};

/// Maximum number of `url` entries emitted into one document.
pub const DEFAULT_MAX_NODES: usize = 50_000;

/// Site URL used when none is configured.
pub const DEFAULT_SITE_URL: &str = "http://localhost:2368/";

/// Which entries survive when an index holds more than `max_nodes` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationPolicy {
    /// Cap in id order first, then sort the survivors newest-first.
    #[default]
    CapBeforeSort,
    /// Sort newest-first, then keep the most recent `max_nodes`.
    SortBeforeCap,
}

/// Settings shared by every index a manager owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Absolute base URL of the site, e.g. `https://example.com/`.
    pub site_url: String,
    /// Optional XSL stylesheet referenced from every document.
    pub stylesheet: Option<String>,
    pub max_nodes: usize,
    pub truncation: TruncationPolicy,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            stylesheet: None,
            max_nodes: DEFAULT_MAX_NODES,
            truncation: TruncationPolicy::default(),
        }
    }
}

impl SitemapConfig {
    /// Config for the given site with every other setting defaulted.
    pub fn for_site(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> SitemapResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| SitemapError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SitemapResult<()> {
        if self.max_nodes == 0 {
            return Err(SitemapError::Config("max_nodes must be at least 1".into()));
        }
        url::Url::parse(&self.site_url).map_err(|source| SitemapError::InvalidSiteUrl {
            url: self.site_url.clone(),
            source,
        })?;
        Ok(())
    }
}
