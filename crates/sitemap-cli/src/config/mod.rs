//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use sitemap_core::SitemapConfig;

pub const SITE_URL_ENV: &str = "SITEMAP_SITE_URL";
pub const CONTENT_ENV: &str = "SITEMAP_CONTENT";

/// Resolve the content export path: flag, then `SITEMAP_CONTENT`, then `./content.json`.
pub fn resolve_content_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(CONTENT_ENV) {
        return PathBuf::from(env_path);
    }

    PathBuf::from("content.json")
}

/// Build the effective sitemap config.
///
/// Starts from the config file when one is given, then applies the site URL
/// from the flag or `SITEMAP_SITE_URL`.
pub fn load_config(config_file: Option<&Path>, site_url: Option<&str>) -> Result<SitemapConfig> {
    let mut config = match config_file {
        Some(path) => SitemapConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SitemapConfig::default(),
    };

    if let Some(url) = site_url
        .map(str::to_string)
        .or_else(|| std::env::var(SITE_URL_ENV).ok())
    {
        config.site_url = url;
    }

    config.validate().context("invalid sitemap config")?;
    Ok(config)
}
