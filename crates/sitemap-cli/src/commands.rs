//! Command plumbing shared by the `sitemapgen` subcommands.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Value};

use sitemap_core::xml::format_lastmod;
use sitemap_core::{ContentKind, SitemapConfig, SitemapManager};

use crate::config::{load_config, resolve_content_path};
use crate::content::ContentExport;

/// Resolve config and content, then index every exported record.
pub fn load_manager(
    content: Option<&str>,
    site_url: Option<&str>,
    config_file: Option<&Path>,
) -> Result<(SitemapConfig, SitemapManager)> {
    let config = load_config(config_file, site_url)?;
    let content_path = resolve_content_path(content);
    tracing::info!("Content: {}", content_path.display());
    tracing::info!("Site: {}", config.site_url);

    let export = ContentExport::from_file(&content_path)?;
    let mut manager = SitemapManager::new(&config)?;
    export.populate(&mut manager);
    Ok((config, manager))
}

/// The `urlset` document for `kind`.
pub fn render(manager: &mut SitemapManager, kind: ContentKind) -> Result<String> {
    let xml = manager
        .resource_xml(kind)?
        .with_context(|| format!("no sitemap for {kind}"))?;
    Ok(xml.to_string())
}

/// Per-kind entry counts and last-modified times.
pub fn stats(config: &SitemapConfig, manager: &SitemapManager) -> Value {
    let kinds: Vec<Value> = ContentKind::ALL
        .iter()
        .filter_map(|kind| manager.index(*kind))
        .map(|index| {
            json!({
                "kind": index.kind(),
                "entries": index.len(),
                "rendered": index.len().min(index.max_nodes()),
                "last_modified": index.collection_last_modified().map(|ts| format_lastmod(&ts)),
            })
        })
        .collect();
    json!({
        "site_url": config.site_url,
        "total_entries": manager.len(),
        "kinds": kinds,
    })
}

/// Write a document to `out`, or to `fallback` when no path is given.
pub fn emit<W: Write>(xml: &str, out: Option<PathBuf>, fallback: &mut W) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(&path, xml)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Wrote {} bytes to {}", xml.len(), path.display());
        }
        None => writeln!(fallback, "{xml}")?,
    }
    Ok(())
}
