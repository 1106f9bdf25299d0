//! Content export loading.
//!
//! The export is a JSON object with one array of records per kind:
//! `{"posts": [...], "pages": [...], "tags": [...], "authors": [...]}`.
//! Each record carries its canonical `url`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sitemap_core::{ContentEvent, ContentKind, Record, SitemapManager};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentExport {
    pub posts: Vec<Record>,
    pub pages: Vec<Record>,
    pub tags: Vec<Record>,
    pub authors: Vec<Record>,
}

impl ContentExport {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read content export {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse content export {}", path.display()))
    }

    pub fn records(&self, kind: ContentKind) -> &[Record] {
        match kind {
            ContentKind::Posts => &self.posts,
            ContentKind::Pages => &self.pages,
            ContentKind::Tags => &self.tags,
            ContentKind::Authors => &self.authors,
        }
    }

    /// Feed every record into `manager` as an add event.
    ///
    /// Records without a URL are skipped. Returns the number applied.
    pub fn populate(&self, manager: &mut SitemapManager) -> usize {
        let mut applied = 0;
        for kind in ContentKind::ALL {
            for record in self.records(kind) {
                let Some(url) = record.url.as_deref().filter(|u| !u.trim().is_empty()) else {
                    tracing::warn!("Skipping {kind} record {} without a url", record.id);
                    continue;
                };
                manager.apply(ContentEvent::Added {
                    kind,
                    url: url.to_string(),
                    record: record.clone(),
                });
                applied += 1;
            }
        }
        tracing::info!("Loaded {applied} records into sitemap indexes");
        applied
    }
}
