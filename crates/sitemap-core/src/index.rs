//! The incrementally-updated record index and its cached document.
//!
//! ## Cache protocol
//!
//! Every mutation ends with [`SitemapIndex::invalidate`]. [`SitemapIndex::xml`]
//! renders only when no cached document is present, so repeated reads between
//! mutations hand back the same shared string.
//!
//! ## Truncation
//!
//! Under [`TruncationPolicy::CapBeforeSort`] the first `max_nodes` entries in
//! ascending id order survive and are then sorted newest-first. Both maps are
//! `BTreeMap`s, so iteration order is ascending id, not insertion order. Under
//! [`TruncationPolicy::SortBeforeCap`] the newest `max_nodes` survive.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::builder::NodeBuilder;
use crate::config::{SitemapConfig, TruncationPolicy};
use crate::types::{ContentKind, Record, SitemapResult, UrlNode};
use crate::urls::AbsoluteRewriter;
use crate::xml;

/// In-memory index of one kind of record, rendered lazily into a `urlset`.
pub struct SitemapIndex {
    builder: Box<dyn NodeBuilder>,
    rewriter: Arc<dyn AbsoluteRewriter>,
    nodes: BTreeMap<String, UrlNode>,
    node_timestamps: BTreeMap<String, DateTime<Utc>>,
    cached_document: Option<Arc<str>>,
    collection_last_modified: Option<DateTime<Utc>>,
    max_nodes: usize,
    truncation: TruncationPolicy,
    declaration: String,
}

impl SitemapIndex {
    /// Create an empty index.
    pub fn new(
        builder: Box<dyn NodeBuilder>,
        rewriter: Arc<dyn AbsoluteRewriter>,
        config: &SitemapConfig,
    ) -> Self {
        Self {
            builder,
            rewriter,
            nodes: BTreeMap::new(),
            node_timestamps: BTreeMap::new(),
            cached_document: None,
            collection_last_modified: None,
            max_nodes: config.max_nodes,
            truncation: config.truncation,
            declaration: xml::declaration(config.stylesheet.as_deref()),
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.builder.kind()
    }

    /// Insert or overwrite the entry for `record.id`.
    pub fn add_url(&mut self, url: &str, record: &Record) {
        let Some(node) = self.builder.build_node(url, record) else {
            tracing::debug!("{}: no node for record {}", self.kind(), record.id);
            return;
        };

        let lastmod = node.lastmod;
        self.collection_last_modified = Some(match self.collection_last_modified {
            Some(current) => current.max(lastmod),
            None => lastmod,
        });
        self.nodes.insert(record.id.clone(), node);
        self.node_timestamps.insert(record.id.clone(), lastmod);
        tracing::trace!("{}: indexed {} at {url}", self.kind(), record.id);
        self.invalidate();
    }

    /// Remove the entry for `record.id`. Absent ids are not an error.
    ///
    /// The collection timestamp is stamped to now rather than recomputed
    /// from the remaining records.
    pub fn remove_url(&mut self, url: &str, record: &Record) {
        self.nodes.remove(&record.id);
        self.node_timestamps.remove(&record.id);
        tracing::trace!("{}: removed {} at {url}", self.kind(), record.id);
        self.invalidate();
        self.collection_last_modified = Some(Utc::now());
    }

    /// The current document, rendering it if no cached copy exists.
    pub fn xml(&mut self) -> SitemapResult<Arc<str>> {
        if let Some(cached) = &self.cached_document {
            return Ok(Arc::clone(cached));
        }
        let document: Arc<str> = self.render()?.into();
        self.cached_document = Some(Arc::clone(&document));
        Ok(document)
    }

    /// Drop all entries and the cached document for a full rebuild.
    /// The collection timestamp is kept.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.node_timestamps.clear();
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.cached_document = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cached_document.is_some()
    }

    pub fn collection_last_modified(&self) -> Option<DateTime<Utc>> {
        self.collection_last_modified
    }

    pub fn node(&self, id: &str) -> Option<&UrlNode> {
        self.nodes.get(id)
    }

    pub fn timestamp(&self, id: &str) -> Option<DateTime<Utc>> {
        self.node_timestamps.get(id).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn timestamp_ids(&self) -> impl Iterator<Item = &str> {
        self.node_timestamps.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    fn render(&self) -> SitemapResult<String> {
        let mut entries: Vec<(&str, DateTime<Utc>, &UrlNode)> = self
            .nodes
            .iter()
            .filter_map(|(id, node)| {
                let ts = self.node_timestamps.get(id)?;
                Some((id.as_str(), *ts, node))
            })
            .collect();
        debug_assert_eq!(entries.len(), self.node_timestamps.len());

        let total = entries.len();
        match self.truncation {
            TruncationPolicy::CapBeforeSort => {
                entries.truncate(self.max_nodes);
                sort_newest_first(&mut entries);
            }
            TruncationPolicy::SortBeforeCap => {
                sort_newest_first(&mut entries);
                entries.truncate(self.max_nodes);
            }
        }
        if total > self.max_nodes {
            tracing::debug!(
                "{}: truncated {} entries to {}",
                self.kind(),
                total,
                self.max_nodes
            );
        }

        let body = xml::write_urlset(entries.iter().map(|(_, _, node)| *node))?;
        let document = format!("{}{body}", self.declaration);
        tracing::debug!("{}: rendered {} urls", self.kind(), entries.len());
        Ok(self.rewriter.make_absolute(&document))
    }
}

fn sort_newest_first(entries: &mut [(&str, DateTime<Utc>, &UrlNode)]) {
    // stable: equal timestamps keep id order
    entries.sort_by(|a, b| b.1.cmp(&a.1));
}
