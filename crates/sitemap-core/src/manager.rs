//! One index per content kind plus the sitemap index document that links them.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::builder::builder_for;
use crate::config::SitemapConfig;
use crate::index::SitemapIndex;
use crate::types::{ContentKind, Record, SitemapResult};
use crate::urls::{AbsoluteRewriter, SiteUrls};
use crate::xml::{self, IndexEntry};

/// File name of the sitemap index document.
pub const INDEX_FILE_NAME: &str = "sitemap.xml";

/// A change notification from the upstream content source.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentEvent {
    Added {
        kind: ContentKind,
        url: String,
        record: Record,
    },
    Removed {
        kind: ContentKind,
        url: String,
        record: Record,
    },
    /// Applied as remove followed by add.
    Updated {
        kind: ContentKind,
        url: String,
        record: Record,
    },
}

impl ContentEvent {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentEvent::Added { kind, .. }
            | ContentEvent::Removed { kind, .. }
            | ContentEvent::Updated { kind, .. } => *kind,
        }
    }
}

/// Owns the per-kind indexes and renders every document a site serves.
pub struct SitemapManager {
    indexes: BTreeMap<ContentKind, SitemapIndex>,
    rewriter: Arc<dyn AbsoluteRewriter>,
    declaration: String,
    cached_index: Option<Arc<str>>,
}

impl SitemapManager {
    pub fn new(config: &SitemapConfig) -> SitemapResult<Self> {
        config.validate()?;
        let urls = Arc::new(SiteUrls::new(&config.site_url)?);

        let indexes = ContentKind::ALL
            .into_iter()
            .map(|kind| {
                let index = SitemapIndex::new(builder_for(kind, urls.clone()), urls.clone(), config);
                (kind, index)
            })
            .collect();

        tracing::debug!("Sitemap manager created for {}", config.site_url);

        Ok(Self {
            indexes,
            rewriter: urls,
            declaration: xml::declaration(config.stylesheet.as_deref()),
            cached_index: None,
        })
    }

    /// Apply one upstream change to the matching index.
    pub fn apply(&mut self, event: ContentEvent) {
        let kind = event.kind();
        let Some(index) = self.indexes.get_mut(&kind) else {
            return;
        };
        match event {
            ContentEvent::Added { url, record, .. } => index.add_url(&url, &record),
            ContentEvent::Removed { url, record, .. } => index.remove_url(&url, &record),
            ContentEvent::Updated { url, record, .. } => {
                index.remove_url(&url, &record);
                index.add_url(&url, &record);
            }
        }
        self.cached_index = None;
    }

    pub fn add_url(&mut self, kind: ContentKind, url: &str, record: &Record) {
        self.apply(ContentEvent::Added {
            kind,
            url: url.to_string(),
            record: record.clone(),
        });
    }

    pub fn remove_url(&mut self, kind: ContentKind, url: &str, record: &Record) {
        self.apply(ContentEvent::Removed {
            kind,
            url: url.to_string(),
            record: record.clone(),
        });
    }

    pub fn index(&self, kind: ContentKind) -> Option<&SitemapIndex> {
        self.indexes.get(&kind)
    }

    /// The `urlset` document for one kind.
    pub fn resource_xml(&mut self, kind: ContentKind) -> SitemapResult<Option<Arc<str>>> {
        match self.indexes.get_mut(&kind) {
            Some(index) => index.xml().map(Some),
            None => Ok(None),
        }
    }

    /// The `sitemapindex` document linking every resource sitemap.
    pub fn index_xml(&mut self) -> SitemapResult<Arc<str>> {
        if let Some(cached) = &self.cached_index {
            return Ok(Arc::clone(cached));
        }

        let entries: Vec<IndexEntry> = self
            .indexes
            .iter()
            .map(|(kind, index)| IndexEntry {
                loc: format!("/{}", kind.file_name()),
                lastmod: index.collection_last_modified(),
            })
            .collect();
        let body = xml::write_sitemap_index(&entries)?;
        let document: Arc<str> = self
            .rewriter
            .make_absolute(&format!("{}{body}", self.declaration))
            .into();

        self.cached_index = Some(Arc::clone(&document));
        Ok(document)
    }

    /// Document served at `path`, e.g. `sitemap.xml` or `/sitemap-posts.xml`.
    pub fn xml_for_path(&mut self, path: &str) -> SitemapResult<Option<Arc<str>>> {
        let name = path.trim_start_matches('/');
        if name == INDEX_FILE_NAME {
            return self.index_xml().map(Some);
        }
        let kind = name
            .strip_prefix("sitemap-")
            .and_then(|rest| rest.strip_suffix(".xml"))
            .and_then(|kind| kind.parse::<ContentKind>().ok())
            .filter(|kind| name == kind.file_name());
        match kind {
            Some(kind) => self.resource_xml(kind),
            None => Ok(None),
        }
    }

    /// Clear every index ahead of a full rebuild.
    pub fn reset(&mut self) {
        for index in self.indexes.values_mut() {
            index.reset();
        }
        self.cached_index = None;
        tracing::info!("Sitemap indexes reset");
    }

    pub fn len(&self) -> usize {
        self.indexes.values().map(SitemapIndex::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.values().all(SitemapIndex::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn manager() -> SitemapManager {
        SitemapManager::new(&SitemapConfig::for_site("https://example.com/")).unwrap()
    }

    fn post(id: &str, day: u32) -> Record {
        Record {
            updated_at: Some(Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()),
            ..Record::new(id)
        }
    }

    #[test]
    fn test_events_route_to_kind() {
        let mut m = manager();
        m.add_url(ContentKind::Posts, "/hello/", &post("p1", 1));
        m.add_url(ContentKind::Tags, "/tag/news/", &post("t1", 2));

        assert_eq!(m.len(), 2);
        assert_eq!(m.index(ContentKind::Posts).unwrap().len(), 1);
        assert_eq!(m.index(ContentKind::Tags).unwrap().len(), 1);
        assert!(m.index(ContentKind::Pages).unwrap().is_empty());

        let posts = m.resource_xml(ContentKind::Posts).unwrap().unwrap();
        assert!(posts.contains("<loc>https://example.com/hello/</loc>"));
        assert!(!posts.contains("/tag/news/"));
    }

    #[test]
    fn test_update_replaces_entry() {
        let mut m = manager();
        m.apply(ContentEvent::Added {
            kind: ContentKind::Posts,
            url: "/draft/".into(),
            record: post("p1", 1),
        });
        m.apply(ContentEvent::Updated {
            kind: ContentKind::Posts,
            url: "/final/".into(),
            record: post("p1", 5),
        });

        let index = m.index(ContentKind::Posts).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.node("p1").unwrap().loc, "/final/");
    }

    #[test]
    fn test_index_document_lists_every_kind() {
        let mut m = manager();
        m.add_url(ContentKind::Posts, "/hello/", &post("p1", 7));

        let xml = m.index_xml().unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex"#));
        for kind in ContentKind::ALL {
            assert!(xml.contains(&format!(
                "<loc>https://example.com/sitemap-{}.xml</loc>",
                kind.as_str()
            )));
        }
        assert!(xml.contains(
            "<loc>https://example.com/sitemap-posts.xml</loc><lastmod>2024-03-07T00:00:00.000Z</lastmod>"
        ));
        assert!(xml.contains("<loc>https://example.com/sitemap-tags.xml</loc></sitemap>"));
    }

    #[test]
    fn test_index_document_cache_invalidated_by_events() {
        let mut m = manager();
        let first = m.index_xml().unwrap();
        assert!(Arc::ptr_eq(&first, &m.index_xml().unwrap()));

        m.add_url(ContentKind::Pages, "/about/", &post("a", 2));
        let second = m.index_xml().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.contains("2024-03-02T00:00:00.000Z"));
    }

    #[test]
    fn test_xml_for_path() {
        let mut m = manager();
        m.add_url(ContentKind::Authors, "/author/jo/", &post("u1", 1));

        let index = m.xml_for_path("/sitemap.xml").unwrap().unwrap();
        assert!(index.contains("<sitemapindex"));

        let authors = m.xml_for_path("sitemap-authors.xml").unwrap().unwrap();
        assert!(authors.contains("https://example.com/author/jo/"));

        assert!(m.xml_for_path("sitemap-author.xml").unwrap().is_none());
        assert!(m.xml_for_path("sitemap-widgets.xml").unwrap().is_none());
        assert!(m.xml_for_path("robots.txt").unwrap().is_none());
    }

    #[test]
    fn test_reset_empties_everything() {
        let mut m = manager();
        m.add_url(ContentKind::Posts, "/a/", &post("p1", 1));
        m.add_url(ContentKind::Tags, "/t/", &post("t1", 1));
        m.reset();
        assert!(m.is_empty());
        let posts = m.resource_xml(ContentKind::Posts).unwrap().unwrap();
        assert!(!posts.contains("<url>"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(SitemapManager::new(&SitemapConfig::for_site("nope")).is_err());
    }
}
