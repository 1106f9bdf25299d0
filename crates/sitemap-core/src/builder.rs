//! Per-kind node synthesis strategies.
//!
//! A [`NodeBuilder`] turns a record and its canonical URL into the
//! [`UrlNode`] stored by an index. The provided methods implement the shared
//! algorithm; kinds override only the steps that differ.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::types::{ContentKind, ImageNode, Record, UrlNode};
use crate::urls::{file_name, AssetResolver};

/// Last-modified instant of a record, falling back to the current time.
pub fn last_modified_of(record: &Record) -> DateTime<Utc> {
    record.last_modified().unwrap_or_else(Utc::now)
}

/// Strategy for rendering one kind of record into a sitemap node.
pub trait NodeBuilder: Send + Sync {
    fn kind(&self) -> ContentKind;

    fn resolver(&self) -> &dyn AssetResolver;

    /// The stored image reference to use for this record, if any.
    fn image_reference<'a>(&self, record: &'a Record) -> Option<&'a str> {
        record.image_reference()
    }

    /// Presence check on the resolved image URL.
    fn validate_image_url(&self, url: &str) -> bool {
        !url.is_empty()
    }

    fn build_image(&self, record: &Record) -> Option<ImageNode> {
        let reference = self.image_reference(record)?;
        let loc = self.resolver().resolve_image(self.kind(), reference, true)?;
        if !self.validate_image_url(&loc) {
            return None;
        }
        let caption = file_name(&loc);
        Some(ImageNode { loc, caption })
    }

    /// Build the node for `record` located at `url`.
    ///
    /// Returns `None` only when no location can be emitted.
    fn build_node(&self, url: &str, record: &Record) -> Option<UrlNode> {
        let loc = url.trim();
        if loc.is_empty() {
            return None;
        }
        Some(UrlNode {
            loc: loc.to_string(),
            lastmod: last_modified_of(record),
            image: self.build_image(record),
        })
    }
}

/// Builder for posts, pages and tags.
pub struct DefaultNodeBuilder {
    kind: ContentKind,
    resolver: Arc<dyn AssetResolver>,
}

impl DefaultNodeBuilder {
    pub fn new(kind: ContentKind, resolver: Arc<dyn AssetResolver>) -> Self {
        Self { kind, resolver }
    }
}

impl NodeBuilder for DefaultNodeBuilder {
    fn kind(&self) -> ContentKind {
        self.kind
    }

    fn resolver(&self) -> &dyn AssetResolver {
        self.resolver.as_ref()
    }
}

/// Builder for author profiles. Gravatar avatars are not content images.
pub struct AuthorNodeBuilder {
    resolver: Arc<dyn AssetResolver>,
}

impl AuthorNodeBuilder {
    pub fn new(resolver: Arc<dyn AssetResolver>) -> Self {
        Self { resolver }
    }
}

impl NodeBuilder for AuthorNodeBuilder {
    fn kind(&self) -> ContentKind {
        ContentKind::Authors
    }

    fn resolver(&self) -> &dyn AssetResolver {
        self.resolver.as_ref()
    }

    fn validate_image_url(&self, url: &str) -> bool {
        !url.is_empty() && !url.contains("gravatar.com")
    }
}

/// The builder a manager uses for `kind`.
pub fn builder_for(kind: ContentKind, resolver: Arc<dyn AssetResolver>) -> Box<dyn NodeBuilder> {
    match kind {
        ContentKind::Authors => Box::new(AuthorNodeBuilder::new(resolver)),
        other => Box::new(DefaultNodeBuilder::new(other, resolver)),
    }
}
