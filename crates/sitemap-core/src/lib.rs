//! Sitemap core — an incrementally-updated content index rendered on demand into sitemap XML.

pub mod builder;
pub mod config;
pub mod index;
pub mod manager;
pub mod types;
pub mod urls;
pub mod xml;

pub use builder::{builder_for, last_modified_of, AuthorNodeBuilder, DefaultNodeBuilder, NodeBuilder};
pub use config::{SitemapConfig, TruncationPolicy, DEFAULT_MAX_NODES};
pub use index::SitemapIndex;
pub use manager::{ContentEvent, SitemapManager, INDEX_FILE_NAME};
pub use types::*;
pub use urls::{AbsoluteRewriter, AssetResolver, SiteUrls};
