//! Core data types for content records, rendered nodes, and errors.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A content item supplied by the upstream content index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub feature_image: Option<String>,
}

/// Timestamp field where `null`, `""` and whitespace all mean absent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<DateTime<Utc>>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl Record {
    /// Create a record with only an id set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// First present of `updated_at`, `published_at`, `created_at`.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.published_at).or(self.created_at)
    }

    /// First non-empty of `cover_image`, `profile_image`, `feature_image`.
    pub fn image_reference(&self) -> Option<&str> {
        [&self.cover_image, &self.profile_image, &self.feature_image]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|value| !value.is_empty())
    }
}

/// The resource families a site publishes, one sitemap document each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Pages,
    Posts,
    Authors,
    Tags,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Pages,
        ContentKind::Posts,
        ContentKind::Authors,
        ContentKind::Tags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Pages => "pages",
            ContentKind::Posts => "posts",
            ContentKind::Authors => "authors",
            ContentKind::Tags => "tags",
        }
    }

    /// File name of this kind's resource sitemap, e.g. `sitemap-posts.xml`.
    pub fn file_name(&self) -> String {
        format!("sitemap-{}.xml", self.as_str())
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = SitemapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pages" | "page" => Ok(ContentKind::Pages),
            "posts" | "post" => Ok(ContentKind::Posts),
            "authors" | "author" | "users" => Ok(ContentKind::Authors),
            "tags" | "tag" => Ok(ContentKind::Tags),
            other => Err(SitemapError::UnknownKind(other.to_string())),
        }
    }
}

/// Rendered sitemap entry for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlNode {
    pub loc: String,
    pub lastmod: DateTime<Utc>,
    pub image: Option<ImageNode>,
}

/// The `image:image` fragment of a sitemap entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageNode {
    pub loc: String,
    pub caption: String,
}

/// Errors that can occur while configuring or rendering sitemaps.
#[derive(thiserror::Error, Debug)]
pub enum SitemapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rendered document is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid site URL '{url}': {source}")]
    InvalidSiteUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Unknown content kind: {0}")]
    UnknownKind(String),

    #[error("Invalid config: {0}")]
    Config(String),
}

/// Convenience result type.
pub type SitemapResult<T> = Result<T, SitemapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_last_modified_precedence() {
        let mut record = Record::new("1");
        assert!(record.last_modified().is_none());

        record.created_at = Some(ts(1));
        assert_eq!(record.last_modified(), Some(ts(1)));

        record.published_at = Some(ts(2));
        assert_eq!(record.last_modified(), Some(ts(2)));

        // updated wins even when older
        record.updated_at = Some(ts(1));
        assert_eq!(record.last_modified(), Some(ts(1)));
    }

    #[test]
    fn test_image_reference_precedence() {
        let mut record = Record::new("1");
        assert!(record.image_reference().is_none());

        record.feature_image = Some("feature.jpg".into());
        assert_eq!(record.image_reference(), Some("feature.jpg"));

        record.profile_image = Some("profile.jpg".into());
        assert_eq!(record.image_reference(), Some("profile.jpg"));

        record.cover_image = Some("cover.jpg".into());
        assert_eq!(record.image_reference(), Some("cover.jpg"));
    }

    #[test]
    fn test_image_reference_skips_empty() {
        let record = Record {
            cover_image: Some(String::new()),
            profile_image: Some("   ".into()),
            feature_image: Some("feature.jpg".into()),
            ..Record::new("1")
        };
        assert_eq!(record.image_reference(), Some("feature.jpg"));
    }

    #[test]
    fn test_record_from_json() {
        let record: Record = serde_json::from_str(
            r#"{"id":"abc","url":"/hello/","published_at":"2024-01-02T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(record.id, "abc");
        assert_eq!(record.url.as_deref(), Some("/hello/"));
        assert_eq!(record.last_modified(), Some(ts(2)));
        assert!(record.feature_image.is_none());
    }

    #[test]
    fn test_empty_timestamp_falls_through() {
        let record: Record = serde_json::from_str(
            r#"{"id":"1","url":"/a/","updated_at":"","published_at":"2024-01-02T12:00:00Z","created_at":"  "}"#,
        )
        .unwrap();
        assert!(record.updated_at.is_none());
        assert!(record.created_at.is_none());
        assert_eq!(record.last_modified(), Some(ts(2)));
    }

    #[test]
    fn test_null_timestamp_is_absent() {
        let record: Record =
            serde_json::from_str(r#"{"id":"1","updated_at":null,"created_at":"2024-01-03T12:00:00Z"}"#)
                .unwrap();
        assert_eq!(record.last_modified(), Some(ts(3)));
    }

    #[test]
    fn test_malformed_timestamp_is_error() {
        assert!(serde_json::from_str::<Record>(r#"{"id":"1","updated_at":"yesterday"}"#).is_err());
    }

    #[test]
    fn test_kind_parse_and_file_name() {
        assert_eq!("posts".parse::<ContentKind>().unwrap(), ContentKind::Posts);
        assert_eq!("Author".parse::<ContentKind>().unwrap(), ContentKind::Authors);
        assert!("widgets".parse::<ContentKind>().is_err());
        assert_eq!(ContentKind::Tags.file_name(), "sitemap-tags.xml");
    }
}
