//! Serialization of sitemap documents.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::types::{SitemapResult, UrlNode};

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Leading declaration prefixed to every document.
pub fn declaration(stylesheet: Option<&str>) -> String {
    match stylesheet {
        Some(href) => format!(
            r#"{XML_DECLARATION}<?xml-stylesheet type="text/xsl" href="{}"?>"#,
            escape(href)
        ),
        None => XML_DECLARATION.to_string(),
    }
}

/// `lastmod` text, e.g. `2024-01-15T10:00:00.000Z`.
pub fn format_lastmod(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One `sitemap` entry of a sitemap index document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub loc: String,
    pub lastmod: Option<DateTime<Utc>>,
}

/// Serialize a `urlset` element containing `nodes` in the given order.
pub fn write_urlset<'a, I>(nodes: I) -> SitemapResult<String>
where
    I: IntoIterator<Item = &'a UrlNode>,
{
    let mut writer = Writer::new(Vec::new());

    let mut root = BytesStart::new("urlset");
    root.push_attribute(("xmlns", SITEMAP_NS));
    root.push_attribute(("xmlns:image", IMAGE_NS));
    writer.write_event(Event::Start(root))?;

    for node in nodes {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &node.loc)?;
        write_text_element(&mut writer, "lastmod", &format_lastmod(&node.lastmod))?;
        if let Some(image) = &node.image {
            writer.write_event(Event::Start(BytesStart::new("image:image")))?;
            write_text_element(&mut writer, "image:loc", &image.loc)?;
            write_text_element(&mut writer, "image:caption", &image.caption)?;
            writer.write_event(Event::End(BytesEnd::new("image:image")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Serialize a `sitemapindex` element listing resource sitemaps.
pub fn write_sitemap_index(entries: &[IndexEntry]) -> SitemapResult<String> {
    let mut writer = Writer::new(Vec::new());

    let mut root = BytesStart::new("sitemapindex");
    root.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(root))?;

    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("sitemap")))?;
        write_text_element(&mut writer, "loc", &entry.loc)?;
        if let Some(lastmod) = &entry.lastmod {
            write_text_element(&mut writer, "lastmod", &format_lastmod(lastmod))?;
        }
        writer.write_event(Event::End(BytesEnd::new("sitemap")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sitemapindex")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> SitemapResult<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageNode;
    use chrono::TimeZone;

    fn node(loc: &str, image: Option<ImageNode>) -> UrlNode {
        UrlNode {
            loc: loc.to_string(),
            lastmod: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            image,
        }
    }

    #[test]
    fn test_declaration() {
        assert_eq!(declaration(None), r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        let with_xsl = declaration(Some("//site/sitemap.xsl?a=1&b=2"));
        assert!(with_xsl.ends_with(
            r#"<?xml-stylesheet type="text/xsl" href="//site/sitemap.xsl?a=1&amp;b=2"?>"#
        ));
    }

    #[test]
    fn test_urlset_layout() {
        let nodes = vec![
            node(
                "/a/",
                Some(ImageNode {
                    loc: "https://site/content/images/img.jpg".into(),
                    caption: "img.jpg".into(),
                }),
            ),
            node("/b/", None),
        ];
        let xml = write_urlset(&nodes).unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" "#,
                r#"xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">"#,
                "<url><loc>/a/</loc><lastmod>2024-01-15T10:00:00.000Z</lastmod>",
                "<image:image><image:loc>https://site/content/images/img.jpg</image:loc>",
                "<image:caption>img.jpg</image:caption></image:image></url>",
                "<url><loc>/b/</loc><lastmod>2024-01-15T10:00:00.000Z</lastmod></url>",
                "</urlset>"
            )
        );
    }

    #[test]
    fn test_urlset_escapes_text() {
        let xml = write_urlset(&[node("/search?q=a&b", None)]).unwrap();
        assert!(xml.contains("<loc>/search?q=a&amp;b</loc>"));
    }

    #[test]
    fn test_empty_urlset() {
        let xml = write_urlset(std::iter::empty()).unwrap();
        assert!(xml.starts_with("<urlset "));
        assert!(xml.ends_with("></urlset>"));
    }

    #[test]
    fn test_sitemap_index_omits_missing_lastmod() {
        let entries = vec![
            IndexEntry {
                loc: "/sitemap-posts.xml".into(),
                lastmod: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            },
            IndexEntry {
                loc: "/sitemap-tags.xml".into(),
                lastmod: None,
            },
        ];
        let xml = write_sitemap_index(&entries).unwrap();
        assert!(xml.contains(
            "<sitemap><loc>/sitemap-posts.xml</loc><lastmod>2024-02-01T00:00:00.000Z</lastmod></sitemap>"
        ));
        assert!(xml.contains("<sitemap><loc>/sitemap-tags.xml</loc></sitemap>"));
    }
}
