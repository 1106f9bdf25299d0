//! URL collaborators: image reference resolution and the absolute-URL pass.

use std::sync::OnceLock;

use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use url::Url;

use crate::types::{ContentKind, SitemapError, SitemapResult};

/// Resolves a stored image reference to a URL.
///
/// Returning `None` means the reference could not be resolved; the caller
/// then omits the image rather than failing.
pub trait AssetResolver: Send + Sync {
    fn resolve_image(&self, kind: ContentKind, reference: &str, absolute: bool) -> Option<String>;
}

/// Rewrites relative URLs inside an already-serialized document.
pub trait AbsoluteRewriter: Send + Sync {
    fn make_absolute(&self, xml: &str) -> String;
}

/// Directory images are served from, relative to the site root.
const IMAGE_DIR: &str = "content/images/";

/// Default collaborators built from the site's base URL.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: Url,
}

impl SiteUrls {
    pub fn new(site_url: &str) -> SitemapResult<Self> {
        let mut base = Url::parse(site_url).map_err(|source| SitemapError::InvalidSiteUrl {
            url: site_url.to_string(),
            source,
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Scheme, host and port without a trailing slash.
    fn origin(&self) -> String {
        self.base.origin().ascii_serialization()
    }

    /// Absolute form of a root-relative path such as `/about/`.
    pub fn absolute_path(&self, path: &str) -> String {
        format!("{}{}", self.origin(), path)
    }
}

impl AssetResolver for SiteUrls {
    fn resolve_image(&self, _kind: ContentKind, reference: &str, absolute: bool) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }

        let resolved = if let Ok(url) = Url::parse(reference) {
            url
        } else if let Some(rest) = reference.strip_prefix("//") {
            Url::parse(&format!("{}://{rest}", self.base.scheme())).ok()?
        } else if reference.starts_with('/') {
            Url::parse(&self.absolute_path(reference)).ok()?
        } else {
            self.base.join(IMAGE_DIR).ok()?.join(reference).ok()?
        };

        if absolute || resolved.origin() != self.base.origin() {
            return Some(resolved.to_string());
        }
        let mut relative = resolved.path().to_string();
        if let Some(query) = resolved.query() {
            relative.push('?');
            relative.push_str(query);
        }
        Some(relative)
    }
}

fn root_relative_loc() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // `/path` but not protocol-relative `//host`
        Regex::new(r"<(loc|image:loc)>(/(?:[^/<][^<]*)?)</").expect("valid loc pattern")
    })
}

impl AbsoluteRewriter for SiteUrls {
    fn make_absolute(&self, xml: &str) -> String {
        let origin = self.origin();
        root_relative_loc()
            .replace_all(xml, |caps: &Captures<'_>| {
                format!("<{}>{origin}{}</", &caps[1], &caps[2])
            })
            .into_owned()
    }
}

/// Decoded file-name component of a URL, used as the image caption.
pub fn file_name(url: &str) -> String {
    let from_url = Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
    });
    let encoded = match from_url {
        Some(name) if !name.is_empty() => name,
        _ => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    percent_decode_str(&encoded).decode_utf8_lossy().into_owned()
}
