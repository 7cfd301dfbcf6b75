//! Image reference resolution.
//!
//! Students attach images by pasting links, most often cloud-drive share
//! links that browsers cannot render directly. The resolver rewrites those to
//! a thumbnail endpoint; [`ImageFallback`] walks the alternative shapes when
//! a rendered image fails to load.

use once_cell::sync::Lazy;
use regex::Regex;

static FILE_PATH_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/file/d/([A-Za-z0-9_-]+)").expect("valid file path regex"));

static QUERY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").expect("valid query id regex"));

/// Hosts whose URLs render as-is.
const DIRECT_HOSTS: &[&str] = &[
    "googleusercontent.com",
    "drive.google.com/thumbnail",
    "i.imgur.com",
    "images.unsplash.com",
];

/// Default image shown when every fallback shape failed.
pub const DEFAULT_PLACEHOLDER: &str = "https://placehold.co/600x400?text=Image+unavailable";

/// Rewrites raw image references into renderable URLs.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    placeholder: String,
    thumbnail_width: u32,
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER)
    }
}

impl ImageResolver {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            thumbnail_width: 1000,
        }
    }

    pub fn with_thumbnail_width(mut self, width: u32) -> Self {
        self.thumbnail_width = width;
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Extracts a drive file id from `.../file/d/{id}/...` or `...?id={id}`.
    pub fn file_id(raw: &str) -> Option<String> {
        FILE_PATH_ID
            .captures(raw)
            .or_else(|| QUERY_ID.captures(raw))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Data URIs and recognized hosts pass through untouched.
    pub fn is_direct(raw: &str) -> bool {
        raw.starts_with("data:") || DIRECT_HOSTS.iter().any(|host| raw.contains(host))
    }

    /// Resolves a raw reference; unrecognized input is returned unchanged.
    pub fn resolve(&self, raw: &str) -> String {
        let raw = raw.trim();
        if Self::is_direct(raw) {
            return raw.to_string();
        }
        match Self::file_id(raw) {
            Some(id) => self.thumbnail_url(&id),
            None => raw.to_string(),
        }
    }

    pub fn resolve_all(&self, raws: &[String]) -> Vec<String> {
        raws.iter().map(|raw| self.resolve(raw)).collect()
    }

    fn thumbnail_url(&self, id: &str) -> String {
        format!(
            "https://drive.google.com/thumbnail?id={}&sz=w{}",
            id, self.thumbnail_width
        )
    }

    /// Fallback shapes in the order they are tried.
    fn shapes(&self, id: &str) -> [String; 3] {
        [
            self.thumbnail_url(id),
            format!("https://lh3.googleusercontent.com/d/{}", id),
            format!("https://drive.google.com/uc?export=view&id={}", id),
        ]
    }

    /// Starts a display-time fallback sequence for a raw reference.
    pub fn fallback(&self, raw: &str) -> ImageFallback {
        let mut candidates: Vec<String> = match Self::file_id(raw) {
            Some(id) if !raw.starts_with("data:") => self.shapes(&id).to_vec(),
            _ => vec![self.resolve(raw)],
        };
        if !candidates.iter().any(|c| c == &self.placeholder) {
            candidates.push(self.placeholder.clone());
        }
        ImageFallback {
            candidates,
            position: 0,
        }
    }
}

/// Render-failure retry policy for one image.
///
/// Starts at the first shape; each call to [`on_error`](Self::on_error)
/// advances to the next untried URL and ends with the placeholder. Once the
/// placeholder has failed too it yields `None`, so a broken image can never
/// loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFallback {
    candidates: Vec<String>,
    position: usize,
}

impl ImageFallback {
    /// URL that should currently be displayed.
    pub fn current(&self) -> Option<&str> {
        self.candidates.get(self.position).map(String::as_str)
    }

    /// Records a load failure of the current URL and returns the next one.
    pub fn on_error(&mut self) -> Option<&str> {
        if self.position < self.candidates.len() {
            self.position += 1;
        }
        self.current()
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.candidates.len()
    }
}
