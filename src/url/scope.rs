use crate::url::domain::same_host;
use crate::url::normalize::normalize_parsed;
use serde::{Deserialize, Serialize};
use url::Url;

/// File extensions that never lead to an HTML page
pub const EXCLUDED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "gif", "mp4", "zip", "rar"];

/// Caller-supplied rules narrowing which same-site links are followed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRules {
    /// Path must start with one of these (ignored when empty)
    pub path_prefixes: Vec<String>,
    /// Path must not contain any of these
    pub exclude_paths: Vec<String>,
    /// Links found deeper than this are not enqueued
    pub max_depth: Option<u32>,
}

/// Decides whether a discovered link belongs to the crawl
///
/// A link is admitted when it resolves to an absolute HTTP(S) URL on the
/// seed's host, satisfies the path rules, and does not point at a known
/// non-HTML file. Admitted links are returned in normalized form, with the
/// fragment removed, so `/page#a` and `/page#b` are the same frontier entry.
/// They also take the seed's scheme, so `http://` and `https://` variants of
/// one page collapse into a single entry.
#[derive(Debug, Clone)]
pub struct LinkScope {
    seed: Url,
    rules: ScopeRules,
}

impl LinkScope {
    pub fn new(seed: Url, rules: ScopeRules) -> Self {
        Self { seed, rules }
    }

    pub fn rules(&self) -> &ScopeRules {
        &self.rules
    }

    /// Resolves `href` against `base` and returns it if it is in scope
    pub fn admit(&self, base: &Url, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let resolved = base.join(href).ok()?;
        let mut normalized = normalize_parsed(resolved).ok()?;

        if !self.is_in_scope(&normalized) {
            return None;
        }

        if normalized.scheme() != self.seed.scheme() {
            normalized.set_scheme(self.seed.scheme()).ok()?;
        }

        Some(normalized)
    }

    /// True if `url` is on the seed's host, whatever its path
    pub fn is_same_site(&self, url: &Url) -> bool {
        same_host(&self.seed, url)
    }

    /// Applies the host, path and extension rules to an absolute URL
    pub fn is_in_scope(&self, url: &Url) -> bool {
        if !same_host(&self.seed, url) {
            return false;
        }

        let path = url.path();

        if !self.rules.path_prefixes.is_empty()
            && !self
                .rules
                .path_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return false;
        }

        if self
            .rules
            .exclude_paths
            .iter()
            .any(|excluded| path.contains(excluded.as_str()))
        {
            return false;
        }

        !has_excluded_extension(path)
    }

    /// Returns true if a link found at `depth` may still be enqueued
    pub fn allows_depth(&self, depth: u32) -> bool {
        self.rules.max_depth.map_or(true, |max| depth <= max)
    }
}

/// Checks the last path segment against [`EXCLUDED_EXTENSIONS`]
fn has_excluded_extension(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            EXCLUDED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}
