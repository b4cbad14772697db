//! Request and response types for the asset cache
//!
//! Host-independent stand-ins for the fetch-event request/response pair.
//! A `ResponseSnapshot` is an immutable copy of body + headers taken at
//! caching time; entries are replaced wholesale, never mutated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP method of an intercepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Method {
    /// Only GET requests are ever keyed into the cache
    pub fn is_cacheable_read(&self) -> bool {
        matches!(self, Method::Get)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of resource a request is targeting
///
/// `Document` marks a top-level navigation and is the only kind eligible
/// for the offline fallback to the cached root document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Top-level navigation (HTML document)
    Document,
    /// Static asset (image, font, script, stylesheet)
    Asset,
    /// Anything else (beacons, preflight, workers)
    Other,
}

/// An intercepted outgoing request
#[derive(Debug, Clone)]
pub struct AssetRequest {
    pub method: Method,
    pub url: String,
    pub kind: RequestKind,
}

impl AssetRequest {
    /// GET request for a static asset
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            kind: RequestKind::Asset,
        }
    }

    /// GET request for a top-level navigation
    pub fn document(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            kind: RequestKind::Document,
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Path component of the URL (scheme/host stripped, query kept out)
    ///
    /// Exclusion predicates match against this, so `/api/contact` is
    /// excluded whether the request URL is relative or absolute.
    pub fn path(&self) -> &str {
        let after_scheme = match self.url.find("://") {
            Some(idx) => {
                let rest = &self.url[idx + 3..];
                match rest.find('/') {
                    Some(slash) => &rest[slash..],
                    None => "/",
                }
            }
            None => self.url.as_str(),
        };
        match after_scheme.find(['?', '#']) {
            Some(idx) => &after_scheme[..idx],
            None => after_scheme,
        }
    }

    /// Normalized cache key (method + URL)
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.method, &self.url)
    }
}

/// Normalized request key: method + URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(method: Method, url: &str) -> Self {
        Self(format!("{} {}", method, url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable snapshot of a response (status + headers + body)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ResponseSnapshot {
    /// Snapshot with a 200 status and no headers (tests, fallbacks)
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Only successful responses are ever stored
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// First `content-type` header, if any (case-insensitive)
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
    }
}
