//! Turns a logical API call into a fully addressed, authorized request.

use std::borrow::Cow;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, Url};

use super::ApiError;
use crate::auth::Credentials;

/// One request attempt, described as plain data.
///
/// Built fresh for every attempt; a retry gets a new descriptor carrying the
/// refreshed token rather than a patched copy of the old one.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl RequestDescriptor {
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Encoded path plus query string.
    pub fn path(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    api_base_url: String,
    product: String,
}

impl RequestBuilder {
    pub fn new(api_base_url: &str, product: &str) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            product: product.to_string(),
        }
    }

    /// Address `path` under the tenant prefix and attach the bearer token.
    ///
    /// Caller headers override the defaults on key collision.
    pub fn build(
        &self,
        credentials: &Credentials,
        path: &str,
        method: Method,
        extra_headers: &HeaderMap,
    ) -> Result<RequestDescriptor, ApiError> {
        let url = self.url_for(&credentials.cloud_id, path)?;

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.access_token))
            .map_err(|_| ApiError::InvalidRequest("access token is not a valid header value".to_string()))?;
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in extra_headers {
            headers.insert(name.clone(), value.clone());
        }

        Ok(RequestDescriptor { method, url, headers })
    }

    /// The URL parser percent-encodes characters such as spaces, quotes and
    /// angle brackets; existing `%XX` sequences are left alone. `#` and stray
    /// `%` are escaped first so nothing ends up in a fragment, which is never
    /// sent.
    fn url_for(&self, cloud_id: &str, path: &str) -> Result<Url, ApiError> {
        let separator = if path.starts_with('/') { "" } else { "/" };
        let raw = format!(
            "{}/ex/{}/{}{}{}",
            self.api_base_url,
            self.product,
            urlencoding::encode(cloud_id),
            separator,
            escape_reserved(path)
        );
        Url::parse(&raw).map_err(|e| ApiError::InvalidRequest(format!("{}: {}", raw, e)))
    }
}

/// Escape `#` and any `%` that does not start a `%XX` sequence.
fn escape_reserved(path: &str) -> Cow<'_, str> {
    if !path.contains(['#', '%']) {
        return Cow::Borrowed(path);
    }

    let bytes = path.as_bytes();
    let mut out = String::with_capacity(path.len() + 8);
    for (i, c) in path.char_indices() {
        match c {
            '#' => out.push_str("%23"),
            '%' => {
                let escaped = bytes.len() > i + 2
                    && bytes[i + 1].is_ascii_hexdigit()
                    && bytes[i + 2].is_ascii_hexdigit();
                out.push_str(if escaped { "%" } else { "%25" });
            }
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
