//! Opaque cursor pagination primitives shared by list endpoints.
//!
//! Cursors are URL-safe base64 strings wrapping a small JSON payload. Clients
//! must treat them as opaque; the encoding may change without notice.
//!
//! # Examples
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::new(Some(2), None).expect("valid request");
//! let page = Page::from_overfetch(vec![1, 2, 3], &request);
//! assert_eq!(page.items, vec![1, 2]);
//! assert!(page.next_cursor.is_some());
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use url::Url;

/// Limit applied when the client does not ask for one.
pub const DEFAULT_LIMIT: u32 = 20;
/// Upper bound for a single page.
pub const MAX_LIMIT: u32 = 100;

const CURSOR_PARAM: &str = "cursor";

/// Errors raised while decoding a client supplied cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The cursor is not valid URL-safe base64.
    #[error("cursor is not valid base64")]
    Encoding,
    /// The decoded cursor does not contain a recognised payload.
    #[error("cursor payload is malformed")]
    Payload,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CursorPayload {
    offset: u64,
}

/// Position inside an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    offset: u64,
}

impl Cursor {
    /// Cursor pointing at the first item.
    #[must_use]
    pub const fn start() -> Self {
        Self { offset: 0 }
    }

    /// Cursor pointing at the given zero-based offset.
    #[must_use]
    pub const fn from_offset(offset: u64) -> Self {
        Self { offset }
    }

    /// Zero-based offset of the first item on the page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.offset
    }

    /// Encode the cursor for transport.
    #[must_use]
    pub fn encode(self) -> String {
        let payload = CursorPayload {
            offset: self.offset,
        };
        // Serialising a struct with a single integer field cannot fail.
        let json = serde_json::to_vec(&payload).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a cursor previously produced by [`Cursor::encode`].
    ///
    /// # Errors
    /// Returns [`CursorError`] when the input is not a cursor we issued.
    pub fn decode(raw: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw.trim())
            .map_err(|_| CursorError::Encoding)?;
        let payload: CursorPayload =
            serde_json::from_slice(&bytes).map_err(|_| CursorError::Payload)?;
        Ok(Self::from_offset(payload.offset))
    }
}

/// Validated pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    cursor: Cursor,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            cursor: Cursor::start(),
        }
    }
}

impl PageRequest {
    /// Build a request from raw query parameters.
    ///
    /// The limit is clamped to `1..=MAX_LIMIT`; a missing limit defaults to
    /// [`DEFAULT_LIMIT`].
    ///
    /// # Errors
    /// Returns [`CursorError`] when `cursor` cannot be decoded.
    pub fn new(limit: Option<u32>, cursor: Option<&str>) -> Result<Self, CursorError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let cursor = match cursor {
            Some(raw) if !raw.trim().is_empty() => Cursor::decode(raw)?,
            _ => Cursor::start(),
        };
        Ok(Self { limit, cursor })
    }

    /// Maximum number of items returned to the client.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Offset of the first item to fetch.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.cursor.offset()
    }

    /// Number of rows to fetch so the presence of a next page can be detected.
    #[must_use]
    pub const fn fetch_limit(&self) -> u32 {
        self.limit.saturating_add(1)
    }
}

/// Page envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in result order.
    pub items: Vec<T>,
    /// Cursor for the following page, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from a fetch of up to [`PageRequest::fetch_limit`] items.
    ///
    /// The surplus item, when present, is dropped and signals a next page.
    #[must_use]
    pub fn from_overfetch(mut items: Vec<T>, request: &PageRequest) -> Self {
        let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let next_cursor = if items.len() > limit {
            items.truncate(limit);
            let next = request
                .offset()
                .saturating_add(u64::from(request.limit()));
            Some(Cursor::from_offset(next).encode())
        } else {
            None
        };
        Self { items, next_cursor }
    }

    /// Transform the items while keeping the cursor.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }

    /// Build the URL of the next page from the current request URL.
    ///
    /// Existing query parameters are preserved; any previous cursor is
    /// replaced.
    #[must_use]
    pub fn next_link(&self, base: &Url) -> Option<Url> {
        let cursor = self.next_cursor.as_deref()?;
        let retained: Vec<(String, String)> = base
            .query_pairs()
            .filter(|(key, _)| key != CURSOR_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        let mut url = base.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .append_pair(CURSOR_PARAM, cursor);
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for cursor encoding and page assembly.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, DEFAULT_LIMIT)]
    #[case(Some(0), 1)]
    #[case(Some(5), 5)]
    #[case(Some(1_000), MAX_LIMIT)]
    fn limit_is_clamped(#[case] requested: Option<u32>, #[case] expected: u32) {
        let request = PageRequest::new(requested, None).expect("request");
        assert_eq!(request.limit(), expected);
        assert_eq!(request.offset(), 0);
    }

    #[rstest]
    fn cursor_survives_transport() {
        let encoded = Cursor::from_offset(40).encode();
        let request = PageRequest::new(Some(20), Some(&encoded)).expect("request");
        assert_eq!(request.offset(), 40);
    }

    #[rstest]
    #[case("%%%", CursorError::Encoding)]
    #[case("bm90LWpzb24", CursorError::Payload)]
    fn malformed_cursors_are_rejected(#[case] raw: &str, #[case] expected: CursorError) {
        let err = PageRequest::new(None, Some(raw)).expect_err("invalid cursor");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn blank_cursor_starts_from_the_beginning() {
        let request = PageRequest::new(None, Some("  ")).expect("request");
        assert_eq!(request.offset(), 0);
    }

    #[rstest]
    fn last_page_has_no_cursor() {
        let request = PageRequest::new(Some(3), None).expect("request");
        let page = Page::from_overfetch(vec![1, 2, 3], &request);
        assert_eq!(page.items.len(), 3);
        assert!(page.next_cursor.is_none());
    }

    #[rstest]
    fn overfetch_produces_next_cursor() {
        let first = PageRequest::new(Some(2), None).expect("request");
        let page = Page::from_overfetch(vec!["a", "b", "c"], &first);
        assert_eq!(page.items, vec!["a", "b"]);
        let next = page.next_cursor.as_deref().expect("next cursor");
        let second = PageRequest::new(Some(2), Some(next)).expect("second request");
        assert_eq!(second.offset(), 2);
    }

    #[rstest]
    fn next_link_replaces_cursor_and_keeps_filters() {
        let request = PageRequest::new(Some(1), None).expect("request");
        let page = Page::from_overfetch(vec![1, 2], &request);
        let base = Url::parse("https://example.test/api/v1/universities?country=Kenya&cursor=old")
            .expect("url");
        let link = page.next_link(&base).expect("link");
        let pairs: Vec<(String, String)> = link
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("country".to_owned(), "Kenya".to_owned())));
        assert_eq!(pairs.iter().filter(|(k, _)| k == "cursor").count(), 1);
        assert!(!pairs.contains(&("cursor".to_owned(), "old".to_owned())));
    }

    #[rstest]
    fn map_keeps_cursor() {
        let request = PageRequest::new(Some(1), None).expect("request");
        let page = Page::from_overfetch(vec![1, 2], &request).map(|n| n * 10);
        assert_eq!(page.items, vec![10]);
        assert!(page.next_cursor.is_some());
    }
}
