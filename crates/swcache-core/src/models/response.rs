use serde::{Deserialize, Serialize};

/// Browser response type, as seen by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response
    Basic,
    /// Cross-origin response the page is allowed to read
    Cors,
    /// Cross-origin response whose status and body are hidden
    Opaque,
}

/// Snapshot of a network response.
///
/// The body is not part of the serialized form; storage backends persist
/// it separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub response_type: ResponseType,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, response_type: ResponseType) -> Self {
        Self {
            status,
            response_type,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// An opaque response exposes neither status, headers nor body
    pub fn opaque() -> Self {
        Self::new(0, ResponseType::Opaque)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// First header value matching `name`, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Status in the 200-299 range
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only a plain 200 the page can read is worth keeping for offline use
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.response_type != ResponseType::Opaque
    }
}
