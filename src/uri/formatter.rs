//! General-purpose mutable URI builder
//!
//! `UriFormatter` decomposes an absolute URI into scheme, credentials, host,
//! port, path segments, query arguments, and fragment, lets each part be
//! mutated independently, and recomposes the URI on demand. The composed form
//! is rebuilt from the decomposed fields on every read, so any mutation is
//! immediately visible in `query()` and `to_string()`.

use crate::error::{Error, Result};
use crate::uri::path::{format_path, parse_path, UriPathSegment};
use indexmap::IndexMap;
use std::fmt;
use url::form_urlencoded;
use url::Url;

/// Default scheme used by an empty formatter
pub const DEFAULT_SCHEME: &str = "http";

/// Default host used by an empty formatter
pub const DEFAULT_HOST: &str = "localhost";

/// Mutable URI builder with SData path-segment awareness
#[derive(Debug, Clone, PartialEq)]
pub struct UriFormatter {
    scheme: String,
    user_name: Option<String>,
    password: Option<String>,
    host: String,
    port: Option<u16>,
    path_segments: Vec<UriPathSegment>,
    query_args: IndexMap<String, String>,
    fragment: Option<String>,
}

impl UriFormatter {
    /// Create an empty formatter addressing `http://localhost/`
    pub fn new() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            user_name: None,
            password: None,
            host: DEFAULT_HOST.to_string(),
            port: None,
            path_segments: Vec::new(),
            query_args: IndexMap::new(),
            fragment: None,
        }
    }

    /// Create a formatter by parsing an absolute URI string
    pub fn parse(uri: &str) -> Result<Self> {
        let mut formatter = Self::new();
        formatter.set_uri(&Url::parse(uri)?)?;
        Ok(formatter)
    }

    /// Create a formatter from an already-parsed URL
    pub fn from_url(url: &Url) -> Result<Self> {
        let mut formatter = Self::new();
        formatter.set_uri(url)?;
        Ok(formatter)
    }

    /// Replace every decomposed field from a new URI value
    ///
    /// Path segments are re-derived from the new value, discarding the old
    /// ones, and the fragment is reset from the new value.
    pub fn set_uri(&mut self, url: &Url) -> Result<()> {
        self.scheme = url.scheme().to_string();
        self.user_name = match url.username() {
            "" => None,
            name => Some(name.to_string()),
        };
        self.password = url.password().map(|p| p.to_string());
        self.host = url.host_str().unwrap_or(DEFAULT_HOST).to_string();
        self.port = url.port();
        self.path_segments = parse_path(url.path().trim_start_matches('/'))?;
        self.query_args = match url.query() {
            Some(query) => parse_query(query)?,
            None => IndexMap::new(),
        };
        self.fragment = url.fragment().map(|f| f.to_string());
        Ok(())
    }

    /// Recompose the current fields into a URL object
    pub fn uri(&self) -> Result<Url> {
        Ok(Url::parse(&self.to_string())?)
    }

    /// The URI scheme
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Set the URI scheme
    pub fn set_scheme(&mut self, scheme: impl Into<String>) {
        self.scheme = scheme.into();
    }

    /// The user name, if any
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Set the user name
    pub fn set_user_name(&mut self, user_name: Option<String>) {
        self.user_name = user_name;
    }

    /// The password, if any
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Set the password
    pub fn set_password(&mut self, password: Option<String>) {
        self.password = password;
    }

    /// The host name
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Set the host name
    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    /// The port; `None` means "use the scheme default"
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Set the port; `None` means "use the scheme default"
    pub fn set_port(&mut self, port: Option<u16>) {
        self.port = port;
    }

    /// The parsed path segments
    pub fn path_segments(&self) -> &[UriPathSegment] {
        &self.path_segments
    }

    /// Mutable access to the path segments
    pub fn path_segments_mut(&mut self) -> &mut Vec<UriPathSegment> {
        &mut self.path_segments
    }

    /// Replace all path segments
    pub fn set_path_segments(&mut self, segments: Vec<UriPathSegment>) {
        self.path_segments = segments;
    }

    /// The path rendered as a string, without a leading slash
    pub fn path(&self) -> String {
        format_path(&self.path_segments)
    }

    /// Replace the path by parsing a path string
    pub fn set_path(&mut self, path: &str) -> Result<()> {
        self.path_segments = parse_path(path.trim_start_matches('/'))?;
        Ok(())
    }

    /// The query arguments, in insertion order
    pub fn query_args(&self) -> &IndexMap<String, String> {
        &self.query_args
    }

    /// Mutable access to the query arguments
    ///
    /// Structural mutation through this view is immediately reflected by
    /// `query()` and `to_string()`.
    pub fn query_args_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.query_args
    }

    /// The query string serialized from the current arguments
    pub fn query(&self) -> String {
        format_query(&self.query_args)
    }

    /// Replace the query arguments by parsing a raw query string
    ///
    /// Values are percent-decoded; malformed percent-encoding is a format
    /// error.
    pub fn set_query(&mut self, query: &str) -> Result<()> {
        self.query_args = parse_query(query)?;
        Ok(())
    }

    /// Query-argument lookup sugar
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query_args.get(key).map(|s| s.as_str())
    }

    /// Query-argument assignment sugar
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query_args.insert(key.into(), value.into());
    }

    /// The fragment, if any
    ///
    /// Stored independently of path and query; mutating other fields leaves
    /// it intact, while `set_uri` resets it from the new value.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Set the fragment
    pub fn set_fragment(&mut self, fragment: Option<String>) {
        self.fragment = fragment;
    }
}

impl Default for UriFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UriFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;
        if let Some(ref user) = self.user_name {
            write!(f, "{}", user)?;
            if let Some(ref password) = self.password {
                write!(f, ":{}", password)?;
            }
            write!(f, "@")?;
        }
        write!(f, "{}", self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        write!(f, "/{}", self.path())?;
        if !self.query_args.is_empty() {
            write!(f, "?{}", self.query())?;
        }
        if let Some(ref fragment) = self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for UriFormatter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse a raw query string into an ordered key-value mapping
///
/// Duplicate keys overwrite; `+` decodes to a space; invalid `%` escapes fail.
fn parse_query(query: &str) -> Result<IndexMap<String, String>> {
    let mut args = IndexMap::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        };
        args.insert(percent_decode(key)?, percent_decode(value)?);
    }
    Ok(args)
}

/// Serialize query arguments in insertion order with percent-encoded values
fn format_query(args: &IndexMap<String, String>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in args {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn percent_decode(input: &str) -> Result<String> {
    let mut bytes = Vec::with_capacity(input.len());
    let mut iter = input.bytes();
    while let Some(b) = iter.next() {
        match b {
            b'%' => {
                let hi = iter.next();
                let lo = iter.next();
                match (hi.and_then(hex_value), lo.and_then(hex_value)) {
                    (Some(hi), Some(lo)) => bytes.push(hi << 4 | lo),
                    _ => {
                        return Err(Error::Format(format!(
                            "malformed percent-encoding in '{}'",
                            input
                        )))
                    }
                }
            }
            b'+' => bytes.push(b' '),
            other => bytes.push(other),
        }
    }
    String::from_utf8(bytes)
        .map_err(|_| Error::Format(format!("percent-encoded data in '{}' is not UTF-8", input)))
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_renders_trailing_slash() {
        let formatter = UriFormatter::new();
        assert_eq!(formatter.to_string(), "http://localhost/");
    }

    #[test]
    fn test_decompose() {
        let formatter =
            UriFormatter::parse("https://user:pw@example.com:8080/sdata/-/-/-?a=1#frag").unwrap();
        assert_eq!(formatter.scheme(), "https");
        assert_eq!(formatter.user_name(), Some("user"));
        assert_eq!(formatter.password(), Some("pw"));
        assert_eq!(formatter.host(), "example.com");
        assert_eq!(formatter.port(), Some(8080));
        assert_eq!(formatter.path_segments().len(), 4);
        assert_eq!(formatter.get("a"), Some("1"));
        assert_eq!(formatter.fragment(), Some("frag"));
    }

    #[test]
    fn test_query_mutation_is_visible() {
        let mut formatter = UriFormatter::parse("http://localhost/").unwrap();
        formatter
            .query_args_mut()
            .insert("orderBy".to_string(), "name".to_string());
        assert_eq!(formatter.query(), "orderBy=name");
        assert_eq!(formatter.to_string(), "http://localhost/?orderBy=name");

        formatter.query_args_mut().clear();
        assert_eq!(formatter.query(), "");
        assert_eq!(formatter.to_string(), "http://localhost/");
    }

    #[test]
    fn test_percent_round_trip() {
        let mut formatter = UriFormatter::new();
        formatter.set("a", "&");
        assert!(formatter.query().contains("a=%26"));

        formatter.set_query("a=%26&b=%26").unwrap();
        assert_eq!(formatter.get("a"), Some("&"));
        assert_eq!(formatter.get("b"), Some("&"));
    }

    #[test]
    fn test_malformed_percent_encoding_fails() {
        let mut formatter = UriFormatter::new();
        assert!(formatter.set_query("a=%2").is_err());
        assert!(formatter.set_query("a=%zz").is_err());
    }

    #[test]
    fn test_assign_new_uri_refreshes_path_segments() {
        let mut formatter = UriFormatter::parse("http://localhost/aaa/bbb/ccc").unwrap();
        assert_eq!(formatter.path_segments().len(), 3);

        let url = Url::parse("http://example.com/xxx").unwrap();
        formatter.set_uri(&url).unwrap();
        assert_eq!(formatter.path_segments().len(), 1);
        assert_eq!(formatter.path_segments()[0].text(), "xxx");
        assert_eq!(formatter.host(), "example.com");
    }

    #[test]
    fn test_fragment_survives_host_change_but_not_reassignment() {
        let mut formatter = UriFormatter::parse("http://localhost/a#frag").unwrap();
        formatter.set_host("example.com");
        assert_eq!(formatter.fragment(), Some("frag"));

        let url = Url::parse("http://example.com/b").unwrap();
        formatter.set_uri(&url).unwrap();
        assert_eq!(formatter.fragment(), None);
    }

    #[test]
    fn test_round_trip_fixpoint() {
        let original = "http://example.com:3333/sdata/-/-/-/test?a=1&b=2#frag";
        let first = UriFormatter::parse(original).unwrap().to_string();
        let second = UriFormatter::parse(&first).unwrap().to_string();
        assert_eq!(first, second);
        assert_eq!(first, original);
    }
}
