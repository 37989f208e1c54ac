//! SData resource URIs
//!
//! `SDataUri` layers SData path grammar over [`UriFormatter`]: three leading
//! addressing segments (where the literal `-` means "default/unspecified"),
//! then dataset, contract, and selector segments, with `$`-prefixed segments
//! switching into service-operation addressing. Query parameters split into
//! protocol-reserved names and `_`-prefixed extension names.

use crate::error::Result;
use crate::uri::formatter::UriFormatter;
use crate::uri::path::UriPathSegment;
use crate::xml::parse_bool;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// The token marking an unspecified addressing segment
pub const UNSPECIFIED_SEGMENT: &str = "-";

/// The marker segment introducing service-operation addressing
pub const SERVICE_SEGMENT: &str = "$service";

/// The marker segment addressing a resource kind's schema
pub const SCHEMA_SEGMENT: &str = "$schema";

/// The marker segment addressing a resource template
pub const TEMPLATE_SEGMENT: &str = "$template";

/// The marker segment addressing a resource prototype
pub const PROTOTYPE_SEGMENT: &str = "$prototype";

/// Protocol-reserved query parameter names
pub mod query_arg_names {
    /// Filter expression
    pub const WHERE: &str = "where";
    /// Sort specification
    pub const ORDER_BY: &str = "orderBy";
    /// Zero-or-one-based index of the first returned resource
    pub const START_INDEX: &str = "startIndex";
    /// Maximum number of resources to return
    pub const COUNT: &str = "count";
    /// Related resources to include inline
    pub const INCLUDE: &str = "include";
    /// Property subset to return
    pub const SELECT: &str = "select";
    /// Maximum property precedence to return
    pub const PRECEDENCE: &str = "precedence";
    /// Whether to inline the resource kind's schema
    pub const INCLUDE_SCHEMA: &str = "includeSchema";
    /// Whether to return only changed values
    pub const RETURN_DELTA: &str = "returnDelta";
    /// Client tracking identifier for asynchronous operations
    pub const TRACKING_ID: &str = "trackingID";
    /// Response format hint
    pub const FORMAT: &str = "format";
    /// Response language hint
    pub const LANGUAGE: &str = "language";
    /// Full-text search expression
    pub const SEARCH: &str = "search";
    /// Whether to return thumbnail representations
    pub const THUMBNAIL: &str = "thumbnail";
}

/// Prefix distinguishing extension query parameters from reserved ones
const EXTENSION_PREFIX: char = '_';

/// Extension parameter controlling content inlining
const INCLUDE_CONTENT_ARG: &str = "includeContent";

// Structural positions of the SData addressing segments.
const PROTOCOL_INDEX: usize = 0;
const SERVER_INDEX: usize = 1;
const VIRTUAL_DIRECTORY_INDEX: usize = 2;
const DATASET_INDEX: usize = 3;
const CONTRACT_INDEX: usize = 4;
const SELECTOR_INDEX: usize = 5;

/// An SData URI
///
/// Dereferences to [`UriFormatter`] for the generic URI surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SDataUri {
    formatter: UriFormatter,
}

impl SDataUri {
    /// Create a URI addressing `http://localhost/`
    pub fn new() -> Self {
        Self {
            formatter: UriFormatter::new(),
        }
    }

    /// Parse an absolute SData URI string
    pub fn parse(uri: &str) -> Result<Self> {
        Ok(Self {
            formatter: UriFormatter::parse(uri)?,
        })
    }

    fn segment_text(&self, index: usize) -> Option<&str> {
        self.formatter
            .path_segments()
            .get(index)
            .map(|s| s.text())
            .filter(|text| *text != UNSPECIFIED_SEGMENT)
    }

    /// Set the segment at `index`, padding any gap with `-` markers
    fn set_segment(&mut self, index: usize, text: Option<String>) {
        let segments = self.formatter.path_segments_mut();
        while segments.len() <= index {
            segments.push(UriPathSegment::new(UNSPECIFIED_SEGMENT));
        }
        segments[index] =
            UriPathSegment::new(text.unwrap_or_else(|| UNSPECIFIED_SEGMENT.to_string()));
    }

    /// The protocol addressing token (first path segment)
    pub fn protocol(&self) -> Option<&str> {
        self.segment_text(PROTOCOL_INDEX)
    }

    /// Set the protocol addressing token
    pub fn set_protocol(&mut self, protocol: Option<String>) {
        self.set_segment(PROTOCOL_INDEX, protocol);
    }

    /// The server addressing token (second path segment)
    pub fn server_name(&self) -> Option<&str> {
        self.segment_text(SERVER_INDEX)
    }

    /// Set the server addressing token
    pub fn set_server_name(&mut self, server_name: Option<String>) {
        self.set_segment(SERVER_INDEX, server_name);
    }

    /// The virtual directory addressing token (third path segment)
    pub fn virtual_directory(&self) -> Option<&str> {
        self.segment_text(VIRTUAL_DIRECTORY_INDEX)
    }

    /// Set the virtual directory addressing token
    pub fn set_virtual_directory(&mut self, virtual_directory: Option<String>) {
        self.set_segment(VIRTUAL_DIRECTORY_INDEX, virtual_directory);
    }

    /// The dataset segment
    pub fn data_set(&self) -> Option<&str> {
        self.segment_text(DATASET_INDEX)
    }

    /// Set the dataset segment
    pub fn set_data_set(&mut self, data_set: Option<String>) {
        self.set_segment(DATASET_INDEX, data_set);
    }

    /// The contract segment
    pub fn contract_name(&self) -> Option<&str> {
        self.segment_text(CONTRACT_INDEX)
    }

    /// Set the contract segment
    pub fn set_contract_name(&mut self, contract_name: Option<String>) {
        self.set_segment(CONTRACT_INDEX, contract_name);
    }

    /// The selector segment, whatever its role
    pub fn selector(&self) -> Option<&UriPathSegment> {
        self.formatter.path_segments().get(SELECTOR_INDEX)
    }

    /// The resource kind named by the selector segment
    ///
    /// `None` when the URI addresses a service operation instead of a
    /// resource, or when the selector is absent or unspecified.
    pub fn resource_kind(&self) -> Option<&str> {
        let segment = self.selector()?;
        if segment.text().starts_with('$') {
            return None;
        }
        Some(segment.text()).filter(|text| *text != UNSPECIFIED_SEGMENT)
    }

    /// Alias for [`resource_kind`](Self::resource_kind)
    pub fn collection_type(&self) -> Option<&str> {
        self.resource_kind()
    }

    /// The predicate selecting a single resource out of the resource kind
    pub fn resource_selector(&self) -> Option<&str> {
        self.selector().and_then(|s| s.predicate())
    }

    /// Set the resource kind, keeping any existing resource selector
    pub fn set_resource_kind(&mut self, resource_kind: Option<String>) {
        let predicate = self.resource_selector().map(|p| p.to_string());
        let kind = resource_kind.unwrap_or_else(|| UNSPECIFIED_SEGMENT.to_string());
        let segments = self.formatter.path_segments_mut();
        while segments.len() <= SELECTOR_INDEX {
            segments.push(UriPathSegment::new(UNSPECIFIED_SEGMENT));
        }
        segments[SELECTOR_INDEX] = match predicate {
            Some(predicate) => UriPathSegment::with_predicate(kind, predicate),
            None => UriPathSegment::new(kind),
        };
    }

    /// Set the resource selector predicate on the selector segment
    pub fn set_resource_selector(&mut self, selector: Option<String>) {
        let kind = self
            .resource_kind()
            .map(|s| s.to_string())
            .unwrap_or_else(|| UNSPECIFIED_SEGMENT.to_string());
        let segments = self.formatter.path_segments_mut();
        while segments.len() <= SELECTOR_INDEX {
            segments.push(UriPathSegment::new(UNSPECIFIED_SEGMENT));
        }
        segments[SELECTOR_INDEX] = match selector {
            Some(predicate) => UriPathSegment::with_predicate(kind, predicate),
            None => UriPathSegment::new(kind),
        };
    }

    /// Index of the `$service` marker segment, if present
    fn service_index(&self) -> Option<usize> {
        self.formatter
            .path_segments()
            .iter()
            .position(|s| s.text() == SERVICE_SEGMENT)
    }

    /// Whether this URI addresses a service operation
    pub fn is_service(&self) -> bool {
        self.service_index().is_some()
    }

    /// The service class segment following the `$service` marker
    pub fn service_class(&self) -> Option<&str> {
        let index = self.service_index()?;
        self.segment_text(index + 1)
    }

    /// The service method segment following the service class
    pub fn service_method(&self) -> Option<&str> {
        let index = self.service_index()?;
        self.segment_text(index + 2)
    }

    /// Alias for [`service_method`](Self::service_method)
    pub fn service_operation(&self) -> Option<&str> {
        self.service_method()
    }

    /// Append a path segment after the current terminal segment
    ///
    /// Always appends at the end, whether the URI currently terminates in a
    /// resource selector or a service method.
    pub fn append_path(&mut self, segment: impl Into<String>) -> Result<()> {
        let parsed = crate::uri::path::parse_path(&segment.into())?;
        self.formatter.path_segments_mut().extend(parsed);
        Ok(())
    }

    /// The `_includeContent` extension parameter
    ///
    /// Absent parameter reads as `None`, not `false`.
    pub fn include_content(&self) -> Option<bool> {
        self.extension_arg(INCLUDE_CONTENT_ARG).map(parse_bool)
    }

    /// Set or clear the `_includeContent` extension parameter
    pub fn set_include_content(&mut self, value: Option<bool>) {
        self.set_extension_arg(INCLUDE_CONTENT_ARG, value.map(|v| v.to_string()));
    }

    /// Read an extension query parameter by its unprefixed name
    pub fn extension_arg(&self, name: &str) -> Option<&str> {
        self.formatter
            .get(&format!("{}{}", EXTENSION_PREFIX, name))
    }

    /// Write or remove an extension query parameter by its unprefixed name
    pub fn set_extension_arg(&mut self, name: &str, value: Option<String>) {
        let key = format!("{}{}", EXTENSION_PREFIX, name);
        match value {
            Some(value) => {
                self.formatter.set(key, value);
            }
            None => {
                self.formatter.query_args_mut().shift_remove(&key);
            }
        }
    }

    fn reserved_arg(&self, name: &str) -> Option<&str> {
        self.formatter.get(name)
    }

    fn set_reserved_arg(&mut self, name: &str, value: Option<String>) {
        match value {
            Some(value) => self.formatter.set(name, value),
            None => {
                self.formatter.query_args_mut().shift_remove(name);
            }
        }
    }

    /// The `where` filter expression
    pub fn where_clause(&self) -> Option<&str> {
        self.reserved_arg(query_arg_names::WHERE)
    }

    /// Set the `where` filter expression
    pub fn set_where_clause(&mut self, value: Option<String>) {
        self.set_reserved_arg(query_arg_names::WHERE, value);
    }

    /// The `orderBy` sort specification
    pub fn order_by(&self) -> Option<&str> {
        self.reserved_arg(query_arg_names::ORDER_BY)
    }

    /// Set the `orderBy` sort specification
    pub fn set_order_by(&mut self, value: Option<String>) {
        self.set_reserved_arg(query_arg_names::ORDER_BY, value);
    }

    /// The `startIndex` paging parameter
    pub fn start_index(&self) -> Option<u64> {
        self.reserved_arg(query_arg_names::START_INDEX)
            .and_then(|v| v.parse().ok())
    }

    /// Set the `startIndex` paging parameter
    pub fn set_start_index(&mut self, value: Option<u64>) {
        self.set_reserved_arg(query_arg_names::START_INDEX, value.map(|v| v.to_string()));
    }

    /// The `count` paging parameter
    pub fn count(&self) -> Option<u64> {
        self.reserved_arg(query_arg_names::COUNT)
            .and_then(|v| v.parse().ok())
    }

    /// Set the `count` paging parameter
    pub fn set_count(&mut self, value: Option<u64>) {
        self.set_reserved_arg(query_arg_names::COUNT, value.map(|v| v.to_string()));
    }

    /// The `include` inline-expansion parameter
    pub fn include(&self) -> Option<&str> {
        self.reserved_arg(query_arg_names::INCLUDE)
    }

    /// Set the `include` inline-expansion parameter
    pub fn set_include(&mut self, value: Option<String>) {
        self.set_reserved_arg(query_arg_names::INCLUDE, value);
    }

    /// The `select` property-subset parameter
    pub fn select(&self) -> Option<&str> {
        self.reserved_arg(query_arg_names::SELECT)
    }

    /// Set the `select` property-subset parameter
    pub fn set_select(&mut self, value: Option<String>) {
        self.set_reserved_arg(query_arg_names::SELECT, value);
    }

    /// The `precedence` parameter
    pub fn precedence(&self) -> Option<u32> {
        self.reserved_arg(query_arg_names::PRECEDENCE)
            .and_then(|v| v.parse().ok())
    }

    /// Set the `precedence` parameter
    pub fn set_precedence(&mut self, value: Option<u32>) {
        self.set_reserved_arg(query_arg_names::PRECEDENCE, value.map(|v| v.to_string()));
    }

    /// The `includeSchema` parameter
    pub fn include_schema(&self) -> Option<bool> {
        self.reserved_arg(query_arg_names::INCLUDE_SCHEMA)
            .map(parse_bool)
    }

    /// Set the `includeSchema` parameter
    pub fn set_include_schema(&mut self, value: Option<bool>) {
        self.set_reserved_arg(query_arg_names::INCLUDE_SCHEMA, value.map(|v| v.to_string()));
    }

    /// The `returnDelta` parameter
    pub fn return_delta(&self) -> Option<bool> {
        self.reserved_arg(query_arg_names::RETURN_DELTA)
            .map(parse_bool)
    }

    /// Set the `returnDelta` parameter
    pub fn set_return_delta(&mut self, value: Option<bool>) {
        self.set_reserved_arg(query_arg_names::RETURN_DELTA, value.map(|v| v.to_string()));
    }

    /// The `trackingID` parameter
    pub fn tracking_id(&self) -> Option<&str> {
        self.reserved_arg(query_arg_names::TRACKING_ID)
    }

    /// Set the `trackingID` parameter
    pub fn set_tracking_id(&mut self, value: Option<String>) {
        self.set_reserved_arg(query_arg_names::TRACKING_ID, value);
    }

    /// The `search` full-text parameter
    pub fn search(&self) -> Option<&str> {
        self.reserved_arg(query_arg_names::SEARCH)
    }

    /// Set the `search` full-text parameter
    pub fn set_search(&mut self, value: Option<String>) {
        self.set_reserved_arg(query_arg_names::SEARCH, value);
    }

    /// The `format` response-format hint
    pub fn format(&self) -> Option<&str> {
        self.reserved_arg(query_arg_names::FORMAT)
    }

    /// Set the `format` response-format hint
    pub fn set_format(&mut self, value: Option<String>) {
        self.set_reserved_arg(query_arg_names::FORMAT, value);
    }

    /// The `language` response-language hint
    pub fn language(&self) -> Option<&str> {
        self.reserved_arg(query_arg_names::LANGUAGE)
    }

    /// Set the `language` response-language hint
    pub fn set_language(&mut self, value: Option<String>) {
        self.set_reserved_arg(query_arg_names::LANGUAGE, value);
    }

    /// The `thumbnail` parameter
    pub fn thumbnail(&self) -> Option<bool> {
        self.reserved_arg(query_arg_names::THUMBNAIL)
            .map(parse_bool)
    }

    /// Set the `thumbnail` parameter
    pub fn set_thumbnail(&mut self, value: Option<bool>) {
        self.set_reserved_arg(query_arg_names::THUMBNAIL, value.map(|v| v.to_string()));
    }
}

impl Deref for SDataUri {
    type Target = UriFormatter;

    fn deref(&self) -> &UriFormatter {
        &self.formatter
    }
}

impl DerefMut for SDataUri {
    fn deref_mut(&mut self) -> &mut UriFormatter {
        &mut self.formatter
    }
}

impl fmt::Display for SDataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.formatter, f)
    }
}

impl std::str::FromStr for SDataUri {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addressing_segments() {
        let uri = SDataUri::parse("http://example.com/sdata/-/-/prod/test/accounts('A1')").unwrap();
        assert_eq!(uri.protocol(), Some("sdata"));
        assert_eq!(uri.server_name(), None);
        assert_eq!(uri.virtual_directory(), None);
        assert_eq!(uri.data_set(), Some("prod"));
        assert_eq!(uri.contract_name(), Some("test"));
        assert_eq!(uri.resource_kind(), Some("accounts"));
        assert_eq!(uri.resource_selector(), Some("'A1'"));
    }

    #[test]
    fn test_unspecified_reads_as_none() {
        let uri = SDataUri::parse("http://example.com/sdata/-/-/-/-/-").unwrap();
        assert_eq!(uri.data_set(), None);
        assert_eq!(uri.contract_name(), None);
        assert_eq!(uri.resource_kind(), None);
    }

    #[test]
    fn test_set_segment_pads_with_markers() {
        let mut uri = SDataUri::new();
        uri.set_data_set(Some("prod".to_string()));
        assert_eq!(uri.to_string(), "http://localhost/-/-/-/prod");
    }

    #[test]
    fn test_service_addressing() {
        let uri =
            SDataUri::parse("http://example.com/sdata/-/-/-/test/$service/accounts/computePrice")
                .unwrap();
        assert!(uri.is_service());
        assert_eq!(uri.resource_kind(), None);
        assert_eq!(uri.service_class(), Some("accounts"));
        assert_eq!(uri.service_method(), Some("computePrice"));
    }

    #[test]
    fn test_append_path_after_service_method() {
        let mut uri =
            SDataUri::parse("http://example.com/sdata/-/-/-/test/$service/name").unwrap();
        uri.append_path("test").unwrap();
        assert_eq!(
            uri.to_string(),
            "http://example.com/sdata/-/-/-/test/$service/name/test"
        );
        assert_eq!(uri.service_class(), Some("name"));
    }

    #[test]
    fn test_set_resource_kind_keeps_selector() {
        let mut uri =
            SDataUri::parse("http://example.com/sdata/-/-/-/test/accounts('A42')").unwrap();
        uri.set_resource_kind(Some("contacts".to_string()));
        assert_eq!(uri.resource_kind(), Some("contacts"));
        assert_eq!(uri.resource_selector(), Some("'A42'"));
        assert_eq!(
            uri.to_string(),
            "http://example.com/sdata/-/-/-/test/contacts('A42')"
        );

        uri.set_resource_kind(None);
        assert_eq!(uri.resource_kind(), None);
        assert_eq!(uri.resource_selector(), Some("'A42'"));
    }

    #[test]
    fn test_boolean_args_accept_numeric_form() {
        let mut uri = SDataUri::parse("http://localhost/").unwrap();
        uri.set_query("includeSchema=1&returnDelta=true&thumbnail=0&_includeContent=1")
            .unwrap();
        assert_eq!(uri.include_schema(), Some(true));
        assert_eq!(uri.return_delta(), Some(true));
        assert_eq!(uri.thumbnail(), Some(false));
        assert_eq!(uri.include_content(), Some(true));
    }

    #[test]
    fn test_include_content_extension_arg() {
        let mut uri = SDataUri::parse("http://localhost/").unwrap();
        assert_eq!(uri.include_content(), None);

        uri.set_include_content(Some(true));
        assert_eq!(uri.get("_includeContent"), Some("true"));
        assert_eq!(uri.include_content(), Some(true));

        uri.set_include_content(None);
        assert_eq!(uri.include_content(), None);
        assert_eq!(uri.query(), "");
    }

    #[test]
    fn test_reserved_args() {
        let mut uri = SDataUri::parse("http://localhost/").unwrap();
        uri.set_start_index(Some(11));
        uri.set_count(Some(10));
        uri.set_order_by(Some("name".to_string()));
        assert_eq!(uri.query(), "startIndex=11&count=10&orderBy=name");
        assert_eq!(uri.start_index(), Some(11));
        assert_eq!(uri.count(), Some(10));

        uri.set_count(None);
        assert_eq!(uri.count(), None);
        assert!(!uri.query().contains("count"));
    }
}
