//! # sdata-model
//!
//! A client-side object model for the Sage SData protocol: typed SData URIs
//! and the XML-Schema-based resource metadata SData providers publish.
//!
//! ## Features
//!
//! - SData URI decomposition and formatting ([`uri::SDataUri`])
//! - The SData path grammar, including quoted selector predicates
//! - Reserved query arguments (`where`, `orderBy`, `startIndex`, ...) as
//!   typed accessors, with `_`-prefixed extension arguments kept separate
//! - An editable schema object model read from and written back to XML
//!   Schema documents ([`schema::SDataSchema`])
//! - SME annotations (resource kinds, service operations, named queries,
//!   relationships) as first-class data, with unmodeled attributes preserved
//!   for round-tripping
//! - Cross-schema type resolution ([`schema::SDataSchemaSet`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use sdata_model::uri::SDataUri;
//! use sdata_model::schema::SDataSchema;
//!
//! let mut uri: SDataUri =
//!     "http://example.com/sdata/myApp/myContract/-/accounts('A42')".parse()?;
//! assert_eq!(uri.resource_kind(), Some("accounts"));
//! uri.set_count(Some(10));
//!
//! let schema = SDataSchema::read_string(&xsd)?;
//! let account = schema.get_type("account");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod namespaces;
pub mod xml;

pub mod uri;

pub mod schema;

pub use error::{Error, Result};
pub use namespaces::QName;
