//! SData URI modeling
//!
//! - [`path`]: path segments and the predicate-aware path parser
//! - [`formatter`]: the general-purpose mutable URI builder
//! - [`sdata`]: the SData-specific URI grammar on top of the formatter

pub mod formatter;
pub mod path;
pub mod sdata;

pub use formatter::UriFormatter;
pub use path::{format_path, parse_path, UriPathSegment};
pub use sdata::SDataUri;
