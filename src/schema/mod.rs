//! The SData schema object model
//!
//! An XML Schema document, restricted to the shapes SData providers emit, is
//! read into a typed graph ([`SDataSchema`] owning [`SDataSchemaType`]s whose
//! properties point back through [`SDataSchemaTypeReference`]s), can be
//! edited in place, and written back out. [`SDataSchemaSet`] compiles
//! several schemas against each other.

pub mod object;
pub mod properties;
pub mod reference;
#[allow(clippy::module_inception)]
pub mod schema;
pub mod set;
pub mod types;

pub use object::{Compliance, SmeAttributes};
pub use properties::{PropertyKind, RelationshipInfo, RelationshipKind, SDataSchemaProperty};
pub use reference::{
    SDataSchemaTypeReference, SchemaTypeRef, SchemaTypeWeak, XmlTypeCode,
};
pub use schema::{
    FormDefault, SDataSchema, SchemaImport, SchemaTypeCollection, SymbolEntry, SymbolTable,
};
pub use set::{SDataSchemaSet, SchemaRef};
pub use types::{
    ChoiceMember, ChoiceTypeInfo, ComplexTypeInfo, EnumTypeInfo, MaxOccurs, NamedQueryInfo,
    ResourceTypeInfo, SDataSchemaType, SchemaFacet, SchemaTypeKind, ServiceOperationInfo,
    SimpleTypeInfo, TopLevelInfo, TypeRole,
};
