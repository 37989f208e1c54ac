//! Deferred type references
//!
//! A [`SDataSchemaTypeReference`] is the slot a property or base-type
//! declaration uses to name its type. It is tri-state: resolved to a schema
//! type object, a built-in XML Schema primitive code, or an unresolved
//! qualified name pending compilation. Exactly one state is authoritative at
//! a time. The reference never performs lookups itself; resolution is driven
//! by [`SDataSchema::compile`](crate::schema::SDataSchema::compile).

use crate::namespaces::{QName, XS_NAMESPACE};
use crate::schema::types::SDataSchemaType;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Built-in XML Schema primitive type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlTypeCode {
    /// `xs:string`
    String,
    /// `xs:boolean`
    Boolean,
    /// `xs:decimal`
    Decimal,
    /// `xs:int`
    Int,
    /// `xs:integer`
    Integer,
    /// `xs:long`
    Long,
    /// `xs:short`
    Short,
    /// `xs:byte`
    Byte,
    /// `xs:double`
    Double,
    /// `xs:float`
    Float,
    /// `xs:dateTime`
    DateTime,
    /// `xs:date`
    Date,
    /// `xs:time`
    Time,
    /// `xs:duration`
    Duration,
    /// `xs:anyURI`
    AnyUri,
    /// `xs:base64Binary`
    Base64Binary,
    /// `xs:hexBinary`
    HexBinary,
    /// `xs:anyType`
    AnyType,
}

impl XmlTypeCode {
    /// The XML Schema local name for this code
    pub fn local_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Int => "int",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::Double => "double",
            Self::Float => "float",
            Self::DateTime => "dateTime",
            Self::Date => "date",
            Self::Time => "time",
            Self::Duration => "duration",
            Self::AnyUri => "anyURI",
            Self::Base64Binary => "base64Binary",
            Self::HexBinary => "hexBinary",
            Self::AnyType => "anyType",
        }
    }

    /// Recognize an XML Schema local name as a primitive code
    pub fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "decimal" => Some(Self::Decimal),
            "int" => Some(Self::Int),
            "integer" => Some(Self::Integer),
            "long" => Some(Self::Long),
            "short" => Some(Self::Short),
            "byte" => Some(Self::Byte),
            "double" => Some(Self::Double),
            "float" => Some(Self::Float),
            "dateTime" => Some(Self::DateTime),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "duration" => Some(Self::Duration),
            "anyURI" => Some(Self::AnyUri),
            "base64Binary" => Some(Self::Base64Binary),
            "hexBinary" => Some(Self::HexBinary),
            "anyType" => Some(Self::AnyType),
            _ => None,
        }
    }

    /// The qualified name for this code
    pub fn qualified_name(&self) -> QName {
        QName::xs(self.local_name())
    }
}

/// Shared handle to a schema type
///
/// Types are owned by their schema's type collection; everything else holds
/// weak back-pointers.
pub type SchemaTypeRef = Rc<RefCell<SDataSchemaType>>;

/// Weak handle to a schema type
pub type SchemaTypeWeak = Weak<RefCell<SDataSchemaType>>;

#[derive(Debug, Clone)]
enum Target {
    /// Resolved to a schema type; the qualified name is cached at resolution
    /// time so reads never need to borrow the target
    Resolved { target: SchemaTypeWeak, qname: QName },
    /// A built-in primitive, resolved immediately with no lookup
    Code(XmlTypeCode),
    /// An unresolved qualified name pending compilation
    Named(QName),
}

/// Reference from a property or base-type slot to its schema type
#[derive(Debug, Clone)]
pub struct SDataSchemaTypeReference {
    target: Target,
}

impl SDataSchemaTypeReference {
    /// Create a reference from a qualified name
    ///
    /// A name in the XML Schema namespace matching a recognized primitive
    /// becomes a code reference immediately; anything else is held unresolved
    /// pending compilation.
    pub fn from_qname(qname: QName) -> Self {
        if qname.is_xs() {
            if let Some(code) = XmlTypeCode::from_local_name(&qname.local_name) {
                return Self {
                    target: Target::Code(code),
                };
            }
        }
        Self {
            target: Target::Named(qname),
        }
    }

    /// Create a reference to a built-in primitive
    pub fn from_code(code: XmlTypeCode) -> Self {
        Self {
            target: Target::Code(code),
        }
    }

    /// Create a reference resolved to `target`
    pub fn from_type(target: &SchemaTypeRef) -> Self {
        let qname = target.borrow().qualified_name();
        Self {
            target: Target::Resolved {
                target: Rc::downgrade(target),
                qname,
            },
        }
    }

    /// The built-in primitive code, if this is a code reference
    pub fn code(&self) -> Option<XmlTypeCode> {
        match self.target {
            Target::Code(code) => Some(code),
            _ => None,
        }
    }

    /// Make this a code reference, clearing any resolved type
    pub fn set_code(&mut self, code: XmlTypeCode) {
        self.target = Target::Code(code);
    }

    /// The resolved schema type, if any
    ///
    /// `None` after compilation means the name was not found in the symbol
    /// table; callers fall back on [`qualified_name`](Self::qualified_name).
    pub fn schema_type(&self) -> Option<SchemaTypeRef> {
        match &self.target {
            Target::Resolved { target, .. } => target.upgrade(),
            _ => None,
        }
    }

    /// Resolve this reference to `target`, clearing any code
    pub fn set_schema_type(&mut self, target: &SchemaTypeRef) {
        let qname = target.borrow().qualified_name();
        self.resolve_to(qname, target);
    }

    /// Resolve to `target` under an externally supplied canonical name
    ///
    /// Used during compilation, where the target may be mutably borrowed and
    /// its name is already known from the symbol table.
    pub(crate) fn resolve_to(&mut self, qname: QName, target: &SchemaTypeRef) {
        self.target = Target::Resolved {
            target: Rc::downgrade(target),
            qname,
        };
    }

    /// Drop a resolved reference back to its name
    ///
    /// Used during compilation when the previously resolved target is no
    /// longer in the symbol table.
    pub(crate) fn unresolve(&mut self) {
        if let Target::Resolved { qname, .. } = &self.target {
            self.target = Target::Named(qname.clone());
        }
    }

    /// Whether this reference is resolved (to a type or a built-in code)
    pub fn is_resolved(&self) -> bool {
        match &self.target {
            Target::Resolved { target, .. } => target.upgrade().is_some(),
            Target::Code(_) => true,
            Target::Named(_) => false,
        }
    }

    /// The qualified name identifying the referenced type
    ///
    /// Resolved: the target type's own qualified name. Code: the primitive's
    /// `xs` name. Unresolved: the originally stored name verbatim.
    pub fn qualified_name(&self) -> QName {
        match &self.target {
            Target::Resolved { qname, .. } => qname.clone(),
            Target::Code(code) => code.qualified_name(),
            Target::Named(qname) => qname.clone(),
        }
    }
}

impl PartialEq for SDataSchemaTypeReference {
    fn eq(&self, other: &Self) -> bool {
        self.qualified_name() == other.qualified_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xs_primitive_becomes_code_reference() {
        let reference = SDataSchemaTypeReference::from_qname(QName::xs("dateTime"));
        assert_eq!(reference.code(), Some(XmlTypeCode::DateTime));
        assert!(reference.is_resolved());
        assert_eq!(reference.qualified_name(), QName::xs("dateTime"));
    }

    #[test]
    fn test_non_primitive_stays_named() {
        let qname = QName::namespaced("http://example.com/test", "account");
        let reference = SDataSchemaTypeReference::from_qname(qname.clone());
        assert_eq!(reference.code(), None);
        assert!(!reference.is_resolved());
        assert_eq!(reference.qualified_name(), qname);
    }

    #[test]
    fn test_xs_name_without_code_stays_named() {
        // xs namespace but not a recognized primitive
        let reference = SDataSchemaTypeReference::from_qname(QName::xs("gYearMonth"));
        assert_eq!(reference.code(), None);
        assert!(!reference.is_resolved());
    }

    #[test]
    fn test_code_name_round_trip() {
        for code in [
            XmlTypeCode::String,
            XmlTypeCode::DateTime,
            XmlTypeCode::AnyUri,
            XmlTypeCode::Base64Binary,
        ] {
            assert_eq!(XmlTypeCode::from_local_name(code.local_name()), Some(code));
        }
    }

    #[test]
    fn test_set_code_clears_resolution_state() {
        let mut reference =
            SDataSchemaTypeReference::from_qname(QName::namespaced("http://x", "account"));
        reference.set_code(XmlTypeCode::String);
        assert_eq!(reference.code(), Some(XmlTypeCode::String));
        assert_eq!(reference.qualified_name(), QName::xs("string"));
    }
}
