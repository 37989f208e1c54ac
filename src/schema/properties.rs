//! Schema properties
//!
//! Properties are the members of a complex type's `xs:all` group. A plain
//! value property carries SME display and storage hints; a property marked
//! with the SME `relationship` attribute is a relationship property whose
//! value is a reference to another resource kind, single or collection.

use crate::error::{Result, StructuralError};
use crate::namespaces::QName;
use crate::schema::object::{parse_bool, sme_attrs, xs_attrs, xs_elements, QNameFormatter, SmeAttributes};
use crate::schema::reference::SDataSchemaTypeReference;
use crate::schema::types::SchemaTypeKind;
use crate::xml::Element;

/// The SData relationship flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    /// The target is this resource's parent
    Parent,
    /// The target is a child of this resource
    Child,
    /// The target is referenced without ownership
    Reference,
    /// The target participates in an association
    Association,
}

impl RelationshipKind {
    /// Parse from the SME `relationship` attribute value
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "parent" => Some(Self::Parent),
            "child" => Some(Self::Child),
            "reference" => Some(Self::Reference),
            "association" => Some(Self::Association),
            _ => None,
        }
    }

    /// The attribute value for this variant
    pub fn as_value(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
            Self::Reference => "reference",
            Self::Association => "association",
        }
    }
}

/// Relationship-specific SME attributes
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipInfo {
    /// Relationship flavor
    pub relationship: RelationshipKind,
    /// Whether the target is a collection of resources
    pub is_collection: bool,
    /// Whether the relationship link supports GET
    pub can_get: bool,
    /// Whether the relationship link supports POST
    pub can_post: bool,
    /// Whether the relationship link supports PUT
    pub can_put: bool,
    /// Whether the relationship link supports DELETE
    pub can_delete: bool,
    /// Paging capability: previous page
    pub can_page_previous: bool,
    /// Paging capability: next page
    pub can_page_next: bool,
    /// Paging capability: by index
    pub can_page_index: bool,
}

impl RelationshipInfo {
    /// Create with the given flavor and all capability flags off
    pub fn new(relationship: RelationshipKind) -> Self {
        Self {
            relationship,
            is_collection: false,
            can_get: false,
            can_post: false,
            can_put: false,
            can_delete: false,
            can_page_previous: false,
            can_page_next: false,
            can_page_index: false,
        }
    }
}

/// Value versus relationship property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// Plain value property
    Value,
    /// Relationship property
    Relationship(RelationshipInfo),
}

/// One property declaration of a complex type
#[derive(Debug, Clone, PartialEq)]
pub struct SDataSchemaProperty {
    /// Property name
    pub name: String,
    /// Reference to the property's type
    pub type_ref: SDataSchemaTypeReference,
    /// `xs:nillable`
    pub nillable: bool,
    /// `xs:minOccurs`, when declared
    pub min_occurs: Option<u32>,
    /// Common SME attributes and the unhandled passthrough bag
    pub sme: SmeAttributes,
    /// SME `isMandatory`
    pub is_mandatory: bool,
    /// SME `isReadOnly`
    pub is_read_only: bool,
    /// SME `averageLength`
    pub average_length: Option<u32>,
    /// SME `maxLength`
    pub max_length: Option<u32>,
    /// SME `precision`
    pub precision: Option<u32>,
    /// SME `scale`
    pub scale: Option<u32>,
    /// Value or relationship
    pub kind: PropertyKind,
}

impl SDataSchemaProperty {
    /// Create a value property
    pub fn new(name: impl Into<String>, type_ref: SDataSchemaTypeReference) -> Self {
        Self {
            name: name.into(),
            type_ref,
            nillable: false,
            min_occurs: None,
            sme: SmeAttributes::default(),
            is_mandatory: false,
            is_read_only: false,
            average_length: None,
            max_length: None,
            precision: None,
            scale: None,
            kind: PropertyKind::Value,
        }
    }

    /// Create a relationship property
    pub fn relationship(
        name: impl Into<String>,
        type_ref: SDataSchemaTypeReference,
        info: RelationshipInfo,
    ) -> Self {
        let mut property = Self::new(name, type_ref);
        property.kind = PropertyKind::Relationship(info);
        property
    }

    /// Whether this is a relationship property
    pub fn is_relationship(&self) -> bool {
        matches!(self.kind, PropertyKind::Relationship(_))
    }

    /// The relationship details, if any
    pub fn relationship_info(&self) -> Option<&RelationshipInfo> {
        match &self.kind {
            PropertyKind::Relationship(info) => Some(info),
            PropertyKind::Value => None,
        }
    }

    /// The type name to emit for this property
    ///
    /// A collection relationship resolved to a complex type with a list
    /// shadow names the list wrapper; everything else names the type itself.
    pub fn write_type_name(&self) -> QName {
        if let PropertyKind::Relationship(info) = &self.kind {
            if info.is_collection {
                if let Some(target) = self.type_ref.schema_type() {
                    let target = target.borrow();
                    if let SchemaTypeKind::Complex(complex) = &target.kind {
                        if let Some(ref list_name) = complex.list_name {
                            return QName::new(target.namespace.clone(), list_name.clone());
                        }
                    }
                }
            }
        }
        self.type_ref.qualified_name()
    }

    /// Read a property from an `xs:element` declaration inside an `xs:all`
    /// group
    ///
    /// `scope` provides the in-scope namespace declarations for resolving the
    /// `type` attribute value.
    pub fn read(element: &Element, scope: &[&Element]) -> Result<Self> {
        let name = element
            .attr(xs_attrs::NAME)
            .ok_or_else(|| StructuralError::new("property element has no name"))?
            .to_string();
        let type_value = element.attr(xs_attrs::TYPE).ok_or_else(|| {
            StructuralError::new("property element has no type").with_element(name.clone())
        })?;
        let type_qname = element.resolve_qname(type_value, scope).ok_or_else(|| {
            StructuralError::new(format!("cannot resolve type name '{}'", type_value))
                .with_element(name.clone())
        })?;

        let mut property = Self::new(name, SDataSchemaTypeReference::from_qname(type_qname));
        property.nillable = element.attr(xs_attrs::NILLABLE).map(parse_bool).unwrap_or(false);
        property.min_occurs = element
            .attr(xs_attrs::MIN_OCCURS)
            .and_then(|v| v.parse().ok());

        let mut relationship: Option<RelationshipInfo> = None;
        let mut is_mandatory = false;
        let mut is_read_only = false;
        let mut average_length = None;
        let mut max_length = None;
        let mut precision = None;
        let mut scale = None;
        let mut flags: Vec<(String, bool)> = Vec::new();

        property.sme = SmeAttributes::read(element, |attr_name, value| match attr_name {
            sme_attrs::RELATIONSHIP => {
                if let Some(kind) = RelationshipKind::from_value(value) {
                    relationship = Some(RelationshipInfo::new(kind));
                }
                true
            }
            sme_attrs::IS_MANDATORY => {
                is_mandatory = parse_bool(value);
                true
            }
            sme_attrs::IS_READ_ONLY => {
                is_read_only = parse_bool(value);
                true
            }
            sme_attrs::AVERAGE_LENGTH => {
                average_length = value.parse().ok();
                true
            }
            sme_attrs::MAX_LENGTH => {
                max_length = value.parse().ok();
                true
            }
            sme_attrs::PRECISION => {
                precision = value.parse().ok();
                true
            }
            sme_attrs::SCALE => {
                scale = value.parse().ok();
                true
            }
            sme_attrs::IS_COLLECTION
            | sme_attrs::CAN_GET
            | sme_attrs::CAN_POST
            | sme_attrs::CAN_PUT
            | sme_attrs::CAN_DELETE
            | sme_attrs::CAN_PAGE_PREVIOUS
            | sme_attrs::CAN_PAGE_NEXT
            | sme_attrs::CAN_PAGE_INDEX => {
                flags.push((attr_name.to_string(), parse_bool(value)));
                true
            }
            _ => false,
        });

        property.is_mandatory = is_mandatory;
        property.is_read_only = is_read_only;
        property.average_length = average_length;
        property.max_length = max_length;
        property.precision = precision;
        property.scale = scale;

        if let Some(mut info) = relationship {
            for (flag, value) in flags {
                match flag.as_str() {
                    sme_attrs::IS_COLLECTION => info.is_collection = value,
                    sme_attrs::CAN_GET => info.can_get = value,
                    sme_attrs::CAN_POST => info.can_post = value,
                    sme_attrs::CAN_PUT => info.can_put = value,
                    sme_attrs::CAN_DELETE => info.can_delete = value,
                    sme_attrs::CAN_PAGE_PREVIOUS => info.can_page_previous = value,
                    sme_attrs::CAN_PAGE_NEXT => info.can_page_next = value,
                    sme_attrs::CAN_PAGE_INDEX => info.can_page_index = value,
                    _ => {}
                }
            }
            property.kind = PropertyKind::Relationship(info);
        }

        Ok(property)
    }

    /// Write this property as an `xs:element` declaration
    pub fn write(&self, formatter: &QNameFormatter) -> Element {
        let mut element = Element::new(QName::xs(xs_elements::ELEMENT));
        element.set_attr(xs_attrs::NAME, self.name.clone());
        element.set_attr(xs_attrs::TYPE, formatter.format(&self.write_type_name()));
        if let Some(min_occurs) = self.min_occurs {
            element.set_attr(xs_attrs::MIN_OCCURS, min_occurs.to_string());
        }
        if self.nillable {
            element.set_attr(xs_attrs::NILLABLE, "true");
        }

        if let PropertyKind::Relationship(info) = &self.kind {
            element.set_attribute(
                QName::sme(sme_attrs::RELATIONSHIP),
                info.relationship.as_value(),
            );
            let flags = [
                (sme_attrs::IS_COLLECTION, info.is_collection),
                (sme_attrs::CAN_GET, info.can_get),
                (sme_attrs::CAN_POST, info.can_post),
                (sme_attrs::CAN_PUT, info.can_put),
                (sme_attrs::CAN_DELETE, info.can_delete),
                (sme_attrs::CAN_PAGE_PREVIOUS, info.can_page_previous),
                (sme_attrs::CAN_PAGE_NEXT, info.can_page_next),
                (sme_attrs::CAN_PAGE_INDEX, info.can_page_index),
            ];
            for (name, value) in flags {
                if value {
                    element.set_attribute(QName::sme(name), "true");
                }
            }
        }
        if self.is_mandatory {
            element.set_attribute(QName::sme(sme_attrs::IS_MANDATORY), "true");
        }
        if self.is_read_only {
            element.set_attribute(QName::sme(sme_attrs::IS_READ_ONLY), "true");
        }
        if let Some(value) = self.average_length {
            element.set_attribute(QName::sme(sme_attrs::AVERAGE_LENGTH), value.to_string());
        }
        if let Some(value) = self.max_length {
            element.set_attribute(QName::sme(sme_attrs::MAX_LENGTH), value.to_string());
        }
        if let Some(value) = self.precision {
            element.set_attribute(QName::sme(sme_attrs::PRECISION), value.to_string());
        }
        if let Some(value) = self.scale {
            element.set_attribute(QName::sme(sme_attrs::SCALE), value.to_string());
        }
        self.sme.write(&mut element);

        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::{SME_NAMESPACE, XS_NAMESPACE};
    use crate::schema::reference::XmlTypeCode;

    fn property_element(xml_attrs: &str) -> Element {
        let xml = format!(
            r#"<xs:element xmlns:xs="{}" xmlns:sme="{}" xmlns:tns="http://example.com/test" {}/>"#,
            XS_NAMESPACE, SME_NAMESPACE, xml_attrs
        );
        Element::parse(&xml).unwrap()
    }

    #[test]
    fn test_read_value_property() {
        let element = property_element(
            r#"name="name" type="xs:string" minOccurs="0" sme:label="Name" sme:maxLength="64" sme:isMandatory="true""#,
        );
        let property = SDataSchemaProperty::read(&element, &[]).unwrap();
        assert_eq!(property.name, "name");
        assert_eq!(property.type_ref.code(), Some(XmlTypeCode::String));
        assert_eq!(property.min_occurs, Some(0));
        assert_eq!(property.sme.label.as_deref(), Some("Name"));
        assert_eq!(property.max_length, Some(64));
        assert!(property.is_mandatory);
        assert!(!property.is_relationship());
    }

    #[test]
    fn test_read_relationship_property() {
        let element = property_element(
            r#"name="contacts" type="tns:contact" sme:relationship="child" sme:isCollection="true" sme:canGet="true""#,
        );
        let property = SDataSchemaProperty::read(&element, &[]).unwrap();
        let info = property.relationship_info().expect("relationship");
        assert_eq!(info.relationship, RelationshipKind::Child);
        assert!(info.is_collection);
        assert!(info.can_get);
        assert!(!info.can_post);
        assert_eq!(
            property.type_ref.qualified_name(),
            QName::namespaced("http://example.com/test", "contact")
        );
    }

    #[test]
    fn test_missing_name_fails() {
        let element = property_element(r#"type="xs:string""#);
        assert!(SDataSchemaProperty::read(&element, &[]).is_err());
    }

    #[test]
    fn test_write_round_trip() {
        let element = property_element(
            r#"name="status" type="xs:string" sme:label="Status" sme:somethingNew="kept""#,
        );
        let property = SDataSchemaProperty::read(&element, &[]).unwrap();

        let mut formatter = QNameFormatter::default();
        formatter
            .prefixes
            .insert(XS_NAMESPACE.to_string(), "xs".to_string());
        let written = property.write(&formatter);
        assert_eq!(written.attr("type"), Some("xs:string"));
        assert_eq!(written.attribute(&QName::sme("label")), Some("Status"));
        assert_eq!(written.attribute(&QName::sme("somethingNew")), Some("kept"));
    }
}
