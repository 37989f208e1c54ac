//! Schema type declarations
//!
//! The set of schema node kinds is closed, so the hierarchy is a sum type:
//! simple types, enum types, complex types (optionally classified as a
//! top-level resource kind, service operation, or named query, and optionally
//! paired with a list-shadow wrapper), and choice types. Each kind knows how
//! to read itself from and write itself back to its `xs:*` declaration.

use crate::error::{Error, Result, StructuralError};
use crate::namespaces::QName;
use crate::schema::object::{
    parse_bool, read_documentation, sme_attrs, write_documentation, xs_attrs, xs_elements,
    QNameFormatter, SmeAttributes,
};
use crate::schema::properties::SDataSchemaProperty;
use crate::schema::reference::SDataSchemaTypeReference;
use crate::xml::Element;
use indexmap::IndexMap;

/// One opaquely preserved restriction facet
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaFacet {
    /// Facet local name (`enumeration`, `maxLength`, `pattern`, ...)
    pub name: String,
    /// Facet value
    pub value: String,
}

/// A simple type: a restricted base plus preserved facets
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleTypeInfo {
    /// Restriction base type name
    pub base: Option<QName>,
    /// Restriction facets, preserved opaquely in document order
    pub facets: Vec<SchemaFacet>,
}

/// An enum type: a restriction whose facets are all enumeration values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumTypeInfo {
    /// Restriction base type name
    pub base: Option<QName>,
    /// Enumeration values in document order
    pub values: Vec<String>,
}

/// Upper bound of a choice group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    /// A fixed count
    Count(u32),
    /// `unbounded`
    Unbounded,
}

impl MaxOccurs {
    fn from_value(value: &str) -> Option<Self> {
        if value == "unbounded" {
            Some(Self::Unbounded)
        } else {
            value.parse().ok().map(Self::Count)
        }
    }

    fn as_value(&self) -> String {
        match self {
            Self::Count(count) => count.to_string(),
            Self::Unbounded => "unbounded".to_string(),
        }
    }
}

/// One named alternative of a choice type
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceMember {
    /// Element name of the alternative
    pub element_name: String,
    /// Reference to the alternative's type
    pub type_ref: SDataSchemaTypeReference,
}

/// A choice type: an ordered list of named alternatives
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChoiceTypeInfo {
    /// The alternatives in document order
    pub members: Vec<ChoiceMember>,
    /// Optional upper bound on the choice group
    pub max_occurs: Option<MaxOccurs>,
}

/// Role of a top-level type, selected by the SME `role` attribute
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRole {
    /// An addressable collection of resources
    ResourceKind(ResourceTypeInfo),
    /// A callable service operation
    ServiceOperation(ServiceOperationInfo),
    /// A named query
    NamedQuery(NamedQueryInfo),
}

impl TypeRole {
    /// The SME `role` attribute value for this role
    pub fn as_value(&self) -> &'static str {
        match self {
            Self::ResourceKind(_) => "resourceKind",
            Self::ServiceOperation(_) => "serviceOperation",
            Self::NamedQuery(_) => "query",
        }
    }
}

/// Resource-kind SME attributes carried by the top-level element declaration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceTypeInfo {
    /// SME `pluralName`
    pub plural_name: Option<String>,
    /// SME `canSearch`
    pub can_search: bool,
    /// SME `hasUuid`
    pub has_uuid: bool,
    /// SME `hasTemplate`
    pub has_template: bool,
    /// SME `supportsETag`
    pub supports_etag: bool,
    /// SME `batchingMode`
    pub batching_mode: Option<String>,
    /// SME `syncMode`
    pub sync_mode: Option<String>,
}

/// Service-operation SME attributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceOperationInfo {
    /// SME `path`
    pub path: Option<String>,
    /// SME `invocationMode`
    pub invocation_mode: Option<String>,
}

/// Named-query SME attributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedQueryInfo {
    /// SME `path`
    pub path: Option<String>,
}

/// Top-level classification of a complex type
///
/// Read from the top-level element declaration that immediately precedes the
/// complex type declaration and references it by type name.
#[derive(Debug, Clone, PartialEq)]
pub struct TopLevelInfo {
    /// Name of the preceding element declaration
    pub element_name: String,
    /// Role and role-specific attributes
    pub role: TypeRole,
    /// Remaining SME attributes of the element declaration
    pub sme: SmeAttributes,
}

impl TopLevelInfo {
    /// Read classification from a top-level `xs:element` declaration
    ///
    /// Fails with a structural error when the required SME `role` attribute
    /// is missing or carries an unexpected value.
    pub fn read(element: &Element) -> Result<Self> {
        let element_name = element
            .attr(xs_attrs::NAME)
            .ok_or_else(|| StructuralError::new("top-level element has no name"))?
            .to_string();

        let role_value = element
            .attribute(&QName::sme(sme_attrs::ROLE))
            .ok_or_else(|| {
                StructuralError::new("top-level element has no role attribute")
                    .with_element(element_name.clone())
            })?
            .to_string();

        let mut resource = ResourceTypeInfo::default();
        let mut service = ServiceOperationInfo::default();
        let mut query = NamedQueryInfo::default();

        let sme = SmeAttributes::read(element, |name, value| match name {
            sme_attrs::ROLE => true,
            sme_attrs::PLURAL_NAME => {
                resource.plural_name = Some(value.to_string());
                true
            }
            sme_attrs::CAN_SEARCH => {
                resource.can_search = parse_bool(value);
                true
            }
            sme_attrs::HAS_UUID => {
                resource.has_uuid = parse_bool(value);
                true
            }
            sme_attrs::HAS_TEMPLATE => {
                resource.has_template = parse_bool(value);
                true
            }
            sme_attrs::SUPPORTS_ETAG => {
                resource.supports_etag = parse_bool(value);
                true
            }
            sme_attrs::BATCHING_MODE => {
                resource.batching_mode = Some(value.to_string());
                true
            }
            sme_attrs::SYNC_MODE => {
                resource.sync_mode = Some(value.to_string());
                true
            }
            sme_attrs::PATH => {
                service.path = Some(value.to_string());
                query.path = Some(value.to_string());
                true
            }
            sme_attrs::INVOCATION_MODE => {
                service.invocation_mode = Some(value.to_string());
                true
            }
            _ => false,
        });

        let role = match role_value.as_str() {
            "resourceKind" => TypeRole::ResourceKind(resource),
            "serviceOperation" => TypeRole::ServiceOperation(service),
            "query" => TypeRole::NamedQuery(query),
            other => {
                return Err(StructuralError::new(format!("unexpected role value '{}'", other))
                    .with_element(element_name)
                    .into())
            }
        };

        Ok(Self {
            element_name,
            role,
            sme,
        })
    }

    /// Write the top-level `xs:element` declaration for a type named
    /// `type_name`
    pub fn write(&self, type_qname: &QName, formatter: &QNameFormatter) -> Element {
        let mut element = Element::new(QName::xs(xs_elements::ELEMENT));
        element.set_attr(xs_attrs::NAME, self.element_name.clone());
        element.set_attr(xs_attrs::TYPE, formatter.format(type_qname));
        element.set_attribute(QName::sme(sme_attrs::ROLE), self.role.as_value());

        match &self.role {
            TypeRole::ResourceKind(info) => {
                if let Some(ref plural_name) = info.plural_name {
                    element.set_attribute(QName::sme(sme_attrs::PLURAL_NAME), plural_name.clone());
                }
                if info.can_search {
                    element.set_attribute(QName::sme(sme_attrs::CAN_SEARCH), "true");
                }
                if info.has_uuid {
                    element.set_attribute(QName::sme(sme_attrs::HAS_UUID), "true");
                }
                if info.has_template {
                    element.set_attribute(QName::sme(sme_attrs::HAS_TEMPLATE), "true");
                }
                if info.supports_etag {
                    element.set_attribute(QName::sme(sme_attrs::SUPPORTS_ETAG), "true");
                }
                if let Some(ref mode) = info.batching_mode {
                    element.set_attribute(QName::sme(sme_attrs::BATCHING_MODE), mode.clone());
                }
                if let Some(ref mode) = info.sync_mode {
                    element.set_attribute(QName::sme(sme_attrs::SYNC_MODE), mode.clone());
                }
            }
            TypeRole::ServiceOperation(info) => {
                if let Some(ref path) = info.path {
                    element.set_attribute(QName::sme(sme_attrs::PATH), path.clone());
                }
                if let Some(ref mode) = info.invocation_mode {
                    element.set_attribute(QName::sme(sme_attrs::INVOCATION_MODE), mode.clone());
                }
            }
            TypeRole::NamedQuery(info) => {
                if let Some(ref path) = info.path {
                    element.set_attribute(QName::sme(sme_attrs::PATH), path.clone());
                }
            }
        }
        self.sme.write(&mut element);
        element
    }
}

/// A complex type: base-type extension, an `xs:all` group of properties, and
/// optionally a paired list-shadow wrapper
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexTypeInfo {
    /// Complex-content extension base, if any
    pub base_type: Option<SDataSchemaTypeReference>,
    /// Properties, ordered and unique by name
    pub properties: IndexMap<String, SDataSchemaProperty>,
    /// Whether the type declares an attribute wildcard
    pub any_attribute: bool,
    /// Name of the paired list-shadow wrapper type, if any
    pub list_name: Option<String>,
    /// Item element name inside the list-shadow wrapper
    pub list_item_name: Option<String>,
    /// `minOccurs` carried by the wrapper's item element, preserved verbatim
    pub list_item_min_occurs: Option<String>,
    /// `maxOccurs` carried by the wrapper's item element, preserved verbatim
    pub list_item_max_occurs: Option<String>,
    /// Whether the list-shadow wrapper declares an attribute wildcard
    pub list_any_attribute: bool,
    /// Top-level classification, if any
    pub top_level: Option<TopLevelInfo>,
}

impl ComplexTypeInfo {
    /// Add a property, replacing any existing property of the same name
    pub fn add_property(&mut self, property: SDataSchemaProperty) {
        self.properties.insert(property.name.clone(), property);
    }

    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&SDataSchemaProperty> {
        self.properties.get(name)
    }
}

/// The closed set of schema type kinds
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaTypeKind {
    /// Simple restricted type
    Simple(SimpleTypeInfo),
    /// Enumeration type
    Enum(EnumTypeInfo),
    /// Complex type
    Complex(ComplexTypeInfo),
    /// Choice type
    Choice(ChoiceTypeInfo),
}

/// One schema type declaration
#[derive(Debug, Clone, PartialEq)]
pub struct SDataSchemaType {
    /// Local type name
    pub name: String,
    /// Target namespace, stamped by the owning schema's type collection
    pub namespace: Option<String>,
    /// Common SME attributes and the unhandled passthrough bag
    pub sme: SmeAttributes,
    /// Annotation documentation
    pub documentation: Option<String>,
    /// The kind-specific payload
    pub kind: SchemaTypeKind,
}

impl SDataSchemaType {
    /// Create a type declaration
    pub fn new(name: impl Into<String>, kind: SchemaTypeKind) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            sme: SmeAttributes::default(),
            documentation: None,
            kind,
        }
    }

    /// The qualified name: local name plus the owning schema's target
    /// namespace
    pub fn qualified_name(&self) -> QName {
        QName::new(self.namespace.clone(), self.name.clone())
    }

    /// The qualified name of the list-shadow wrapper, when this is a complex
    /// type that has one
    pub fn list_qualified_name(&self) -> Option<QName> {
        match &self.kind {
            SchemaTypeKind::Complex(info) => info
                .list_name
                .as_ref()
                .map(|list_name| QName::new(self.namespace.clone(), list_name.clone())),
            _ => None,
        }
    }

    /// The complex payload, when this is a complex type
    pub fn as_complex(&self) -> Option<&ComplexTypeInfo> {
        match &self.kind {
            SchemaTypeKind::Complex(info) => Some(info),
            _ => None,
        }
    }

    /// Every type reference owned by this type, pre-order: the base-type
    /// slot first, then property slots, then choice member slots
    pub fn type_references_mut(&mut self) -> Vec<&mut SDataSchemaTypeReference> {
        let mut refs = Vec::new();
        match &mut self.kind {
            SchemaTypeKind::Complex(info) => {
                if let Some(ref mut base) = info.base_type {
                    refs.push(base);
                }
                for property in info.properties.values_mut() {
                    refs.push(&mut property.type_ref);
                }
            }
            SchemaTypeKind::Choice(info) => {
                for member in &mut info.members {
                    refs.push(&mut member.type_ref);
                }
            }
            SchemaTypeKind::Simple(_) | SchemaTypeKind::Enum(_) => {}
        }
        refs
    }

    /// Read a simple or enum type from an `xs:simpleType` declaration
    ///
    /// Classification: a restriction whose facets are all enumeration facets
    /// is an enum type; one mixed or non-enumeration facet makes it a plain
    /// simple type.
    pub fn read_simple(element: &Element, scope: &[&Element]) -> Result<Self> {
        let name = element
            .attr(xs_attrs::NAME)
            .ok_or_else(|| StructuralError::new("simple type has no name"))?
            .to_string();

        let mut base = None;
        let mut facets = Vec::new();
        if let Some(restriction) = element.find_child(&QName::xs(xs_elements::RESTRICTION)) {
            if let Some(base_value) = restriction.attr(xs_attrs::BASE) {
                base = restriction.resolve_qname(base_value, scope);
            }
            for facet in &restriction.children {
                if facet.qname == QName::xs(xs_elements::ANNOTATION) {
                    continue;
                }
                facets.push(SchemaFacet {
                    name: facet.local_name().to_string(),
                    value: facet.attr(xs_attrs::VALUE).unwrap_or("").to_string(),
                });
            }
        }

        let all_enumeration =
            !facets.is_empty() && facets.iter().all(|f| f.name == xs_elements::ENUMERATION);
        let kind = if all_enumeration {
            SchemaTypeKind::Enum(EnumTypeInfo {
                base,
                values: facets.into_iter().map(|f| f.value).collect(),
            })
        } else {
            SchemaTypeKind::Simple(SimpleTypeInfo { base, facets })
        };

        let mut schema_type = Self::new(name, kind);
        schema_type.sme = SmeAttributes::read(element, |_, _| false);
        schema_type.documentation = read_documentation(element);
        Ok(schema_type)
    }

    /// Read a complex or choice type from an `xs:complexType` declaration
    ///
    /// `top_level` carries the classification read from the immediately
    /// preceding element declaration, when there is one. Sequence-shaped
    /// wrappers are not handled here; the document reader folds those into
    /// their item type as list shadows.
    pub fn read_complex(
        element: &Element,
        scope: &[&Element],
        top_level: Option<TopLevelInfo>,
    ) -> Result<Self> {
        let name = element
            .attr(xs_attrs::NAME)
            .ok_or_else(|| StructuralError::new("complex type has no name"))?
            .to_string();

        let mut info = ComplexTypeInfo {
            top_level,
            ..ComplexTypeInfo::default()
        };
        let mut choice: Option<ChoiceTypeInfo> = None;

        for child in &element.children {
            match child.qname.local_name.as_str() {
                xs_elements::ANNOTATION => {}
                xs_elements::ALL => {
                    read_all_group(child, scope, &mut info)?;
                }
                xs_elements::CHOICE => {
                    choice = Some(read_choice_group(child, scope, &name)?);
                }
                xs_elements::COMPLEX_CONTENT => {
                    read_complex_content(child, scope, &name, &mut info)?;
                }
                xs_elements::ANY_ATTRIBUTE => info.any_attribute = true,
                other => {
                    return Err(StructuralError::new(format!(
                        "unsupported particle 'xs:{}' on complex type",
                        other
                    ))
                    .with_element(name)
                    .into())
                }
            }
        }

        let kind = match choice {
            Some(mut choice_info) => {
                if let Some(max_occurs) = element
                    .find_child(&QName::xs(xs_elements::CHOICE))
                    .and_then(|c| c.attr(xs_attrs::MAX_OCCURS))
                    .and_then(MaxOccurs::from_value)
                {
                    choice_info.max_occurs = Some(max_occurs);
                }
                SchemaTypeKind::Choice(choice_info)
            }
            None => SchemaTypeKind::Complex(info),
        };

        let mut schema_type = Self::new(name, kind);
        schema_type.sme = SmeAttributes::read(element, |_, _| false);
        schema_type.documentation = read_documentation(element);
        Ok(schema_type)
    }

    /// Write this type's primary declaration
    ///
    /// Top-level element declarations and list-shadow wrapper types are
    /// synthesized separately by the document writer.
    pub fn write(&self, formatter: &QNameFormatter) -> Element {
        let mut element = match &self.kind {
            SchemaTypeKind::Simple(info) => write_restriction(
                info.base.as_ref(),
                info.facets.iter().cloned(),
                formatter,
            ),
            SchemaTypeKind::Enum(info) => write_restriction(
                info.base.as_ref(),
                info.values.iter().map(|value| SchemaFacet {
                    name: xs_elements::ENUMERATION.to_string(),
                    value: value.clone(),
                }),
                formatter,
            ),
            SchemaTypeKind::Complex(info) => write_complex_body(info, formatter),
            SchemaTypeKind::Choice(info) => write_choice_body(info, formatter),
        };
        element.set_attr(xs_attrs::NAME, self.name.clone());
        // Name first, then annotation and SME attributes.
        element.attributes.move_index(element.attributes.len() - 1, 0);
        if let Some(ref documentation) = self.documentation {
            let mut annotation_holder = Element::new(element.qname.clone());
            write_documentation(&mut annotation_holder, documentation);
            element.children.insert(0, annotation_holder.children.remove(0));
        }
        self.sme.write(&mut element);
        element
    }

    /// Write the list-shadow wrapper declaration, when this complex type has
    /// one
    pub fn write_list_shadow(&self, formatter: &QNameFormatter) -> Option<Element> {
        let info = self.as_complex()?;
        let list_name = info.list_name.as_ref()?;
        let item_name = info.list_item_name.as_ref()?;

        let mut item = Element::new(QName::xs(xs_elements::ELEMENT));
        item.set_attr(xs_attrs::NAME, item_name.clone());
        item.set_attr(xs_attrs::TYPE, formatter.format(&self.qualified_name()));
        if let Some(ref min_occurs) = info.list_item_min_occurs {
            item.set_attr(xs_attrs::MIN_OCCURS, min_occurs.clone());
        }
        if let Some(ref max_occurs) = info.list_item_max_occurs {
            item.set_attr(xs_attrs::MAX_OCCURS, max_occurs.clone());
        }

        let mut sequence = Element::new(QName::xs(xs_elements::SEQUENCE));
        sequence.add_child(item);

        let mut wrapper = Element::new(QName::xs(xs_elements::COMPLEX_TYPE));
        wrapper.set_attr(xs_attrs::NAME, list_name.clone());
        wrapper.add_child(sequence);
        if info.list_any_attribute {
            wrapper.add_child(Element::new(QName::xs(xs_elements::ANY_ATTRIBUTE)));
        }
        Some(wrapper)
    }
}

/// Read the `xs:all` property group into `info`
fn read_all_group(group: &Element, scope: &[&Element], info: &mut ComplexTypeInfo) -> Result<()> {
    for child in &group.children {
        if child.qname == QName::xs(xs_elements::ELEMENT) {
            let property = SDataSchemaProperty::read(child, scope)?;
            info.add_property(property);
        }
    }
    Ok(())
}

/// Read an `xs:choice` group
fn read_choice_group(group: &Element, scope: &[&Element], type_name: &str) -> Result<ChoiceTypeInfo> {
    let mut choice = ChoiceTypeInfo::default();
    for child in &group.children {
        if child.qname != QName::xs(xs_elements::ELEMENT) {
            continue;
        }
        let element_name = child
            .attr(xs_attrs::NAME)
            .ok_or_else(|| {
                StructuralError::new("choice member has no name").with_element(type_name.to_string())
            })?
            .to_string();
        let type_value = child.attr(xs_attrs::TYPE).ok_or_else(|| {
            StructuralError::new("choice member has no type").with_element(element_name.clone())
        })?;
        let type_qname = child.resolve_qname(type_value, scope).ok_or_else(|| {
            StructuralError::new(format!("cannot resolve type name '{}'", type_value))
                .with_element(element_name.clone())
        })?;
        choice.members.push(ChoiceMember {
            element_name,
            type_ref: SDataSchemaTypeReference::from_qname(type_qname),
        });
    }
    Ok(choice)
}

/// Read `xs:complexContent/xs:extension` into `info`
fn read_complex_content(
    content: &Element,
    scope: &[&Element],
    type_name: &str,
    info: &mut ComplexTypeInfo,
) -> Result<()> {
    let extension = content
        .find_child(&QName::xs(xs_elements::EXTENSION))
        .ok_or_else(|| {
            StructuralError::new("complex content without an extension")
                .with_element(type_name.to_string())
        })?;
    let base_value = extension.attr(xs_attrs::BASE).ok_or_else(|| {
        StructuralError::new("extension has no base").with_element(type_name.to_string())
    })?;
    let base_qname = extension.resolve_qname(base_value, scope).ok_or_else(|| {
        StructuralError::new(format!("cannot resolve base name '{}'", base_value))
            .with_element(type_name.to_string())
    })?;
    info.base_type = Some(SDataSchemaTypeReference::from_qname(base_qname));

    for child in &extension.children {
        match child.qname.local_name.as_str() {
            xs_elements::ALL => read_all_group(child, scope, info)?,
            xs_elements::ANY_ATTRIBUTE => info.any_attribute = true,
            xs_elements::ANNOTATION => {}
            other => {
                return Err(StructuralError::new(format!(
                    "unsupported particle 'xs:{}' in extension",
                    other
                ))
                .with_element(type_name.to_string())
                .into())
            }
        }
    }
    Ok(())
}

/// Describe a sequence-shaped wrapper: its single item's element name and
/// declared type
pub(crate) struct ListWrapper {
    /// Wrapper type name
    pub name: String,
    /// Item element name
    pub item_name: String,
    /// Item element declared type
    pub item_type: QName,
    /// `minOccurs` carried by the item element
    pub min_occurs: Option<String>,
    /// `maxOccurs` carried by the item element
    pub max_occurs: Option<String>,
    /// Whether the wrapper declares an attribute wildcard
    pub any_attribute: bool,
}

/// Inspect a sequence-shaped `xs:complexType`
///
/// Returns `Ok(None)` when the type is not sequence-shaped at all. Fails when
/// the sequence particle has anything other than exactly one element item.
pub(crate) fn read_list_wrapper(
    element: &Element,
    scope: &[&Element],
) -> Result<Option<ListWrapper>> {
    let sequence = match element.find_child(&QName::xs(xs_elements::SEQUENCE)) {
        Some(sequence) => sequence,
        None => return Ok(None),
    };
    let name = element
        .attr(xs_attrs::NAME)
        .ok_or_else(|| StructuralError::new("complex type has no name"))?
        .to_string();

    let items: Vec<&Element> = sequence
        .children
        .iter()
        .filter(|c| c.qname.local_name != xs_elements::ANNOTATION)
        .collect();
    if items.len() != 1 || items[0].qname != QName::xs(xs_elements::ELEMENT) {
        return Err(StructuralError::new(
            "sequence-shaped complex type must contain exactly one element item",
        )
        .with_element(name)
        .into());
    }

    let item = items[0];
    let item_name = item
        .attr(xs_attrs::NAME)
        .ok_or_else(|| {
            Error::from(StructuralError::new("list item has no name").with_element(name.clone()))
        })?
        .to_string();
    let type_value = item.attr(xs_attrs::TYPE).ok_or_else(|| {
        Error::from(StructuralError::new("list item has no type").with_element(name.clone()))
    })?;
    let item_type = item.resolve_qname(type_value, scope).ok_or_else(|| {
        Error::from(
            StructuralError::new(format!("cannot resolve type name '{}'", type_value))
                .with_element(name.clone()),
        )
    })?;

    Ok(Some(ListWrapper {
        name,
        item_name,
        item_type,
        min_occurs: item.attr(xs_attrs::MIN_OCCURS).map(|s| s.to_string()),
        max_occurs: item.attr(xs_attrs::MAX_OCCURS).map(|s| s.to_string()),
        any_attribute: element
            .find_child(&QName::xs(xs_elements::ANY_ATTRIBUTE))
            .is_some(),
    }))
}

fn write_restriction(
    base: Option<&QName>,
    facets: impl Iterator<Item = SchemaFacet>,
    formatter: &QNameFormatter,
) -> Element {
    let mut restriction = Element::new(QName::xs(xs_elements::RESTRICTION));
    if let Some(base) = base {
        restriction.set_attr(xs_attrs::BASE, formatter.format(base));
    }
    for facet in facets {
        let mut facet_element = Element::new(QName::xs(facet.name));
        facet_element.set_attr(xs_attrs::VALUE, facet.value);
        restriction.add_child(facet_element);
    }

    let mut element = Element::new(QName::xs(xs_elements::SIMPLE_TYPE));
    element.add_child(restriction);
    element
}

fn write_complex_body(info: &ComplexTypeInfo, formatter: &QNameFormatter) -> Element {
    let mut element = Element::new(QName::xs(xs_elements::COMPLEX_TYPE));

    let mut all = Element::new(QName::xs(xs_elements::ALL));
    for property in info.properties.values() {
        all.add_child(property.write(formatter));
    }

    match &info.base_type {
        Some(base) => {
            let mut extension = Element::new(QName::xs(xs_elements::EXTENSION));
            extension.set_attr(xs_attrs::BASE, formatter.format(&base.qualified_name()));
            if !all.children.is_empty() {
                extension.add_child(all);
            }
            if info.any_attribute {
                extension.add_child(Element::new(QName::xs(xs_elements::ANY_ATTRIBUTE)));
            }
            let mut content = Element::new(QName::xs(xs_elements::COMPLEX_CONTENT));
            content.add_child(extension);
            element.add_child(content);
        }
        None => {
            if !all.children.is_empty() {
                element.add_child(all);
            }
            if info.any_attribute {
                element.add_child(Element::new(QName::xs(xs_elements::ANY_ATTRIBUTE)));
            }
        }
    }
    element
}

fn write_choice_body(info: &ChoiceTypeInfo, formatter: &QNameFormatter) -> Element {
    let mut choice = Element::new(QName::xs(xs_elements::CHOICE));
    if let Some(max_occurs) = info.max_occurs {
        choice.set_attr(xs_attrs::MAX_OCCURS, max_occurs.as_value());
    }
    for member in &info.members {
        let mut member_element = Element::new(QName::xs(xs_elements::ELEMENT));
        member_element.set_attr(xs_attrs::NAME, member.element_name.clone());
        member_element.set_attr(
            xs_attrs::TYPE,
            formatter.format(&member.type_ref.qualified_name()),
        );
        choice.add_child(member_element);
    }

    let mut element = Element::new(QName::xs(xs_elements::COMPLEX_TYPE));
    element.add_child(choice);
    element
}
