//! The top-level schema document
//!
//! `SDataSchema` reads a whole XML Schema document into the typed object
//! graph and writes it back out. Reading is two-pass: every top-level item is
//! classified and built first (pairing top-level element declarations with
//! their complex types, folding sequence-shaped wrappers into list shadows),
//! then every type reference is compiled against a symbol table built from
//! the document's own types. A [`SDataSchemaSet`](crate::schema::SDataSchemaSet)
//! later recompiles member schemas against the cross-schema table.

use crate::error::{Result, StructuralError};
use crate::namespaces::{QName, SME_NAMESPACE, SME_PREFIX, XS_NAMESPACE, XS_PREFIX};
use crate::schema::object::{
    read_documentation, write_documentation, xs_attrs, xs_elements, QNameFormatter,
};
use crate::schema::reference::SchemaTypeRef;
use crate::schema::types::{read_list_wrapper, SDataSchemaType, SchemaTypeKind, TopLevelInfo};
use crate::xml::Element;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Conventional prefix declared for the target namespace on write
const TNS_PREFIX: &str = "tns";

/// `elementFormDefault` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormDefault {
    /// Unqualified (the XML Schema default)
    #[default]
    Unqualified,
    /// Qualified
    Qualified,
}

impl FormDefault {
    /// Parse from the attribute value
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "qualified" => Some(Self::Qualified),
            "unqualified" => Some(Self::Unqualified),
            _ => None,
        }
    }
}

impl fmt::Display for FormDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qualified => write!(f, "qualified"),
            Self::Unqualified => write!(f, "unqualified"),
        }
    }
}

/// One `xs:import` record
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaImport {
    /// Imported namespace URI
    pub namespace: Option<String>,
    /// Location hint
    pub schema_location: Option<String>,
}

/// A symbol table entry: the canonical qualified name of the target type and
/// the shared handle to it
///
/// List-shadow keys map to the wrapped complex type, so the entry's canonical
/// name can differ from the key it is stored under.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    /// The target type's own qualified name
    pub qname: QName,
    /// The target type
    pub schema_type: SchemaTypeRef,
}

/// Qualified name to type mapping used by compilation
pub type SymbolTable = IndexMap<QName, SymbolEntry>;

/// Ordered collection of schema types, unique by local name
///
/// The collection stamps each type with the schema's target namespace at
/// insert time and clears it at remove time; `qualified_name` on a type is
/// derived from that stamp.
#[derive(Debug, Default)]
pub struct SchemaTypeCollection {
    target_namespace: Option<String>,
    items: IndexMap<String, SchemaTypeRef>,
}

impl SchemaTypeCollection {
    /// Add a type, replacing any previous type of the same name
    pub fn add(&mut self, mut schema_type: SDataSchemaType) -> SchemaTypeRef {
        schema_type.namespace = self.target_namespace.clone();
        let name = schema_type.name.clone();
        let rc = Rc::new(RefCell::new(schema_type));
        self.items.insert(name, rc.clone());
        rc
    }

    /// Look up a type by local name; absent names are `None`, not an error
    pub fn get(&self, name: &str) -> Option<&SchemaTypeRef> {
        self.items.get(name)
    }

    /// Positional access
    pub fn get_index(&self, index: usize) -> Option<&SchemaTypeRef> {
        self.items.get_index(index).map(|(_, rc)| rc)
    }

    /// Remove a type by local name
    pub fn remove(&mut self, name: &str) -> Option<SchemaTypeRef> {
        let removed = self.items.shift_remove(name);
        if let Some(ref rc) = removed {
            rc.borrow_mut().namespace = None;
        }
        removed
    }

    /// Number of types
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate the types in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SchemaTypeRef> {
        self.items.values()
    }

    fn set_target_namespace(&mut self, target_namespace: Option<String>) {
        self.target_namespace = target_namespace;
        for rc in self.items.values() {
            rc.borrow_mut().namespace = self.target_namespace.clone();
        }
    }
}

/// An SData schema document
#[derive(Debug, Default)]
pub struct SDataSchema {
    /// Schema version
    pub version: Option<String>,
    /// `elementFormDefault`
    pub element_form_default: FormDefault,
    /// Extra namespace prefix declarations carried by the document root,
    /// beyond the xs/sme/target declarations the writer synthesizes
    pub namespaces: IndexMap<String, String>,
    /// `xs:import` records
    pub imports: Vec<SchemaImport>,
    /// Schema-level documentation
    pub documentation: Option<String>,
    types: SchemaTypeCollection,
    target_namespace: Option<String>,
}

impl SDataSchema {
    /// Create an empty schema with the given target namespace
    pub fn new(target_namespace: Option<String>) -> Self {
        let mut schema = Self::default();
        schema.set_target_namespace(target_namespace);
        schema
    }

    /// The target namespace
    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Set the target namespace, re-stamping every owned type
    pub fn set_target_namespace(&mut self, target_namespace: Option<String>) {
        self.target_namespace = target_namespace.clone();
        self.types.set_target_namespace(target_namespace);
    }

    /// The type collection
    pub fn types(&self) -> &SchemaTypeCollection {
        &self.types
    }

    /// Add a type to the schema
    pub fn add_type(&mut self, schema_type: SDataSchemaType) -> SchemaTypeRef {
        self.types.add(schema_type)
    }

    /// Look up a type by local name
    pub fn get_type(&self, name: &str) -> Option<&SchemaTypeRef> {
        self.types.get(name)
    }

    /// Add a type while reading; a duplicate declaration is a structural
    /// error rather than a silent replacement
    fn add_read_type(&mut self, schema_type: SDataSchemaType) -> Result<()> {
        if self.types.get(&schema_type.name).is_some() {
            return Err(StructuralError::new("duplicate type name")
                .with_element(schema_type.name)
                .into());
        }
        self.types.add(schema_type);
        Ok(())
    }

    /// Read a schema from an XML string and compile it against its own types
    pub fn read_string(xml: &str) -> Result<Self> {
        let root = Element::parse(xml)?;
        Self::read(&root)
    }

    /// Read a schema from a parsed document root and compile it against its
    /// own types
    ///
    /// A failed read means the document could not be modeled; no partially
    /// populated schema is returned.
    pub fn read(root: &Element) -> Result<Self> {
        if root.qname != QName::xs(xs_elements::SCHEMA) {
            return Err(StructuralError::new("document root is not an XML Schema")
                .with_element(root.local_name().to_string())
                .into());
        }

        let mut schema = Self::new(root.attr(xs_attrs::TARGET_NAMESPACE).map(|s| s.to_string()));
        schema.version = root.attr(xs_attrs::VERSION).map(|s| s.to_string());
        if let Some(form) = root
            .attr(xs_attrs::ELEMENT_FORM_DEFAULT)
            .and_then(FormDefault::from_value)
        {
            schema.element_form_default = form;
        }
        for (prefix, uri) in &root.namespaces {
            let synthesized = uri == XS_NAMESPACE
                || uri == SME_NAMESPACE
                || Some(uri.as_str()) == schema.target_namespace();
            if !synthesized {
                schema.namespaces.insert(prefix.clone(), uri.clone());
            }
        }
        schema.documentation = read_documentation(root);

        let scope = &[root][..];
        // A top-level element declaration waiting for the complex type it
        // classifies, together with the type name it references.
        let mut pending: Option<(TopLevelInfo, QName)> = None;

        for child in &root.children {
            if child.namespace() != Some(XS_NAMESPACE) {
                continue;
            }
            if let Some((waiting, _)) = &pending {
                if child.qname.local_name != xs_elements::COMPLEX_TYPE {
                    return Err(unpaired_element_error(waiting));
                }
            }
            match child.qname.local_name.as_str() {
                xs_elements::ANNOTATION | xs_elements::DOCUMENTATION => {}
                xs_elements::IMPORT => schema.imports.push(SchemaImport {
                    namespace: child.attr(xs_attrs::NAMESPACE).map(|s| s.to_string()),
                    schema_location: child.attr(xs_attrs::SCHEMA_LOCATION).map(|s| s.to_string()),
                }),
                xs_elements::ELEMENT => {
                    let top_level = TopLevelInfo::read(child)?;
                    let type_value = child.attr(xs_attrs::TYPE).ok_or_else(|| {
                        StructuralError::new("top-level element has no type")
                            .with_element(top_level.element_name.clone())
                    })?;
                    let expected = child.resolve_qname(type_value, scope).ok_or_else(|| {
                        StructuralError::new(format!(
                            "cannot resolve type name '{}'",
                            type_value
                        ))
                        .with_element(top_level.element_name.clone())
                    })?;
                    pending = Some((top_level, expected));
                }
                xs_elements::SIMPLE_TYPE => {
                    let schema_type = SDataSchemaType::read_simple(child, scope)?;
                    schema.add_read_type(schema_type)?;
                }
                xs_elements::COMPLEX_TYPE => match pending.take() {
                    Some((top_level, expected)) => {
                        let name = child.attr(xs_attrs::NAME).ok_or_else(|| {
                            StructuralError::new("complex type has no name")
                        })?;
                        let qname =
                            QName::new(schema.target_namespace.clone(), name.to_string());
                        if expected != qname {
                            return Err(StructuralError::new(format!(
                                "top-level element '{}' references '{}', not the complex \
                                 type that follows it",
                                top_level.element_name, expected
                            ))
                            .with_element(name.to_string())
                            .into());
                        }
                        let schema_type =
                            SDataSchemaType::read_complex(child, scope, Some(top_level))?;
                        schema.add_read_type(schema_type)?;
                    }
                    None => match read_list_wrapper(child, scope)? {
                        Some(wrapper) => {
                            let item = schema
                                .types
                                .iter()
                                .find(|rc| rc.borrow().qualified_name() == wrapper.item_type)
                                .cloned();
                            let item = item.ok_or_else(|| {
                                StructuralError::new(format!(
                                    "list wrapper item type '{}' does not match a \
                                     preceding complex type",
                                    wrapper.item_type
                                ))
                                .with_element(wrapper.name.clone())
                            })?;
                            let mut item = item.borrow_mut();
                            match &mut item.kind {
                                SchemaTypeKind::Complex(info) => {
                                    info.list_name = Some(wrapper.name);
                                    info.list_item_name = Some(wrapper.item_name);
                                    info.list_item_min_occurs = wrapper.min_occurs;
                                    info.list_item_max_occurs = wrapper.max_occurs;
                                    info.list_any_attribute = wrapper.any_attribute;
                                }
                                _ => {
                                    return Err(StructuralError::new(
                                        "list wrapper item type is not a complex type",
                                    )
                                    .with_element(wrapper.name)
                                    .into())
                                }
                            }
                        }
                        None => {
                            let schema_type = SDataSchemaType::read_complex(child, scope, None)?;
                            schema.add_read_type(schema_type)?;
                        }
                    },
                },
                _ => {} // xs:include and friends are not modeled
            }
        }
        if let Some((top_level, _)) = pending {
            return Err(unpaired_element_error(&top_level));
        }

        let table = schema.local_symbol_table();
        schema.compile(&table);
        Ok(schema)
    }

    /// The symbol table spanning only this schema's own types
    pub fn local_symbol_table(&self) -> SymbolTable {
        let mut table = SymbolTable::new();
        add_schema_symbols(&mut table, self);
        table
    }

    /// Resolve every reachable type reference found in `table`
    ///
    /// References whose qualified name is absent from the table are left
    /// unresolved; that is not an error.
    pub fn compile(&mut self, table: &SymbolTable) {
        for rc in self.types.iter() {
            let mut schema_type = rc.borrow_mut();
            for reference in schema_type.type_references_mut() {
                if reference.code().is_some() {
                    continue;
                }
                match table.get(&reference.qualified_name()) {
                    Some(entry) => reference.resolve_to(entry.qname.clone(), &entry.schema_type),
                    None => reference.unresolve(),
                }
            }
        }
    }

    /// Write the schema as a document element tree
    pub fn write(&self) -> Element {
        let formatter = self.qname_formatter();
        let mut root = Element::new(QName::xs(xs_elements::SCHEMA));
        if let Some(ref target_namespace) = self.target_namespace {
            root.set_attr(xs_attrs::TARGET_NAMESPACE, target_namespace.clone());
        }
        if let Some(ref version) = self.version {
            root.set_attr(xs_attrs::VERSION, version.clone());
        }
        if self.element_form_default == FormDefault::Qualified {
            root.set_attr(
                xs_attrs::ELEMENT_FORM_DEFAULT,
                self.element_form_default.to_string(),
            );
        }
        if let Some(ref documentation) = self.documentation {
            write_documentation(&mut root, documentation);
        }
        for import in &self.imports {
            let mut element = Element::new(QName::xs(xs_elements::IMPORT));
            if let Some(ref namespace) = import.namespace {
                element.set_attr(xs_attrs::NAMESPACE, namespace.clone());
            }
            if let Some(ref location) = import.schema_location {
                element.set_attr(xs_attrs::SCHEMA_LOCATION, location.clone());
            }
            root.add_child(element);
        }

        for rc in self.types.iter() {
            let schema_type = rc.borrow();
            if let Some(info) = schema_type.as_complex() {
                if let Some(ref top_level) = info.top_level {
                    root.add_child(
                        top_level.write(&schema_type.qualified_name(), &formatter),
                    );
                }
            }
            root.add_child(schema_type.write(&formatter));
            if let Some(list_shadow) = schema_type.write_list_shadow(&formatter) {
                root.add_child(list_shadow);
            }
        }
        root
    }

    /// Write the schema as an XML string
    pub fn write_string(&self) -> Result<String> {
        let mut prefixes = IndexMap::new();
        prefixes.insert(XS_NAMESPACE.to_string(), XS_PREFIX.to_string());
        prefixes.insert(SME_NAMESPACE.to_string(), SME_PREFIX.to_string());
        if let Some(ref target_namespace) = self.target_namespace {
            prefixes.insert(target_namespace.clone(), TNS_PREFIX.to_string());
        }
        for (prefix, uri) in &self.namespaces {
            if !prefixes.contains_key(uri) && !prefix.is_empty() {
                prefixes.insert(uri.clone(), prefix.clone());
            }
        }
        self.write().to_xml(&prefixes)
    }

    fn qname_formatter(&self) -> QNameFormatter {
        let mut formatter = QNameFormatter::default();
        formatter
            .prefixes
            .insert(XS_NAMESPACE.to_string(), XS_PREFIX.to_string());
        formatter
            .prefixes
            .insert(SME_NAMESPACE.to_string(), SME_PREFIX.to_string());
        if let Some(ref target_namespace) = self.target_namespace {
            formatter
                .prefixes
                .insert(target_namespace.clone(), TNS_PREFIX.to_string());
        }
        for (prefix, uri) in &self.namespaces {
            if !formatter.prefixes.contains_key(uri) {
                formatter.prefixes.insert(uri.clone(), prefix.clone());
            }
        }
        formatter
    }
}

/// Merge one schema's types (and their list-shadow aliases) into `table`
pub(crate) fn add_schema_symbols(table: &mut SymbolTable, schema: &SDataSchema) {
    for rc in schema.types.iter() {
        let schema_type = rc.borrow();
        let qname = schema_type.qualified_name();
        table.insert(
            qname.clone(),
            SymbolEntry {
                qname: qname.clone(),
                schema_type: rc.clone(),
            },
        );
        if let Some(list_qname) = schema_type.list_qualified_name() {
            table.insert(
                list_qname,
                SymbolEntry {
                    qname,
                    schema_type: rc.clone(),
                },
            );
        }
    }
}

fn unpaired_element_error(top_level: &TopLevelInfo) -> crate::error::Error {
    StructuralError::new(
        "top-level element declaration is not immediately followed by its complex type",
    )
    .with_element(top_level.element_name.clone())
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::reference::XmlTypeCode;

    const TEST_NS: &str = "http://example.com/test";

    fn schema_doc(body: &str) -> String {
        format!(
            r#"<xs:schema xmlns:xs="{}" xmlns:sme="{}" xmlns:tns="{}" targetNamespace="{}" elementFormDefault="qualified">{}</xs:schema>"#,
            XS_NAMESPACE, SME_NAMESPACE, TEST_NS, TEST_NS, body
        )
    }

    #[test]
    fn test_read_classifies_and_compiles() {
        let xml = schema_doc(
            r#"<xs:element name="accounts" type="tns:account" sme:role="resourceKind" sme:pluralName="Accounts"/>
               <xs:complexType name="account">
                 <xs:all>
                   <xs:element name="name" type="xs:string"/>
                   <xs:element name="status" type="tns:status"/>
                 </xs:all>
               </xs:complexType>
               <xs:simpleType name="status">
                 <xs:restriction base="xs:string">
                   <xs:enumeration value="Open"/>
                 </xs:restriction>
               </xs:simpleType>"#,
        );
        let schema = SDataSchema::read_string(&xml).unwrap();
        assert_eq!(schema.target_namespace(), Some(TEST_NS));
        assert_eq!(schema.types().len(), 2);

        let account = schema.get_type("account").unwrap().borrow();
        let info = account.as_complex().unwrap();
        assert!(info.top_level.is_some());

        // The local compile pass resolves the same-document reference.
        let status_ref = &info.property("status").unwrap().type_ref;
        assert!(status_ref.is_resolved());
        let status = status_ref.schema_type().unwrap();
        assert_eq!(status.borrow().name, "status");

        // Built-in references resolve immediately as codes.
        let name_ref = &info.property("name").unwrap().type_ref;
        assert_eq!(name_ref.code(), Some(XmlTypeCode::String));
    }

    #[test]
    fn test_list_shadow_is_folded() {
        let xml = schema_doc(
            r#"<xs:complexType name="account">
                 <xs:all><xs:element name="name" type="xs:string"/></xs:all>
               </xs:complexType>
               <xs:complexType name="account--list">
                 <xs:sequence>
                   <xs:element name="account" type="tns:account" maxOccurs="unbounded"/>
                 </xs:sequence>
                 <xs:anyAttribute/>
               </xs:complexType>"#,
        );
        let schema = SDataSchema::read_string(&xml).unwrap();
        assert_eq!(schema.types().len(), 1);
        let account = schema.get_type("account").unwrap().borrow();
        let info = account.as_complex().unwrap();
        assert_eq!(info.list_name.as_deref(), Some("account--list"));
        assert_eq!(info.list_item_name.as_deref(), Some("account"));
        assert!(info.list_any_attribute);
    }

    #[test]
    fn test_list_item_occurrence_attributes_round_trip() {
        // The item carries maxOccurs only; the writer must not invent a
        // minOccurs the document never had.
        let xml = schema_doc(
            r#"<xs:complexType name="account">
                 <xs:all><xs:element name="name" type="xs:string"/></xs:all>
               </xs:complexType>
               <xs:complexType name="account--list">
                 <xs:sequence>
                   <xs:element name="account" type="tns:account" maxOccurs="unbounded"/>
                 </xs:sequence>
               </xs:complexType>"#,
        );
        let schema = SDataSchema::read_string(&xml).unwrap();
        {
            let account = schema.get_type("account").unwrap().borrow();
            let info = account.as_complex().unwrap();
            assert_eq!(info.list_item_max_occurs.as_deref(), Some("unbounded"));
            assert_eq!(info.list_item_min_occurs, None);
        }

        let written = schema.write_string().unwrap();
        assert!(written.contains(r#"maxOccurs="unbounded""#));
        assert!(!written.contains("minOccurs"));

        let reread = SDataSchema::read_string(&written).unwrap();
        let account = reread.get_type("account").unwrap().borrow();
        let info = account.as_complex().unwrap();
        assert_eq!(info.list_item_max_occurs.as_deref(), Some("unbounded"));
        assert_eq!(info.list_item_min_occurs, None);
    }

    #[test]
    fn test_duplicate_type_name_fails_to_read() {
        let xml = schema_doc(
            r#"<xs:simpleType name="status">
                 <xs:restriction base="xs:string"><xs:enumeration value="Open"/></xs:restriction>
               </xs:simpleType>
               <xs:simpleType name="status">
                 <xs:restriction base="xs:string"><xs:enumeration value="Closed"/></xs:restriction>
               </xs:simpleType>"#,
        );
        let err = SDataSchema::read_string(&xml).unwrap_err();
        assert!(err.to_string().contains("duplicate type name"));
    }

    #[test]
    fn test_list_wrapper_for_unknown_type_fails() {
        let xml = schema_doc(
            r#"<xs:complexType name="ghost--list">
                 <xs:sequence>
                   <xs:element name="ghost" type="tns:ghost" maxOccurs="unbounded"/>
                 </xs:sequence>
               </xs:complexType>"#,
        );
        assert!(SDataSchema::read_string(&xml).is_err());
    }

    #[test]
    fn test_element_pairing_violations_fail() {
        // Element not followed by a complex type at all.
        let xml = schema_doc(
            r#"<xs:element name="accounts" type="tns:account" sme:role="resourceKind"/>"#,
        );
        assert!(SDataSchema::read_string(&xml).is_err());

        // Element followed by a complex type of a different name.
        let xml = schema_doc(
            r#"<xs:element name="accounts" type="tns:account" sme:role="resourceKind"/>
               <xs:complexType name="contact">
                 <xs:all><xs:element name="name" type="xs:string"/></xs:all>
               </xs:complexType>"#,
        );
        assert!(SDataSchema::read_string(&xml).is_err());
    }

    #[test]
    fn test_unresolved_reference_is_not_an_error() {
        let xml = schema_doc(
            r#"<xs:complexType name="account">
                 <xs:all><xs:element name="owner" type="tns:user"/></xs:all>
               </xs:complexType>"#,
        );
        let schema = SDataSchema::read_string(&xml).unwrap();
        let account = schema.get_type("account").unwrap().borrow();
        let owner_ref = &account.as_complex().unwrap().property("owner").unwrap().type_ref;
        assert!(!owner_ref.is_resolved());
        assert_eq!(owner_ref.qualified_name(), QName::namespaced(TEST_NS, "user"));
    }

    #[test]
    fn test_types_are_stamped_with_target_namespace() {
        let mut schema = SDataSchema::new(Some(TEST_NS.to_string()));
        let rc = schema.add_type(SDataSchemaType::new(
            "account",
            SchemaTypeKind::Complex(Default::default()),
        ));
        assert_eq!(
            rc.borrow().qualified_name(),
            QName::namespaced(TEST_NS, "account")
        );

        schema.set_target_namespace(Some("http://example.com/other".to_string()));
        assert_eq!(
            rc.borrow().qualified_name(),
            QName::namespaced("http://example.com/other", "account")
        );
    }

    #[test]
    fn test_imports_round_trip() {
        let xml = schema_doc(
            r#"<xs:import namespace="http://schemas.sage.com/sdata/2008/1" schemaLocation="sdata.xsd"/>"#,
        );
        let schema = SDataSchema::read_string(&xml).unwrap();
        assert_eq!(schema.imports.len(), 1);
        assert_eq!(
            schema.imports[0].namespace.as_deref(),
            Some("http://schemas.sage.com/sdata/2008/1")
        );

        let written = schema.write_string().unwrap();
        let reread = SDataSchema::read_string(&written).unwrap();
        assert_eq!(reread.imports, schema.imports);
    }
}
