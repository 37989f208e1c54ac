//! Cross-schema resolution
//!
//! An [`SDataSchemaSet`] holds a group of schemas whose types may reference
//! each other across target namespaces. Every membership change rebuilds the
//! shared symbol table and recompiles every member, so references resolve as
//! soon as the schema that defines their target joins the set, and fall back
//! to names when it leaves.

use crate::namespaces::QName;
use crate::schema::reference::SchemaTypeRef;
use crate::schema::schema::{add_schema_symbols, SDataSchema, SymbolTable};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a member schema
pub type SchemaRef = Rc<RefCell<SDataSchema>>;

/// A set of schemas compiled against each other
#[derive(Debug, Default)]
pub struct SDataSchemaSet {
    schemas: Vec<SchemaRef>,
    symbols: SymbolTable,
}

impl SDataSchemaSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from the given schemas and compile them together
    pub fn with_schemas(schemas: impl IntoIterator<Item = SDataSchema>) -> Self {
        let mut set = Self::new();
        set.schemas = schemas
            .into_iter()
            .map(|schema| Rc::new(RefCell::new(schema)))
            .collect();
        set.recompile();
        set
    }

    /// Add a schema and recompile every member
    pub fn add(&mut self, schema: SDataSchema) -> SchemaRef {
        let schema = Rc::new(RefCell::new(schema));
        self.schemas.push(schema.clone());
        self.recompile();
        schema
    }

    /// Remove a member schema and recompile the remainder
    ///
    /// Returns `false` when `schema` is not a member. References into the
    /// removed schema drop back to unresolved names on the next lookup of
    /// their target.
    pub fn remove(&mut self, schema: &SchemaRef) -> bool {
        let index = match self.schemas.iter().position(|s| Rc::ptr_eq(s, schema)) {
            Some(index) => index,
            None => return false,
        };
        self.schemas.remove(index);
        self.recompile();
        true
    }

    /// The member schemas, in insertion order
    pub fn schemas(&self) -> &[SchemaRef] {
        &self.schemas
    }

    /// Look up a type by qualified name across the whole set
    ///
    /// List-shadow names resolve to their wrapped complex type.
    pub fn get_type(&self, qname: &QName) -> Option<SchemaTypeRef> {
        self.symbols.get(qname).map(|entry| entry.schema_type.clone())
    }

    fn recompile(&mut self) {
        self.symbols = SymbolTable::new();
        for schema in &self.schemas {
            add_schema_symbols(&mut self.symbols, &schema.borrow());
        }
        for schema in &self.schemas {
            schema.borrow_mut().compile(&self.symbols);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::{SME_NAMESPACE, XS_NAMESPACE};

    const COMMON_NS: &str = "http://example.com/common";
    const CRM_NS: &str = "http://example.com/crm";

    fn common_schema() -> SDataSchema {
        let xml = format!(
            r#"<xs:schema xmlns:xs="{}" targetNamespace="{}">
                 <xs:complexType name="address">
                   <xs:all><xs:element name="city" type="xs:string"/></xs:all>
                 </xs:complexType>
               </xs:schema>"#,
            XS_NAMESPACE, COMMON_NS
        );
        SDataSchema::read_string(&xml).unwrap()
    }

    fn crm_schema() -> SDataSchema {
        let xml = format!(
            r#"<xs:schema xmlns:xs="{}" xmlns:sme="{}" xmlns:common="{}" targetNamespace="{}">
                 <xs:complexType name="account">
                   <xs:all>
                     <xs:element name="postalAddress" type="common:address"/>
                   </xs:all>
                 </xs:complexType>
               </xs:schema>"#,
            XS_NAMESPACE, SME_NAMESPACE, COMMON_NS, CRM_NS
        );
        SDataSchema::read_string(&xml).unwrap()
    }

    fn address_ref_resolved(schema: &SchemaRef) -> bool {
        let schema = schema.borrow();
        let account = schema.get_type("account").unwrap().borrow();
        account
            .as_complex()
            .unwrap()
            .property("postalAddress")
            .unwrap()
            .type_ref
            .is_resolved()
    }

    #[test]
    fn test_cross_schema_references_resolve_on_add() {
        let mut set = SDataSchemaSet::new();
        let crm = set.add(crm_schema());
        assert!(!address_ref_resolved(&crm));

        set.add(common_schema());
        assert!(address_ref_resolved(&crm));
    }

    #[test]
    fn test_removal_breaks_resolution() {
        let mut set = SDataSchemaSet::new();
        let crm = set.add(crm_schema());
        let common = set.add(common_schema());
        assert!(address_ref_resolved(&crm));

        assert!(set.remove(&common));
        assert!(!address_ref_resolved(&crm));
    }

    #[test]
    fn test_remove_non_member_is_false() {
        let mut set = SDataSchemaSet::new();
        set.add(common_schema());
        let outsider = Rc::new(RefCell::new(crm_schema()));
        assert!(!set.remove(&outsider));
        assert_eq!(set.schemas().len(), 1);
    }

    #[test]
    fn test_get_type_spans_the_set_and_list_names() {
        let xml = format!(
            r#"<xs:schema xmlns:xs="{}" xmlns:tns="{}" targetNamespace="{}">
                 <xs:complexType name="account">
                   <xs:all><xs:element name="name" type="xs:string"/></xs:all>
                 </xs:complexType>
                 <xs:complexType name="account--list">
                   <xs:sequence>
                     <xs:element name="account" type="tns:account" maxOccurs="unbounded"/>
                   </xs:sequence>
                 </xs:complexType>
               </xs:schema>"#,
            XS_NAMESPACE, CRM_NS, CRM_NS
        );
        let set = SDataSchemaSet::with_schemas([
            common_schema(),
            SDataSchema::read_string(&xml).unwrap(),
        ]);

        let address = set.get_type(&QName::namespaced(COMMON_NS, "address"));
        assert!(address.is_some());

        // The list-shadow name is an alias for the item type itself.
        let by_list_name = set
            .get_type(&QName::namespaced(CRM_NS, "account--list"))
            .unwrap();
        assert_eq!(by_list_name.borrow().name, "account");
    }
}
