//! Read/write round trips over a realistic SData resource schema, plus
//! cross-schema compilation through a schema set.

use pretty_assertions::assert_eq;
use sdata_model::namespaces::{QName, SME_NAMESPACE, XS_NAMESPACE};
use sdata_model::schema::{
    FormDefault, SDataSchema, SDataSchemaSet, SchemaTypeKind, TypeRole, XmlTypeCode,
};

const CRM_NS: &str = "http://schemas.example.com/crm";

/// A condensed but representative provider schema: a resource kind with its
/// paired complex type and list shadow, a relationship to another complex
/// type, an enum, and a service operation.
fn crm_xsd() -> String {
    format!(
        r#"<xs:schema xmlns:xs="{xs}" xmlns:sme="{sme}" xmlns:tns="{tns}" targetNamespace="{tns}" elementFormDefault="qualified">
  <xs:element name="accounts" type="tns:account" sme:role="resourceKind" sme:pluralName="Accounts" sme:canSearch="true" sme:label="Account"/>
  <xs:complexType name="account">
    <xs:annotation><xs:documentation>A customer account.</xs:documentation></xs:annotation>
    <xs:all>
      <xs:element name="accountName" type="xs:string" minOccurs="0" sme:label="Name" sme:isMandatory="true" sme:maxLength="60"/>
      <xs:element name="status" type="tns:accountStatus" minOccurs="0"/>
      <xs:element name="contacts" type="tns:contact--list" minOccurs="0" sme:relationship="child" sme:isCollection="true" sme:canGet="true"/>
      <xs:element name="primaryContact" type="tns:contact" minOccurs="0" sme:relationship="reference" sme:canGet="true"/>
    </xs:all>
  </xs:complexType>
  <xs:complexType name="account--list">
    <xs:sequence>
      <xs:element name="account" type="tns:account" minOccurs="0" maxOccurs="unbounded"/>
    </xs:sequence>
    <xs:anyAttribute/>
  </xs:complexType>
  <xs:complexType name="contact">
    <xs:all>
      <xs:element name="fullName" type="xs:string" minOccurs="0"/>
      <xs:element name="birthDate" type="xs:date" minOccurs="0" nillable="true"/>
    </xs:all>
  </xs:complexType>
  <xs:complexType name="contact--list">
    <xs:sequence>
      <xs:element name="contact" type="tns:contact" minOccurs="0" maxOccurs="unbounded"/>
    </xs:sequence>
  </xs:complexType>
  <xs:simpleType name="accountStatus">
    <xs:restriction base="xs:string">
      <xs:enumeration value="Active"/>
      <xs:enumeration value="Closed"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:element name="computePrice" type="tns:computePrice" sme:role="serviceOperation" sme:path="computePrice"/>
  <xs:complexType name="computePrice">
    <xs:all>
      <xs:element name="productId" type="xs:string"/>
      <xs:element name="quantity" type="xs:int"/>
    </xs:all>
  </xs:complexType>
</xs:schema>"#,
        xs = XS_NAMESPACE,
        sme = SME_NAMESPACE,
        tns = CRM_NS,
    )
}

#[test]
fn read_models_a_provider_schema() {
    let schema = SDataSchema::read_string(&crm_xsd()).unwrap();
    assert_eq!(schema.target_namespace(), Some(CRM_NS));
    assert_eq!(schema.element_form_default, FormDefault::Qualified);
    // List shadows fold into their item types rather than appearing as types
    // of their own.
    assert_eq!(schema.types().len(), 4);

    let account = schema.get_type("account").unwrap().borrow();
    assert_eq!(account.documentation.as_deref(), Some("A customer account."));
    let info = account.as_complex().unwrap();
    assert_eq!(info.list_name.as_deref(), Some("account--list"));
    assert!(info.list_any_attribute);

    let top_level = info.top_level.as_ref().unwrap();
    assert_eq!(top_level.element_name, "accounts");
    match &top_level.role {
        TypeRole::ResourceKind(resource) => {
            assert_eq!(resource.plural_name.as_deref(), Some("Accounts"));
            assert!(resource.can_search);
        }
        other => panic!("unexpected role {:?}", other),
    }
    assert_eq!(top_level.sme.label.as_deref(), Some("Account"));

    let name = info.property("accountName").unwrap();
    assert_eq!(name.type_ref.code(), Some(XmlTypeCode::String));
    assert!(name.is_mandatory);
    assert_eq!(name.max_length, Some(60));

    // The collection relationship names the list wrapper but resolves to the
    // item type.
    let contacts = info.property("contacts").unwrap();
    let relationship = contacts.relationship_info().unwrap();
    assert!(relationship.is_collection);
    assert!(relationship.can_get);
    let target = contacts.type_ref.schema_type().unwrap();
    assert_eq!(target.borrow().name, "contact");

    let status = schema.get_type("accountStatus").unwrap().borrow();
    match &status.kind {
        SchemaTypeKind::Enum(info) => assert_eq!(info.values, vec!["Active", "Closed"]),
        other => panic!("unexpected kind {:?}", other),
    }

    let operation = schema.get_type("computePrice").unwrap().borrow();
    let top_level = operation.as_complex().unwrap().top_level.as_ref().unwrap();
    assert!(matches!(top_level.role, TypeRole::ServiceOperation(_)));
}

#[test]
fn write_then_read_is_structurally_identical() {
    let first = SDataSchema::read_string(&crm_xsd()).unwrap();
    let written = first.write_string().unwrap();
    let second = SDataSchema::read_string(&written).unwrap();

    assert_eq!(second.target_namespace(), first.target_namespace());
    assert_eq!(second.element_form_default, first.element_form_default);
    assert_eq!(second.types().len(), first.types().len());
    for (index, rc) in first.types().iter().enumerate() {
        let original = rc.borrow();
        let reread = second.types().get_index(index).unwrap().borrow();
        assert_eq!(*reread, *original);
    }

    // A second pass through the writer settles to the same document.
    assert_eq!(second.write_string().unwrap(), written);
}

#[test]
fn unknown_sme_attributes_survive_the_round_trip() {
    let xml = format!(
        r#"<xs:schema xmlns:xs="{xs}" xmlns:sme="{sme}" targetNamespace="{tns}">
  <xs:complexType name="account">
    <xs:all>
      <xs:element name="name" type="xs:string" sme:futureHint="keep-me"/>
    </xs:all>
  </xs:complexType>
</xs:schema>"#,
        xs = XS_NAMESPACE,
        sme = SME_NAMESPACE,
        tns = CRM_NS,
    );
    let schema = SDataSchema::read_string(&xml).unwrap();
    let written = schema.write_string().unwrap();
    assert!(written.contains("futureHint=\"keep-me\""));

    let reread = SDataSchema::read_string(&written).unwrap();
    let account = reread.get_type("account").unwrap().borrow();
    let property = account.as_complex().unwrap().property("name").unwrap();
    assert_eq!(
        property.sme.unhandled,
        vec![(QName::sme("futureHint"), "keep-me".to_string())]
    );
}

#[test]
fn malformed_role_fails_to_read() {
    let with_role = |role: &str| {
        format!(
            r#"<xs:schema xmlns:xs="{xs}" xmlns:sme="{sme}" xmlns:tns="{tns}" targetNamespace="{tns}">
  <xs:element name="accounts" type="tns:account" {role}/>
  <xs:complexType name="account">
    <xs:all><xs:element name="name" type="xs:string"/></xs:all>
  </xs:complexType>
</xs:schema>"#,
            xs = XS_NAMESPACE,
            sme = SME_NAMESPACE,
            tns = CRM_NS,
            role = role,
        )
    };

    // A recognized role reads fine.
    assert!(SDataSchema::read_string(&with_role("sme:role=\"resourceKind\"")).is_ok());
    // Missing or unknown roles are structural failures, not silent defaults.
    assert!(SDataSchema::read_string(&with_role("")).is_err());
    assert!(SDataSchema::read_string(&with_role("sme:role=\"mystery\"")).is_err());
}

#[test]
fn schema_set_resolves_across_documents() {
    let common = format!(
        r#"<xs:schema xmlns:xs="{xs}" targetNamespace="http://schemas.example.com/common">
  <xs:complexType name="address">
    <xs:all><xs:element name="city" type="xs:string"/></xs:all>
  </xs:complexType>
</xs:schema>"#,
        xs = XS_NAMESPACE,
    );
    let crm = format!(
        r#"<xs:schema xmlns:xs="{xs}" xmlns:common="http://schemas.example.com/common" targetNamespace="{tns}">
  <xs:complexType name="account">
    <xs:all><xs:element name="shipping" type="common:address"/></xs:all>
  </xs:complexType>
</xs:schema>"#,
        xs = XS_NAMESPACE,
        tns = CRM_NS,
    );

    let mut set = SDataSchemaSet::new();
    let crm = set.add(SDataSchema::read_string(&crm).unwrap());
    {
        let crm = crm.borrow();
        let account = crm.get_type("account").unwrap().borrow();
        let shipping = &account.as_complex().unwrap().property("shipping").unwrap().type_ref;
        assert!(!shipping.is_resolved());
    }

    let common = set.add(SDataSchema::read_string(&common).unwrap());
    {
        let crm = crm.borrow();
        let account = crm.get_type("account").unwrap().borrow();
        let shipping = &account.as_complex().unwrap().property("shipping").unwrap().type_ref;
        assert!(shipping.is_resolved());
        assert_eq!(shipping.schema_type().unwrap().borrow().name, "address");
    }

    set.remove(&common);
    let crm = crm.borrow();
    let account = crm.get_type("account").unwrap().borrow();
    let shipping = &account.as_complex().unwrap().property("shipping").unwrap().type_ref;
    assert!(!shipping.is_resolved());
    assert_eq!(
        shipping.qualified_name(),
        QName::namespaced("http://schemas.example.com/common", "address")
    );
}
