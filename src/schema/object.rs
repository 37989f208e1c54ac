//! Shared plumbing for schema graph nodes
//!
//! Every schema node reads itself from and writes itself to an [`Element`].
//! The SME private namespace carries SData annotations on top of plain XML
//! Schema; attributes every node understands (`label`, `unsupported`,
//! `compliance`, `tags`) live in [`SmeAttributes`], node-specific names are
//! claimed by the node's own reader, and anything left over is preserved
//! losslessly in the `unhandled` bag and re-emitted verbatim on write.

use crate::namespaces::QName;
use crate::xml::Element;
use indexmap::IndexMap;

pub use crate::xml::parse_bool;

/// XML Schema element local names used by the schema model
pub mod xs_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const RESTRICTION: &str = "restriction";
    pub const ENUMERATION: &str = "enumeration";
    pub const ALL: &str = "all";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ANY_ATTRIBUTE: &str = "anyAttribute";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const EXTENSION: &str = "extension";
    pub const ANNOTATION: &str = "annotation";
    pub const DOCUMENTATION: &str = "documentation";
    pub const IMPORT: &str = "import";
}

/// XML Schema attribute local names used by the schema model
pub mod xs_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const NILLABLE: &str = "nillable";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const VERSION: &str = "version";
    pub const ELEMENT_FORM_DEFAULT: &str = "elementFormDefault";
    pub const NAMESPACE: &str = "namespace";
    pub const SCHEMA_LOCATION: &str = "schemaLocation";
}

/// SME attribute local names
pub mod sme_attrs {
    pub const LABEL: &str = "label";
    pub const UNSUPPORTED: &str = "unsupported";
    pub const COMPLIANCE: &str = "compliance";
    pub const TAGS: &str = "tags";
    pub const ROLE: &str = "role";
    pub const PATH: &str = "path";
    pub const INVOCATION_MODE: &str = "invocationMode";
    pub const IS_MANDATORY: &str = "isMandatory";
    pub const IS_READ_ONLY: &str = "isReadOnly";
    pub const AVERAGE_LENGTH: &str = "averageLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const PRECISION: &str = "precision";
    pub const SCALE: &str = "scale";
    pub const RELATIONSHIP: &str = "relationship";
    pub const IS_COLLECTION: &str = "isCollection";
    pub const CAN_GET: &str = "canGet";
    pub const CAN_POST: &str = "canPost";
    pub const CAN_PUT: &str = "canPut";
    pub const CAN_DELETE: &str = "canDelete";
    pub const CAN_PAGE_PREVIOUS: &str = "canPagePrevious";
    pub const CAN_PAGE_NEXT: &str = "canPageNext";
    pub const CAN_PAGE_INDEX: &str = "canPageIndex";
    pub const PLURAL_NAME: &str = "pluralName";
    pub const CAN_SEARCH: &str = "canSearch";
    pub const HAS_UUID: &str = "hasUuid";
    pub const HAS_TEMPLATE: &str = "hasTemplate";
    pub const SUPPORTS_ETAG: &str = "supportsETag";
    pub const BATCHING_MODE: &str = "batchingMode";
    pub const SYNC_MODE: &str = "syncMode";
}

/// SME `compliance` attribute values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compliance {
    /// The annotated item may be supported
    May,
    /// The annotated item must be supported
    MustSupport,
}

impl Compliance {
    /// Parse from the attribute value
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "may" => Some(Self::May),
            "mustSupport" => Some(Self::MustSupport),
            _ => None,
        }
    }

    /// The attribute value for this variant
    pub fn as_value(&self) -> &'static str {
        match self {
            Self::May => "may",
            Self::MustSupport => "mustSupport",
        }
    }
}

/// SME attributes shared by every schema item, plus the lossless passthrough
/// bag for unmodeled SME attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmeAttributes {
    /// Display label
    pub label: Option<String>,
    /// Whether the item is declared but not supported by the provider
    pub unsupported: bool,
    /// Compliance requirement
    pub compliance: Option<Compliance>,
    /// Free-form tag list
    pub tags: Option<String>,
    /// SME attributes not modeled as first-class properties, preserved
    /// verbatim for round-trip fidelity
    pub unhandled: Vec<(QName, String)>,
}

impl SmeAttributes {
    /// Read the SME attributes of `element`
    ///
    /// `claim` is offered each SME attribute first (by local name); returning
    /// `true` means the caller modeled it. Unclaimed common names fill this
    /// struct's fields, and everything else lands in `unhandled`.
    pub fn read<F>(element: &Element, mut claim: F) -> Self
    where
        F: FnMut(&str, &str) -> bool,
    {
        let mut sme = Self::default();
        for (qname, value) in &element.attributes {
            if !qname.is_sme() {
                continue;
            }
            if claim(&qname.local_name, value) {
                continue;
            }
            match qname.local_name.as_str() {
                sme_attrs::LABEL => sme.label = Some(value.clone()),
                sme_attrs::UNSUPPORTED => sme.unsupported = parse_bool(value),
                sme_attrs::COMPLIANCE => sme.compliance = Compliance::from_value(value),
                sme_attrs::TAGS => sme.tags = Some(value.clone()),
                _ => sme.unhandled.push((qname.clone(), value.clone())),
            }
        }
        sme
    }

    /// Write the common SME attributes and re-emit the unhandled bag
    pub fn write(&self, element: &mut Element) {
        if let Some(ref label) = self.label {
            element.set_attribute(QName::sme(sme_attrs::LABEL), label.clone());
        }
        if self.unsupported {
            element.set_attribute(QName::sme(sme_attrs::UNSUPPORTED), "true");
        }
        if let Some(compliance) = self.compliance {
            element.set_attribute(QName::sme(sme_attrs::COMPLIANCE), compliance.as_value());
        }
        if let Some(ref tags) = self.tags {
            element.set_attribute(QName::sme(sme_attrs::TAGS), tags.clone());
        }
        for (qname, value) in &self.unhandled {
            element.set_attribute(qname.clone(), value.clone());
        }
    }
}

/// Namespace-to-prefix mapping used when writing qualified names into
/// attribute values (`type="xs:string"`, `base="tns:account"`)
#[derive(Debug, Clone, Default)]
pub struct QNameFormatter {
    /// Namespace URI to prefix; an empty prefix means the default namespace
    pub prefixes: IndexMap<String, String>,
}

impl QNameFormatter {
    /// Render a qualified name as a prefixed attribute value
    pub fn format(&self, qname: &QName) -> String {
        match qname.namespace.as_deref() {
            Some(ns) => match self.prefixes.get(ns) {
                Some(prefix) if !prefix.is_empty() => {
                    format!("{}:{}", prefix, qname.local_name)
                }
                _ => qname.local_name.clone(),
            },
            None => qname.local_name.clone(),
        }
    }
}

/// Read `xs:annotation/xs:documentation` text from an element
pub fn read_documentation(element: &Element) -> Option<String> {
    element
        .find_child(&QName::xs(xs_elements::ANNOTATION))?
        .find_child(&QName::xs(xs_elements::DOCUMENTATION))?
        .text
        .clone()
}

/// Append an `xs:annotation/xs:documentation` child carrying `text`
pub fn write_documentation(element: &mut Element, text: &str) {
    let mut annotation = Element::new(QName::xs(xs_elements::ANNOTATION));
    let mut documentation = Element::new(QName::xs(xs_elements::DOCUMENTATION));
    documentation.text = Some(text.to_string());
    annotation.add_child(documentation);
    element.add_child(annotation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::SME_NAMESPACE;

    fn element_with_sme(attrs: &[(&str, &str)]) -> Element {
        let mut element = Element::new(QName::xs(xs_elements::COMPLEX_TYPE));
        for (name, value) in attrs {
            element.set_attribute(QName::sme(*name), *value);
        }
        element
    }

    #[test]
    fn test_read_common_attributes() {
        let element = element_with_sme(&[
            ("label", "Account"),
            ("compliance", "mustSupport"),
            ("unsupported", "true"),
        ]);
        let sme = SmeAttributes::read(&element, |_, _| false);
        assert_eq!(sme.label.as_deref(), Some("Account"));
        assert_eq!(sme.compliance, Some(Compliance::MustSupport));
        assert!(sme.unsupported);
        assert!(sme.unhandled.is_empty());
    }

    #[test]
    fn test_claimed_attributes_are_skipped() {
        let element = element_with_sme(&[("role", "resourceKind"), ("label", "Account")]);
        let mut claimed = Vec::new();
        let sme = SmeAttributes::read(&element, |name, value| {
            if name == "role" {
                claimed.push(value.to_string());
                true
            } else {
                false
            }
        });
        assert_eq!(claimed, vec!["resourceKind"]);
        assert_eq!(sme.label.as_deref(), Some("Account"));
        assert!(sme.unhandled.is_empty());
    }

    #[test]
    fn test_unhandled_round_trip() {
        let element = element_with_sme(&[("somethingNew", "x"), ("label", "L")]);
        let sme = SmeAttributes::read(&element, |_, _| false);
        assert_eq!(sme.unhandled.len(), 1);
        assert_eq!(
            sme.unhandled[0].0,
            QName::namespaced(SME_NAMESPACE, "somethingNew")
        );

        let mut written = Element::new(QName::xs(xs_elements::COMPLEX_TYPE));
        sme.write(&mut written);
        assert_eq!(written.attribute(&QName::sme("somethingNew")), Some("x"));
        assert_eq!(written.attribute(&QName::sme("label")), Some("L"));
    }

    #[test]
    fn test_documentation_round_trip() {
        let mut element = Element::new(QName::xs(xs_elements::COMPLEX_TYPE));
        write_documentation(&mut element, "An account resource.");
        assert_eq!(
            read_documentation(&element).as_deref(),
            Some("An account resource.")
        );
    }
}
