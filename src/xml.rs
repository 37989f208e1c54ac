//! XML document handling
//!
//! This module provides the owned element tree that the schema object model
//! reads from and writes to. Reading resolves namespace prefixes eagerly so
//! that SME-namespace attributes can be recognized by qualified name; writing
//! re-declares the required prefixes on the root element.

use crate::error::{Error, Result};
use crate::namespaces::QName;
use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// XML element in the document tree
///
/// Attributes preserve insertion order; namespace-declaration attributes
/// (`xmlns`, `xmlns:*`) are consumed during parsing and recorded in
/// `namespaces`, so they never appear in `attributes`. Equality compares the
/// modeled content and ignores the `namespaces` bookkeeping, since the writer
/// re-declares prefixes on the root.
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes in document order
    pub attributes: IndexMap<QName, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Namespace prefix declarations in scope at this element, as recorded
    /// during parsing (empty-string prefix is the default namespace)
    pub namespaces: IndexMap<String, String>,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.qname == other.qname
            && self.attributes == other.attributes
            && self.text == other.text
            && self.children == other.children
    }
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            namespaces: IndexMap::new(),
        }
    }

    /// Resolve a prefixed name in an attribute value (e.g. `type="xs:string"`)
    /// against this element's declarations and those of `ancestors`
    ///
    /// An unprefixed name resolves to the in-scope default namespace, or to no
    /// namespace when none is declared.
    pub fn resolve_qname(&self, value: &str, ancestors: &[&Element]) -> Option<QName> {
        let (prefix, local) = match value.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None => ("", value),
        };
        if let Some(ns) = self.namespaces.get(prefix) {
            return Some(QName::namespaced(ns.clone(), local));
        }
        for ancestor in ancestors.iter().rev() {
            if let Some(ns) = ancestor.namespaces.get(prefix) {
                return Some(QName::namespaced(ns.clone(), local));
            }
        }
        if prefix.is_empty() {
            Some(QName::local(local))
        } else {
            None
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an attribute value by qualified name
    pub fn attribute(&self, qname: &QName) -> Option<&str> {
        self.attributes.get(qname).map(|s| s.as_str())
    }

    /// Get an un-namespaced attribute value by local name
    pub fn attr(&self, local_name: &str) -> Option<&str> {
        self.attributes.get(&QName::local(local_name)).map(|s| s.as_str())
    }

    /// Set an attribute value
    pub fn set_attribute(&mut self, qname: QName, value: impl Into<String>) {
        self.attributes.insert(qname, value.into());
    }

    /// Set an un-namespaced attribute value
    pub fn set_attr(&mut self, local_name: &str, value: impl Into<String>) {
        self.attributes.insert(QName::local(local_name), value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Find the first child with the given qualified name
    pub fn find_child(&self, qname: &QName) -> Option<&Element> {
        self.children.iter().find(|e| &e.qname == qname)
    }

    /// Find all children with the given qualified name
    pub fn find_children<'a>(&'a self, qname: &'a QName) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |e| &e.qname == qname)
    }

    /// Parse an XML document from a string, returning its root element
    pub fn parse(xml: &str) -> Result<Element> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        reader.trim_text(true);

        // Stack of namespace scopes, innermost last. Each Start pushes the
        // prefix declarations it introduces; the matching End pops them.
        let mut scopes: Vec<IndexMap<String, String>> = vec![IndexMap::new()];
        let mut element_stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let element = parse_start(&e, &mut scopes, true)?;
                    element_stack.push(element);
                }
                Ok(Event::End(_)) => {
                    scopes.pop();
                    if let Some(current) = element_stack.pop() {
                        if let Some(parent) = element_stack.last_mut() {
                            parent.add_child(current);
                        } else {
                            root = Some(current);
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let element = parse_start(&e, &mut scopes, false)?;
                    if let Some(parent) = element_stack.last_mut() {
                        parent.add_child(element);
                    } else {
                        root = Some(element);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("failed to unescape text: {}", e)))?
                            .to_string();
                        if !text.trim().is_empty() {
                            current.text = Some(text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Ignore comments, processing instructions, etc.
            }
            buf.clear();
        }

        root.ok_or_else(|| Error::Xml("document has no root element".into()))
    }

    /// Serialize this element as a standalone XML document
    ///
    /// `prefixes` maps namespace URI to the prefix declared on the root; an
    /// empty prefix declares the default namespace. Namespaces encountered in
    /// the tree but absent from the map get generated `ns1`, `ns2`, ... decls.
    pub fn to_xml(&self, prefixes: &IndexMap<String, String>) -> Result<String> {
        let mut declared = prefixes.clone();
        collect_namespaces(self, &mut declared);

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| Error::Xml(format!("failed to write XML declaration: {}", e)))?;
        write_element(&mut writer, self, &declared, true)?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Xml(format!("serialized XML is not valid UTF-8: {}", e)))
    }
}

/// Parse one element from a Start/Empty event, resolving namespace prefixes
fn parse_start(
    start: &BytesStart,
    scopes: &mut Vec<IndexMap<String, String>>,
    push_scope: bool,
) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| Error::Xml(format!("invalid element name: {}", e)))?
        .to_string();

    // Collect the declarations this element introduces before resolving
    // anything, since its own name may use one of them.
    let mut local_decls: IndexMap<String, String> = IndexMap::new();
    let mut plain_attrs: Vec<(String, String)> = Vec::new();
    for attr_result in start.attributes() {
        let attr =
            attr_result.map_err(|e| Error::Xml(format!("failed to parse attribute: {}", e)))?;
        let attr_name = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| Error::Xml(format!("invalid attribute name: {}", e)))?
            .to_string();
        let attr_value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(format!("failed to unescape attribute value: {}", e)))?
            .to_string();

        if attr_name == "xmlns" {
            local_decls.insert(String::new(), attr_value);
        } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
            local_decls.insert(prefix.to_string(), attr_value);
        } else {
            plain_attrs.push((attr_name, attr_value));
        }
    }

    let resolve = |prefix: &str| -> Option<String> {
        if let Some(ns) = local_decls.get(prefix) {
            return Some(ns.clone());
        }
        scopes.iter().rev().find_map(|s| s.get(prefix).cloned())
    };

    let qname = match name.split_once(':') {
        Some((prefix, local)) => match resolve(prefix) {
            Some(ns) => QName::namespaced(ns, local),
            None => return Err(Error::Xml(format!("undeclared namespace prefix '{}'", prefix))),
        },
        None => match resolve("") {
            Some(ns) => QName::namespaced(ns, &name),
            None => QName::local(&name),
        },
    };

    let mut element = Element::new(qname);
    for (attr_name, attr_value) in plain_attrs {
        // Unprefixed attributes are in no namespace.
        let attr_qname = match attr_name.split_once(':') {
            Some((prefix, local)) => match resolve(prefix) {
                Some(ns) => QName::namespaced(ns, local),
                None => {
                    return Err(Error::Xml(format!("undeclared namespace prefix '{}'", prefix)))
                }
            },
            None => QName::local(&attr_name),
        };
        element.attributes.insert(attr_qname, attr_value);
    }

    // Record the full in-scope declaration map so a detached subtree can
    // still resolve prefixed names in its attribute values.
    let mut in_scope: IndexMap<String, String> = IndexMap::new();
    for scope in scopes.iter() {
        for (prefix, uri) in scope {
            in_scope.insert(prefix.clone(), uri.clone());
        }
    }
    for (prefix, uri) in &local_decls {
        in_scope.insert(prefix.clone(), uri.clone());
    }
    element.namespaces = in_scope;
    if push_scope {
        scopes.push(local_decls);
    }
    Ok(element)
}

/// Parse a boolean attribute or parameter value
///
/// The XML Schema lexical forms `true` and `1` are truthy; everything else
/// reads as `false`. Both the schema attributes and the SData query
/// parameters follow this convention.
pub fn parse_bool(value: &str) -> bool {
    matches!(value, "true" | "1")
}

/// Collect every namespace URI in the tree, assigning generated prefixes to
/// those not already mapped
fn collect_namespaces(element: &Element, declared: &mut IndexMap<String, String>) {
    let mut add = |ns: Option<&str>, declared: &mut IndexMap<String, String>| {
        if let Some(ns) = ns {
            if !declared.contains_key(ns) {
                let prefix = format!("ns{}", declared.len() + 1);
                declared.insert(ns.to_string(), prefix);
            }
        }
    };
    add(element.namespace(), declared);
    for qname in element.attributes.keys() {
        add(qname.namespace.as_deref(), declared);
    }
    for child in &element.children {
        collect_namespaces(child, declared);
    }
}

fn prefixed_name(qname: &QName, prefixes: &IndexMap<String, String>) -> String {
    match qname.namespace.as_deref() {
        Some(ns) => {
            let prefix = prefixes.get(ns).map(|s| s.as_str()).unwrap_or("");
            if prefix.is_empty() {
                qname.local_name.clone()
            } else {
                format!("{}:{}", prefix, qname.local_name)
            }
        }
        None => qname.local_name.clone(),
    }
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    prefixes: &IndexMap<String, String>,
    is_root: bool,
) -> Result<()> {
    let name = prefixed_name(&element.qname, prefixes);
    let mut start = BytesStart::new(name.clone());

    if is_root {
        for (ns, prefix) in prefixes {
            if prefix.is_empty() {
                start.push_attribute(("xmlns", ns.as_str()));
            } else {
                start.push_attribute((format!("xmlns:{}", prefix).as_str(), ns.as_str()));
            }
        }
    }
    for (qname, value) in &element.attributes {
        start.push_attribute((prefixed_name(qname, prefixes).as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_none() {
        writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::Xml(format!("failed to write element: {}", e)))?;
    } else {
        writer
            .write_event(Event::Start(start))
            .map_err(|e| Error::Xml(format!("failed to write element: {}", e)))?;
        if let Some(ref text) = element.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| Error::Xml(format!("failed to write text: {}", e)))?;
        }
        for child in &element.children {
            write_element(writer, child, prefixes, false)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(|e| Error::Xml(format!("failed to write element: {}", e)))?;
    }
    Ok(())
}
