//! XML namespace handling
//!
//! Qualified names and the namespace URIs the SData schema conventions are
//! built on: plain XML Schema plus the private SME annotation namespace.

use std::fmt;

/// XML Schema namespace
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// SData core namespace
pub const SDATA_NAMESPACE: &str = "http://schemas.sage.com/sdata/2008/1";

/// SME namespace carrying SData-specific schema annotations
pub const SME_NAMESPACE: &str = "http://schemas.sage.com/sdata/sme/2007";

/// Conventional prefix for the XML Schema namespace
pub const XS_PREFIX: &str = "xs";

/// Conventional prefix for the SME namespace
pub const SME_PREFIX: &str = "sme";

/// Qualified name - combination of namespace URI and local name
///
/// Used as the key type for schema types and attributes throughout the
/// library. Equality and hashing are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<String>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName in the XML Schema namespace
    pub fn xs(local_name: impl Into<String>) -> Self {
        Self::namespaced(XS_NAMESPACE, local_name)
    }

    /// Create a QName in the SME namespace
    pub fn sme(local_name: impl Into<String>) -> Self {
        Self::namespaced(SME_NAMESPACE, local_name)
    }

    /// Check whether this name is in the XML Schema namespace
    pub fn is_xs(&self) -> bool {
        self.namespace.as_deref() == Some(XS_NAMESPACE)
    }

    /// Check whether this name is in the SME namespace
    pub fn is_sme(&self) -> bool {
        self.namespace.as_deref() == Some(SME_NAMESPACE)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_equality() {
        assert_eq!(QName::xs("string"), QName::namespaced(XS_NAMESPACE, "string"));
        assert_ne!(QName::xs("string"), QName::local("string"));
    }

    #[test]
    fn test_qname_display() {
        assert_eq!(QName::local("account").to_string(), "account");
        assert_eq!(
            QName::sme("label").to_string(),
            format!("{{{}}}label", SME_NAMESPACE)
        );
    }

    #[test]
    fn test_namespace_checks() {
        assert!(QName::xs("int").is_xs());
        assert!(QName::sme("role").is_sme());
        assert!(!QName::local("int").is_xs());
    }
}
