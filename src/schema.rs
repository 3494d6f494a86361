//! In-memory model of a loaded schema document.
//!
//! Everything here is produced by [`crate::loader::SchemaLoader`] and treated as
//! read-only by the rest of the pipeline. Iteration order is always document
//! order, which is what keeps generated output deterministic.

use indexmap::{IndexMap, IndexSet};
use serde_yaml::Value;
use std::fmt;

/// Root of a loaded schema document
#[derive(Debug, Clone, Default)]
pub struct SchemaDocument {
    /// Named components in declaration order (duplicates survive a merge)
    pub components: Vec<Component>,
    /// Path templates in declaration order
    pub paths: Vec<PathItem>,
}

/// A named, reusable type definition
#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub description: Option<String>,
    pub schema: SchemaType,
}

/// All operations declared under one path template
#[derive(Debug, Clone)]
pub struct PathItem {
    pub path: String,
    pub operations: Vec<Operation>,
}

/// Type node of the schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    Primitive {
        kind: PrimitiveKind,
        format: Option<String>,
    },
    Reference(String),
    Array(Box<SchemaType>),
    Object(ObjectType),
    Nullable(Box<SchemaType>),
    EnumOfStrings(Vec<String>),
    /// A node with no type information
    Untyped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Integer,
    Number,
    Boolean,
}

/// Object schema with ordered properties
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectType {
    pub properties: IndexMap<String, Property>,
    pub required: IndexSet<String>,
}

/// One property of an object schema
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub schema: SchemaType,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub constraints: Constraints,
}

/// Numeric and string constraints, carried as field metadata only
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self.minimum.is_none()
            && self.maximum.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
    }
}

/// HTTP verbs that produce route handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    /// Parse a lowercase path-item key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// One (path, verb) pair
#[derive(Debug, Clone)]
pub struct Operation {
    pub path: String,
    pub method: HttpMethod,
    pub operation_id: Option<String>,
    /// The first tag decides the router group
    pub tags: Vec<String>,
    /// JSON request body schema, if the operation declares one
    pub request_body: Option<SchemaType>,
    /// JSON schema of the `200` response, `Untyped` when absent
    pub response: SchemaType,
    pub summary: Option<String>,
    pub description: Option<String>,
}

impl Operation {
    pub fn first_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

impl SchemaDocument {
    /// Iterate over every operation in path order, then verb order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.paths.iter().flat_map(|item| item.operations.iter())
    }

    /// Append another document's components and paths.
    ///
    /// Components are appended as-is, even when a name repeats; model emission
    /// is where a repeated name is reported. A path present in both documents
    /// has its operations combined, and a repeated (path, verb) pair is an error.
    pub fn merge(&mut self, other: SchemaDocument) -> crate::error::Result<()> {
        self.components.extend(other.components);

        for item in other.paths {
            match self.paths.iter_mut().find(|p| p.path == item.path) {
                Some(existing) => {
                    for op in item.operations {
                        if existing.operations.iter().any(|e| e.method == op.method) {
                            return Err(crate::error::Error::parse(format!(
                                "duplicate operation {} {} in merged documents",
                                op.method, op.path
                            )));
                        }
                        existing.operations.push(op);
                    }
                }
                None => self.paths.push(item),
            }
        }
        Ok(())
    }
}

impl SchemaType {
    /// Collect every reference target reachable from this node
    pub fn references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            SchemaType::Reference(name) => out.push(name),
            SchemaType::Array(inner) | SchemaType::Nullable(inner) => inner.references(out),
            SchemaType::Object(obj) => {
                for prop in obj.properties.values() {
                    prop.schema.references(out);
                }
            }
            SchemaType::Primitive { .. } | SchemaType::EnumOfStrings(_) | SchemaType::Untyped => {}
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, SchemaType::Object(_))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, SchemaType::Nullable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(path: &str, method: HttpMethod) -> Operation {
        Operation {
            path: path.to_string(),
            method,
            operation_id: None,
            tags: vec![],
            request_body: None,
            response: SchemaType::Untyped,
            summary: None,
            description: None,
        }
    }

    fn doc_with(path: &str, method: HttpMethod) -> SchemaDocument {
        SchemaDocument {
            components: vec![Component {
                name: "Widget".to_string(),
                description: None,
                schema: SchemaType::Object(ObjectType::default()),
            }],
            paths: vec![PathItem {
                path: path.to_string(),
                operations: vec![op(path, method)],
            }],
        }
    }

    #[test]
    fn test_merge_keeps_duplicate_components() {
        let mut doc = doc_with("/a", HttpMethod::Get);
        doc.merge(doc_with("/b", HttpMethod::Get)).unwrap();

        assert_eq!(doc.components.len(), 2);
        assert_eq!(doc.paths.len(), 2);
    }

    #[test]
    fn test_merge_combines_verbs_on_same_path() {
        let mut doc = doc_with("/a", HttpMethod::Get);
        doc.merge(doc_with("/a", HttpMethod::Post)).unwrap();

        assert_eq!(doc.paths.len(), 1);
        assert_eq!(doc.operations().count(), 2);
    }

    #[test]
    fn test_merge_rejects_duplicate_operation() {
        let mut doc = doc_with("/a", HttpMethod::Get);
        let err = doc.merge(doc_with("/a", HttpMethod::Get)).unwrap_err();
        assert!(err.to_string().contains("duplicate operation GET /a"));
    }

    #[test]
    fn test_references_walks_nested_types() {
        let mut properties = IndexMap::new();
        properties.insert(
            "items".to_string(),
            Property {
                schema: SchemaType::Array(Box::new(SchemaType::Nullable(Box::new(
                    SchemaType::Reference("Widget".to_string()),
                )))),
                default: None,
                description: None,
                constraints: Constraints::default(),
            },
        );
        let ty = SchemaType::Object(ObjectType {
            properties,
            required: IndexSet::new(),
        });

        let mut refs = Vec::new();
        ty.references(&mut refs);
        assert_eq!(refs, vec!["Widget"]);
    }
}
