//! Schema type → target-language type expressions.
//!
//! Mapping is pure and total: every [`SchemaType`] variant has a rendering in
//! every target, and nothing here can fail or perform I/O. Constraints are
//! never looked at here; they travel with the field to the model emitter.

use crate::naming;
use crate::schema::{PrimitiveKind, SchemaType};
use std::fmt;

/// A type expression in target-language syntax
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeExpr(String);

impl TypeExpr {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-language type mapping strategy
pub trait TypeMapper {
    /// Render a schema type
    fn map(&self, ty: &SchemaType) -> TypeExpr;

    /// Open key-value type used when an operation declares no schema
    fn generic(&self) -> TypeExpr;

    /// Render a request or response type, falling back to [`TypeMapper::generic`]
    fn map_or_generic(&self, ty: Option<&SchemaType>) -> TypeExpr {
        match ty {
            None | Some(SchemaType::Untyped) => self.generic(),
            Some(ty) => self.map(ty),
        }
    }

    /// Render `ty` as a value that may be absent, without double-wrapping
    fn optional(&self, ty: &SchemaType) -> TypeExpr {
        if ty.is_nullable() {
            self.map(ty)
        } else {
            self.map(&SchemaType::Nullable(Box::new(ty.clone())))
        }
    }
}

/// Python type hints for pydantic models and FastAPI handlers
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonTypes;

impl TypeMapper for PythonTypes {
    fn map(&self, ty: &SchemaType) -> TypeExpr {
        let text = match ty {
            SchemaType::Primitive { kind, format } => match kind {
                PrimitiveKind::String if format.as_deref() == Some("date-time") => {
                    "datetime".to_string()
                }
                PrimitiveKind::String => "str".to_string(),
                PrimitiveKind::Integer => "int".to_string(),
                PrimitiveKind::Number => "float".to_string(),
                PrimitiveKind::Boolean => "bool".to_string(),
            },
            SchemaType::EnumOfStrings(values) if values.is_empty() => "str".to_string(),
            SchemaType::EnumOfStrings(values) => {
                let literals: Vec<String> = values.iter().map(|v| quote(v)).collect();
                format!("Literal[{}]", literals.join(", "))
            }
            SchemaType::Array(items) => format!("list[{}]", self.map(items)),
            SchemaType::Object(_) => "dict[str, Any]".to_string(),
            SchemaType::Reference(name) => naming::type_name(name),
            SchemaType::Nullable(inner) => format!("Optional[{}]", self.map(inner)),
            SchemaType::Untyped => "Any".to_string(),
        };
        TypeExpr(text)
    }

    fn generic(&self) -> TypeExpr {
        TypeExpr::new("dict[str, Any]")
    }
}

/// TypeScript types for interfaces and client helpers
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptTypes;

/// Alias emitted at the top of the types file for `date-time` strings
pub const TS_DATE_TIME_ALIAS: &str = "DateTimeString";

impl TypeMapper for TypeScriptTypes {
    fn map(&self, ty: &SchemaType) -> TypeExpr {
        let text = match ty {
            SchemaType::Primitive { kind, format } => match kind {
                PrimitiveKind::String if format.as_deref() == Some("date-time") => {
                    TS_DATE_TIME_ALIAS.to_string()
                }
                PrimitiveKind::String => "string".to_string(),
                PrimitiveKind::Integer | PrimitiveKind::Number => "number".to_string(),
                PrimitiveKind::Boolean => "boolean".to_string(),
            },
            SchemaType::EnumOfStrings(values) if values.is_empty() => "string".to_string(),
            SchemaType::EnumOfStrings(values) => {
                let literals: Vec<String> = values.iter().map(|v| quote(v)).collect();
                literals.join(" | ")
            }
            SchemaType::Array(items) => {
                let inner = self.map(items);
                if inner.as_str().contains(" | ") {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            SchemaType::Object(_) => "Record<string, any>".to_string(),
            SchemaType::Reference(name) => naming::type_name(name),
            SchemaType::Nullable(inner) => format!("{} | null", self.map(inner)),
            SchemaType::Untyped => "any".to_string(),
        };
        TypeExpr(text)
    }

    fn generic(&self) -> TypeExpr {
        TypeExpr::new("Record<string, any>")
    }
}

/// Double-quoted string literal, valid in both Python and TypeScript
pub(crate) fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value.escape_default()))
}
