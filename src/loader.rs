use crate::config::ReferencePolicy;
use crate::error::{Error, Result};
use crate::schema::{
    Component, Constraints, HttpMethod, ObjectType, Operation, PathItem, PrimitiveKind, Property,
    SchemaDocument, SchemaType,
};
use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Loader for OpenAPI schema documents.
///
/// The `SchemaLoader` parses YAML (or JSON, which is a YAML subset) into a
/// [`SchemaDocument`]. Loading is all-or-nothing: either the whole document is
/// understood and every reference is checked, or an error is returned.
///
/// # Example
///
/// ```
/// use openapi_scaffold::loader::SchemaLoader;
///
/// let doc = SchemaLoader::default()
///     .load_str("paths: {}\ncomponents:\n  schemas: {}\n")
///     .unwrap();
/// assert!(doc.components.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaLoader {
    reference_policy: ReferencePolicy,
}

impl SchemaLoader {
    pub fn new(reference_policy: ReferencePolicy) -> Self {
        Self { reference_policy }
    }

    /// Reads and parses a schema document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or any error of
    /// [`SchemaLoader::load_str`].
    pub fn load_file(&self, path: &Path) -> Result<SchemaDocument> {
        debug!("Loading schema document: {}", path.display());
        let text = fs::read_to_string(path)?;
        self.load_str(&text)
    }

    /// Parses a schema document from text.
    ///
    /// Reference checking runs against the document's own components, so
    /// documents that are merged later must each be self-contained.
    ///
    /// # Arguments
    ///
    /// * `text` - YAML or JSON document text
    ///
    /// # Returns
    ///
    /// Returns the loaded [`SchemaDocument`].
    ///
    /// # Errors
    ///
    /// Returns a parse error if:
    /// - The text is not well-formed YAML/JSON
    /// - `paths` or `components` is missing or not a mapping
    /// - A schema node uses an unknown `type`
    ///
    /// Returns an unresolved-reference error when a `$ref` has no matching
    /// component and the loader uses [`ReferencePolicy::Strict`].
    pub fn load_str(&self, text: &str) -> Result<SchemaDocument> {
        let root: Value = serde_yaml::from_str(text)?;
        let root = root
            .as_mapping()
            .ok_or_else(|| Error::parse("document root is not a mapping"))?;

        let components = Self::parse_components(root)?;
        let paths = Self::parse_paths(root)?;
        let mut doc = SchemaDocument { components, paths };

        self.check_references(&mut doc)?;

        debug!(
            "Loaded {} components and {} operations",
            doc.components.len(),
            doc.operations().count()
        );
        Ok(doc)
    }

    fn parse_components(root: &Mapping) -> Result<Vec<Component>> {
        let components = root
            .get("components")
            .ok_or_else(|| Error::parse("missing `components` section"))?;
        if components.is_null() {
            return Ok(Vec::new());
        }
        let components = components
            .as_mapping()
            .ok_or_else(|| Error::parse("`components` is not a mapping"))?;

        let schemas = match components.get("schemas") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(value) => value
                .as_mapping()
                .ok_or_else(|| Error::parse("`components.schemas` is not a mapping"))?,
        };

        let mut out = Vec::with_capacity(schemas.len());
        for (key, node) in schemas {
            let name = key_string(key)
                .ok_or_else(|| Error::parse("component name is not a string"))?;
            let location = format!("components.schemas.{name}");
            debug!("Parsing component: {}", name);
            out.push(Component {
                description: string_field(node, "description"),
                schema: parse_schema(node, &location)?,
                name,
            });
        }
        Ok(out)
    }

    fn parse_paths(root: &Mapping) -> Result<Vec<PathItem>> {
        let paths = root
            .get("paths")
            .ok_or_else(|| Error::parse("missing `paths` section"))?;
        if paths.is_null() {
            return Ok(Vec::new());
        }
        let paths = paths
            .as_mapping()
            .ok_or_else(|| Error::parse("`paths` is not a mapping"))?;

        let mut out = Vec::with_capacity(paths.len());
        for (key, item) in paths {
            let path = key_string(key).ok_or_else(|| Error::parse("path key is not a string"))?;
            let item = item
                .as_mapping()
                .ok_or_else(|| Error::parse(format!("path item `{path}` is not a mapping")))?;

            let mut operations = Vec::new();
            for (verb, node) in item {
                let verb = key_string(verb).unwrap_or_default();
                let Some(method) = HttpMethod::from_key(&verb.to_ascii_lowercase()) else {
                    debug!("Ignoring `{}` under path {}", verb, path);
                    continue;
                };
                operations.push(parse_operation(&path, method, node)?);
            }
            out.push(PathItem { path, operations });
        }
        Ok(out)
    }

    /// Apply the reference policy to every `$ref` in the document
    fn check_references(&self, doc: &mut SchemaDocument) -> Result<()> {
        let known: HashSet<String> = doc.components.iter().map(|c| c.name.clone()).collect();
        let policy = self.reference_policy;

        for component in &mut doc.components {
            let location = format!("components.schemas.{}", component.name);
            resolve_references(&mut component.schema, &known, policy, &location)?;
        }
        for item in &mut doc.paths {
            for op in &mut item.operations {
                let location = format!("paths.{}.{}", op.path, op.method.as_str());
                if let Some(body) = op.request_body.as_mut() {
                    resolve_references(body, &known, policy, &format!("{location}.requestBody"))?;
                }
                resolve_references(
                    &mut op.response,
                    &known,
                    policy,
                    &format!("{location}.responses.200"),
                )?;
            }
        }
        Ok(())
    }
}

fn resolve_references(
    ty: &mut SchemaType,
    known: &HashSet<String>,
    policy: ReferencePolicy,
    location: &str,
) -> Result<()> {
    let unresolved = match ty {
        SchemaType::Reference(name) if !known.contains(name.as_str()) => Some(name.clone()),
        _ => None,
    };
    if let Some(name) = unresolved {
        return match policy {
            ReferencePolicy::Strict => Err(Error::UnresolvedReference {
                reference: name,
                location: location.to_string(),
            }),
            ReferencePolicy::Lenient => {
                warn!(
                    "Unresolved reference `{}` at {}, using the generic type",
                    name, location
                );
                *ty = SchemaType::Untyped;
                Ok(())
            }
        };
    }

    match ty {
        SchemaType::Array(inner) => {
            resolve_references(inner, known, policy, &format!("{location}.items"))
        }
        SchemaType::Nullable(inner) => resolve_references(inner, known, policy, location),
        SchemaType::Object(obj) => {
            for (name, prop) in obj.properties.iter_mut() {
                resolve_references(
                    &mut prop.schema,
                    known,
                    policy,
                    &format!("{location}.properties.{name}"),
                )?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn parse_operation(path: &str, method: HttpMethod, node: &Value) -> Result<Operation> {
    let location = format!("paths.{path}.{}", method.as_str());
    if !node.is_mapping() {
        return Err(Error::parse(format!("{location} is not a mapping")));
    }

    let tags = match node.get("tags") {
        Some(Value::Sequence(seq)) => seq.iter().filter_map(key_string).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => return Err(Error::parse(format!("{location}.tags is not a list"))),
    };

    let request_body = match node.get("requestBody").and_then(json_schema) {
        Some(schema) => Some(parse_schema(schema, &format!("{location}.requestBody"))?),
        None => None,
    };

    let success = node
        .get("responses")
        .and_then(Value::as_mapping)
        .and_then(|responses| {
            responses
                .iter()
                .find(|(code, _)| key_string(code).as_deref() == Some("200"))
                .map(|(_, response)| response)
        });
    let response = match success.and_then(json_schema) {
        Some(schema) => parse_schema(schema, &format!("{location}.responses.200"))?,
        None => SchemaType::Untyped,
    };

    debug!("Parsed operation {} {}", method, path);
    Ok(Operation {
        path: path.to_string(),
        method,
        operation_id: string_field(node, "operationId"),
        tags,
        request_body,
        response,
        summary: string_field(node, "summary"),
        description: string_field(node, "description"),
    })
}

/// The schema under `content."application/json".schema`, if present
fn json_schema(node: &Value) -> Option<&Value> {
    let content = node.get("content")?;
    let media = content.get("application/json")?;
    Some(media.get("schema").unwrap_or(&Value::Null))
}

/// Convert one schema node into a [`SchemaType`]
pub(crate) fn parse_schema(node: &Value, location: &str) -> Result<SchemaType> {
    let Some(map) = node.as_mapping() else {
        return match node {
            Value::Null => Ok(SchemaType::Untyped),
            _ => Err(Error::parse(format!("schema at {location} is not a mapping"))),
        };
    };

    let ty = parse_schema_inner(map, location)?;
    if map.get("nullable").and_then(Value::as_bool) == Some(true) && !ty.is_nullable() {
        return Ok(SchemaType::Nullable(Box::new(ty)));
    }
    Ok(ty)
}

fn parse_schema_inner(map: &Mapping, location: &str) -> Result<SchemaType> {
    if let Some(reference) = map.get("$ref") {
        let reference = reference
            .as_str()
            .ok_or_else(|| Error::parse(format!("$ref at {location} is not a string")))?;
        let name = reference.rsplit('/').next().unwrap_or(reference);
        return Ok(SchemaType::Reference(name.to_string()));
    }

    for key in ["anyOf", "oneOf", "allOf"] {
        if let Some(Value::Sequence(members)) = map.get(key) {
            return parse_composition(key, members, location);
        }
    }

    match map.get("type") {
        None | Some(Value::Null) => {
            if map.contains_key("properties") {
                parse_object(map, location)
            } else {
                Ok(SchemaType::Untyped)
            }
        }
        Some(Value::String(name)) => parse_typed(name, map, location),
        Some(Value::Sequence(names)) => {
            let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
            let non_null: Vec<&str> = names.iter().copied().filter(|n| *n != "null").collect();
            let inner = match non_null.as_slice() {
                [single] => parse_typed(single, map, location)?,
                _ => {
                    debug!("Type list {:?} at {} maps to the generic type", names, location);
                    SchemaType::Untyped
                }
            };
            if names.contains(&"null") {
                Ok(SchemaType::Nullable(Box::new(inner)))
            } else {
                Ok(inner)
            }
        }
        Some(_) => Err(Error::parse(format!("`type` at {location} is not a string"))),
    }
}

fn parse_typed(name: &str, map: &Mapping, location: &str) -> Result<SchemaType> {
    let primitive = |kind: PrimitiveKind| -> Result<SchemaType> {
        Ok(SchemaType::Primitive {
            kind,
            format: map.get("format").and_then(Value::as_str).map(str::to_string),
        })
    };
    match name {
        "string" => match map.get("enum") {
            Some(Value::Sequence(values)) if !values.is_empty() => {
                let values: Option<Vec<String>> =
                    values.iter().map(|v| v.as_str().map(str::to_string)).collect();
                values
                    .map(SchemaType::EnumOfStrings)
                    .ok_or_else(|| Error::parse(format!("enum at {location} has non-string values")))
            }
            _ => primitive(PrimitiveKind::String),
        },
        "integer" => primitive(PrimitiveKind::Integer),
        "number" => primitive(PrimitiveKind::Number),
        "boolean" => primitive(PrimitiveKind::Boolean),
        "array" => {
            let items = match map.get("items") {
                Some(items) => parse_schema(items, &format!("{location}.items"))?,
                None => SchemaType::Untyped,
            };
            Ok(SchemaType::Array(Box::new(items)))
        }
        "object" => parse_object(map, location),
        "null" => Ok(SchemaType::Nullable(Box::new(SchemaType::Untyped))),
        other => Err(Error::parse(format!("unknown type `{other}` at {location}"))),
    }
}

fn parse_composition(key: &str, members: &[Value], location: &str) -> Result<SchemaType> {
    let is_null = |v: &Value| v.get("type").and_then(Value::as_str) == Some("null");
    let non_null: Vec<&Value> = members.iter().filter(|m| !is_null(*m)).collect();
    let has_null = non_null.len() < members.len();

    let inner = match non_null.as_slice() {
        [single] => parse_schema(single, location)?,
        _ => {
            debug!("`{}` at {} maps to the generic type", key, location);
            SchemaType::Untyped
        }
    };
    if has_null && !inner.is_nullable() {
        Ok(SchemaType::Nullable(Box::new(inner)))
    } else {
        Ok(inner)
    }
}

fn parse_object(map: &Mapping, location: &str) -> Result<SchemaType> {
    let required: IndexSet<String> = match map.get("required") {
        Some(Value::Sequence(names)) => names.iter().filter_map(key_string).collect(),
        _ => IndexSet::new(),
    };

    let mut properties = IndexMap::new();
    if let Some(props) = map.get("properties") {
        let props = props
            .as_mapping()
            .ok_or_else(|| Error::parse(format!("properties at {location} is not a mapping")))?;
        for (key, node) in props {
            let name = key_string(key)
                .ok_or_else(|| Error::parse(format!("property name at {location} is not a string")))?;
            let prop_location = format!("{location}.properties.{name}");
            let property = Property {
                schema: parse_schema(node, &prop_location)?,
                default: node.get("default").cloned(),
                description: string_field(node, "description"),
                constraints: Constraints {
                    minimum: node.get("minimum").and_then(Value::as_f64),
                    maximum: node.get("maximum").and_then(Value::as_f64),
                    min_length: node.get("minLength").and_then(Value::as_u64),
                    max_length: node.get("maxLength").and_then(Value::as_u64),
                },
            };
            properties.insert(name, property);
        }
    }

    for name in &required {
        if !properties.contains_key(name) {
            warn!("Required property `{}` is not declared at {}", name, location);
        }
    }

    Ok(SchemaType::Object(ObjectType {
        properties,
        required,
    }))
}

/// Mapping keys may be strings or, for response codes, YAML integers
fn key_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_field(node: &Value, key: &str) -> Option<String> {
    node.get(key).and_then(Value::as_str).map(str::to_string)
}
