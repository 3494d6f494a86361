//! Model declarations planned from schema components.
//!
//! Planning is shared by every target: it decides which components become
//! declarations, the order of their fields and how each field's presence is
//! rendered. The per-language renderers in [`crate::targets`] only turn the
//! plan into text.

use crate::error::{Error, Result};
use crate::naming;
use crate::schema::{Component, Constraints, SchemaDocument, SchemaType};
use log::debug;
use serde_yaml::Value;
use std::collections::HashMap;

/// How a field is rendered with respect to absence
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    /// Required: never optional
    Required,
    /// Not required, with an explicit literal default
    Defaulted(Value),
    /// Not required and no default: optional, absent by default
    Optional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Property name exactly as written in the schema
    pub name: String,
    pub schema: SchemaType,
    pub presence: Presence,
    pub description: Option<String>,
    pub constraints: Constraints,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    /// A named record type with ordered fields
    Object(Vec<FieldDecl>),
    /// A named alias for a non-object component
    Alias(SchemaType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelDecl {
    /// Emitted declaration name
    pub name: String,
    /// Component name in the schema
    pub component: String,
    pub description: Option<String>,
    pub kind: DeclKind,
}

impl ModelDecl {
    pub fn fields(&self) -> &[FieldDecl] {
        match &self.kind {
            DeclKind::Object(fields) => fields,
            DeclKind::Alias(_) => &[],
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, DeclKind::Object(_))
    }
}

/// Every declaration to emit, in component order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelPlan {
    pub declarations: Vec<ModelDecl>,
}

impl ModelPlan {
    /// Plans one declaration per component.
    ///
    /// # Errors
    ///
    /// Returns a name-collision error when two components produce the same
    /// declaration name, including two components with an identical name after
    /// a merge.
    pub fn from_document(doc: &SchemaDocument) -> Result<Self> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        let mut declarations = Vec::with_capacity(doc.components.len());

        for component in &doc.components {
            let name = naming::type_name(&component.name);
            if let Some(first) = seen.insert(name.clone(), &component.name) {
                return Err(Error::NameCollision {
                    name,
                    first: first.to_string(),
                    second: component.name.clone(),
                });
            }
            declarations.push(plan_component(component, name));
        }

        debug!("Planned {} model declarations", declarations.len());
        Ok(Self { declarations })
    }

    pub fn objects(&self) -> impl Iterator<Item = &ModelDecl> {
        self.declarations.iter().filter(|d| d.is_object())
    }

    pub fn aliases(&self) -> impl Iterator<Item = &ModelDecl> {
        self.declarations.iter().filter(|d| !d.is_object())
    }
}

fn plan_component(component: &Component, name: String) -> ModelDecl {
    let kind = match &component.schema {
        SchemaType::Object(obj) => {
            let fields = obj
                .properties
                .iter()
                .map(|(prop_name, prop)| {
                    let presence = if obj.required.contains(prop_name) {
                        Presence::Required
                    } else if let Some(default) = &prop.default {
                        Presence::Defaulted(default.clone())
                    } else {
                        Presence::Optional
                    };
                    FieldDecl {
                        name: prop_name.clone(),
                        schema: prop.schema.clone(),
                        presence,
                        description: prop.description.clone(),
                        constraints: prop.constraints.clone(),
                    }
                })
                .collect();
            DeclKind::Object(fields)
        }
        other => DeclKind::Alias(other.clone()),
    };

    ModelDecl {
        name,
        component: component.name.clone(),
        description: component.description.clone(),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SchemaLoader;

    const DOC: &str = r#"
paths: {}
components:
  schemas:
    GenerateTextRequest:
      type: object
      required: [prompt]
      properties:
        prompt:
          type: string
          minLength: 1
        max_length:
          type: integer
          default: 50
        temperature:
          type: number
    Mood:
      type: string
      enum: [happy, sad]
"#;

    fn plan(text: &str) -> Result<ModelPlan> {
        ModelPlan::from_document(&SchemaLoader::default().load_str(text)?)
    }

    #[test]
    fn test_presence_follows_required_and_default() {
        let plan = plan(DOC).unwrap();
        let request = &plan.declarations[0];
        let presence: Vec<_> = request
            .fields()
            .iter()
            .map(|f| (f.name.as_str(), f.presence.clone()))
            .collect();

        assert_eq!(
            presence,
            vec![
                ("prompt", Presence::Required),
                ("max_length", Presence::Defaulted(Value::from(50))),
                ("temperature", Presence::Optional),
            ]
        );
        assert_eq!(request.fields()[0].constraints.min_length, Some(1));
    }

    #[test]
    fn test_non_object_components_become_aliases() {
        let plan = plan(DOC).unwrap();
        assert_eq!(plan.objects().count(), 1);
        let aliases: Vec<_> = plan.aliases().map(|d| d.name.as_str()).collect();
        assert_eq!(aliases, vec!["Mood"]);
    }

    #[test]
    fn test_merged_duplicate_component_is_a_collision() {
        let mut doc = SchemaLoader::default().load_str(DOC).unwrap();
        let extra = SchemaLoader::default()
            .load_str("paths: {}\ncomponents:\n  schemas:\n    Mood:\n      type: string\n")
            .unwrap();
        doc.merge(extra).unwrap();

        match ModelPlan::from_document(&doc) {
            Err(Error::NameCollision { name, .. }) => assert_eq!(name, "Mood"),
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_sanitized_names_can_collide() {
        let text = r#"
paths: {}
components:
  schemas:
    user-profile:
      type: object
    UserProfile:
      type: object
"#;
        match plan(text) {
            Err(Error::NameCollision { name, first, second }) => {
                assert_eq!(name, "UserProfile");
                assert_eq!(first, "user-profile");
                assert_eq!(second, "UserProfile");
            }
            other => panic!("expected collision, got {other:?}"),
        }
    }
}
