//! pydantic models and FastAPI router scaffolding.

use super::{number_literal, referenced_types, RenderContext, TargetEmitter};
use crate::binding::HandlerBody;
use crate::config::{PythonOptions, Target};
use crate::error::Result;
use crate::formatter::FormatCommand;
use crate::models::{DeclKind, FieldDecl, ModelDecl, ModelPlan, Presence};
use crate::naming;
use crate::routes::{PlannedRoute, RoutePlan, RouterRef};
use crate::staging::Artifact;
use crate::type_mapper::{quote, PythonTypes, TypeMapper};
use log::debug;
use serde_yaml::Value;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

const AGGREGATE_ROUTER: &str = "api_router";
const LEGACY_ROUTER: &str = "legacy_router";
const NOT_IMPLEMENTED: &str =
    "    raise HTTPException(status_code=501, detail=\"Not implemented\")\n";

/// Names the route module defines or imports before any handler
const ROUTE_MODULE_NAMES: &[&str] = &[
    "datetime",
    "Any",
    "Literal",
    "Optional",
    "APIRouter",
    "HTTPException",
    "Path",
    AGGREGATE_ROUTER,
    LEGACY_ROUTER,
];

/// Emits `generated_models.py` and `generated_router.py`
#[derive(Debug, Clone)]
pub struct PythonEmitter {
    options: PythonOptions,
    types: PythonTypes,
}

impl PythonEmitter {
    pub fn new(options: PythonOptions) -> Self {
        Self {
            options,
            types: PythonTypes,
        }
    }

    /// Render the pydantic models module
    pub fn render_models(&self, plan: &ModelPlan) -> String {
        let mut out = String::new();
        out.push_str(&module_header("Pydantic models generated from the OpenAPI schema."));
        out.push_str("from datetime import datetime\n");
        out.push_str("from typing import Any, Literal, Optional\n\n");
        out.push_str("from pydantic import BaseModel, ConfigDict, Field\n");

        for decl in plan.objects() {
            out.push_str("\n\n");
            self.render_class(decl, &mut out);
        }

        // Alias values are evaluated at import time, so they follow the
        // classes and each other in dependency order.
        let aliases: Vec<&ModelDecl> = plan.aliases().collect();
        let ordered = alias_order(&aliases);
        if !ordered.is_empty() {
            out.push_str("\n\n");
        }
        for decl in ordered {
            if let DeclKind::Alias(ty) = &decl.kind {
                if let Some(description) = &decl.description {
                    for line in description.trim().lines() {
                        let _ = writeln!(out, "# {}", line.trim_end());
                    }
                }
                let _ = writeln!(out, "{} = {}", decl.name, self.types.map(ty));
            }
        }

        let classes: Vec<&ModelDecl> = plan.objects().collect();
        if !classes.is_empty() {
            out.push_str("\n\n");
            for decl in classes {
                let _ = writeln!(out, "{}.model_rebuild()", decl.name);
            }
        }
        out
    }

    fn render_class(&self, decl: &ModelDecl, out: &mut String) {
        let _ = writeln!(out, "class {}(BaseModel):", decl.name);
        if let Some(description) = &decl.description {
            out.push_str(&docstring(description, "    "));
        }

        let fields = decl.fields();
        let mut lines = Vec::with_capacity(fields.len());
        let mut aliased = false;
        let mut taken = HashSet::new();
        for field in fields {
            let name = fresh(&mut taken, &field_name(&field.name));
            let (line, has_alias) = self.render_field(field, &name);
            aliased |= has_alias;
            lines.push(line);
        }

        if aliased {
            if decl.description.is_some() {
                out.push('\n');
            }
            out.push_str("    model_config = ConfigDict(populate_by_name=True)\n");
        }
        if !lines.is_empty() && (aliased || decl.description.is_some()) {
            out.push('\n');
        }
        for line in &lines {
            let _ = writeln!(out, "    {line}");
        }
        if lines.is_empty() && decl.description.is_none() {
            out.push_str("    pass\n");
        }
    }

    /// One annotated field named `name`; the flag is set when the field needs an alias
    fn render_field(&self, field: &FieldDecl, name: &str) -> (String, bool) {
        let ty = match &field.presence {
            Presence::Required => self.types.map(&field.schema),
            Presence::Defaulted(Value::Null) | Presence::Optional => {
                self.types.optional(&field.schema)
            }
            Presence::Defaulted(_) => self.types.map(&field.schema),
        };
        let default = match &field.presence {
            Presence::Required => None,
            Presence::Defaulted(value) => Some(python_literal(value)),
            Presence::Optional => Some("None".to_string()),
        };

        let mut kwargs = Vec::new();
        let has_alias = name != field.name;
        if has_alias {
            kwargs.push(format!("alias={}", quote(&field.name)));
        }
        if let Some(description) = &field.description {
            kwargs.push(format!("description={}", quote(description.trim())));
        }
        let c = &field.constraints;
        if let Some(min) = c.minimum {
            kwargs.push(format!("ge={}", number_literal(min)));
        }
        if let Some(max) = c.maximum {
            kwargs.push(format!("le={}", number_literal(max)));
        }
        if let Some(min) = c.min_length {
            kwargs.push(format!("min_length={min}"));
        }
        if let Some(max) = c.max_length {
            kwargs.push(format!("max_length={max}"));
        }

        let line = match (default, kwargs.is_empty()) {
            (None, true) => format!("{name}: {ty}"),
            (None, false) => format!("{name}: {ty} = Field(..., {})", kwargs.join(", ")),
            (Some(d), true) => format!("{name}: {ty} = {d}"),
            (Some(d), false) => format!("{name}: {ty} = Field(default={d}, {})", kwargs.join(", ")),
        };
        (line, has_alias)
    }

    /// Render the FastAPI router module
    pub fn render_routes(&self, models: &ModelPlan, plan: &RoutePlan, api_prefix: &str) -> String {
        let mut taken: HashSet<String> = ROUTE_MODULE_NAMES.iter().map(|s| s.to_string()).collect();
        taken.extend(models.declarations.iter().map(|d| d.name.clone()));

        let mut router_vars: HashMap<&str, String> = HashMap::new();
        for group in plan.active_groups() {
            let var = fresh(&mut taken, &naming::sanitize_identifier(&group.name));
            router_vars.insert(group.name.as_str(), var);
        }

        let handler_names: Vec<String> = plan
            .routes
            .iter()
            .map(|r| fresh(&mut taken, &naming::python_identifier(&r.operation_id)))
            .collect();

        // (module, function) → local name, in first-use order
        let mut imports: Vec<(&str, &str, String)> = Vec::new();
        for route in &plan.routes {
            if let HandlerBody::Delegate { binding, .. } = &route.body {
                let known = imports
                    .iter()
                    .any(|(m, f, _)| *m == binding.module && *f == binding.function);
                if !known {
                    let local = if taken.contains(&binding.function) {
                        fresh(&mut taken, &format!("{}_impl", binding.function))
                    } else {
                        fresh(&mut taken, &binding.function)
                    };
                    imports.push((binding.module.as_str(), binding.function.as_str(), local));
                }
            }
        }

        let used_models = referenced_types(
            plan.routes
                .iter()
                .flat_map(|r| r.request.iter().chain(std::iter::once(&r.response))),
        );

        let mut out = String::new();
        out.push_str(&module_header("FastAPI routers generated from the OpenAPI schema."));
        out.push_str("from datetime import datetime\n");
        out.push_str("from typing import Any, Literal, Optional\n\n");
        out.push_str("from fastapi import APIRouter, HTTPException, Path\n");
        if !used_models.is_empty() {
            out.push('\n');
            let _ = writeln!(out, "from {} import (", self.options.models_module);
            for name in &used_models {
                let _ = writeln!(out, "    {name},");
            }
            out.push_str(")\n");
        }
        for (module, function, local) in &imports {
            if function == local {
                let _ = writeln!(out, "from {module} import {function}");
            } else {
                let _ = writeln!(out, "from {module} import {function} as {local}");
            }
        }

        out.push('\n');
        for group in plan.active_groups() {
            let tags: Vec<String> = group.tags.iter().map(|t| quote(t)).collect();
            let var = &router_vars[group.name.as_str()];
            if group.prefix.is_empty() {
                let _ = writeln!(out, "{var} = APIRouter(tags=[{}])", tags.join(", "));
            } else {
                let _ = writeln!(
                    out,
                    "{var} = APIRouter(prefix={}, tags=[{}])",
                    quote(&group.prefix),
                    tags.join(", ")
                );
            }
        }
        if plan.has_legacy_routes() {
            let tags: Vec<String> = plan.topology.legacy().tags.iter().map(|t| quote(t)).collect();
            let _ = writeln!(out, "{LEGACY_ROUTER} = APIRouter(tags=[{}])", tags.join(", "));
        }
        let _ = writeln!(out, "{AGGREGATE_ROUTER} = APIRouter(prefix={})", quote(api_prefix));

        for (route, handler) in plan.routes.iter().zip(&handler_names) {
            let router = match &route.router {
                RouterRef::Group(name) => router_vars
                    .get(name.as_str())
                    .map(String::as_str)
                    .unwrap_or(AGGREGATE_ROUTER),
                RouterRef::Aggregate => AGGREGATE_ROUTER,
                RouterRef::Legacy => LEGACY_ROUTER,
            };
            let local = match &route.body {
                HandlerBody::Delegate { binding, .. } => imports
                    .iter()
                    .find(|(m, f, _)| *m == binding.module && *f == binding.function)
                    .map(|(_, _, local)| local.as_str()),
                HandlerBody::Stub => None,
            };
            out.push_str("\n\n");
            self.render_handler(route, handler, router, local, &mut out);
        }

        let includes: Vec<&String> = plan
            .active_groups()
            .map(|g| &router_vars[g.name.as_str()])
            .collect();
        if !includes.is_empty() {
            out.push_str("\n\n");
            for var in includes {
                let _ = writeln!(out, "{AGGREGATE_ROUTER}.include_router({var})");
            }
        }
        out
    }

    fn render_handler(
        &self,
        route: &PlannedRoute,
        handler: &str,
        router: &str,
        service: Option<&str>,
        out: &mut String,
    ) {
        let mut decorator = format!(
            "@{router}.{}({}",
            route.method.as_str(),
            quote(&route.relative_path)
        );
        if let Some(summary) = &route.summary {
            let _ = write!(decorator, ", summary={}", quote(summary.trim()));
        }
        decorator.push(')');
        let _ = writeln!(out, "{decorator}");

        let mut params = Vec::new();
        let mut param_names = HashSet::new();
        for name in &route.path_params {
            let ident = fresh(&mut param_names, &naming::python_identifier(name));
            if &ident == name {
                params.push(format!("{ident}: str"));
            } else {
                params.push(format!("{ident}: str = Path(alias={})", quote(name)));
            }
        }
        let request_var = route.request.as_ref().map(|request| {
            let var = fresh(&mut param_names, "request");
            params.push(format!("{var}: {}", self.types.map_or_generic(Some(request))));
            var
        });

        let response = self.types.map_or_generic(Some(&route.response));
        let _ = writeln!(out, "async def {handler}({}) -> {response}:", params.join(", "));
        if let Some(description) = &route.description {
            out.push_str(&docstring(description, "    "));
        }

        match (&route.body, service) {
            (HandlerBody::Delegate { pass_request, .. }, Some(function)) => {
                let arg = match (pass_request, &request_var) {
                    (true, Some(var)) => var.as_str(),
                    _ => "",
                };
                out.push_str("    try:\n");
                let _ = writeln!(out, "        return await {function}({arg})");
                out.push_str("    except HTTPException:\n");
                out.push_str("        raise\n");
                out.push_str("    except Exception as exc:\n");
                out.push_str(
                    "        raise HTTPException(status_code=500, detail=str(exc)) from exc\n",
                );
            }
            _ => out.push_str(NOT_IMPLEMENTED),
        }
    }
}

impl TargetEmitter for PythonEmitter {
    fn target(&self) -> Target {
        Target::Python
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<Vec<Artifact>> {
        debug!(
            "Rendering Python models to {} and routes to {}",
            self.options.models_path.display(),
            self.options.routes_path.display()
        );
        Ok(vec![
            Artifact::new(self.options.models_path.clone(), self.render_models(ctx.models)),
            Artifact::new(
                self.options.routes_path.clone(),
                self.render_routes(ctx.models, ctx.routes, &ctx.config.api_prefix),
            ),
        ])
    }

    fn format_commands(&self) -> Vec<FormatCommand> {
        vec![
            FormatCommand::new("poetry", &["run", "ruff", "format"]),
            FormatCommand::new("ruff", &["format"]),
        ]
    }
}

fn module_header(title: &str) -> String {
    format!(
        "\"\"\"{title}\n\nDo not edit by hand; edit the schema and rerun the generator.\n\"\"\"\n\n\
         # ruff: noqa: F401\n\n\
         from __future__ import annotations\n\n"
    )
}

/// pydantic treats a leading underscore as a private attribute
fn field_name(name: &str) -> String {
    let ident = naming::python_identifier(name);
    if ident.starts_with('_') {
        format!("field{ident}")
    } else {
        ident
    }
}

fn fresh(taken: &mut HashSet<String>, base: &str) -> String {
    naming::unique_name(taken, base)
}

fn docstring(text: &str, indent: &str) -> String {
    let mut body = text.trim().replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"");
    if body.ends_with('"') {
        body.push(' ');
    }
    let mut lines = body.lines();
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();
    if rest.is_empty() {
        return format!("{indent}\"\"\"{first}\"\"\"\n");
    }
    let mut out = format!("{indent}\"\"\"{first}\n");
    for line in rest {
        let line = line.trim_end();
        if line.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "{indent}{line}");
        }
    }
    let _ = writeln!(out, "{indent}\"\"\"");
    out
}

/// Python source for a literal default value
fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_nan() => "float(\"nan\")".to_string(),
            Some(f) if f.is_infinite() && f > 0.0 => "float(\"inf\")".to_string(),
            Some(f) if f.is_infinite() => "float(\"-inf\")".to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => quote(s),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", python_literal(k), python_literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Value::Tagged(tagged) => python_literal(&tagged.value),
    }
}

/// Aliases ordered so that each follows the aliases it refers to
fn alias_order<'a>(aliases: &[&'a ModelDecl]) -> Vec<&'a ModelDecl> {
    let index: HashMap<&str, usize> = aliases
        .iter()
        .enumerate()
        .map(|(i, d)| (d.name.as_str(), i))
        .collect();
    let mut visited = vec![false; aliases.len()];
    let mut order = Vec::with_capacity(aliases.len());

    fn visit<'a>(
        i: usize,
        aliases: &[&'a ModelDecl],
        index: &HashMap<&str, usize>,
        visited: &mut [bool],
        order: &mut Vec<&'a ModelDecl>,
    ) {
        if visited[i] {
            return;
        }
        visited[i] = true;
        if let DeclKind::Alias(ty) = &aliases[i].kind {
            let mut refs = Vec::new();
            ty.references(&mut refs);
            for name in refs {
                if let Some(&j) = index.get(naming::type_name(name).as_str()) {
                    visit(j, aliases, index, visited, order);
                }
            }
        }
        order.push(aliases[i]);
    }

    for i in 0..aliases.len() {
        visit(i, aliases, &index, &mut visited, &mut order);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingTable, ServiceBindingResolver};
    use crate::config::PrefixTieBreak;
    use crate::loader::SchemaLoader;
    use crate::topology::RouteTopology;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"
paths:
  /api/v1/health/:
    get:
      operationId: health_check
      summary: Health check
      tags: [health]
      responses:
        "200":
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/HealthResponse'
  /api/v1/items/{item_id}:
    get:
      tags: [items]
  /api/v1/external/weather:
    post:
      operationId: get_weather
      tags: [external]
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/WeatherRequest'
      responses:
        200:
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/WeatherResponse'
  /generate:
    post:
      operationId: generate_text_legacy
      tags: [text]
components:
  schemas:
    HealthResponse:
      type: object
      description: Service health
      required: [status]
      properties:
        status:
          type: string
          enum: [ok, degraded]
        checked_at:
          type: string
          format: date-time
    WeatherRequest:
      type: object
      required: [city]
      properties:
        city:
          type: string
          minLength: 1
          maxLength: 100
        units:
          type: string
          default: metric
        content-type:
          type: string
    WeatherResponse:
      type: object
      properties:
        temperature:
          type: number
          minimum: -100
          maximum: 100
        readings:
          type: array
          items:
            type: array
            items:
              type: number
    Empty:
      type: object
    Conditions:
      type: array
      items:
        $ref: '#/components/schemas/Condition'
    Condition:
      type: string
      enum: [sunny, rainy]
"#;

    fn render() -> (String, String) {
        let doc = SchemaLoader::default().load_str(DOC).unwrap();
        let models = ModelPlan::from_document(&doc).unwrap();
        let topology = RouteTopology::resolve(&doc, "/api/v1", PrefixTieBreak::FirstSeen).unwrap();
        let table = BindingTable::builtin();
        let routes = RoutePlan::build(&doc, topology, &ServiceBindingResolver::new(&table));
        let emitter = PythonEmitter::new(PythonOptions::default());
        (
            emitter.render_models(&models),
            emitter.render_routes(&models, &routes, "/api/v1"),
        )
    }

    #[test]
    fn test_required_and_optional_fields() {
        let (models, _) = render();
        assert!(models.contains("class HealthResponse(BaseModel):\n    \"\"\"Service health\"\"\"\n"));
        assert!(models.contains("    status: Literal[\"ok\", \"degraded\"]\n"));
        assert!(models.contains("    checked_at: Optional[datetime] = None\n"));
        assert!(models.contains("    city: str = Field(..., min_length=1, max_length=100)\n"));
        assert!(models.contains("    units: str = \"metric\"\n"));
    }

    #[test]
    fn test_constraints_and_nested_arrays() {
        let (models, _) = render();
        assert!(models.contains("    temperature: Optional[float] = Field(default=None, ge=-100, le=100)\n"));
        assert!(models.contains("    readings: Optional[list[list[float]]] = None\n"));
    }

    #[test]
    fn test_non_identifier_fields_are_aliased() {
        let (models, _) = render();
        assert!(models.contains("    model_config = ConfigDict(populate_by_name=True)\n"));
        assert!(models.contains(
            "    content_type: Optional[str] = Field(default=None, alias=\"content-type\")\n"
        ));
    }

    #[test]
    fn test_aliases_follow_their_dependencies() {
        let (models, _) = render();
        let condition = models.find("Condition = Literal[\"sunny\", \"rainy\"]").unwrap();
        let conditions = models.find("Conditions = list[Condition]").unwrap();
        assert!(condition < conditions);
        assert!(models.contains("class Empty(BaseModel):\n    pass\n"));
        assert!(models.trim_end().ends_with("Empty.model_rebuild()"));
    }

    #[test]
    fn test_router_declarations() {
        let (_, routes) = render();
        assert!(routes.contains("health_router = APIRouter(prefix=\"/health\", tags=[\"health\"])\n"));
        assert!(routes.contains("items_router = APIRouter(prefix=\"/items\", tags=[\"items\"])\n"));
        assert!(routes.contains("legacy_router = APIRouter(tags=[\"text\"])\n"));
        assert!(routes.contains("api_router = APIRouter(prefix=\"/api/v1\")\n"));
        assert!(routes.contains("api_router.include_router(external_router)\n"));
        assert!(!routes.contains("include_router(legacy_router)"));
    }

    #[test]
    fn test_stub_handler_with_path_parameter() {
        let (_, routes) = render();
        assert!(routes.contains(
            "@items_router.get(\"/{item_id}\")\n\
             async def get_api_v1_items_item_id(item_id: str) -> dict[str, Any]:\n\
             \x20   raise HTTPException(status_code=501, detail=\"Not implemented\")\n"
        ));
        assert!(routes.contains(
            "@health_router.get(\"/\", summary=\"Health check\")\n\
             async def health_check() -> HealthResponse:\n"
        ));
    }

    #[test]
    fn test_bound_handler_delegates_and_wraps_failures() {
        let (_, routes) = render();
        assert!(routes.contains(
            "from app.services.external.get_weather_impl import get_weather_impl\n"
        ));
        let expected = "\
async def get_weather(request: WeatherRequest) -> WeatherResponse:
    try:
        return await get_weather_impl(request)
    except HTTPException:
        raise
    except Exception as exc:
        raise HTTPException(status_code=500, detail=str(exc)) from exc
";
        assert!(routes.contains(expected), "{routes}");
    }

    #[test]
    fn test_used_models_are_imported_sorted() {
        let (_, routes) = render();
        assert!(routes.contains(
            "from app.generated.generated_models import (\n    HealthResponse,\n    WeatherRequest,\n    WeatherResponse,\n)\n"
        ));
    }

    const INLINE_DOC: &str = r#"
paths:
  /api/v1/clock/now:
    get:
      operationId: now
      tags: [clock]
      responses:
        "200":
          content:
            application/json:
              schema:
                type: string
                format: date-time
  /api/v1/clock/maybe:
    get:
      operationId: maybe
      tags: [clock]
      responses:
        "200":
          content:
            application/json:
              schema:
                type: string
                nullable: true
  /api/v1/clock/kind:
    post:
      operationId: kind
      tags: [clock]
      requestBody:
        content:
          application/json:
            schema:
              type: string
              enum: [a, b]
components:
  schemas:
    Clash:
      type: object
      properties:
        a-b:
          type: string
        a_b:
          type: integer
"#;

    fn render_inline() -> (String, String) {
        let doc = SchemaLoader::default().load_str(INLINE_DOC).unwrap();
        let models = ModelPlan::from_document(&doc).unwrap();
        let topology = RouteTopology::resolve(&doc, "/api/v1", PrefixTieBreak::FirstSeen).unwrap();
        let table = BindingTable::builtin();
        let routes = RoutePlan::build(&doc, topology, &ServiceBindingResolver::new(&table));
        let emitter = PythonEmitter::new(PythonOptions::default());
        (
            emitter.render_models(&models),
            emitter.render_routes(&models, &routes, "/api/v1"),
        )
    }

    #[test]
    fn test_route_module_imports_inline_type_names() {
        let (_, routes) = render_inline();
        assert!(routes.contains("from datetime import datetime\n"));
        assert!(routes.contains("from typing import Any, Literal, Optional\n"));
        assert!(routes.contains("async def now() -> datetime:\n"));
        assert!(routes.contains("async def maybe() -> Optional[str]:\n"));
        assert!(routes.contains(
            "async def kind(request: Literal[\"a\", \"b\"]) -> dict[str, Any]:\n"
        ));
    }

    #[test]
    fn test_sanitized_field_names_stay_distinct() {
        let (models, _) = render_inline();
        assert!(models.contains("    a_b: Optional[str] = Field(default=None, alias=\"a-b\")\n"));
        assert!(models.contains("    a_b_1: Optional[int] = Field(default=None, alias=\"a_b\")\n"));
    }

    #[test]
    fn test_python_literal() {
        assert_eq!(python_literal(&Value::Bool(true)), "True");
        assert_eq!(python_literal(&Value::Null), "None");
        let list: Value = serde_yaml::from_str("[1, two, 0.5]").unwrap();
        assert_eq!(python_literal(&list), "[1, \"two\", 0.5]");
        let map: Value = serde_yaml::from_str("{a: false}").unwrap();
        assert_eq!(python_literal(&map), "{\"a\": False}");
    }

    #[test]
    fn test_docstring_escapes_quotes() {
        assert_eq!(docstring("Say \"hi\"", ""), "\"\"\"Say \"hi\" \"\"\"\n");
        assert_eq!(docstring("One\n\nTwo", "    "), "    \"\"\"One\n\n    Two\n    \"\"\"\n");
    }

    #[test]
    fn test_field_name_avoids_private_attributes() {
        assert_eq!(field_name("2fa"), "field_2fa");
        assert_eq!(field_name("class"), "class_");
    }
}
