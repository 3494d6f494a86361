//! TypeScript interfaces and fetch-based client helpers.
//!
//! The types file mirrors the model plan one declaration at a time. The client
//! file is rendered from the same route plan as the Python handlers, so every
//! handler has exactly one endpoint constant and one `apiMethods` helper.

use super::{number_literal, referenced_types, RenderContext, TargetEmitter};
use crate::config::{Target, TypeScriptOptions};
use crate::error::Result;
use crate::formatter::FormatCommand;
use crate::models::{DeclKind, FieldDecl, ModelDecl, ModelPlan, Presence};
use crate::naming;
use crate::routes::{PlannedRoute, RoutePlan};
use crate::schema::{Constraints, PrimitiveKind, SchemaType};
use crate::staging::Artifact;
use crate::type_mapper::{quote, TypeMapper, TypeScriptTypes, TS_DATE_TIME_ALIAS};
use log::debug;
use serde_yaml::Value;
use std::collections::HashSet;
use std::fmt::Write as _;

const HEADER: &str = "// Generated from the OpenAPI schema.\n\
                      // Do not edit by hand; edit the schema and rerun the generator.\n";

/// Fixed part of the client file, between the endpoint table and the helpers
const CLIENT_RUNTIME: &str = r#"export type ApiEndpoint = (typeof API_ENDPOINTS)[keyof typeof API_ENDPOINTS];

export type HttpMethod = "GET" | "POST" | "PUT" | "DELETE" | "PATCH";

export interface ApiClientConfig {
  baseUrl: string;
  timeout?: number;
  headers?: Record<string, string>;
}

export interface ApiError {
  detail: string;
  status_code?: number;
}

/** Substitute `{name}` tokens of a path template with encoded values */
export function buildPath(template: string, params: Record<string, string>): string {
  return template.replace(/\{([^}]+)\}/g, (_match, name: string) =>
    encodeURIComponent(params[name] ?? ""),
  );
}

export class ApiClient {
  private config: ApiClientConfig;

  constructor(config: ApiClientConfig) {
    this.config = config;
  }

  async request<T>(path: string, method: HttpMethod = "GET", data?: unknown): Promise<T> {
    const options: RequestInit = {
      method,
      headers: {
        "Content-Type": "application/json",
        ...this.config.headers,
      },
    };
    if (data !== undefined) {
      options.body = JSON.stringify(data);
    }

    const controller = this.config.timeout ? new AbortController() : undefined;
    const timer = controller
      ? setTimeout(() => controller.abort(), this.config.timeout)
      : undefined;
    if (controller) {
      options.signal = controller.signal;
    }

    try {
      const response = await fetch(`${this.config.baseUrl}${path}`, options);
      if (!response.ok) {
        let detail = `HTTP error! status: ${response.status}`;
        try {
          const body = (await response.json()) as Partial<ApiError>;
          detail = body.detail || detail;
        } catch {
          // keep the status-based message
        }
        throw new Error(detail);
      }
      return (await response.json()) as T;
    } finally {
      if (timer !== undefined) {
        clearTimeout(timer);
      }
    }
  }

  async get<T>(path: string): Promise<T> {
    return this.request<T>(path, "GET");
  }

  async post<T>(path: string, data?: unknown): Promise<T> {
    return this.request<T>(path, "POST", data);
  }

  async put<T>(path: string, data?: unknown): Promise<T> {
    return this.request<T>(path, "PUT", data);
  }

  async patch<T>(path: string, data?: unknown): Promise<T> {
    return this.request<T>(path, "PATCH", data);
  }

  async delete<T>(path: string): Promise<T> {
    return this.request<T>(path, "DELETE");
  }
}

export function createApiClient(baseUrl: string, options?: Partial<ApiClientConfig>): ApiClient {
  return new ApiClient({
    baseUrl,
    timeout: 10000,
    ...options,
  });
}
"#;

/// Emits `api-types.ts` and `api-client.ts`
#[derive(Debug, Clone)]
pub struct TypeScriptEmitter {
    options: TypeScriptOptions,
    types: TypeScriptTypes,
}

impl TypeScriptEmitter {
    pub fn new(options: TypeScriptOptions) -> Self {
        Self {
            options,
            types: TypeScriptTypes,
        }
    }

    /// Render the interface declarations
    pub fn render_types(&self, plan: &ModelPlan) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');
        let _ = writeln!(out, "/** ISO 8601 date-time string */");
        let _ = writeln!(out, "export type {TS_DATE_TIME_ALIAS} = string;");

        for decl in &plan.declarations {
            out.push('\n');
            match &decl.kind {
                DeclKind::Object(fields) => self.render_interface(decl, fields, &mut out),
                DeclKind::Alias(ty) => {
                    out.push_str(&jsdoc(decl.description.as_deref(), &Constraints::default(), ""));
                    let _ = writeln!(out, "export type {} = {};", decl.name, self.types.map(ty));
                }
            }
        }
        out
    }

    fn render_interface(&self, decl: &ModelDecl, fields: &[FieldDecl], out: &mut String) {
        out.push_str(&jsdoc(decl.description.as_deref(), &Constraints::default(), ""));
        if fields.is_empty() {
            let _ = writeln!(out, "export interface {} {{}}", decl.name);
            return;
        }

        let _ = writeln!(out, "export interface {} {{", decl.name);
        for field in fields {
            out.push_str(&jsdoc(field.description.as_deref(), &field.constraints, "  "));
            let marker = match field.presence {
                Presence::Required => "",
                Presence::Defaulted(_) | Presence::Optional => "?",
            };
            let _ = writeln!(
                out,
                "  {}{marker}: {};",
                property_key(&field.name),
                self.types.map(&field.schema)
            );
        }
        out.push_str("}\n");

        let defaults: Vec<(&str, &Value)> = fields
            .iter()
            .filter_map(|f| match &f.presence {
                Presence::Defaulted(value) => Some((f.name.as_str(), value)),
                _ => None,
            })
            .collect();
        if !defaults.is_empty() {
            out.push('\n');
            let _ = writeln!(
                out,
                "export const {0}Defaults: Partial<{0}> = {{",
                decl.name
            );
            for (name, value) in defaults {
                let _ = writeln!(out, "  {}: {},", property_key(name), ts_literal(value));
            }
            out.push_str("};\n");
        }
    }

    /// Render the endpoint table, client runtime and per-operation helpers
    pub fn render_client(&self, plan: &RoutePlan) -> String {
        let mut out = String::from(HEADER);

        let mut imports = referenced_types(
            plan.routes
                .iter()
                .flat_map(|r| r.request.iter().chain(std::iter::once(&r.response))),
        );
        if plan
            .routes
            .iter()
            .any(|r| uses_date_time(&r.response) || r.request.as_ref().is_some_and(uses_date_time))
        {
            imports.push(TS_DATE_TIME_ALIAS.to_string());
            imports.sort();
        }
        if !imports.is_empty() {
            out.push('\n');
            let _ = writeln!(
                out,
                "import type {{ {} }} from {};",
                imports.join(", "),
                quote(&self.options.types_import)
            );
        }

        let mut constant_names = HashSet::new();
        let constants: Vec<String> = plan
            .routes
            .iter()
            .map(|r| naming::unique_name(&mut constant_names, &naming::upper_snake_case(&r.operation_id)))
            .collect();

        out.push('\n');
        out.push_str("export const API_ENDPOINTS = {\n");
        for (route, constant) in plan.routes.iter().zip(&constants) {
            let _ = writeln!(out, "  {constant}: {},", quote(&route.path));
        }
        out.push_str("} as const;\n\n");
        out.push_str(CLIENT_RUNTIME);

        out.push('\n');
        let _ = writeln!(
            out,
            "const defaultBaseUrl: string =\n  (typeof process !== \"undefined\" && process.env.{}) || {};",
            self.options.base_url_env,
            quote(&self.options.default_base_url)
        );

        let mut helper_names = HashSet::new();
        out.push('\n');
        out.push_str("export const apiMethods = {\n");
        for (route, constant) in plan.routes.iter().zip(&constants) {
            let helper = naming::unique_name(
                &mut helper_names,
                &naming::ts_identifier(&naming::camel_case(&route.operation_id)),
            );
            self.render_helper(route, &helper, constant, &mut out);
        }
        out.push_str("};\n");
        out
    }

    fn render_helper(&self, route: &PlannedRoute, helper: &str, constant: &str, out: &mut String) {
        let mut params = Vec::new();
        let mut idents = HashSet::new();
        let mut substitutions = Vec::new();
        for name in &route.path_params {
            let ident = naming::unique_name(&mut idents, &naming::ts_identifier(name));
            params.push(format!("{ident}: string"));
            if &ident == name {
                substitutions.push(ident);
            } else {
                substitutions.push(format!("{}: {ident}", property_key(name)));
            }
        }
        let request = route.request.as_ref().map(|request| {
            let ident = naming::unique_name(&mut idents, "request");
            params.push(format!("{ident}: {}", self.types.map_or_generic(Some(request))));
            ident
        });
        let response = self.types.map_or_generic(Some(&route.response));

        let endpoint = format!("API_ENDPOINTS.{constant}");
        let path = if substitutions.is_empty() {
            endpoint
        } else {
            format!("buildPath({endpoint}, {{ {} }})", substitutions.join(", "))
        };
        let mut args = vec![path, quote(&route.method.to_string())];
        if let Some(ident) = request {
            args.push(ident);
        }

        if let Some(doc) = route.summary.as_deref().or(route.description.as_deref()) {
            out.push_str(&jsdoc(Some(doc), &Constraints::default(), "  "));
        }
        let _ = writeln!(
            out,
            "  {helper}: ({}): Promise<{response}> =>\n    createApiClient(defaultBaseUrl).request<{response}>({}),",
            params.join(", "),
            args.join(", ")
        );
    }
}

impl TargetEmitter for TypeScriptEmitter {
    fn target(&self) -> Target {
        Target::TypeScript
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<Vec<Artifact>> {
        debug!(
            "Rendering TypeScript types to {} and client to {}",
            self.options.types_path.display(),
            self.options.client_path.display()
        );
        Ok(vec![
            Artifact::new(self.options.types_path.clone(), self.render_types(ctx.models)),
            Artifact::new(self.options.client_path.clone(), self.render_client(ctx.routes)),
        ])
    }

    fn format_commands(&self) -> Vec<FormatCommand> {
        vec![
            FormatCommand::new("npx", &["--no-install", "prettier", "--write"]),
            FormatCommand::new("prettier", &["--write"]),
        ]
    }
}

fn property_key(name: &str) -> String {
    if naming::is_ts_property_key(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

fn uses_date_time(ty: &SchemaType) -> bool {
    match ty {
        SchemaType::Primitive {
            kind: PrimitiveKind::String,
            format,
        } => format.as_deref() == Some("date-time"),
        SchemaType::Array(inner) | SchemaType::Nullable(inner) => uses_date_time(inner),
        _ => false,
    }
}

/// JSDoc block for a description and constraint tags; empty when both are absent
fn jsdoc(description: Option<&str>, constraints: &Constraints, indent: &str) -> String {
    let mut lines: Vec<String> = description
        .map(|d| d.trim().replace("*/", "*\\/"))
        .into_iter()
        .flat_map(|d| d.lines().map(|l| l.trim_end().to_string()).collect::<Vec<_>>())
        .collect();
    if let Some(min) = constraints.minimum {
        lines.push(format!("@minimum {}", number_literal(min)));
    }
    if let Some(max) = constraints.maximum {
        lines.push(format!("@maximum {}", number_literal(max)));
    }
    if let Some(min) = constraints.min_length {
        lines.push(format!("@minLength {min}"));
    }
    if let Some(max) = constraints.max_length {
        lines.push(format!("@maxLength {max}"));
    }

    match lines.as_slice() {
        [] => String::new(),
        [single] => format!("{indent}/** {single} */\n"),
        _ => {
            let mut out = format!("{indent}/**\n");
            for line in &lines {
                if line.is_empty() {
                    let _ = writeln!(out, "{indent} *");
                } else {
                    let _ = writeln!(out, "{indent} * {line}");
                }
            }
            let _ = writeln!(out, "{indent} */");
            out
        }
    }
}

/// TypeScript source for a literal default value
fn ts_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_nan() => "Number.NaN".to_string(),
            Some(f) if f.is_infinite() && f > 0.0 => "Number.POSITIVE_INFINITY".to_string(),
            Some(f) if f.is_infinite() => "Number.NEGATIVE_INFINITY".to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => quote(s),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(ts_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    let key = match k {
                        Value::String(s) => property_key(s),
                        other => quote(&ts_literal(other)),
                    };
                    format!("{key}: {}", ts_literal(v))
                })
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
        Value::Tagged(tagged) => ts_literal(&tagged.value),
    }
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
  /api/v1/text/generate:
    post:
      operationId: generate_text
      summary: Generate text
      tags: [text]
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/GenerateTextRequest'
      responses:
        "200":
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/GenerateTextResponse'
  /api/v1/items/{item_id}/tags/{tag}:
    delete:
      tags: [items]
components:
  schemas:
    GenerateTextRequest:
      type: object
      description: Text generation input
      required: [prompt]
      properties:
        prompt:
          type: string
          description: The prompt
          minLength: 1
        max_length:
          type: integer
          default: 50
        style:
          type: string
          enum: [plain, fancy]
        content-type:
          type: string
    GenerateTextResponse:
      type: object
      required: [text, created_at]
      properties:
        text:
          type: string
        created_at:
          type: string
          format: date-time
        tokens:
          type: array
          items:
            type: array
            items:
              type: integer
    Styles:
      type: array
      items:
        type: string
        enum: [plain, fancy]
"#;

    fn plan() -> (ModelPlan, RoutePlan) {
        let doc = SchemaLoader::default().load_str(DOC).unwrap();
        let models = ModelPlan::from_document(&doc).unwrap();
        let topology = RouteTopology::resolve(&doc, "/api/v1", PrefixTieBreak::FirstSeen).unwrap();
        let table = BindingTable::builtin();
        let routes = RoutePlan::build(&doc, topology, &ServiceBindingResolver::new(&table));
        (models, routes)
    }

    fn emitter() -> TypeScriptEmitter {
        TypeScriptEmitter::new(TypeScriptOptions::default())
    }

    #[test]
    fn test_interface_fields_and_defaults() {
        let (models, _) = plan();
        let types = emitter().render_types(&models);
        let expected = r#"/** Text generation input */
export interface GenerateTextRequest {
  /**
   * The prompt
   * @minLength 1
   */
  prompt: string;
  max_length?: number;
  style?: "plain" | "fancy";
  "content-type"?: string;
}

export const GenerateTextRequestDefaults: Partial<GenerateTextRequest> = {
  max_length: 50,
};
"#;
        assert!(types.contains(expected), "{types}");
    }

    #[test]
    fn test_date_time_and_nested_arrays() {
        let (models, _) = plan();
        let types = emitter().render_types(&models);
        assert!(types.contains("export type DateTimeString = string;\n"));
        assert!(types.contains("  created_at: DateTimeString;\n"));
        assert!(types.contains("  tokens?: number[][];\n"));
        assert!(types.contains("export type Styles = (\"plain\" | \"fancy\")[];\n"));
    }

    #[test]
    fn test_client_endpoints_and_helpers() {
        let (_, routes) = plan();
        let client = emitter().render_client(&routes);

        assert!(client.contains(
            "import type { GenerateTextRequest, GenerateTextResponse } from \"./api-types\";\n"
        ));
        assert!(client.contains("  GENERATE_TEXT: \"/api/v1/text/generate\",\n"));
        assert!(client.contains(
            "  DELETE_API_V1_ITEMS_ITEM_ID_TAGS_TAG: \"/api/v1/items/{item_id}/tags/{tag}\",\n"
        ));
        assert!(client.contains(
            "  /** Generate text */\n  generateText: (request: GenerateTextRequest): Promise<GenerateTextResponse> =>\n    createApiClient(defaultBaseUrl).request<GenerateTextResponse>(API_ENDPOINTS.GENERATE_TEXT, \"POST\", request),\n"
        ));
        assert!(client.contains(
            "  deleteApiV1ItemsItemIdTagsTag: (item_id: string, tag: string): Promise<Record<string, any>> =>\n    createApiClient(defaultBaseUrl).request<Record<string, any>>(buildPath(API_ENDPOINTS.DELETE_API_V1_ITEMS_ITEM_ID_TAGS_TAG, { item_id, tag }), \"DELETE\"),\n"
        ));
    }

    #[test]
    fn test_client_uses_configured_base_url() {
        let (_, routes) = plan();
        let client = emitter().render_client(&routes);
        assert!(client.contains(
            "(typeof process !== \"undefined\" && process.env.NEXT_PUBLIC_API_URL) || \"http://localhost:8000\";"
        ));
    }

    #[test]
    fn test_jsdoc() {
        assert_eq!(jsdoc(None, &Constraints::default(), ""), "");
        assert_eq!(jsdoc(Some("Hi */"), &Constraints::default(), ""), "/** Hi *\\/ */\n");
        let constraints = Constraints {
            minimum: Some(0.0),
            ..Constraints::default()
        };
        assert_eq!(jsdoc(None, &constraints, "  "), "  /** @minimum 0 */\n");
    }

    #[test]
    fn test_ts_literal() {
        let value: Value = serde_yaml::from_str("{a: [1, x], b-c: null}").unwrap();
        assert_eq!(ts_literal(&value), "{ a: [1, \"x\"], \"b-c\": null }");
        assert_eq!(ts_literal(&Value::Bool(false)), "false");
    }
}
