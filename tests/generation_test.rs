use openapi_scaffold::{
    config::{BindingPolicy, GeneratorConfig, PrefixTieBreak, ReferencePolicy, Target},
    error::Error,
    loader::SchemaLoader,
    pipeline::{Generator, Stage, StageOutcome},
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Configuration writing into `out_dir` without running formatters
fn test_config(out_dir: &Path) -> GeneratorConfig {
    GeneratorConfig {
        out_dir: out_dir.to_path_buf(),
        format: false,
        ..GeneratorConfig::default()
    }
}

/// Generate from the main fixture and return the four generated files
fn generate_all(out_dir: &Path) -> (String, String, String, String) {
    let generator = Generator::new(test_config(out_dir)).expect("Failed to create generator");
    generator
        .run(&[fixture("openapi.yaml")])
        .expect("Generation failed");

    let read = |path: &str| {
        fs::read_to_string(out_dir.join(path)).unwrap_or_else(|e| panic!("{path}: {e}"))
    };
    (
        read("app/generated/generated_models.py"),
        read("app/generated/generated_router.py"),
        read("generated/api-types.ts"),
        read("generated/api-client.ts"),
    )
}

#[test]
fn test_end_to_end_generation_writes_all_files() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Generator::new(test_config(temp_dir.path())).unwrap();
    let report = generator.run(&[fixture("openapi.yaml")]).unwrap();

    assert_eq!(report.written.len(), 4);
    for path in &report.written {
        assert!(path.is_file(), "{} should exist", path.display());
    }
    assert!(matches!(report.outcome(Stage::Load), Some(StageOutcome::Done(_))));
    assert!(matches!(report.outcome(Stage::Commit), Some(StageOutcome::Done(_))));
    assert_eq!(
        report.outcome(Stage::Format(Target::TypeScript)),
        Some(&StageOutcome::Skipped("formatting disabled".to_string()))
    );
}

#[test]
fn test_generation_is_deterministic() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    assert_eq!(generate_all(first.path()), generate_all(second.path()));

    // a rerun over existing output is byte-identical as well
    let before = generate_all(first.path());
    assert_eq!(before, generate_all(first.path()));
}

#[test]
fn test_required_fields_are_never_optional() {
    let temp_dir = TempDir::new().unwrap();
    let (models, _, types, _) = generate_all(temp_dir.path());

    assert!(models.contains(
        "    prompt: str = Field(..., description=\"Text prompt for generation\", min_length=1, max_length=1000)\n"
    ));
    assert!(models.contains("    timestamp: datetime\n"));
    assert!(types.contains("  prompt: string;\n"));
    assert!(types.contains("  timestamp: DateTimeString;\n"));
}

#[test]
fn test_optional_and_defaulted_fields() {
    let temp_dir = TempDir::new().unwrap();
    let (models, _, types, _) = generate_all(temp_dir.path());

    assert!(models.contains(
        "    max_length: int = Field(default=50, description=\"Maximum length of generated text\", ge=1, le=500)\n"
    ));
    assert!(models.contains("    temperature: Optional[float] = None\n"));
    assert!(models.contains("    country_code: Optional[str] = Field(default=None, min_length=2, max_length=2)\n"));
    assert!(models.contains("    metadata: Optional[dict[str, Any]] = None\n"));

    assert!(types.contains("  temperature?: number | null;\n"));
    assert!(types.contains(
        "export const GenerateTextRequestDefaults: Partial<GenerateTextRequest> = {\n  max_length: 50,\n};\n"
    ));
}

#[test]
fn test_nested_arrays_and_references() {
    let temp_dir = TempDir::new().unwrap();
    let (models, _, types, _) = generate_all(temp_dir.path());

    assert!(models.contains("    alternatives: Optional[list[list[str]]] = None\n"));
    assert!(models.contains("    widget: Optional[Widget] = None\n"));
    assert!(types.contains("  alternatives?: string[][];\n"));
    assert!(types.contains("  widget?: Widget;\n"));
    assert!(types.contains("export interface Widget {\n  name?: string;\n}\n"));
}

#[test]
fn test_health_router_prefix_and_relative_paths() {
    let temp_dir = TempDir::new().unwrap();
    let (_, router, _, _) = generate_all(temp_dir.path());

    assert!(router.contains("health_router = APIRouter(prefix=\"/health\", tags=[\"health\"])\n"));
    assert!(router.contains("@health_router.get(\"/\", summary=\"Health check\")\n"));
    assert!(router.contains("@health_router.get(\"/detailed\", summary=\"Detailed health check\")\n"));
    assert!(router.contains("async def detailed_health_check() -> dict[str, Any]:\n"));
}

#[test]
fn test_path_parameters_are_ordered_strings() {
    let temp_dir = TempDir::new().unwrap();
    let (_, router, _, client) = generate_all(temp_dir.path());

    assert!(router.contains(
        "@text_router.get(\"/history/{session_id}/{index}\")\n\
         async def get_api_v1_text_history_session_id_index(session_id: str, index: str) -> GenerateTextResponse:\n"
    ));
    assert!(client.contains(
        "  getApiV1TextHistorySessionIdIndex: (session_id: string, index: string): Promise<GenerateTextResponse> =>\n"
    ));
    assert!(client.contains(
        "buildPath(API_ENDPOINTS.GET_API_V1_TEXT_HISTORY_SESSION_ID_INDEX, { session_id, index }), \"GET\")"
    ));
}

#[test]
fn test_unbound_operation_gets_not_implemented_stub() {
    let temp_dir = TempDir::new().unwrap();
    let (_, router, _, _) = generate_all(temp_dir.path());

    assert!(router.contains(
        "@external_router.get(\"/fact\")\n\
         async def foo_bar() -> dict[str, Any]:\n\
         \x20   raise HTTPException(status_code=501, detail=\"Not implemented\")\n"
    ));
}

#[test]
fn test_bound_operations_delegate_to_services() {
    let temp_dir = TempDir::new().unwrap();
    let (_, router, _, _) = generate_all(temp_dir.path());

    assert!(router.contains("from app.services.external.get_weather_impl import get_weather_impl\n"));
    assert!(router.contains(
        "from app.services.external.get_random_quote_impl import get_random_quote_impl\n"
    ));
    assert!(router.contains("        return await get_weather_impl(request)\n"));
    assert!(router.contains("        return await get_random_quote_impl()\n"));
    assert!(router.contains("        raise HTTPException(status_code=500, detail=str(exc)) from exc\n"));
}

#[test]
fn test_legacy_routes_stay_out_of_aggregate_router() {
    let temp_dir = TempDir::new().unwrap();
    let (_, router, _, client) = generate_all(temp_dir.path());

    assert!(router.contains("legacy_router = APIRouter(tags=[\"text\"])\n"));
    assert!(router.contains("@legacy_router.post(\"/generate\", summary=\"Generate text (legacy)\")\n"));
    assert!(router.contains("api_router = APIRouter(prefix=\"/api/v1\")\n"));
    let includes: Vec<&str> = router
        .lines()
        .filter(|l| l.starts_with("api_router.include_router("))
        .collect();
    assert_eq!(
        includes,
        vec![
            "api_router.include_router(health_router)",
            "api_router.include_router(text_router)",
            "api_router.include_router(external_router)",
        ]
    );
    assert!(client.contains("  GENERATE_TEXT_LEGACY: \"/generate\",\n"));
}

#[test]
fn test_client_helpers_match_handlers() {
    let temp_dir = TempDir::new().unwrap();
    let (_, router, _, client) = generate_all(temp_dir.path());

    let handlers: Vec<String> = router
        .lines()
        .filter_map(|l| l.strip_prefix("async def "))
        .map(|l| l.split('(').next().unwrap().to_string())
        .collect();
    assert_eq!(handlers.len(), 8);

    for handler in &handlers {
        let constant = handler.to_uppercase();
        assert!(
            client.contains(&format!("  {constant}: \"")),
            "missing endpoint constant for {handler}"
        );
    }
    assert!(client.contains("  getRandomQuote: (): Promise<QuoteResponse> =>\n"));
    assert!(client.contains("  getWeather: (request: WeatherRequest): Promise<WeatherResponse> =>\n"));
}

#[test]
fn test_merged_documents_add_routes() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Generator::new(test_config(temp_dir.path())).unwrap();
    let doc = generator
        .load(&[fixture("openapi.yaml"), fixture("admin.yaml")])
        .unwrap();
    let stage = generator.render(&doc).unwrap();

    let router = &stage
        .get(Path::new("app/generated/generated_router.py"))
        .unwrap()
        .contents;
    let client = &stage
        .get(Path::new("generated/api-client.ts"))
        .unwrap()
        .contents;
    assert!(router.contains("admin_router = APIRouter(prefix=\"/admin\", tags=[\"admin\"])\n"));
    assert!(router.contains("async def list_users() -> list[AdminUser]:\n"));
    assert!(client.contains("  listUsers: (): Promise<AdminUser[]> =>\n"));
}

#[test]
fn test_merged_duplicate_component_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Generator::new(test_config(temp_dir.path())).unwrap();
    let doc = generator
        .load(&[fixture("openapi.yaml"), fixture("duplicate_widget.yaml")])
        .unwrap();

    match generator.generate(&doc) {
        Err(Error::NameCollision { name, .. }) => assert_eq!(name, "Widget"),
        other => panic!("expected a name collision, got {other:?}"),
    }
    assert!(fs::read_dir(temp_dir.path()).unwrap().next().is_none());
}

#[test]
fn test_strict_bindings_list_every_unbound_operation() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig {
        binding_policy: BindingPolicy::Strict,
        ..test_config(temp_dir.path())
    };
    let generator = Generator::new(config).unwrap();

    match generator.run(&[fixture("openapi.yaml")]) {
        Err(Error::UnboundOperations(ids)) => assert_eq!(
            ids,
            vec![
                "health_check",
                "detailed_health_check",
                "generate_text",
                "get_api_v1_text_history_session_id_index",
                "foo_bar",
                "generate_text_legacy",
            ]
        ),
        other => panic!("expected unbound operations, got {other:?}"),
    }
}

#[test]
fn test_rejected_prefix_conflict() {
    let text = r#"
paths:
  /api/v1/health/live:
    get:
      tags: [health]
  /api/v1/status/ready:
    get:
      tags: [health]
components: {}
"#;
    let doc = SchemaLoader::default().load_str(text).unwrap();
    let temp_dir = TempDir::new().unwrap();

    let lenient = Generator::new(test_config(temp_dir.path())).unwrap();
    assert!(lenient.render(&doc).is_ok());

    let config = GeneratorConfig {
        prefix_tie_break: PrefixTieBreak::Reject,
        ..test_config(temp_dir.path())
    };
    let strict = Generator::new(config).unwrap();
    assert!(matches!(strict.render(&doc), Err(Error::PrefixConflict { .. })));
}

#[test]
fn test_reference_policies() {
    let text = r#"
paths: {}
components:
  schemas:
    Order:
      type: object
      properties:
        item:
          $ref: '#/components/schemas/Missing'
"#;
    match SchemaLoader::new(ReferencePolicy::Strict).load_str(text) {
        Err(Error::UnresolvedReference { reference, .. }) => assert_eq!(reference, "Missing"),
        other => panic!("expected an unresolved reference, got {other:?}"),
    }

    let doc = SchemaLoader::new(ReferencePolicy::Lenient).load_str(text).unwrap();
    let temp_dir = TempDir::new().unwrap();
    let stage = Generator::new(test_config(temp_dir.path()))
        .unwrap()
        .render(&doc)
        .unwrap();
    let models = &stage
        .get(Path::new("app/generated/generated_models.py"))
        .unwrap()
        .contents;
    assert!(models.contains("    item: Optional[Any] = None\n"));
}

#[test]
fn test_failed_commit_leaves_no_partial_output() {
    let temp_dir = TempDir::new().unwrap();
    // the client destination is a non-empty directory, so its rename fails
    fs::create_dir_all(temp_dir.path().join("generated/api-client.ts/blocker")).unwrap();

    let generator = Generator::new(test_config(temp_dir.path())).unwrap();
    match generator.run(&[fixture("openapi.yaml")]) {
        Err(Error::Commit { path, .. }) => {
            assert_eq!(path, temp_dir.path().join("generated/api-client.ts"))
        }
        other => panic!("expected a commit error, got {other:?}"),
    }

    assert!(!temp_dir.path().join("app/generated/generated_models.py").exists());
    assert!(!temp_dir.path().join("app/generated/generated_router.py").exists());
    assert!(!temp_dir.path().join("generated/api-types.ts").exists());
}

#[test]
fn test_single_target_generation() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig {
        targets: vec![Target::TypeScript],
        ..test_config(temp_dir.path())
    };
    let report = Generator::new(config)
        .unwrap()
        .run(&[fixture("openapi.yaml")])
        .unwrap();

    assert_eq!(report.written.len(), 2);
    assert!(!temp_dir.path().join("app").exists());
}
