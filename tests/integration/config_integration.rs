//! Integration tests for configuration loading and the command route

use crate::integration::test_utils::{
    draft_page, identity, score, structure_error, with_isolated_env, ScriptedBackend,
};
use pagecraft::api::PageApi;
use pagecraft::cli::{Commands, IdentityCommands, OutputFormat, RunContext, SegmentCommands};
use pagecraft::config::{ConfigLoader, PagecraftConfig};
use pagecraft::error::ApiError;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn write_config(workspace: &Path, body: &str) -> PathBuf {
    let path = workspace.join("pagecraft.toml");
    fs::write(&path, body).unwrap();
    path
}

fn write_identity(workspace: &Path) -> PathBuf {
    let path = workspace.join("identity.json");
    fs::write(&path, serde_json::to_string_pretty(&identity()).unwrap()).unwrap();
    path
}

fn generate(page: &str, identity: Option<PathBuf>) -> Commands {
    Commands::Generate {
        page: page.to_string(),
        identity,
        title: None,
        description: None,
        name: None,
        tagline: None,
        sections: Vec::new(),
    }
}

fn json_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn test_config_file_drives_storage_and_prompts() {
    let workspace = TempDir::new().unwrap();
    fs::create_dir_all(workspace.path().join("prompts")).unwrap();
    fs::write(
        workspace.path().join("prompts/generation.txt"),
        "CUSTOM DRAFT for {brand_guidelines}",
    )
    .unwrap();
    let config_path = write_config(
        workspace.path(),
        r#"
[generation]
max_retries = 1
reuse_segments = true

[storage]
data_dir = "state"

[prompts]
template_dir = "prompts"
"#,
    );

    let config = ConfigLoader::load_from_file(&config_path).unwrap();
    assert_eq!(config.generation.max_retries, 1);
    assert!(config.generation.simplify_on_retry);

    let backend = ScriptedBackend::new(vec![Ok(draft_page()), structure_error()]);
    let api = PageApi::from_config(&config, workspace.path(), backend.clone()).unwrap();
    api.generate("landing", Some(identity()), None).await.unwrap();

    assert!(workspace.path().join("state/pages/landing/page.json").is_file());
    assert!(workspace.path().join("state/pages/landing/identity.json").is_file());
    assert!(workspace.path().join("state/segments/identity.json").is_file());
    assert!(backend
        .prompt(0)
        .starts_with("CUSTOM DRAFT for Brand: Tidewater Kayaks"));
    assert_eq!(api.orchestrator().settings().max_retries, 1);
}

#[test]
fn test_missing_template_directory_is_a_config_error() {
    let workspace = TempDir::new().unwrap();
    let config = PagecraftConfig {
        prompts: pagecraft::config::PromptsConfig {
            template_dir: Some(PathBuf::from("no-such-dir")),
        },
        ..Default::default()
    };
    let backend = ScriptedBackend::new(Vec::new());

    assert!(matches!(
        PageApi::from_config(&config, workspace.path(), backend),
        Err(ApiError::ConfigError(_))
    ));
}

#[test]
fn test_workspace_config_and_environment_layers() {
    let sandbox = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    fs::create_dir_all(workspace.path().join("config")).unwrap();
    fs::write(
        workspace.path().join("config/config.toml"),
        "[generation]\nmax_retries = 5\n\n[storage]\ndata_dir = \"from-file\"\n",
    )
    .unwrap();

    let config = with_isolated_env(&sandbox, || {
        std::env::set_var("PAGECRAFT__STORAGE__DATA_DIR", "from-env");
        ConfigLoader::load(workspace.path())
    })
    .unwrap();

    assert_eq!(config.generation.max_retries, 5);
    assert_eq!(config.storage.data_dir, PathBuf::from("from-env"));
    assert!(config.providers.is_empty());
}

#[test]
fn test_command_route_end_to_end() {
    let workspace = TempDir::new().unwrap();
    let identity_path = write_identity(workspace.path());
    let config = ConfigLoader::load_from_file(&write_config(
        workspace.path(),
        "[generation]\nmax_retries = 2\n",
    ))
    .unwrap();
    let backend = ScriptedBackend::new(vec![
        Ok(draft_page()),
        structure_error(),
        Ok(json!({
            "sections": [
                score("hero", 0.9, 0.9),
                score("services", 0.9, 0.9),
                score("faq", 0.2, 0.3)
            ]
        })),
        Ok(json!({
            "title": "Before you book",
            "items": [{"question": "What should I wear?", "answer": "Quick-dry layers."}]
        })),
    ]);
    let context =
        RunContext::with_backend(workspace.path().to_path_buf(), config, backend, None).unwrap();

    let generated = context
        .execute(&generate("landing", Some(identity_path)), OutputFormat::Json)
        .unwrap();
    assert!(generated.success);
    let body = json_body(&generated.body);
    assert_eq!(body["data"]["page"]["title"], "Tidewater Kayaks");
    assert_eq!(body["data"]["page_id"], "landing");

    let viewed = context
        .execute(
            &Commands::View {
                page: "landing".to_string(),
            },
            OutputFormat::Text,
        )
        .unwrap();
    assert!(viewed.body.contains("Explore the coast"));

    let assessed = context
        .execute(
            &Commands::Assess {
                page: "landing".to_string(),
                apply: true,
                min_combined: None,
                min_quality: None,
                min_confidence: None,
            },
            OutputFormat::Json,
        )
        .unwrap();
    assert!(assessed.success);
    let body = json_body(&assessed.body);
    assert_eq!(body["data"]["outcome"]["failing"], json!(["faq"]));
    assert_eq!(
        body["data"]["outcome"]["regeneration"]["succeeded"],
        json!(["faq"])
    );
    assert_eq!(
        context.api().view("landing").unwrap().faq.unwrap().title,
        "Before you book"
    );

    let shown = context
        .execute(
            &Commands::Identity {
                command: IdentityCommands::Show {
                    page: "landing".to_string(),
                },
            },
            OutputFormat::Json,
        )
        .unwrap();
    assert_eq!(
        json_body(&shown.body)["data"]["identity"]["name"],
        "Tidewater Kayaks"
    );

    let segments = context
        .execute(
            &Commands::Segments {
                command: SegmentCommands::List,
            },
            OutputFormat::Json,
        )
        .unwrap();
    let body = json_body(&segments.body);
    assert!(body["data"]["segments"]["conversion"].is_object());

    context
        .execute(
            &Commands::Segments {
                command: SegmentCommands::Clear {
                    kind: Some("conversion".to_string()),
                },
            },
            OutputFormat::Text,
        )
        .unwrap();
    assert!(!context
        .api()
        .segments()
        .contains_key(&pagecraft::segment::SegmentKind::Conversion));

    let listed = context.execute(&Commands::List, OutputFormat::Text).unwrap();
    assert!(listed.body.contains("landing"));
}

#[test]
fn test_fallback_left_on_page_reports_failure() {
    let workspace = TempDir::new().unwrap();
    let config = ConfigLoader::load_from_file(&write_config(
        workspace.path(),
        "[generation]\nmax_retries = 1\n",
    ))
    .unwrap();
    let backend = ScriptedBackend::new(vec![
        Ok(json!({"section_order": ["hero", "services"], "hero": {"title": "Explore"}})),
        structure_error(),
        structure_error(),
    ]);
    let context =
        RunContext::with_backend(workspace.path().to_path_buf(), config, backend, None).unwrap();

    context
        .execute(
            &generate("landing", Some(write_identity(workspace.path()))),
            OutputFormat::Text,
        )
        .unwrap();
    let output = context
        .execute(
            &Commands::RegenerateFailed {
                page: "landing".to_string(),
            },
            OutputFormat::Text,
        )
        .unwrap();

    assert!(!output.success);
    assert!(output.body.contains("fallback content used for: services"));
}

#[test]
fn test_route_without_provider_refuses_generation_but_serves_reads() {
    let workspace = TempDir::new().unwrap();
    let config_path = write_config(workspace.path(), "[generation]\nmax_retries = 2\n");
    let context = RunContext::new(workspace.path().to_path_buf(), Some(config_path)).unwrap();

    assert!(matches!(
        context.execute(&generate("landing", None), OutputFormat::Text),
        Err(ApiError::ProviderNotConfigured(_))
    ));
    assert!(matches!(
        context.execute(
            &Commands::View {
                page: "landing".to_string()
            },
            OutputFormat::Text
        ),
        Err(ApiError::PageNotFound(_))
    ));
    let listed = context.execute(&Commands::List, OutputFormat::Text).unwrap();
    assert!(listed.body.starts_with("No pages found."));
}

#[test]
fn test_route_rejects_bad_arguments_before_calling_the_backend() {
    let workspace = TempDir::new().unwrap();
    let backend = ScriptedBackend::new(Vec::new());
    let context = RunContext::with_backend(
        workspace.path().to_path_buf(),
        PagecraftConfig::default(),
        backend.clone(),
        None,
    )
    .unwrap();

    assert!(matches!(
        context.execute(
            &Commands::Assess {
                page: "landing".to_string(),
                apply: false,
                min_combined: Some(1.5),
                min_quality: None,
                min_confidence: None,
            },
            OutputFormat::Text
        ),
        Err(ApiError::ConfigError(_))
    ));
    assert!(matches!(
        context.execute(
            &Commands::Regenerate {
                page: "landing".to_string(),
                sections: vec!["footer".to_string()],
            },
            OutputFormat::Text
        ),
        Err(ApiError::UnknownSectionKind(_))
    ));
    assert!(matches!(
        context.execute(
            &Commands::Identity {
                command: IdentityCommands::Show {
                    page: "landing".to_string()
                }
            },
            OutputFormat::Text
        ),
        Err(ApiError::IdentityNotFound(_))
    ));
    assert!(matches!(
        context.execute(&generate("landing", None), OutputFormat::Text),
        Err(ApiError::IdentityNotFound(_))
    ));
    assert_eq!(backend.call_count(), 0);
}
