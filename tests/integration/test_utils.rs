//! Shared test utilities for integration tests
//!
//! Scripted backends, identity and page fixtures, and environment isolation
//! for tests that touch configuration lookup.

use async_trait::async_trait;
use pagecraft::error::ApiError;
use pagecraft::generation::{GenerationSettings, PageOrchestrator};
use pagecraft::identity::{BrandIdentity, BrandValues, BrandVoice};
use pagecraft::prompt::PromptSet;
use pagecraft::provider::GenerativeBackend;
use pagecraft::schema::OutputSchema;
use pagecraft::segment::{FileSegmentStorage, SegmentCache};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// One recorded backend call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub schema: String,
}

/// Backend that answers from a fixed script, in order, and records every call.
/// An exhausted script answers with a structure error.
pub struct ScriptedBackend {
    replies: parking_lot::Mutex<VecDeque<Result<Value, ApiError>>>,
    calls: parking_lot::Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<Value, ApiError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: parking_lot::Mutex::new(replies.into()),
            calls: parking_lot::Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn prompt(&self, index: usize) -> String {
        self.calls.lock()[index].prompt.clone()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn invoke(&self, prompt: &str, schema: &OutputSchema) -> Result<Value, ApiError> {
        self.calls.lock().push(RecordedCall {
            prompt: prompt.to_string(),
            schema: schema.name.clone(),
        });
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::BackendStructure("script exhausted".to_string())))
    }
}

/// Backend that answers every section request with `{"title": "Fresh <kind>"}`
/// after a short delay, so concurrent callers interleave.
pub struct SlowSectionBackend {
    pub delay: Duration,
}

#[async_trait]
impl GenerativeBackend for SlowSectionBackend {
    async fn invoke(&self, _prompt: &str, schema: &OutputSchema) -> Result<Value, ApiError> {
        tokio::time::sleep(self.delay).await;
        Ok(json!({ "title": format!("Fresh {}", schema.name) }))
    }
}

pub fn structure_error() -> Result<Value, ApiError> {
    Err(ApiError::BackendStructure("empty reply".to_string()))
}

pub fn identity() -> BrandIdentity {
    BrandIdentity {
        name: "Tidewater Kayaks".to_string(),
        tagline: "Paddle further".to_string(),
        unique_value: "Small-group sea kayak trips with certified guides".to_string(),
        voice: BrandVoice {
            formality: "conversational".to_string(),
            personality: vec!["adventurous".to_string(), "warm".to_string()],
            emotion: "excitement".to_string(),
        },
        values: BrandValues {
            core_values: vec!["safety".to_string(), "stewardship".to_string()],
            target_audience: "weekend adventurers".to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn other_identity() -> BrandIdentity {
    BrandIdentity {
        name: "Copperline Bakery".to_string(),
        tagline: "Bread worth waking up for".to_string(),
        ..Default::default()
    }
}

/// A draft that satisfies every section schema it includes.
pub fn draft_page() -> Value {
    json!({
        "title": "Tidewater Kayaks",
        "description": "Guided sea kayak trips along the coast",
        "name": "Tidewater",
        "tagline": "Paddle further",
        "section_order": ["hero", "services", "faq"],
        "hero": {"title": "Explore the coast", "subtitle": "Trips for every level"},
        "services": {
            "title": "Trips",
            "items": [{"name": "Sunset paddle"}, {"name": "Island crossing"}]
        },
        "faq": {
            "title": "Questions",
            "items": [{"question": "Is there an age limit?", "answer": "Paddlers must be 12 or older."}]
        }
    })
}

pub fn score(section: &str, quality: f64, confidence: f64) -> Value {
    json!({
        "section": section,
        "quality_score": quality,
        "confidence_score": confidence,
        "rationale": format!("{} reviewed", section),
        "recommendations": [format!("Sharpen the {} copy", section)]
    })
}

pub fn orchestrator(backend: Arc<dyn GenerativeBackend>, settings: GenerationSettings) -> PageOrchestrator {
    PageOrchestrator::new(backend, Arc::new(PromptSet::default()), settings)
}

pub fn segment_cache(dir: &TempDir) -> Arc<SegmentCache> {
    Arc::new(SegmentCache::new(Arc::new(
        FileSegmentStorage::new(dir.path().join("segments")).unwrap(),
    )))
}

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Run `f` with HOME and XDG_CONFIG_HOME pointed into `test_dir` and every
/// `PAGECRAFT_*` variable cleared, restoring the environment afterwards.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    let names: Vec<String> = std::env::vars()
        .map(|(name, _)| name)
        .filter(|name| name.starts_with("PAGECRAFT"))
        .chain(["HOME".to_string(), "XDG_CONFIG_HOME".to_string()])
        .collect();
    let saved: Vec<(String, Option<String>)> = names
        .into_iter()
        .map(|name| {
            let value = std::env::var(&name).ok();
            (name, value)
        })
        .collect();

    for (name, _) in &saved {
        std::env::remove_var(name);
    }
    let home = test_dir.path().join("home");
    let config_home = test_dir.path().join("xdg");
    std::fs::create_dir_all(&home).unwrap();
    std::fs::create_dir_all(&config_home).unwrap();
    std::env::set_var("HOME", &home);
    std::env::set_var("XDG_CONFIG_HOME", &config_home);

    let result = f();

    let leaked: Vec<String> = std::env::vars()
        .map(|(name, _)| name)
        .filter(|name| name.starts_with("PAGECRAFT"))
        .collect();
    for name in leaked {
        std::env::remove_var(name);
    }
    for (name, value) in saved {
        match value {
            Some(value) => std::env::set_var(&name, value),
            None => std::env::remove_var(&name),
        }
    }
    result
}
