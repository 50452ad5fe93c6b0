//! Remote-assisted intent classification (crate feature `remote`).
//!
//! The remote service is an accelerator, never an authority: its
//! response is untrusted text, parsed defensively, and discarded
//! wholesale on any failure — non-success status, timeout, malformed
//! JSON, or a template id the registry does not know. Partial trust of
//! remote output is disallowed for routing-critical fields.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::core::intent::{pluralize, singularize};
use crate::schema::capability::Category;
use crate::schema::intent::{Constraints, Difficulty, Intent, Pace};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);
const MAX_THEME_TAGS: usize = 5;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("non-success status: {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("template id '{0}' not in registry")]
    UnknownTemplate(String),
}

/// The JSON shape requested from the classification endpoint. Every
/// field defaults, so a sparse or sloppy response still parses; the
/// one field that must be present and valid is `template_id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteIntent {
    pub template_id: String,
    pub theme_tags: Vec<String>,
    pub counts: FxHashMap<String, u32>,
    pub difficulty: Option<Difficulty>,
    pub pace: Option<Pace>,
    pub exclude: Vec<String>,
}

impl RemoteIntent {
    /// Convert into a full `Intent`. The category is taken from the
    /// routed template, not from the remote response: template_id is
    /// the routing-authoritative field and category must stay
    /// consistent with it.
    pub fn into_intent(self, template_category: Category) -> Intent {
        let mut exclude = FxHashSet::default();
        for term in &self.exclude {
            let term = term.trim().to_lowercase();
            if term.is_empty() {
                continue;
            }
            exclude.insert(pluralize(&term));
            exclude.insert(singularize(&term));
            exclude.insert(term);
        }
        let mut theme_tags = self.theme_tags;
        theme_tags.dedup();
        theme_tags.truncate(MAX_THEME_TAGS);

        let include = self
            .counts
            .keys()
            .filter(|k| !exclude.contains(*k))
            .cloned()
            .collect();

        Intent {
            template_id: self.template_id,
            category: template_category,
            theme_tags,
            counts: self.counts,
            difficulty: self.difficulty.unwrap_or_default(),
            pace: self.pace.unwrap_or_default(),
            constraints: Constraints { include, exclude },
        }
    }
}

/// Client for the classification endpoint, bounded by a hard timeout.
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    endpoint: String,
    api_key: Option<String>,
    model: Option<String>,
    timeout: Duration,
}

impl RemoteClassifier {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: None,
            model: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ask the endpoint to classify a prompt against the registry's
    /// template vocabulary. Any error means the caller should use the
    /// deterministic extractor instead.
    pub fn classify(&self, prompt: &str, template_ids: &[&str]) -> Result<RemoteIntent, RemoteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let body = json!({
            "prompt": prompt,
            "template_ids": template_ids,
            "response_schema": "intent_v1",
            "model": self.model,
        });

        let mut request = client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }

        let text = response.text()?;
        let parsed: RemoteIntent = serde_json::from_str(&text)?;
        if !template_ids.contains(&parsed.template_id.as_str()) {
            return Err(RemoteError::UnknownTemplate(parsed.template_id));
        }
        Ok(parsed)
    }
}
