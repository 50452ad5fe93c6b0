//! The compile pipeline: prompt → Intent → base build → modifiers →
//! repair → normalize → validate.
//!
//! The public entry point never fails and never returns a description
//! that fails `validate`. Every error mode inside the pipeline
//! degrades to a deterministic, fully playable fallback.

use crate::core::intent::extract_intent;
use crate::core::normalize::normalize;
use crate::core::repair::repair;
use crate::core::seed::seed_from_prompt;
use crate::core::templates::TemplateRegistry;
use crate::core::validate::validate;
use crate::schema::capability::Category;
use crate::schema::description::Description;
use crate::schema::intent::Intent;

/// Options for one compile invocation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Explicit seed. When absent, the seed is hashed from the prompt,
    /// so identical prompts reproduce identical games.
    pub seed: Option<u32>,
    /// Prefer a template of this category when the prompt itself is
    /// uninformative (deterministic extraction fell through to the
    /// default template).
    pub category_hint: Option<Category>,
    /// Ask the remote classifier first (requires the `remote` feature
    /// and an endpoint; silently ignored otherwise).
    pub use_ai: bool,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

/// The result of a compile: a validated description plus the intent
/// that produced it and a label for diagnostics.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub description: Description,
    pub intent: Intent,
    pub debug_label: String,
}

/// Compiler holding the immutable template registry. Compile calls
/// share no mutable state; each is a pure function of its inputs.
#[derive(Debug)]
pub struct Compiler {
    registry: TemplateRegistry,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            registry: TemplateRegistry::standard(),
        }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Compile a prompt into a playable description. Never fails; the
    /// output always passes `validate`.
    pub fn compile(&self, prompt: &str, options: &CompileOptions) -> CompileOutput {
        let seed = options.seed.unwrap_or_else(|| seed_from_prompt(prompt));
        let (intent, used_remote) = self.resolve_intent(prompt, options);

        let template = self.registry.get(&intent.template_id);
        let base = (template.build_base)(seed);
        let candidate = (template.apply_modifiers)(&base, &intent, seed);
        let repaired = repair(&candidate, &intent, template, seed);
        let normalized = normalize(&repaired);

        let description = if validate(&normalized).ok {
            normalized
        } else {
            // Last resort: the template's own base, normalized,
            // which is valid by construction.
            log::warn!(
                "compile: normalized candidate failed validation, using '{}' base",
                template.id
            );
            normalize(&base)
        };

        let debug_label = format!(
            "{}@{:08x}{}",
            template.id,
            seed,
            if used_remote { "+remote" } else { "" }
        );
        log::debug!("compile: {}", debug_label);

        CompileOutput {
            description,
            intent,
            debug_label,
        }
    }

    /// Remote classification when requested and available, otherwise
    /// the deterministic extractor; a category hint can redirect an
    /// uninformative prompt away from the default template.
    fn resolve_intent(&self, prompt: &str, options: &CompileOptions) -> (Intent, bool) {
        #[cfg(feature = "remote")]
        if options.use_ai {
            if let Some(endpoint) = &options.endpoint {
                match self.classify_remote(prompt, endpoint, options) {
                    Ok(intent) => return (intent, true),
                    Err(err) => {
                        log::warn!("remote classification failed, using local path: {}", err);
                    }
                }
            }
        }
        #[cfg(not(feature = "remote"))]
        if options.use_ai {
            log::debug!("remote feature disabled; using deterministic extractor");
        }

        let mut intent = extract_intent(prompt);
        if intent.template_id == "arcade" {
            if let Some(hint) = options.category_hint {
                if let Some(id) = self.template_for_category(hint) {
                    intent.template_id = id.to_string();
                    intent.category = hint;
                }
            }
        }
        (intent, false)
    }

    fn template_for_category(&self, category: Category) -> Option<&'static str> {
        self.registry
            .ids()
            .into_iter()
            .find(|id| self.registry.get(id).category == category)
    }

    #[cfg(feature = "remote")]
    fn classify_remote(
        &self,
        prompt: &str,
        endpoint: &str,
        options: &CompileOptions,
    ) -> Result<Intent, crate::core::remote::RemoteError> {
        use crate::core::remote::RemoteClassifier;

        let mut classifier = RemoteClassifier::new(endpoint);
        if let Some(key) = &options.api_key {
            classifier = classifier.with_api_key(key);
        }
        if let Some(model) = &options.model {
            classifier = classifier.with_model(model);
        }
        let ids = self.registry.ids();
        let remote = classifier.classify(prompt, &ids)?;
        let category = self.registry.get(&remote.template_id).category;
        Ok(remote.into_intent(category))
    }
}

/// One-shot compile against the standard registry.
pub fn compile(prompt: &str, options: &CompileOptions) -> CompileOutput {
    Compiler::new().compile(prompt, options)
}
