use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::capability::Category;

/// How punishing the generated game should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// How quickly the generated game should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    Slow,
    #[default]
    Medium,
    Fast,
}

/// Include/exclude constraints extracted from the prompt. Terms are
/// normalized (lower-cased, articles stripped) and stored in both
/// singular and plural form so later substring matching tolerates
/// either.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub include: FxHashSet<String>,
    #[serde(default)]
    pub exclude: FxHashSet<String>,
}

impl Constraints {
    /// Bidirectional substring test against the exclusion set: "tree"
    /// excludes "trees", "pine_tree", and vice versa.
    pub fn excludes_term(&self, term: &str) -> bool {
        if term.is_empty() {
            return false;
        }
        let term = term.to_lowercase();
        self.exclude
            .iter()
            .any(|ex| !ex.is_empty() && (term.contains(ex.as_str()) || ex.contains(term.as_str())))
    }
}

/// Semantic parameters extracted from a prompt. Created once per
/// compile request and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub template_id: String,
    pub category: Category,
    /// Theme tags, deduplicated, at most five, in vocabulary order.
    pub theme_tags: Vec<String>,
    /// Requested entity counts, keyed by normalized noun.
    pub counts: FxHashMap<String, u32>,
    pub difficulty: Difficulty,
    pub pace: Pace,
    pub constraints: Constraints,
}
