use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::capability::RuleType;

/// A win/lose/score rule. `params` is a free-form map interpreted per
/// rule type by the runtime's rule evaluator; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default)]
    pub params: serde_json::Map<String, Value>,
}

impl Rule {
    pub fn new(rule_type: RuleType) -> Self {
        Self {
            rule_type,
            params: serde_json::Map::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: Value) -> Self {
        self.params.insert(key.to_string(), value);
        self
    }

    /// Numeric parameter lookup. Accepts any JSON number.
    pub fn param_f32(&self, key: &str) -> Option<f32> {
        self.params.get(key).and_then(Value::as_f64).map(|v| v as f32)
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

/// Well-known parameter keys, shared by templates and the rule
/// evaluator so the two sides cannot drift apart.
pub mod params {
    /// Points awarded per pickup (`score`).
    pub const POINTS: &str = "points";
    /// Score needed to win (`win_on_score`).
    pub const TARGET: &str = "target";
    /// Tag the colliding entity must carry (`win_on_goal`).
    pub const TARGET_TAG: &str = "target_tag";
    /// Maximum player speed at which a goal contact counts
    /// (`win_on_goal`); distinguishes rolling past the cup from
    /// settling into it.
    pub const MAX_SPEED: &str = "max_speed";
    /// Starting life count (`lives` / `lose_on_lives`).
    pub const LIVES: &str = "lives";
    /// Countdown length in seconds (`timer` / `lose_on_timer`).
    pub const SECONDS: &str = "seconds";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn param_lookup() {
        let rule = Rule::new(RuleType::WinOnGoal)
            .with_param(params::TARGET_TAG, json!("goal"))
            .with_param(params::MAX_SPEED, json!(40));
        assert_eq!(rule.param_str(params::TARGET_TAG), Some("goal"));
        assert_eq!(rule.param_f32(params::MAX_SPEED), Some(40.0));
        assert_eq!(rule.param_f32("missing"), None);
    }

    #[test]
    fn unknown_rule_type_survives_parse() {
        let rule: Rule =
            serde_json::from_str(r#"{"type": "win_on_vibes", "params": {}}"#).unwrap();
        assert_eq!(rule.rule_type, RuleType::Unknown);
    }

    #[test]
    fn wire_format_uses_type_key() {
        let rule = Rule::new(RuleType::LoseOnTimer).with_param(params::SECONDS, json!(30));
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["type"], "lose_on_timer");
        assert_eq!(json["params"]["seconds"], 30);
    }
}
