//! Rule interpretation: fold the description's rule list into a
//! compact `RuleSet` the frame loop can query, and classify what a
//! contact between the player (or a projectile) and another entity
//! means under those rules.

use crate::schema::bounds;
use crate::schema::capability::{EntityKind, RuleType};
use crate::schema::entity::Entity;
use crate::schema::rule::{params, Rule};

const DEFAULT_POINTS: u32 = 1;
const DEFAULT_LIVES: u32 = 3;
const DEFAULT_TIMER_SECONDS: f32 = 60.0;

/// Win-on-goal condition: the player must touch an entity with
/// `target_tag` while moving no faster than `max_speed`.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalRule {
    pub target_tag: String,
    pub max_speed: f32,
}

/// The description's rules folded into one queryable record. Later
/// rules of the same family overwrite earlier ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSet {
    pub score_points: Option<u32>,
    pub win_score_target: Option<u32>,
    pub goal: Option<GoalRule>,
    pub starting_lives: Option<u32>,
    pub timer_seconds: Option<f32>,
}

impl RuleSet {
    pub fn from_rules(rules: &[Rule]) -> Self {
        let mut set = RuleSet::default();
        for rule in rules {
            match rule.rule_type {
                RuleType::Score => {
                    let points = rule
                        .param_f32(params::POINTS)
                        .map(|p| p.max(0.0) as u32)
                        .unwrap_or(DEFAULT_POINTS);
                    set.score_points = Some(points.max(1));
                }
                RuleType::WinOnScore => {
                    let target = rule
                        .param_f32(params::TARGET)
                        .map(|t| t.max(1.0) as u32)
                        .unwrap_or(1);
                    set.win_score_target = Some(target);
                    // A score target implies pickups are worth scoring
                    // even without an explicit score rule.
                    set.score_points.get_or_insert(DEFAULT_POINTS);
                }
                RuleType::WinOnGoal => {
                    set.goal = Some(GoalRule {
                        target_tag: rule
                            .param_str(params::TARGET_TAG)
                            .unwrap_or("goal")
                            .to_string(),
                        max_speed: rule
                            .param_f32(params::MAX_SPEED)
                            .unwrap_or(bounds::VELOCITY_MAX),
                    });
                }
                RuleType::Lives | RuleType::LoseOnLives => {
                    let lives = rule
                        .param_f32(params::LIVES)
                        .map(|l| l.max(1.0) as u32)
                        .unwrap_or(DEFAULT_LIVES);
                    set.starting_lives = Some(lives);
                }
                RuleType::Timer | RuleType::LoseOnTimer => {
                    let seconds = rule
                        .param_f32(params::SECONDS)
                        .filter(|s| *s > 0.0)
                        .unwrap_or(DEFAULT_TIMER_SECONDS);
                    set.timer_seconds = Some(seconds);
                }
                // Rounds and checkpoints render on the HUD but have no
                // frame-loop semantics yet.
                RuleType::Rounds | RuleType::Checkpoints | RuleType::Unknown => {}
            }
        }
        set
    }
}

/// What one contact means under the active rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    None,
    /// Collect the other entity and add points.
    Collect { points: u32 },
    /// Lose a life (subject to the engine's contact cooldown).
    Damage,
    /// The win-on-goal condition is satisfied.
    Goal,
}

/// Classify a player contact. Goal outranks collect outranks damage;
/// the goal only fires when the player is slow enough to settle.
pub fn player_contact(set: &RuleSet, other: &Entity, player_speed: f32) -> ContactOutcome {
    if let Some(goal) = &set.goal {
        if other.has_tag(&goal.target_tag) {
            if player_speed <= goal.max_speed {
                return ContactOutcome::Goal;
            }
            // Too fast to count; rolling past the cup is not a win.
            return ContactOutcome::None;
        }
    }
    if is_collectible(other) {
        if let Some(points) = set.score_points {
            return ContactOutcome::Collect { points };
        }
    }
    if is_harmful(other) && set.starting_lives.is_some() {
        return ContactOutcome::Damage;
    }
    ContactOutcome::None
}

/// Classify a projectile contact: projectiles only interact with
/// harmful targets, converting them into score.
pub fn projectile_contact(set: &RuleSet, other: &Entity) -> ContactOutcome {
    if is_harmful(other) || other.has_tag("target") {
        return ContactOutcome::Collect {
            points: set.score_points.unwrap_or(DEFAULT_POINTS),
        };
    }
    ContactOutcome::None
}

fn is_collectible(entity: &Entity) -> bool {
    entity.kind == EntityKind::Pickup || entity.has_tag("pickup") || entity.has_tag("collectible")
}

fn is_harmful(entity: &Entity) -> bool {
    matches!(entity.kind, EntityKind::Hazard | EntityKind::Enemy)
        || entity.has_tag("hazard")
        || entity.has_tag("enemy")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::capability::EntityKind;
    use crate::schema::entity::{Collider, Render, Vec2};
    use serde_json::json;

    fn entity(kind: EntityKind, tags: &[&str]) -> Entity {
        Entity {
            id: "e".to_string(),
            kind,
            position: Vec2::default(),
            velocity: Vec2::default(),
            size: Vec2::new(20.0, 20.0),
            rotation: 0.0,
            render: Render::default(),
            collider: Collider::default(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn folds_golf_rules() {
        let rules = vec![Rule::new(RuleType::WinOnGoal)
            .with_param(params::TARGET_TAG, json!("goal"))
            .with_param(params::MAX_SPEED, json!(40))];
        let set = RuleSet::from_rules(&rules);
        let goal = set.goal.unwrap();
        assert_eq!(goal.target_tag, "goal");
        assert_eq!(goal.max_speed, 40.0);
        assert!(set.timer_seconds.is_none());
    }

    #[test]
    fn win_on_score_implies_scoring() {
        let rules = vec![Rule::new(RuleType::WinOnScore).with_param(params::TARGET, json!(5))];
        let set = RuleSet::from_rules(&rules);
        assert_eq!(set.win_score_target, Some(5));
        assert_eq!(set.score_points, Some(1));
    }

    #[test]
    fn missing_params_take_defaults() {
        let rules = vec![
            Rule::new(RuleType::LoseOnLives),
            Rule::new(RuleType::LoseOnTimer),
        ];
        let set = RuleSet::from_rules(&rules);
        assert_eq!(set.starting_lives, Some(DEFAULT_LIVES));
        assert_eq!(set.timer_seconds, Some(DEFAULT_TIMER_SECONDS));
    }

    #[test]
    fn goal_contact_gated_on_speed() {
        let set = RuleSet {
            goal: Some(GoalRule {
                target_tag: "goal".to_string(),
                max_speed: 40.0,
            }),
            ..Default::default()
        };
        let cup = entity(EntityKind::Cup, &["goal"]);
        assert_eq!(player_contact(&set, &cup, 30.0), ContactOutcome::Goal);
        assert_eq!(player_contact(&set, &cup, 41.0), ContactOutcome::None);
    }

    #[test]
    fn pickup_contact_scores_only_with_score_rule() {
        let star = entity(EntityKind::Pickup, &["pickup"]);
        let with_score = RuleSet {
            score_points: Some(2),
            ..Default::default()
        };
        assert_eq!(
            player_contact(&with_score, &star, 0.0),
            ContactOutcome::Collect { points: 2 }
        );
        assert_eq!(
            player_contact(&RuleSet::default(), &star, 0.0),
            ContactOutcome::None
        );
    }

    #[test]
    fn hazard_contact_damages_only_with_lives() {
        let ghost = entity(EntityKind::Hazard, &["hazard"]);
        let with_lives = RuleSet {
            starting_lives: Some(3),
            ..Default::default()
        };
        assert_eq!(player_contact(&with_lives, &ghost, 0.0), ContactOutcome::Damage);
        // Golf sand traps: hazard kind, no lives rule, no effect.
        assert_eq!(
            player_contact(&RuleSet::default(), &ghost, 0.0),
            ContactOutcome::None
        );
    }

    #[test]
    fn projectile_contact_converts_enemies_to_score() {
        let drone = entity(EntityKind::Enemy, &["enemy", "target"]);
        let set = RuleSet {
            score_points: Some(1),
            ..Default::default()
        };
        assert_eq!(
            projectile_contact(&set, &drone),
            ContactOutcome::Collect { points: 1 }
        );
        let wall = entity(EntityKind::Wall, &[]);
        assert_eq!(projectile_contact(&set, &wall), ContactOutcome::None);
    }
}
