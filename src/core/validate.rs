//! Multi-layer validation: schema shape, gameplay sanity, and renderer
//! capability constraints, run in that order with short-circuiting.
//!
//! Nothing here mutates or recovers — that is the repairer's and
//! normalizer's job. This is the final gate a description must pass
//! before any consumer sees it.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::schema::bounds;
use crate::schema::capability::{Capabilities, Category, RuleType};
use crate::schema::description::Description;
use crate::schema::rule::params;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidateError {
    // Layer (a): schema.
    #[error("empty description id")]
    EmptyId,
    #[error("empty title")]
    EmptyTitle,
    #[error("unknown enum value in {0}")]
    UnknownEnum(String),
    #[error("non-finite number in {0}")]
    NonFinite(String),
    #[error("{field} out of range: {value}")]
    OutOfRange { field: String, value: f32 },
    #[error("duplicate entity id '{0}'")]
    DuplicateEntityId(String),

    // Layer (b): sanity.
    #[error("no entity tagged 'player'")]
    MissingPlayer,
    #[error("player entity out of world bounds")]
    PlayerOutOfBounds,
    #[error("control mappings are empty")]
    EmptyControlMappings,
    #[error("win_on_goal targets tag '{0}' but no entity carries it")]
    DanglingGoalTag(String),
    #[error("win_on_score target must be positive")]
    NonPositiveScoreTarget,
    #[error("entity count {0} exceeds cap {max}", max = bounds::MAX_ENTITIES)]
    TooManyEntities(usize),

    // Layer (c): renderer constraints.
    #[error("renderer does not support {0}")]
    Unsupported(String),
}

/// Validation report. `ok` iff no layer produced an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub ok: bool,
    pub errors: Vec<ValidateError>,
}

impl Validation {
    fn passed() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
        }
    }

    fn failed(errors: Vec<ValidateError>) -> Self {
        Self { ok: false, errors }
    }
}

/// Run all three layers against the engine capability table.
pub fn validate(desc: &Description) -> Validation {
    validate_with(desc, Capabilities::engine())
}

/// Run all three layers against an explicit capability table,
/// short-circuiting at the first layer that reports errors.
pub fn validate_with(desc: &Description, caps: &Capabilities) -> Validation {
    let schema_errors = check_schema(desc);
    if !schema_errors.is_empty() {
        return Validation::failed(schema_errors);
    }
    let sanity_errors = check_sanity(desc);
    if !sanity_errors.is_empty() {
        return Validation::failed(sanity_errors);
    }
    let renderer_errors = check_renderer(desc, caps);
    if !renderer_errors.is_empty() {
        return Validation::failed(renderer_errors);
    }
    Validation::passed()
}

fn push_finite(errors: &mut Vec<ValidateError>, value: f32, field: &str) {
    if !value.is_finite() {
        errors.push(ValidateError::NonFinite(field.to_string()));
    }
}

fn push_range(errors: &mut Vec<ValidateError>, value: f32, min: f32, max: f32, field: &str) {
    if value.is_finite() && !(min..=max).contains(&value) {
        errors.push(ValidateError::OutOfRange {
            field: field.to_string(),
            value,
        });
    }
}

/// Layer (a): every field's shape, every enum value, every number
/// finite and within its documented range.
fn check_schema(desc: &Description) -> Vec<ValidateError> {
    let mut errors = Vec::new();

    if desc.id.trim().is_empty() {
        errors.push(ValidateError::EmptyId);
    }
    if desc.title.trim().is_empty() {
        errors.push(ValidateError::EmptyTitle);
    }
    if desc.category == Category::Unknown {
        errors.push(ValidateError::UnknownEnum("category".to_string()));
    }

    let world = &desc.world;
    push_range(
        &mut errors,
        world.size.x,
        bounds::WORLD_WIDTH_MIN,
        bounds::WORLD_WIDTH_MAX,
        "world.size.x",
    );
    push_range(
        &mut errors,
        world.size.y,
        bounds::WORLD_HEIGHT_MIN,
        bounds::WORLD_HEIGHT_MAX,
        "world.size.y",
    );
    push_finite(&mut errors, world.size.x, "world.size.x");
    push_finite(&mut errors, world.size.y, "world.size.y");

    let physics = &world.physics;
    for (value, field) in [
        (physics.gravity.x, "physics.gravity.x"),
        (physics.gravity.y, "physics.gravity.y"),
        (physics.friction, "physics.friction"),
        (physics.restitution, "physics.restitution"),
        (physics.time_step, "physics.time_step"),
    ] {
        push_finite(&mut errors, value, field);
    }
    push_range(
        &mut errors,
        physics.friction,
        bounds::FRICTION_MIN,
        bounds::FRICTION_MAX,
        "physics.friction",
    );
    push_range(
        &mut errors,
        physics.restitution,
        bounds::RESTITUTION_MIN,
        bounds::RESTITUTION_MAX,
        "physics.restitution",
    );

    let mut seen_ids: FxHashSet<&str> = FxHashSet::default();
    for entity in &desc.entities {
        let prefix = format!("entity '{}'", entity.id);
        if !seen_ids.insert(&entity.id) {
            errors.push(ValidateError::DuplicateEntityId(entity.id.clone()));
        }
        for (value, field) in [
            (entity.position.x, "position.x"),
            (entity.position.y, "position.y"),
            (entity.velocity.x, "velocity.x"),
            (entity.velocity.y, "velocity.y"),
            (entity.size.x, "size.x"),
            (entity.size.y, "size.y"),
            (entity.rotation, "rotation"),
        ] {
            push_finite(&mut errors, value, &format!("{} {}", prefix, field));
        }
        push_range(
            &mut errors,
            entity.size.x,
            bounds::ENTITY_SIZE_MIN,
            bounds::ENTITY_SIZE_MAX,
            &format!("{} size.x", prefix),
        );
        push_range(
            &mut errors,
            entity.size.y,
            bounds::ENTITY_SIZE_MIN,
            bounds::ENTITY_SIZE_MAX,
            &format!("{} size.y", prefix),
        );
        push_range(
            &mut errors,
            entity.velocity.x,
            -bounds::VELOCITY_MAX,
            bounds::VELOCITY_MAX,
            &format!("{} velocity.x", prefix),
        );
        push_range(
            &mut errors,
            entity.velocity.y,
            -bounds::VELOCITY_MAX,
            bounds::VELOCITY_MAX,
            &format!("{} velocity.y", prefix),
        );
    }

    errors
}

/// Layer (b): the description must be playable, not just well-formed.
fn check_sanity(desc: &Description) -> Vec<ValidateError> {
    let mut errors = Vec::new();

    match desc.player() {
        None => errors.push(ValidateError::MissingPlayer),
        Some(player) => {
            let (min_x, min_y, max_x, max_y) = player.aabb();
            let in_bounds = min_x >= -0.5
                && min_y >= -0.5
                && max_x <= desc.world.size.x + 0.5
                && max_y <= desc.world.size.y + 0.5;
            if !in_bounds {
                errors.push(ValidateError::PlayerOutOfBounds);
            }
        }
    }

    if desc.controls.mappings.is_empty() {
        errors.push(ValidateError::EmptyControlMappings);
    }

    for rule in &desc.rules {
        match rule.rule_type {
            RuleType::WinOnGoal => {
                let tag = rule.param_str(params::TARGET_TAG).unwrap_or("goal");
                if !desc.entities.iter().any(|e| e.has_tag(tag)) {
                    errors.push(ValidateError::DanglingGoalTag(tag.to_string()));
                }
            }
            RuleType::WinOnScore => {
                if rule.param_f32(params::TARGET).unwrap_or(0.0) <= 0.0 {
                    errors.push(ValidateError::NonPositiveScoreTarget);
                }
            }
            _ => {}
        }
    }

    if desc.entities.len() > bounds::MAX_ENTITIES {
        errors.push(ValidateError::TooManyEntities(desc.entities.len()));
    }

    errors
}

/// Layer (c): every enum value used anywhere must be in the renderer's
/// current capability set.
fn check_renderer(desc: &Description, caps: &Capabilities) -> Vec<ValidateError> {
    let mut errors = Vec::new();

    if !caps.supports_control_scheme(desc.controls.scheme) {
        errors.push(ValidateError::Unsupported(format!(
            "control scheme {:?}",
            desc.controls.scheme
        )));
    }
    if !caps.supports_camera_mode(desc.world.camera.mode) {
        errors.push(ValidateError::Unsupported(format!(
            "camera mode {:?}",
            desc.world.camera.mode
        )));
    }
    if !caps.supports_world_mode(desc.world.mode) {
        errors.push(ValidateError::Unsupported(format!(
            "world mode {:?}",
            desc.world.mode
        )));
    }
    for rule in &desc.rules {
        if !caps.supports_rule_type(rule.rule_type) {
            errors.push(ValidateError::Unsupported(format!(
                "rule type {:?}",
                rule.rule_type
            )));
        }
    }
    for entity in &desc.entities {
        if !caps.supports_entity_kind(entity.kind) {
            errors.push(ValidateError::Unsupported(format!(
                "entity kind {:?} ('{}')",
                entity.kind, entity.id
            )));
        }
        if let Some(shape) = entity.render.shape {
            if !caps.supports_render_shape(shape) {
                errors.push(ValidateError::Unsupported(format!(
                    "render shape {:?} ('{}')",
                    shape, entity.id
                )));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::templates::TemplateRegistry;
    use crate::schema::capability::EntityKind;

    fn valid_description() -> Description {
        let registry = TemplateRegistry::standard();
        (registry.get("mini_golf").build_base)(3)
    }

    #[test]
    fn template_bases_validate_clean() {
        let registry = TemplateRegistry::standard();
        for id in registry.ids() {
            let desc = (registry.get(id).build_base)(17);
            let report = validate(&desc);
            assert!(report.ok, "template {} failed: {:?}", id, report.errors);
        }
    }

    #[test]
    fn schema_layer_rejects_nan() {
        let mut desc = valid_description();
        desc.entities[0].position.x = f32::NAN;
        let report = validate(&desc);
        assert!(!report.ok);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidateError::NonFinite(_))));
    }

    #[test]
    fn schema_layer_rejects_unknown_category() {
        let mut desc = valid_description();
        desc.category = Category::Unknown;
        let report = validate(&desc);
        assert!(report.errors.contains(&ValidateError::UnknownEnum("category".to_string())));
    }

    #[test]
    fn sanity_layer_requires_player() {
        let mut desc = valid_description();
        desc.entities.retain(|e| !e.has_tag("player"));
        let report = validate(&desc);
        assert!(!report.ok);
        assert!(report.errors.contains(&ValidateError::MissingPlayer));
    }

    #[test]
    fn sanity_layer_rejects_dangling_goal_tag() {
        let mut desc = valid_description();
        desc.entities.retain(|e| !e.has_tag("goal"));
        let report = validate(&desc);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidateError::DanglingGoalTag(_))));
    }

    #[test]
    fn sanity_layer_rejects_zero_score_target() {
        let mut desc = valid_description();
        desc.rules
            .push(crate::schema::rule::Rule::new(RuleType::WinOnScore));
        let report = validate(&desc);
        assert!(report.errors.contains(&ValidateError::NonPositiveScoreTarget));
    }

    #[test]
    fn renderer_layer_rejects_unknown_kind() {
        let mut desc = valid_description();
        desc.entities[0].kind = EntityKind::Unknown;
        let report = validate(&desc);
        assert!(!report.ok);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidateError::Unsupported(_))));
    }

    #[test]
    fn layers_short_circuit_in_order() {
        // Both a schema problem (NaN) and a sanity problem (no player):
        // only the schema layer reports.
        let mut desc = valid_description();
        desc.entities.retain(|e| !e.has_tag("player"));
        desc.world.physics.friction = f32::NAN;
        let report = validate(&desc);
        assert!(!report.ok);
        assert!(report
            .errors
            .iter()
            .all(|e| matches!(e, ValidateError::NonFinite(_))));
    }
}
