//! Validation-and-repair pass: coerce a candidate description into one
//! that satisfies its template's minimum requirements and global
//! playability, no matter how damaged the input is.
//!
//! The passes are ordered and idempotent; running `repair` twice
//! yields the same output as running it once.

use rand::Rng;
use rustc_hash::FxHashSet;

use crate::core::seed::rng_for;
use crate::core::templates::{default_for_kind, kind_tag, TemplateDefinition};
use crate::schema::capability::{
    Capabilities, ColliderType, ControlScheme, EntityKind, RenderShape, RenderType, RuleType,
};
use crate::schema::description::{Controls, Description};
use crate::schema::entity::Vec2;
use crate::schema::intent::{Constraints, Intent};
use crate::schema::rule::{params, Rule};
use serde_json::json;

/// RNG stream for repair-injected entity placement; distinct from the
/// template build and modifier streams.
const STREAM_REPAIR: u64 = 2;

/// Repair a candidate against its template. Guaranteed to return a
/// description with a non-empty title, at least one entity, and a
/// player-tagged entity.
pub fn repair(
    desc: &Description,
    intent: &Intent,
    template: &TemplateDefinition,
    seed: u32,
) -> Description {
    let caps = Capabilities::engine();
    let mut out = desc.clone();

    sanitize_entities(&mut out, caps);
    sanitize_rules(&mut out, caps);
    sanitize_controls(&mut out, caps);
    apply_exclusions(&mut out, &intent.constraints);
    inject_required(&mut out, intent, template, seed);

    if accepts(&out) {
        return out;
    }

    // The candidate is beyond repair. Fall back to a fresh base,
    // re-filtered through the exclusion pass so honored exclusions
    // survive the swap.
    log::warn!(
        "repair: candidate for template '{}' unplayable, substituting base",
        template.id
    );
    let mut fresh = (template.build_base)(seed);
    apply_exclusions(&mut fresh, &intent.constraints);
    if accepts(&fresh) {
        return fresh;
    }
    // Exclusions gutted even the base (e.g. "no player"). Playability
    // outranks exclusion at last resort.
    (template.build_base)(seed)
}

/// True when the description meets the global playability floor.
pub fn accepts(desc: &Description) -> bool {
    !desc.title.trim().is_empty()
        && !desc.entities.is_empty()
        && desc.entities.iter().any(|e| e.has_tag("player"))
}

/// Pass 1: coerce out-of-table enum values to safe defaults instead of
/// deleting the entity, and restore structural invariants (unique ids,
/// decor that cannot win).
fn sanitize_entities(desc: &mut Description, caps: &Capabilities) {
    let win_tags: Vec<String> = desc
        .rules
        .iter()
        .filter(|r| r.rule_type == RuleType::WinOnGoal)
        .filter_map(|r| r.param_str(params::TARGET_TAG).map(str::to_string))
        .chain(std::iter::once("goal".to_string()))
        .collect();

    let mut seen_ids: FxHashSet<String> = FxHashSet::default();
    for entity in &mut desc.entities {
        if !caps.supports_entity_kind(entity.kind) {
            log::debug!("sanitize: entity '{}' kind coerced to decor", entity.id);
            entity.kind = EntityKind::Decor;
        }
        match entity.render.render_type {
            RenderType::Shape => {
                let shape_ok = entity
                    .render
                    .shape
                    .is_some_and(|s| caps.supports_render_shape(s));
                if !shape_ok {
                    entity.render.shape = Some(RenderShape::Circle);
                }
            }
            RenderType::Emoji => {
                if entity.render.emoji.is_none() {
                    entity.render = Default::default();
                }
            }
            RenderType::Unknown => {
                entity.render = Default::default();
            }
        }
        if entity.collider.collider_type == ColliderType::Unknown {
            entity.collider.collider_type = ColliderType::Circle;
        }

        // Decor must never be able to satisfy a win condition.
        if entity.kind == EntityKind::Decor {
            entity.tags.retain(|t| !win_tags.contains(t));
        }

        // Unique ids: rename duplicates deterministically.
        if entity.id.is_empty() {
            entity.id = "entity".to_string();
        }
        let mut candidate = entity.id.clone();
        let mut n = 2;
        while !seen_ids.insert(candidate.clone()) {
            candidate = format!("{}_{}", entity.id, n);
            n += 1;
        }
        entity.id = candidate;
    }
}

/// Pass 2: silently drop rules whose type is outside the capability
/// table.
fn sanitize_rules(desc: &mut Description, caps: &Capabilities) {
    desc.rules.retain(|rule| {
        let keep = caps.supports_rule_type(rule.rule_type);
        if !keep {
            log::debug!("sanitize: dropped rule of unsupported type");
        }
        keep
    });
}

/// Pass 3: replace an unsupported control scheme with the universal
/// default, and make sure bindings are present.
fn sanitize_controls(desc: &mut Description, caps: &Capabilities) {
    if !caps.supports_control_scheme(desc.controls.scheme) {
        desc.controls = Controls::for_scheme(ControlScheme::KeyboardMove);
    } else if desc.controls.mappings.is_empty() {
        desc.controls = Controls::for_scheme(desc.controls.scheme);
    }
}

/// Pass 4: drop entities and assets matching any excluded term, by id,
/// kind name, or tag (bidirectional substring).
fn apply_exclusions(desc: &mut Description, constraints: &Constraints) {
    if constraints.exclude.is_empty() {
        return;
    }
    desc.entities.retain(|entity| {
        let hit = constraints.excludes_term(&entity.id)
            || constraints.excludes_term(kind_name(entity.kind))
            || entity.tags.iter().any(|t| constraints.excludes_term(t));
        if hit {
            log::debug!("exclusion: removed entity '{}'", entity.id);
        }
        !hit
    });
    desc.assets.retain(|asset| {
        !(constraints.excludes_term(&asset.id)
            || constraints.excludes_term(&asset.value)
            || asset.tags.iter().any(|t| constraints.excludes_term(t)))
    });
}

fn kind_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Player => "player",
        EntityKind::Enemy => "enemy",
        EntityKind::Projectile => "projectile",
        EntityKind::Goal => "goal",
        EntityKind::Wall => "wall",
        EntityKind::Hazard => "hazard",
        EntityKind::Pickup => "pickup",
        EntityKind::Spawner => "spawner",
        EntityKind::Decor => "decor",
        EntityKind::Npc => "npc",
        EntityKind::Ball => "ball",
        EntityKind::Cup => "cup",
        EntityKind::Bumper => "bumper",
        EntityKind::Unknown => "unknown",
    }
}

/// Pass 5: re-inject template-mandated entities, rules, and controls
/// that are still missing. A requirement whose kind or tag is itself
/// excluded is skipped — exclusion outranks requirement.
fn inject_required(
    desc: &mut Description,
    intent: &Intent,
    template: &TemplateDefinition,
    seed: u32,
) {
    let mut rng = rng_for(seed, STREAM_REPAIR);

    for required in template.required_entities {
        let excluded = intent.constraints.excludes_term(kind_name(required.kind))
            || required
                .tag
                .is_some_and(|t| intent.constraints.excludes_term(t));
        if excluded {
            continue;
        }
        let present = desc.entities.iter().any(|e| {
            e.kind == required.kind || required.tag.is_some_and(|t| e.has_tag(t))
        });
        if present {
            continue;
        }

        let noun = required.tag.unwrap_or_else(|| kind_tag(required.kind));
        let mut entity = default_for_kind(required.kind, noun);
        entity.id = format!("required_{}", noun);
        entity.size = Vec2::new(22.0, 22.0);
        entity.position = Vec2::new(
            rng.gen_range(60.0..desc.world.size.x.max(121.0) - 60.0),
            rng.gen_range(60.0..desc.world.size.y.max(121.0) - 60.0),
        );
        if let Some(tag) = required.tag {
            if !entity.has_tag(tag) {
                entity.tags.push(tag.to_string());
            }
        }
        log::debug!("repair: injected required entity '{}'", entity.id);
        desc.entities.push(entity);
    }

    for required in template.required_rules {
        if !desc.rules.iter().any(|r| r.rule_type == *required) {
            desc.rules.push(default_rule(*required));
        }
    }

    if desc.controls.scheme != template.required_controls {
        desc.controls = Controls::for_scheme(template.required_controls);
    }
}

fn default_rule(rule_type: RuleType) -> Rule {
    match rule_type {
        RuleType::Score => Rule::new(rule_type).with_param(params::POINTS, json!(1)),
        RuleType::WinOnScore => Rule::new(rule_type).with_param(params::TARGET, json!(5)),
        RuleType::WinOnGoal => Rule::new(rule_type)
            .with_param(params::TARGET_TAG, json!("goal"))
            .with_param(params::MAX_SPEED, json!(40.0)),
        RuleType::Lives | RuleType::LoseOnLives => {
            Rule::new(rule_type).with_param(params::LIVES, json!(3))
        }
        RuleType::Timer | RuleType::LoseOnTimer => {
            Rule::new(rule_type).with_param(params::SECONDS, json!(60))
        }
        RuleType::Rounds => Rule::new(rule_type).with_param("rounds", json!(3)),
        RuleType::Checkpoints | RuleType::Unknown => Rule::new(rule_type),
    }
}
