//! Normalization: clamp every number into its documented range,
//! default anything non-finite, coerce drifted enum values onto the
//! capability table, clip entities into the world, and enforce the
//! entity cap (decor goes first).

use rustc_hash::FxHashSet;

use crate::schema::bounds;
use crate::schema::capability::{Capabilities, ColliderType, EntityKind, RenderShape, RenderType};
use crate::schema::description::Description;
use crate::schema::entity::Entity;

/// Clamp into `[min, max]`, substituting `default` for non-finite
/// input. Never returns a non-finite value.
fn clamp_finite(value: f32, min: f32, max: f32, default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

/// Normalize a description. Pure; returns a new value.
pub fn normalize(desc: &Description) -> Description {
    let mut out = desc.clone();

    let world = &mut out.world;
    world.size.x = clamp_finite(
        world.size.x,
        bounds::WORLD_WIDTH_MIN,
        bounds::WORLD_WIDTH_MAX,
        bounds::DEFAULT_WORLD_WIDTH,
    );
    world.size.y = clamp_finite(
        world.size.y,
        bounds::WORLD_HEIGHT_MIN,
        bounds::WORLD_HEIGHT_MAX,
        bounds::DEFAULT_WORLD_HEIGHT,
    );

    let physics = &mut world.physics;
    physics.gravity.x = clamp_finite(physics.gravity.x, -bounds::GRAVITY_MAX, bounds::GRAVITY_MAX, 0.0);
    physics.gravity.y = clamp_finite(physics.gravity.y, -bounds::GRAVITY_MAX, bounds::GRAVITY_MAX, 0.0);
    physics.friction = clamp_finite(
        physics.friction,
        bounds::FRICTION_MIN,
        bounds::FRICTION_MAX,
        bounds::DEFAULT_FRICTION,
    );
    physics.restitution = clamp_finite(
        physics.restitution,
        bounds::RESTITUTION_MIN,
        bounds::RESTITUTION_MAX,
        bounds::DEFAULT_RESTITUTION,
    );
    physics.time_step = clamp_finite(
        physics.time_step,
        bounds::TIME_STEP_MIN,
        bounds::TIME_STEP_MAX,
        bounds::DEFAULT_TIME_STEP,
    );

    let world_size = out.world.size;
    let caps = Capabilities::engine();
    for entity in &mut out.entities {
        coerce_unknown(entity, caps);
        entity.size.x = clamp_finite(
            entity.size.x,
            bounds::ENTITY_SIZE_MIN,
            bounds::ENTITY_SIZE_MAX,
            bounds::DEFAULT_ENTITY_SIZE,
        );
        entity.size.y = clamp_finite(
            entity.size.y,
            bounds::ENTITY_SIZE_MIN,
            bounds::ENTITY_SIZE_MAX,
            bounds::DEFAULT_ENTITY_SIZE,
        );
        entity.velocity.x = clamp_finite(
            entity.velocity.x,
            -bounds::VELOCITY_MAX,
            bounds::VELOCITY_MAX,
            0.0,
        );
        entity.velocity.y = clamp_finite(
            entity.velocity.y,
            -bounds::VELOCITY_MAX,
            bounds::VELOCITY_MAX,
            0.0,
        );
        if !entity.rotation.is_finite() {
            entity.rotation = 0.0;
        }

        // Clip the full bounding box inside world bounds. An entity
        // larger than the world pins to the center of the axis.
        let hw = (entity.size.x * 0.5).min(world_size.x * 0.5);
        let hh = (entity.size.y * 0.5).min(world_size.y * 0.5);
        entity.position.x = clamp_finite(entity.position.x, hw, world_size.x - hw, world_size.x * 0.5);
        entity.position.y = clamp_finite(entity.position.y, hh, world_size.y - hh, world_size.y * 0.5);
    }

    cap_entities(&mut out);
    out
}

/// Substitute supported values for enum members outside the current
/// capability table, so normalized output always renders.
fn coerce_unknown(entity: &mut Entity, caps: &Capabilities) {
    if !caps.supports_entity_kind(entity.kind) {
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
        RenderType::Unknown => entity.render = Default::default(),
    }
    if entity.collider.collider_type == ColliderType::Unknown {
        entity.collider.collider_type = ColliderType::Circle;
    }
}

/// Enforce `MAX_ENTITIES`, truncating decor before anything
/// gameplay-relevant and preserving relative order of the survivors.
fn cap_entities(desc: &mut Description) {
    if desc.entities.len() <= bounds::MAX_ENTITIES {
        return;
    }
    let gameplay_count = desc
        .entities
        .iter()
        .filter(|e| e.kind.is_gameplay())
        .count();
    let decor_budget = bounds::MAX_ENTITIES.saturating_sub(gameplay_count);

    let mut keep: FxHashSet<usize> = FxHashSet::default();
    let mut gameplay_kept = 0usize;
    let mut decor_kept = 0usize;
    for (i, entity) in desc.entities.iter().enumerate() {
        if entity.kind.is_gameplay() {
            if gameplay_kept < bounds::MAX_ENTITIES {
                keep.insert(i);
                gameplay_kept += 1;
            }
        } else if decor_kept < decor_budget {
            keep.insert(i);
            decor_kept += 1;
        }
    }

    let mut i = 0;
    desc.entities.retain(|_| {
        let kept = keep.contains(&i);
        i += 1;
        kept
    });
    log::debug!(
        "normalize: entity cap applied, {} entities kept",
        desc.entities.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::capability::{Category, EntityKind};
    use crate::schema::description::World;
    use crate::schema::entity::{Entity, Vec2};

    fn blank_entity(id: &str, kind: EntityKind) -> Entity {
        Entity {
            id: id.to_string(),
            kind,
            position: Vec2::default(),
            velocity: Vec2::default(),
            size: Vec2::new(20.0, 20.0),
            rotation: 0.0,
            render: Default::default(),
            collider: Default::default(),
            tags: Vec::new(),
        }
    }

    fn blank_description() -> Description {
        Description {
            id: "d".to_string(),
            title: "t".to_string(),
            category: Category::Arcade,
            description: String::new(),
            assets: Vec::new(),
            world: World::default(),
            entities: Vec::new(),
            rules: Vec::new(),
            controls: Default::default(),
            ui: Default::default(),
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut desc = blank_description();
        desc.entities.push(blank_entity("a", EntityKind::Player));
        let once = normalize(&desc);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn non_finite_numbers_replaced() {
        let mut desc = blank_description();
        desc.world.size = Vec2::new(f32::NAN, f32::INFINITY);
        desc.world.physics.friction = f32::NAN;
        let mut e = blank_entity("a", EntityKind::Player);
        e.velocity = Vec2::new(f32::NAN, -f32::INFINITY);
        e.rotation = f32::NAN;
        desc.entities.push(e);

        let normal = normalize(&desc);
        assert_eq!(normal.world.size.x, crate::schema::bounds::DEFAULT_WORLD_WIDTH);
        assert_eq!(normal.world.size.y, crate::schema::bounds::DEFAULT_WORLD_HEIGHT);
        assert_eq!(normal.world.physics.friction, crate::schema::bounds::DEFAULT_FRICTION);
        let e = &normal.entities[0];
        assert!(e.velocity.is_finite());
        assert_eq!(e.rotation, 0.0);
    }

    #[test]
    fn values_clamped_into_documented_ranges() {
        let mut desc = blank_description();
        desc.world.size = Vec2::new(10_000.0, 1.0);
        desc.world.physics.restitution = 4.2;
        let mut e = blank_entity("a", EntityKind::Player);
        e.size = Vec2::new(1.0, 9_999.0);
        e.velocity = Vec2::new(5_000.0, -5_000.0);
        desc.entities.push(e);

        let normal = normalize(&desc);
        assert_eq!(normal.world.size.x, crate::schema::bounds::WORLD_WIDTH_MAX);
        assert_eq!(normal.world.size.y, crate::schema::bounds::WORLD_HEIGHT_MIN);
        assert_eq!(normal.world.physics.restitution, 1.0);
        let e = &normal.entities[0];
        assert_eq!(e.size.x, crate::schema::bounds::ENTITY_SIZE_MIN);
        assert_eq!(e.size.y, crate::schema::bounds::ENTITY_SIZE_MAX);
        assert_eq!(e.velocity.x, crate::schema::bounds::VELOCITY_MAX);
        assert_eq!(e.velocity.y, -crate::schema::bounds::VELOCITY_MAX);
    }

    #[test]
    fn bounding_box_clipped_inside_world() {
        let mut desc = blank_description();
        let mut e = blank_entity("a", EntityKind::Player);
        e.position = Vec2::new(-500.0, 10_000.0);
        e.size = Vec2::new(20.0, 20.0);
        desc.entities.push(e);

        let normal = normalize(&desc);
        let (min_x, min_y, max_x, max_y) = normal.entities[0].aabb();
        assert!(min_x >= 0.0 && min_y >= 0.0);
        assert!(max_x <= normal.world.size.x);
        assert!(max_y <= normal.world.size.y);
    }

    #[test]
    fn entity_cap_truncates_decor_first() {
        let mut desc = blank_description();
        for i in 0..100 {
            desc.entities.push(blank_entity(&format!("decor_{}", i), EntityKind::Decor));
        }
        for i in 0..30 {
            desc.entities.push(blank_entity(&format!("pickup_{}", i), EntityKind::Pickup));
        }
        let normal = normalize(&desc);
        assert_eq!(normal.entities.len(), crate::schema::bounds::MAX_ENTITIES);
        // All 30 gameplay entities survive; decor fills the remainder.
        let pickups = normal
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::Pickup)
            .count();
        assert_eq!(pickups, 30);
    }

    #[test]
    fn adversarial_200_empty_entities() {
        // The literal malformed-input scenario: 200 entities of nothing.
        let json = format!(
            r#"{{"entities": [{}]}}"#,
            vec!["{}"; 200].join(",")
        );
        let desc = Description::from_json(&json).unwrap();
        let normal = normalize(&desc);
        assert!(normal.entities.len() <= crate::schema::bounds::MAX_ENTITIES);
        let caps = Capabilities::engine();
        for e in &normal.entities {
            assert!(caps.supports_entity_kind(e.kind));
            if let Some(shape) = e.render.shape {
                assert!(caps.supports_render_shape(shape));
            }
            assert!(e.size.x >= crate::schema::bounds::ENTITY_SIZE_MIN);
            assert!(e.position.is_finite());
        }
    }

    #[test]
    fn drifted_enum_values_coerced_to_supported() {
        let doc = r#"{"entities": [
            {"id": "m", "kind": "mystery", "size": {"x": 20, "y": 20},
             "render": {"type": "hologram"},
             "collider": {"type": "mesh"}}
        ]}"#;
        let desc = Description::from_json(doc).unwrap();
        assert_eq!(desc.entities[0].kind, EntityKind::Unknown);
        let normal = normalize(&desc);
        let e = &normal.entities[0];
        assert_eq!(e.kind, EntityKind::Decor);
        assert_eq!(e.render.render_type, RenderType::Shape);
        assert!(e.render.shape.is_some());
        assert_ne!(e.collider.collider_type, ColliderType::Unknown);
    }
}
