use serde::{Deserialize, Serialize};

use super::capability::{ColliderType, EntityKind, RenderShape, RenderType};

/// 2D vector used for positions, velocities, and sizes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// How an entity is drawn: either a colored shape or an emoji glyph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Render {
    #[serde(rename = "type")]
    pub render_type: RenderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<RenderShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Render {
    pub fn shape(shape: RenderShape, color: &str) -> Self {
        Self {
            render_type: RenderType::Shape,
            shape: Some(shape),
            emoji: None,
            color: Some(color.to_string()),
        }
    }

    pub fn emoji(glyph: &str) -> Self {
        Self {
            render_type: RenderType::Emoji,
            shape: None,
            emoji: Some(glyph.to_string()),
            color: None,
        }
    }
}

impl Default for Render {
    fn default() -> Self {
        Render::shape(RenderShape::Circle, "#cccccc")
    }
}

/// Collision participation for an entity.
///
/// Sensors detect overlap and trigger rule evaluation without taking
/// part in the physical collision response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    #[serde(rename = "type")]
    pub collider_type: ColliderType,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_sensor: bool,
}

impl Collider {
    pub fn solid_circle() -> Self {
        Self {
            collider_type: ColliderType::Circle,
            is_static: false,
            is_sensor: false,
        }
    }

    pub fn static_rect() -> Self {
        Self {
            collider_type: ColliderType::Rect,
            is_static: true,
            is_sensor: false,
        }
    }

    pub fn sensor_circle() -> Self {
        Self {
            collider_type: ColliderType::Circle,
            is_static: true,
            is_sensor: true,
        }
    }
}

impl Default for Collider {
    fn default() -> Self {
        Collider::solid_circle()
    }
}

/// A single game object in a description. Every field defaults, so
/// even an empty JSON object parses; a missing kind reads as inert
/// decor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_kind")]
    pub kind: EntityKind,
    #[serde(default)]
    pub position: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
    #[serde(default)]
    pub size: Vec2,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub render: Render,
    #[serde(default)]
    pub collider: Collider,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_kind() -> EntityKind {
    EntityKind::Decor
}

impl Entity {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Effective circle radius: half the larger dimension.
    pub fn radius(&self) -> f32 {
        self.size.x.max(self.size.y) * 0.5
    }

    /// Axis-aligned bounding box as (min_x, min_y, max_x, max_y),
    /// centered on `position`.
    pub fn aabb(&self) -> (f32, f32, f32, f32) {
        let hw = self.size.x * 0.5;
        let hh = self.size.y * 0.5;
        (
            self.position.x - hw,
            self.position.y - hh,
            self.position.x + hw,
            self.position.y + hh,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entity(tags: &[&str]) -> Entity {
        Entity {
            id: "e1".to_string(),
            kind: EntityKind::Player,
            position: Vec2::new(100.0, 50.0),
            velocity: Vec2::default(),
            size: Vec2::new(20.0, 30.0),
            rotation: 0.0,
            render: Render::default(),
            collider: Collider::default(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn has_tag_positive_and_negative() {
        let e = make_entity(&["player", "hero"]);
        assert!(e.has_tag("player"));
        assert!(e.has_tag("hero"));
        assert!(!e.has_tag("enemy"));
        assert!(!e.has_tag(""));
    }

    #[test]
    fn radius_uses_larger_dimension() {
        let e = make_entity(&[]);
        assert!((e.radius() - 15.0).abs() < f32::EPSILON);
    }

    #[test]
    fn aabb_is_centered() {
        let e = make_entity(&[]);
        let (min_x, min_y, max_x, max_y) = e.aabb();
        assert_eq!((min_x, min_y, max_x, max_y), (90.0, 35.0, 110.0, 65.0));
    }

    #[test]
    fn entity_deserializes_with_defaults() {
        let e: Entity = serde_json::from_str(r#"{"id": "x", "kind": "pickup"}"#).unwrap();
        assert_eq!(e.kind, EntityKind::Pickup);
        assert_eq!(e.position, Vec2::default());
        assert!(e.tags.is_empty());
    }

    #[test]
    fn empty_object_parses_as_decor() {
        let e: Entity = serde_json::from_str("{}").unwrap();
        assert!(e.id.is_empty());
        assert_eq!(e.kind, EntityKind::Decor);
        assert_eq!(e.size, Vec2::default());
    }

    #[test]
    fn unknown_kind_survives_parse() {
        let e: Entity = serde_json::from_str(r#"{"id": "x", "kind": "wormhole"}"#).unwrap();
        assert_eq!(e.kind, EntityKind::Unknown);
    }
}
