//! The canonical intermediate representation of a playable game — the
//! wire and persistence format shared with every consumer.
//!
//! Field names and the closed enum string values are the compatibility
//! boundary: renaming any of them breaks saved games.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::bounds;
use super::capability::{CameraMode, Category, ControlScheme, WorldMode};
use super::entity::{Entity, Vec2};
use super::rule::Rule;

#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// World physics parameters, all clamped by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParams {
    #[serde(default)]
    pub gravity: Vec2,
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default = "default_restitution")]
    pub restitution: f32,
    #[serde(default = "default_time_step")]
    pub time_step: f32,
}

fn default_friction() -> f32 {
    bounds::DEFAULT_FRICTION
}

fn default_restitution() -> f32 {
    bounds::DEFAULT_RESTITUTION
}

fn default_time_step() -> f32 {
    bounds::DEFAULT_TIME_STEP
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: Vec2::default(),
            friction: bounds::DEFAULT_FRICTION,
            restitution: bounds::DEFAULT_RESTITUTION,
            time_step: bounds::DEFAULT_TIME_STEP,
        }
    }
}

/// Camera behavior hint for the render layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub mode: CameraMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            mode: CameraMode::Fixed,
            target_id: None,
        }
    }
}

/// The simulated world: size, orientation, physics, camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub size: Vec2,
    #[serde(default = "default_world_mode")]
    pub mode: WorldMode,
    #[serde(default)]
    pub physics: PhysicsParams,
    #[serde(default)]
    pub camera: Camera,
}

fn default_world_mode() -> WorldMode {
    WorldMode::TopDown
}

impl Default for World {
    fn default() -> Self {
        Self {
            size: Vec2::new(bounds::DEFAULT_WORLD_WIDTH, bounds::DEFAULT_WORLD_HEIGHT),
            mode: WorldMode::TopDown,
            physics: PhysicsParams::default(),
            camera: Camera::default(),
        }
    }
}

/// Input scheme plus named input→action bindings. Mappings are kept
/// sorted so serialized documents are byte-stable across processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub scheme: ControlScheme,
    #[serde(default)]
    pub mappings: BTreeMap<String, String>,
}

impl Controls {
    pub fn for_scheme(scheme: ControlScheme) -> Self {
        let mut mappings = BTreeMap::new();
        match scheme {
            ControlScheme::KeyboardMove => {
                mappings.insert("arrow_up".to_string(), "move_up".to_string());
                mappings.insert("arrow_down".to_string(), "move_down".to_string());
                mappings.insert("arrow_left".to_string(), "move_left".to_string());
                mappings.insert("arrow_right".to_string(), "move_right".to_string());
            }
            ControlScheme::DragLaunch => {
                mappings.insert("pointer_drag".to_string(), "aim".to_string());
                mappings.insert("pointer_release".to_string(), "launch".to_string());
            }
            ControlScheme::AimShoot => {
                mappings.insert("pointer_move".to_string(), "aim".to_string());
                mappings.insert("pointer_down".to_string(), "shoot".to_string());
            }
            ControlScheme::ClickPlace | ControlScheme::Unknown => {
                mappings.insert("pointer_down".to_string(), "place".to_string());
            }
        }
        Self { scheme, mappings }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Controls::for_scheme(ControlScheme::KeyboardMove)
    }
}

/// A HUD readout the render layer should show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudElement {
    pub element: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl HudElement {
    pub fn new(element: &str, label: &str) -> Self {
        Self {
            element: element.to_string(),
            label: Some(label.to_string()),
        }
    }
}

/// End-of-game and start messages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UiMessages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ui {
    #[serde(default)]
    pub hud: Vec<HudElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<UiMessages>,
}

/// A non-entity asset reference (palette, glyph, backdrop keyword).
/// Assets are subject to the same exclusion filtering as entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The complete structured description of a playable mini-game.
/// Every field defaults so even a near-empty document parses; what
/// the defaults cannot make playable, validation reports and repair
/// recovers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub world: World,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub controls: Controls,
    #[serde(default)]
    pub ui: Ui,
}

fn default_category() -> Category {
    Category::Unknown
}

impl Description {
    /// The first entity tagged "player", if any.
    pub fn player(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.has_tag("player"))
    }

    pub fn find_entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Serialize to the wire format.
    pub fn to_json(&self) -> Result<String, DescriptionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an untrusted wire document. Unknown enum values map to
    /// `Unknown` variants rather than failing, so a parsed document
    /// still needs repair + normalization before use.
    pub fn from_json(input: &str) -> Result<Description, DescriptionError> {
        Ok(serde_json::from_str(input)?)
    }
}
