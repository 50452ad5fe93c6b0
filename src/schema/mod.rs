//! Data model: capability tables, the game description IR, and the
//! per-request intent record.

pub mod bounds;
pub mod capability;
pub mod description;
pub mod entity;
pub mod intent;
pub mod rule;

pub use capability::{
    CameraMode, Capabilities, Category, ColliderType, ControlScheme, EntityKind, RenderShape,
    RenderType, RuleType, WorldMode,
};
pub use description::{
    Asset, Camera, Controls, Description, HudElement, PhysicsParams, Ui, UiMessages, World,
};
pub use entity::{Collider, Entity, Render, Vec2};
pub use intent::{Constraints, Difficulty, Intent, Pace};
pub use rule::Rule;
