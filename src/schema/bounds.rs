//! Documented numeric ranges and defaults, shared by the normalizer
//! (which clamps into them) and the validator (which rejects outside
//! them). Keeping both sides on one table is what makes
//! normalize-then-validate always pass.

pub const WORLD_WIDTH_MIN: f32 = 320.0;
pub const WORLD_WIDTH_MAX: f32 = 1600.0;
pub const WORLD_HEIGHT_MIN: f32 = 240.0;
pub const WORLD_HEIGHT_MAX: f32 = 1200.0;
pub const DEFAULT_WORLD_WIDTH: f32 = 800.0;
pub const DEFAULT_WORLD_HEIGHT: f32 = 600.0;

pub const ENTITY_SIZE_MIN: f32 = 6.0;
pub const ENTITY_SIZE_MAX: f32 = 160.0;
pub const DEFAULT_ENTITY_SIZE: f32 = 24.0;

/// Speed clamp per axis, world units per second.
pub const VELOCITY_MAX: f32 = 600.0;
pub const GRAVITY_MAX: f32 = 4000.0;

pub const FRICTION_MIN: f32 = 0.0;
pub const FRICTION_MAX: f32 = 1.0;
pub const DEFAULT_FRICTION: f32 = 0.99;

pub const RESTITUTION_MIN: f32 = 0.0;
pub const RESTITUTION_MAX: f32 = 1.0;
pub const DEFAULT_RESTITUTION: f32 = 0.5;

pub const TIME_STEP_MIN: f32 = 1.0 / 240.0;
pub const TIME_STEP_MAX: f32 = 1.0 / 15.0;
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Hard cap on entities per description.
pub const MAX_ENTITIES: usize = 80;
