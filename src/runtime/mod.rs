//! The real-time runtime: input translation, physics, rule
//! evaluation, and the engine state machine that ties them together.

pub mod engine;
pub mod input;
pub mod physics;
pub mod rules;

pub use engine::{AimOverlay, Engine, EngineStatus, RenderFrame, StateSnapshot};
pub use input::{Direction, InputEvent};
pub use rules::RuleSet;
