//! Arcade Forge — turn a short natural-language prompt into a fully
//! structured, validated, deterministically reproducible mini-game
//! description, then run it in a small real-time simulation loop.
//!
//! The pipeline is a chain of pure stages: intent extraction, template
//! building, repair, normalization, and validation. The compile entry
//! point never fails and never emits a description that fails
//! validation; every error mode degrades to a playable fallback.

pub mod core;
pub mod runtime;
pub mod schema;

pub use crate::core::pipeline::{compile, CompileOptions, CompileOutput, Compiler};
pub use crate::core::validate::{validate, Validation};
pub use crate::runtime::engine::{Engine, EngineStatus, StateSnapshot};
pub use crate::schema::description::Description;
pub use crate::schema::intent::Intent;
