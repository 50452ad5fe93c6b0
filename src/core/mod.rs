//! Compile pipeline stages, leaf to root: seeding, intent extraction,
//! templates, repair, normalization, validation, and the driver.

pub mod intent;
pub mod normalize;
pub mod pipeline;
#[cfg(feature = "remote")]
pub mod remote;
pub mod repair;
pub mod seed;
pub mod templates;
pub mod validate;
