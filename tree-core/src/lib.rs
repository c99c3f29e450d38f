//! Seeded procedural tree generation for instanced rendering.
//!
//! Main components:
//! - [`seed`] - sine-hash PRNG and the seed cursor that orders draws.
//! - [`branch`] - the recursive branch generator.
//! - [`instance_buffer`] - packed per-instance attribute arrays.
//! - [`tree`] - branch skeleton recorded during generation.
//! - [`color`] - HSL to RGB conversion.
//! - [`config`] - tree parameters, defaults, JSON loading and validation.
//! - [`pulse`] - effector sweeps animating the instances' time channel.
//! - [`error`] - configuration errors.
//! - [`types`] - shared type aliases and IDs.

pub mod branch;
pub mod color;
pub mod config;
pub mod error;
pub mod instance_buffer;
pub mod pulse;
pub mod seed;
pub mod tree;
pub mod types;

pub use branch::{GeneratedTree, generate};
pub use config::{TreeConfig, TreeParams};
pub use error::ConfigError;
pub use instance_buffer::{Instance, InstanceBuffers, PointRecord};
