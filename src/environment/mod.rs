//! Provisioning environment: the overridable parameters every step sees.

pub mod resolver;

pub use resolver::{Environment, OVERRIDES, SOURCE_DEFAULT, SOURCE_OVERRIDE};
