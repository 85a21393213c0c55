//! Playbook loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - Discovery and loading in [`loader`]
//! - Validation in [`validator`]
//! - Variable interpolation in [`interpolation`]
//! - Layered parameter resolution in [`env_layer`]
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use workstation::config::{parse_playbook, validate};
//!
//! let yaml = r#"
//! steps:
//!   - name: git_email
//!     expect:
//!       command: git config --global user.email
//!       equals: ${email}
//!       remedy: git config --global user.email ${email}
//! "#;
//!
//! let playbook = parse_playbook(yaml, Path::new("playbook.yml")).unwrap();
//! validate(&playbook).unwrap();
//! assert_eq!(playbook.steps[0].name, "git_email");
//! ```

pub mod env_layer;
pub mod interpolation;
pub mod loader;
pub mod schema;
pub mod validator;

pub use env_layer::{EnvLayer, EnvLayerStack};
pub use interpolation::{
    extract_variables, parse_interpolation, resolve_string, InterpolationContext, Segment,
};
pub use loader::{
    load_playbook, parse_playbook, PlaybookSource, DEFAULT_PLAYBOOK, PLAYBOOK_ENV, STATE_DIR,
    USER_PLAYBOOK,
};
pub use schema::{
    CheckConfig, ConfirmConfig, ExpectConfig, LineConfig, Playbook, Settings, StepConfig,
};
pub use validator::{validate, validate_playbook, ValidationError, BUILTIN_VARIABLES};
