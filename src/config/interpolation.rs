//! Variable interpolation for playbook values.
//!
//! Playbook strings may reference environment values and playbook vars
//! using `${variable}` syntax.
//!
//! # Syntax
//!
//! - `${variable_name}` - replaced with variable value
//! - `$${escaped}` - produces literal `${escaped}` in output
//! - `$NAME` - left alone, so plain shell variables pass through
//!
//! # Example
//!
//! ```
//! use workstation::config::{resolve_string, InterpolationContext};
//!
//! let mut ctx = InterpolationContext::new();
//! ctx.builtins.insert("username".to_string(), "ada".to_string());
//! let line = resolve_string("git config user.name ${username}", &ctx).unwrap();
//! assert_eq!(line, "git config user.name ada");
//! ```

use crate::error::{Result, WorkstationError};
use std::collections::{HashMap, HashSet};

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Parse a string containing ${var} interpolations.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut current_literal = String::new();

    while let Some(c) = chars.next() {
        if c != '$' {
            current_literal.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                // $$ becomes $, and $${...} is copied through verbatim
                chars.next();
                current_literal.push('$');
                if chars.peek() == Some(&'{') {
                    for c in chars.by_ref() {
                        current_literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                }
            }
            Some('{') => {
                chars.next();

                if !current_literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut current_literal)));
                }

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                segments.push(Segment::Variable(var_name.trim().to_string()));
            }
            _ => current_literal.push(c),
        }
    }

    if !current_literal.is_empty() {
        segments.push(Segment::Literal(current_literal));
    }

    segments
}

/// Extract all variable names from an interpolated string.
pub fn extract_variables(input: &str) -> HashSet<String> {
    parse_interpolation(input)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Variable(name) => Some(name),
            _ => None,
        })
        .collect()
}

/// Context for variable resolution.
///
/// Built-in values (resolved environment, runner version) take priority
/// over playbook vars.
#[derive(Debug, Default, Clone)]
pub struct InterpolationContext {
    /// Built-in variables (username, arch, repo_path, version, ...)
    pub builtins: HashMap<String, String>,

    /// Variables declared in the playbook
    pub vars: HashMap<String, String>,
}

impl InterpolationContext {
    /// Create a context holding only the runner version.
    pub fn new() -> Self {
        let mut builtins = HashMap::new();
        builtins.insert(
            "version".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );

        Self {
            builtins,
            ..Default::default()
        }
    }

    /// Add playbook variables.
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.builtins
            .get(name)
            .or_else(|| self.vars.get(name))
            .map(String::as_str)
    }
}

/// Resolve all variables in an interpolated string.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any variable is not found in the context.
pub fn resolve_string(input: &str, context: &InterpolationContext) -> Result<String> {
    let mut result = String::new();

    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value =
                    context
                        .resolve(&name)
                        .ok_or_else(|| WorkstationError::ConfigValidationError {
                            message: format!("Unresolved variable: ${{{}}}", name),
                        })?;
                result.push_str(value);
            }
        }
    }

    Ok(result)
}
