//! Layered parameter resolution.
//!
//! Each provisioning parameter has a computed default that the process
//! environment may override. Layers remember where a value came from so the
//! resolved environment can be explained in debug output.

use std::collections::HashMap;

/// One source of parameter values.
///
/// # Example
///
/// ```
/// use workstation::config::EnvLayer;
///
/// let mut layer = EnvLayer::new("defaults");
/// layer.set("username", "ada");
///
/// assert_eq!(layer.get("username"), Some("ada"));
/// assert_eq!(layer.source, "defaults");
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvLayer {
    /// Values in this layer, keyed by parameter name.
    pub vars: HashMap<String, String>,
    /// Source of this layer (for debugging).
    pub source: String,
}

impl EnvLayer {
    /// Create a new layer with the given source name.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            vars: HashMap::new(),
            source: source.into(),
        }
    }

    /// Build a layer from process variables.
    ///
    /// `mapping` pairs a parameter name with the environment variable that
    /// overrides it. Unset and blank variables are ignored.
    pub fn from_process(
        source: impl Into<String>,
        process: &HashMap<String, String>,
        mapping: &[(&str, &str)],
    ) -> Self {
        let mut layer = Self::new(source);
        for (key, var) in mapping {
            if let Some(value) = process.get(*var) {
                let value = value.trim();
                if !value.is_empty() {
                    layer.set(*key, value);
                }
            }
        }
        layer
    }

    /// Add a value to this layer.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Look up a value in this layer only.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Check if this layer has a value.
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Check if this layer is empty.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Ordered stack of layers.
///
/// The first layer pushed has lowest priority, the last has highest.
///
/// # Example
///
/// ```
/// use workstation::config::{EnvLayer, EnvLayerStack};
///
/// let mut defaults = EnvLayer::new("default");
/// defaults.set("arch", "x86_64");
/// defaults.set("username", "user");
///
/// let mut overrides = EnvLayer::new("environment");
/// overrides.set("username", "ada");
///
/// let mut stack = EnvLayerStack::new();
/// stack.push(defaults);
/// stack.push(overrides);
///
/// assert_eq!(stack.get("username"), Some("ada"));
/// assert_eq!(stack.source_of("username"), Some("environment"));
/// assert_eq!(stack.source_of("arch"), Some("default"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvLayerStack {
    layers: Vec<EnvLayer>,
}

impl EnvLayerStack {
    /// Create a new empty stack.
    pub fn new() -> Self {
        Self { layers: vec![] }
    }

    /// Add a layer above every existing one.
    pub fn push(&mut self, layer: EnvLayer) {
        self.layers.push(layer);
    }

    /// Resolved value: the highest layer that contains the key wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.layers.iter().rev().find_map(|layer| layer.get(key))
    }

    /// Source of the layer that supplies `key`.
    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.contains(key))
            .map(|layer| layer.source.as_str())
    }

    /// Every resolved value.
    pub fn resolve(&self) -> HashMap<String, String> {
        let mut result = HashMap::new();
        for layer in &self.layers {
            result.extend(layer.vars.clone());
        }
        result
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}
