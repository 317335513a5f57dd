use std::collections::HashMap;

use super::types::Key;

/// Returned when an action name has no binding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action `{0}`")]
pub struct UnknownAction(pub String);

/// Immutable table from logical action names to key codes.
///
/// Built once at startup; there is no way to rebind after construction.
#[derive(Debug, Clone)]
pub struct ActionMap {
    bindings: HashMap<String, u32>,
}

impl ActionMap {
    /// Builds a map from `(action, key code)` pairs. Later duplicates win.
    pub fn new<I, S>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self {
            bindings: bindings
                .into_iter()
                .map(|(name, code)| (name.into(), code))
                .collect(),
        }
    }

    /// Resolves `action` to its bound key code.
    pub fn resolve(&self, action: &str) -> Result<u32, UnknownAction> {
        self.bindings
            .get(action)
            .copied()
            .ok_or_else(|| UnknownAction(action.to_string()))
    }

    /// Bound action names, in no particular order.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for ActionMap {
    /// First-person defaults: WASD movement, Space to jump.
    fn default() -> Self {
        let bind = |key: Key| key.code().unwrap_or_default();
        Self::new([
            ("forward", bind(Key::W)),
            ("backward", bind(Key::S)),
            ("left", bind(Key::A)),
            ("right", bind(Key::D)),
            ("jump", bind(Key::Space)),
        ])
    }
}
