//! Layer resolution: maps fully-qualified element names to layers.

use crate::config::LayerConfig;

/// Resolves element names to architecture layer names.
///
/// Resolution uses longest-prefix-match so that more specific package
/// prefixes take priority over broader ones.
#[derive(Debug, Clone)]
pub struct LayerResolver {
    /// (package prefix, layer index) sorted by prefix length descending.
    prefixes: Vec<(String, usize)>,
    /// Layer names in definition order.
    layers: Vec<String>,
}

impl LayerResolver {
    /// Build a resolver from config.
    #[must_use]
    pub fn new(config: &LayerConfig) -> Self {
        let layers: Vec<String> = config.layers.iter().map(|l| l.name.clone()).collect();
        let mut prefixes: Vec<(String, usize)> = config
            .layers
            .iter()
            .enumerate()
            .flat_map(|(i, l)| l.packages.iter().map(move |p| (p.clone(), i)))
            .collect();
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { prefixes, layers }
    }

    /// Which layer does this element belong to?
    #[must_use]
    pub fn resolve(&self, qualified_name: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(prefix, _)| {
                qualified_name
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
            })
            .map(|(_, i)| self.layers[*i].as_str())
    }

    /// Returns `true` if `qualified_name` belongs to `layer`.
    #[must_use]
    pub fn is_in(&self, qualified_name: &str, layer: &str) -> bool {
        self.resolve(qualified_name) == Some(layer)
    }

    /// Layer names in definition order.
    #[must_use]
    pub fn layers(&self) -> &[String] {
        &self.layers
    }
}
