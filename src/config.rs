//! Configuration of the junction tree inference engine

use serde::{Deserialize, Serialize};

/// The default tolerance when checking that a factor is a normalized distribution
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Which clique of the junction tree propagation starts from.
///
/// The marginals do not depend on the root; only the order of the messages does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootSelection {
    /// The clique with the smallest id
    First,

    /// The clique with the most variables, smallest id on ties
    Largest,

    /// A specific clique
    Clique(usize)
}

impl Default for RootSelection {
    fn default() -> Self {
        RootSelection::First
    }
}


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {

    /// How far a distribution of a factor may sum away from 1
    pub tolerance: f64,

    /// Check that every factor is a conditional probability table when the engine is compiled
    pub validate_factors: bool,

    /// The root clique of propagation
    pub root: RootSelection,

    /// Join independent sub-networks with empty sepsets instead of rejecting them
    pub link_components: bool

}

impl Default for EngineConfig {

    fn default() -> Self {
        EngineConfig {
            tolerance: DEFAULT_TOLERANCE,
            validate_factors: true,
            root: RootSelection::First,
            link_components: false
        }
    }

}

impl EngineConfig {

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_factors = validate;
        self
    }

    pub fn with_root(mut self, root: RootSelection) -> Self {
        self.root = root;
        self
    }

    pub fn with_linked_components(mut self, link: bool) -> Self {
        self.link_components = link;
        self
    }
}
