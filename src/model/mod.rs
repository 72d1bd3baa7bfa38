//! Defines a `Model`, a graphical model over a set of named discrete `Variable`s, together with
//! the graph transformations junction tree compilation is built from.

use crate::variable::{VarId, Variable};

/// The `Model` trait represents a Probabilistic Graphical Model whose `Variable`s are addressed by
/// a stable `VarId`.
pub trait Model {

    /// Get all `Variable`s in the model, indexed by `VarId`.
    fn variables(&self) -> &[Variable];


    /// Lookup a `Variable` in the `Model` based on the name
    fn lookup_variable(&self, name: &str) -> Option<VarId>;


    /// Lookup a `Variable`'s name in the `Model`.
    fn lookup_name(&self, var: VarId) -> Option<&str> {
        self.variables().get(var).map(|v| v.name())
    }


    /// Get the number of `Variable`s in the `Model`
    fn num_variables(&self) -> usize {
        self.variables().len()
    }


    /// The cardinality of every `Variable`, indexed by `VarId`
    fn cardinalities(&self) -> Vec<usize> {
        self.variables().iter().map(|v| v.cardinality()).collect()
    }
}

pub mod directed;
pub mod moralize;
pub mod undirected;
