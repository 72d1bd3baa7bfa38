//! Defines the interface to inference engines, and the stages of junction tree compilation and
//! propagation.

use crate::model::Model;
use crate::util::{BbnError, EvidenceError, Result};
use crate::variable::{Assignment, VarId};

pub mod enumeration;
pub mod initialize;
pub mod junction_tree;
pub mod propagate;
pub mod query;
pub mod triangulate;

pub use self::enumeration::EnumerationEngine;
pub use self::query::{Distribution, JunctionTreeEngine, Marginals};


/// A `ConditionalInferenceEngine` is capable of answering Conditional Probability Queries of the
/// form ```P(X | E = e)``` for every `Variable` ```X``` of a model at once.
pub trait ConditionalInferenceEngine {

    /// Infer the marginal distribution ```P(X | evidence)``` of every `Variable` ```X```
    fn infer(&self, evidence: &Assignment) -> Result<Marginals>;

}


/// Resolve by-name evidence into ```(variable, value index)``` pairs.
///
/// # Errors
/// * `EvidenceError::UnknownVariable` if a name is not in the model
/// * `EvidenceError::InvalidValue` if a value is not in the domain of its variable
pub(crate) fn resolve_evidence<M>(model: &M, evidence: &Assignment) -> Result<Vec<(VarId, usize)>>
    where M: Model + ?Sized
{
    evidence.iter()
            .map(|(name, value)| {
                let v = model.lookup_variable(name)
                             .ok_or_else(|| EvidenceError::UnknownVariable(String::from(name)))?;

                let idx = model.variables()[v]
                               .index_of(value)
                               .ok_or_else(|| EvidenceError::InvalidValue {
                                   variable: String::from(name),
                                   value: value.to_string()
                               })?;

                Ok((v, idx))
            })
            .collect::<std::result::Result<Vec<_>, EvidenceError>>()
            .map_err(BbnError::from)
}
