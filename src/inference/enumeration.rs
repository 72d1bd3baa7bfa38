//! Defines a `ConditionalInferenceEngine` that answers queries by enumerating the full joint
//! distribution of the model.
//!
//! The joint table grows exponentially with the number of `Variable`s, so this engine is only
//! practical for small models. It is the reference the junction tree engine is checked against.

use crate::model::directed::DirectedModel;
use crate::model::Model;
use crate::potential::Potential;
use crate::util::{BbnError, EvidenceError, Result};
use crate::variable::{Assignment, VarId, Variable};
use super::query::{Distribution, Marginals};
use super::{resolve_evidence, ConditionalInferenceEngine};

use tracing::debug;

pub struct EnumerationEngine<'a> {

    /// The model the joint distribution was built from
    model: &'a DirectedModel,

    /// The joint distribution, one axis per `Variable` in `VarId` order
    joint: Potential

}

impl<'a> EnumerationEngine<'a> {

    /// Build the joint distribution of `model` by the chain rule
    pub fn new(model: &'a DirectedModel) -> Self {
        let scope: Vec<VarId> = (0..model.num_variables()).collect();
        let mut joint = Potential::ones(&scope, &model.cardinalities());

        for v in scope.iter().cloned() {
            let family = model.family(v);
            let mut sub = vec![0; family.len()];
            joint.multiply_by(|config| {
                for (s, &f) in sub.iter_mut().zip(family.iter()) {
                    *s = config[f];
                }
                model.evaluate_family(v, &sub)
            });
        }

        debug!(variables = scope.len(), entries = joint.table().len(), "enumerated joint distribution");
        EnumerationEngine { model, joint }
    }

    /// The joint distribution of the model
    pub fn joint(&self) -> &Potential {
        &self.joint
    }
}

impl<'a> Model for EnumerationEngine<'a> {

    fn variables(&self) -> &[Variable] {
        self.model.variables()
    }

    fn lookup_variable(&self, name: &str) -> Option<VarId> {
        self.model.lookup_variable(name)
    }
}

impl<'a> ConditionalInferenceEngine for EnumerationEngine<'a> {

    /// Zero the joint entries that disagree with the evidence, then sum onto each `Variable` and
    /// normalize.
    fn infer(&self, evidence: &Assignment) -> Result<Marginals> {
        let observed = resolve_evidence(self, evidence)?;

        let mut joint = self.joint.clone();
        for &(v, value) in observed.iter() {
            joint.mask(v, value);
        }

        let z = joint.sum();
        if z <= 0.0 {
            return Err(BbnError::from(EvidenceError::Impossible));
        }

        let distributions = self.variables()
                                .iter()
                                .enumerate()
                                .map(|(v, var)| {
                                    let probabilities = joint.marginal(v)?.into_iter().map(|p| p / z).collect();
                                    Ok(Distribution::new(var, probabilities))
                                })
                                .collect::<Result<Vec<_>>>()?;

        Ok(Marginals::new(distributions))
    }

}
