//! Initialization of the clique and sepset beliefs of a junction tree

use crate::model::directed::DirectedModel;
use crate::model::Model;
use crate::potential::Potential;
use crate::util::{BbnError, ModelError, Result};
use crate::variable::VarId;
use super::junction_tree::JunctionTree;

use tracing::debug;


/// The potentials of a junction tree: one per clique and one per sepset, indexed by id
#[derive(Clone, Debug, PartialEq)]
pub struct Beliefs {
    pub cliques: Vec<Potential>,
    pub sepsets: Vec<Potential>
}

impl Beliefs {

    /// Unit potentials over every clique and sepset of `tree`
    pub fn ones(tree: &JunctionTree, cards: &[usize]) -> Self {
        Beliefs {
            cliques: tree.cliques().iter().map(|c| Potential::ones(c.variables(), cards)).collect(),
            sepsets: tree.sepsets().iter().map(|s| Potential::ones(s.label(), cards)).collect()
        }
    }

    pub fn clique(&self, id: usize) -> Option<&Potential> {
        self.cliques.get(id)
    }

    pub fn sepset(&self, id: usize) -> Option<&Potential> {
        self.sepsets.get(id)
    }
}


/// Assign every factor of `model` to exactly one clique containing its family: the smallest such
/// clique, smallest id on ties.
///
/// # Returns
/// the variables whose factors each clique multiplies in, indexed by clique id
///
/// # Errors
/// * `ModelError::NoContainingClique` if no clique contains the family of a factor
pub fn assign_factors(model: &DirectedModel, tree: &JunctionTree) -> Result<Vec<Vec<VarId>>> {
    let mut assigned = vec![Vec::new(); tree.len()];

    for v in 0..model.num_variables() {
        match tree.smallest_containing(&model.family(v)) {
            Some(c) => assigned[c].push(v),
            None => {
                let name = model.lookup_name(v).unwrap_or_default();
                return Err(BbnError::from(ModelError::NoContainingClique(String::from(name))));
            }
        }
    }

    debug!(
        factors = model.num_variables(),
        cliques = assigned.iter().filter(|a| ! a.is_empty()).count(),
        "assigned factors to cliques"
    );

    Ok(assigned)
}

/// The evidence-free beliefs of the junction tree of `model`: every clique table is the product
/// of the factors assigned to it, every sepset table is 1.
pub fn initialize(model: &DirectedModel, tree: &JunctionTree) -> Result<Beliefs> {
    let cards = model.cardinalities();
    let mut beliefs = Beliefs::ones(tree, &cards);

    for (c, vars) in assign_factors(model, tree)?.into_iter().enumerate() {
        let potential = &mut beliefs.cliques[c];

        for v in vars {
            let family = model.family(v);
            // both scopes are sorted, and the family is a subset of the clique
            let axes: Vec<usize> = potential.scope()
                                            .iter()
                                            .enumerate()
                                            .filter(|&(_, u)| family.binary_search(u).is_ok())
                                            .map(|(i, _)| i)
                                            .collect();

            let mut sub = vec![0; axes.len()];
            potential.multiply_by(|config| {
                for (s, &axis) in sub.iter_mut().zip(axes.iter()) {
                    *s = config[axis];
                }
                model.evaluate_family(v, &sub)
            });
        }
    }

    Ok(beliefs)
}

/// Enter evidence: in every clique containing an observed variable, zero the entries that
/// disagree with the observation.
///
/// # Args
/// * `evidence`: ```(variable, value index)``` pairs
pub fn apply_evidence(beliefs: &mut Beliefs, evidence: &[(VarId, usize)]) {
    for &(var, value) in evidence.iter() {
        for potential in beliefs.cliques.iter_mut() {
            potential.mask(var, value);
        }
    }
}
