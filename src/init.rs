//! Module containing initialization routines for the conditional probability tables of a model.

use crate::factor::Factor;
use crate::util::{BbnError, ModelError, Result};
use crate::variable::Variable;

use ndarray::prelude as nd;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Alias f64 ndarray::ArrayD as Table
pub type Table = nd::ArrayD<f64>;

/// Defines possible ways to initialize a `Variable`s CPT.
///
/// Tables are laid out with one axis per parent, in the order the parents were declared, followed
/// by a final axis for the `Variable` itself. Every slice along the final axis is a distribution.
#[derive(Clone, Debug)]
pub enum Initialization {
    /// A uniform distribution over all possibilities
    Uniform,

    /// Randomly initialize the weights of the CPT, using the given seed
    Random(u64),

    /// A Bernoulli distribution with parameter ```p``` - the probability of the first value in
    /// the domain. Note that this `Initialization` is valid only for a two-valued `Variable` with
    /// no parents.
    Bernoulli(f64),

    /// A categorical distribution with parameters ```p_0, p_1...```, one per domain value.
    /// Note that this `Initialization` is valid only for a `Variable` with no parents.
    Categorical(Vec<f64>),

    /// User defined CPT
    Table(Table)
}


impl Initialization {

    /// Construct the CPT ```P(var | parents)```, initialized based on ```self```
    ///
    /// # Args
    /// * `var`: the `Variable` the CPT is a distribution over
    /// * `parents`: the parents of `var`, in the order of the table axes
    /// * `tolerance`: how far a distribution in the table may sum away from 1
    ///
    /// # Returns
    /// a `Factor` introducing `var`, looking its values up in the table
    ///
    /// # Errors
    /// * `ModelError::InvalidInitialization` if the initialization does not fit the scope
    /// * `ModelError::NotACpt` if the table is not a normalized, non-negative CPT
    pub fn build_cpt(self, var: &Variable, parents: &[&Variable], tolerance: f64) -> Result<Factor> {
        let invalid = |reason: &str| -> BbnError {
            BbnError::from(ModelError::InvalidInitialization {
                variable: String::from(var.name()),
                reason: String::from(reason)
            })
        };

        ///////////////////////////////////////////////////////////////////////////////
        // Check for errors
        if ! parents.is_empty() {
            match self {

                // A Bernoulli/categorical on a non-unit scope
                Initialization::Bernoulli(_) | Initialization::Categorical(_) => {
                    return Err(invalid("distribution is only valid for a variable without parents"));
                },

                _ => ()
            }
        }

        match self {

            // A Bernoulli distribution on a non-binary variable
            Initialization::Bernoulli(_) if var.cardinality() != 2 => {
                return Err(invalid("Bernoulli requires exactly two values"));
            },

            Initialization::Bernoulli(p) if ! (0.0..=1.0).contains(&p) => {
                return Err(invalid("Bernoulli parameter must lie in [0, 1]"));
            },

            // A categorical distribution with an incorrect number of parameters
            Initialization::Categorical(ref ps) if ps.len() != var.cardinality() => {
                return Err(invalid("one parameter per domain value is required"));
            },

            _ => ()
        }

        ///////////////////////////////////////////////////////////////////////////////
        // now, build CPT
        let mut shape: Vec<usize> = parents.iter().map(|v| v.cardinality()).collect();
        shape.push(var.cardinality());
        let last = nd::Axis(shape.len() - 1);

        let tbl = match self {
            Initialization::Uniform => {
                // normalizing constant is just the number of values
                let val = 1. / (var.cardinality() as f64);
                Table::from_elem(nd::IxDyn(&shape), val)
            },
            Initialization::Random(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut tbl = Table::random_using(nd::IxDyn(&shape), Uniform::new(1.0, 100.0), &mut rng);
                let z = tbl.sum_axis(last).insert_axis(last);
                tbl /= &z;
                tbl
            },
            Initialization::Bernoulli(p) => {
                nd::arr1(&[p, 1.0 - p]).into_dyn()
            },
            Initialization::Categorical(ps) => {
                nd::Array::from(ps).into_dyn()
            },
            Initialization::Table(tbl) => {
                if tbl.shape() != shape.as_slice() {
                    return Err(invalid("table shape does not match the cardinalities of the scope"));
                }
                tbl
            }
        };

        ///////////////////////////////////////////////////////////////////////////////
        // verify the table represents a CPT
        if tbl.iter().any(|&v| ! v.is_finite() || v < 0.0) {
            return Err(BbnError::from(ModelError::NotACpt(String::from(var.name()))));
        }

        if tbl.sum_axis(last).iter().any(|&z| (z - 1.0).abs() > tolerance) {
            return Err(BbnError::from(ModelError::NotACpt(String::from(var.name()))));
        }

        let axes: Vec<Variable> = parents.iter().map(|&v| v.clone()).chain(Some(var.clone())).collect();
        let names: Vec<&str> = parents.iter().map(|v| v.name()).collect();

        Ok(Factor::cpt(var.name(), &names, move |assignment| {
            let idx: Option<Vec<usize>> = axes.iter()
                                              .map(|v| assignment.get(v.name()).and_then(|val| v.index_of(val)))
                                              .collect();

            // values outside of the declared domains carry no mass
            match idx {
                Some(idx) => tbl[nd::IxDyn(&idx)],
                None => 0.0
            }
        }))
    }
}
