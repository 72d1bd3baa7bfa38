//! Defines the `JunctionTreeEngine`, which answers marginal queries by exact inference over a
//! compiled junction tree, and the `Marginals` it returns.

use crate::config::{EngineConfig, RootSelection};
use crate::model::directed::DirectedModel;
use crate::model::moralize::moralize;
use crate::model::Model;
use crate::util::{BbnError, EvidenceError, ModelError, Result};
use crate::variable::{Assignment, Value, VarId, Variable};
use super::initialize::{apply_evidence, initialize, Beliefs};
use super::junction_tree::JunctionTree;
use super::propagate::propagate;
use super::triangulate::triangulate;
use super::{resolve_evidence, ConditionalInferenceEngine};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;


/// The marginal distribution of a single `Variable`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Distribution {
    variable: String,
    values: Vec<(Value, f64)>
}

impl Distribution {

    /// Pair the domain of `var` with its probabilities
    pub fn new(var: &Variable, probabilities: Vec<f64>) -> Self {
        Distribution {
            variable: String::from(var.name()),
            values: var.domain().iter().cloned().zip(probabilities).collect()
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The ```(value, probability)``` pairs, in domain order
    pub fn values(&self) -> &[(Value, f64)] {
        &self.values
    }

    /// The probability of a value, if it is in the domain
    pub fn probability(&self, value: &Value) -> Option<f64> {
        self.values.iter().find(|(v, _)| v == value).map(|&(_, p)| p)
    }

    /// The total probability, 1 up to rounding
    pub fn total(&self) -> f64 {
        self.values.iter().map(|&(_, p)| p).sum()
    }
}


/// The marginal distributions of every `Variable` of a model, in `VarId` order
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Marginals {
    distributions: Vec<Distribution>
}

impl Marginals {

    pub fn new(distributions: Vec<Distribution>) -> Self {
        Marginals { distributions }
    }

    /// The probability that `variable` takes `value`
    pub fn get<V: Into<Value>>(&self, variable: &str, value: V) -> Option<f64> {
        self.distribution(variable).and_then(|d| d.probability(&value.into()))
    }

    /// The distribution of `variable`
    pub fn distribution(&self, variable: &str) -> Option<&Distribution> {
        self.distributions.iter().find(|d| d.variable == variable)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Distribution> {
        self.distributions.iter()
    }

    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }
}


/// Exact inference over a junction tree.
///
/// Compiling the engine moralizes and triangulates the model, assembles the junction tree and
/// multiplies the factors into the clique beliefs. All of this is done once. Every query works
/// on a copy of the evidence-free beliefs, so the engine is never mutated and can be shared
/// between threads.
#[derive(Clone, Debug)]
pub struct JunctionTreeEngine {

    /// The `Variable`s of the model, indexed by `VarId`
    variables: Vec<Variable>,

    /// Name to `VarId`
    names: IndexMap<String, VarId>,

    tree: JunctionTree,

    /// The evidence-free, uncalibrated beliefs
    beliefs: Beliefs,

    /// The smallest clique containing each `Variable`
    homes: Vec<usize>,

    config: EngineConfig

}

impl JunctionTreeEngine {

    /// Compile the junction tree of `model` with the default configuration
    pub fn new(model: &DirectedModel) -> Result<Self> {
        JunctionTreeEngine::with_config(model, EngineConfig::default())
    }

    /// Compile the junction tree of `model`.
    ///
    /// # Errors
    /// * `ModelError::NotACpt` if factors are validated and one is not a CPT
    /// * `ModelError::DisconnectedForest` if the model has independent components and they are not
    ///   linked
    /// * `ModelError::NoContainingClique` if the junction tree does not cover a family
    pub fn with_config(model: &DirectedModel, config: EngineConfig) -> Result<Self> {
        if config.validate_factors {
            model.validate(config.tolerance)?;
        }

        let cards = model.cardinalities();
        let moral = moralize(model);
        let triangulation = triangulate(&moral, &cards);
        let tree = JunctionTree::build(triangulation.cliques, &cards, config.link_components)?;
        let beliefs = initialize(model, &tree)?;

        let homes = model.variables()
                         .iter()
                         .enumerate()
                         .map(|(v, var)| {
                             tree.smallest_containing(&[v]).ok_or_else(|| {
                                 BbnError::from(ModelError::NoContainingClique(String::from(var.name())))
                             })
                         })
                         .collect::<Result<Vec<usize>>>()?;

        let names = model.variables()
                         .iter()
                         .enumerate()
                         .map(|(v, var)| (String::from(var.name()), v))
                         .collect();

        debug!(
            variables = model.num_variables(),
            cliques = tree.len(),
            treewidth = tree.treewidth(),
            "compiled junction tree"
        );

        Ok(JunctionTreeEngine {
            variables: model.variables().to_vec(),
            names,
            tree,
            beliefs,
            homes,
            config
        })
    }

    pub fn tree(&self) -> &JunctionTree {
        &self.tree
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The root clique selected by the configuration
    pub fn root(&self) -> usize {
        match self.config.root {
            RootSelection::First => 0,
            RootSelection::Largest => self.tree.largest().unwrap_or(0),
            RootSelection::Clique(id) => id
        }
    }

    /// Compute the marginal distribution of every `Variable` given the evidence, propagating
    /// from the configured root.
    pub fn query(&self, evidence: &Assignment) -> Result<Marginals> {
        self.query_from(evidence, self.root())
    }

    /// Compute the marginal distribution of every `Variable` given the evidence, propagating
    /// from `root`.
    ///
    /// Without evidence the distributions are read off the calibrated beliefs as they are. With
    /// evidence each distribution is renormalized by its own sum.
    ///
    /// # Errors
    /// * `EvidenceError::UnknownVariable` if the evidence names a variable not in the model
    /// * `EvidenceError::InvalidValue` if an observed value is not in the domain
    /// * `EvidenceError::Impossible` if the evidence has zero probability
    /// * `BbnError::UnknownClique` if `root` is not a clique of the junction tree
    pub fn query_from(&self, evidence: &Assignment, root: usize) -> Result<Marginals> {
        let observed = resolve_evidence(self, evidence)?;
        debug!(evidence = observed.len(), root, "junction tree query");

        let beliefs = self.calibrate(&observed, root)?;

        let mut distributions = Vec::with_capacity(self.variables.len());
        for (v, var) in self.variables.iter().enumerate() {
            let mut probabilities = self.marginal_of(&beliefs, v)?;

            if ! observed.is_empty() {
                let z: f64 = probabilities.iter().sum();
                if z <= 0.0 {
                    return Err(BbnError::from(EvidenceError::Impossible));
                }
                probabilities.iter_mut().for_each(|p| *p /= z);
            }

            distributions.push(Distribution::new(var, probabilities));
        }

        Ok(Marginals::new(distributions))
    }

    /// Enter the evidence into a copy of the evidence-free beliefs and propagate from `root`.
    ///
    /// # Args
    /// * `evidence`: ```(variable, value index)``` pairs
    pub fn calibrate(&self, evidence: &[(VarId, usize)], root: usize) -> Result<Beliefs> {
        let mut beliefs = self.beliefs.clone();
        if self.tree.is_empty() {
            return Ok(beliefs);
        }

        apply_evidence(&mut beliefs, evidence);
        propagate(&self.tree, &mut beliefs, root)?;
        Ok(beliefs)
    }

    /// The (unnormalized) marginal of `variable` in calibrated `beliefs`, read off the smallest
    /// clique containing it
    ///
    /// # Errors
    /// * `BbnError::UnknownVariable` if the model has no such variable
    pub fn marginal(&self, beliefs: &Beliefs, variable: &str) -> Result<Vec<f64>> {
        let v = self.lookup_variable(variable).ok_or_else(|| BbnError::UnknownVariable(String::from(variable)))?;
        self.marginal_of(beliefs, v)
    }

    fn marginal_of(&self, beliefs: &Beliefs, v: VarId) -> Result<Vec<f64>> {
        let home = self.homes[v];
        beliefs.clique(home).ok_or(BbnError::UnknownClique(home))?.marginal(v)
    }
}

impl Model for JunctionTreeEngine {

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn lookup_variable(&self, name: &str) -> Option<VarId> {
        self.names.get(name).cloned()
    }
}

impl ConditionalInferenceEngine for JunctionTreeEngine {

    fn infer(&self, evidence: &Assignment) -> Result<Marginals> {
        self.query(evidence)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::Factor;
    use crate::init::Initialization;
    use crate::model::directed::DirectedModelBuilder;

    use ndarray::prelude as nd;

    /// The sprinkler network: rain -> sprinkler, (rain, sprinkler) -> grass_wet
    fn sprinkler() -> DirectedModel {
        DirectedModelBuilder::new()
            .with_cpt("rain", &[], Initialization::Bernoulli(0.2))
            .with_cpt("sprinkler", &["rain"], Initialization::Table(nd::arr2(&[[0.01, 0.99], [0.4, 0.6]]).into_dyn()))
            .with_factor(Factor::cpt("grass_wet", &["sprinkler", "rain"], |a| {
                let p = match (a["sprinkler"] == true, a["rain"] == true) {
                    (true, true) => 0.99,
                    (true, false) => 0.9,
                    (false, true) => 0.8,
                    (false, false) => 0.0
                };
                if a["grass_wet"] == true { p } else { 1.0 - p }
            }))
            .build()
            .unwrap()
    }

    #[test]
    fn sprinkler_marginals() {
        let engine = JunctionTreeEngine::new(&sprinkler()).unwrap();
        assert_eq!(1, engine.tree().len());

        let marginals = engine.query(&Assignment::new()).unwrap();
        assert_eq!(3, marginals.len());
        assert!((0.2 - marginals.get("rain", true).unwrap()).abs() < 1e-9);
        assert!((0.322 - marginals.get("sprinkler", true).unwrap()).abs() < 1e-9);
        assert!((0.44838 - marginals.get("grass_wet", true).unwrap()).abs() < 1e-9);

        for d in marginals.iter() {
            assert!((1.0 - d.total()).abs() < 1e-9);
        }
    }

    #[test]
    fn sprinkler_evidence() {
        let engine = JunctionTreeEngine::new(&sprinkler()).unwrap();
        let marginals = engine.query(&Assignment::new().with("grass_wet", true)).unwrap();

        // P(rain | grass_wet) = 0.16038 / 0.44838
        assert!((0.16038 / 0.44838 - marginals.get("rain", true).unwrap()).abs() < 1e-9);
        assert_eq!(Some(1.0), marginals.get("grass_wet", true));
        assert_eq!(Some(0.0), marginals.get("grass_wet", false));
        assert_eq!(None, marginals.get("grass_wet", 1));
        assert_eq!(None, marginals.get("snow", true));
    }

    #[test]
    fn bad_evidence() {
        let engine = JunctionTreeEngine::new(&sprinkler()).unwrap();

        let err = engine.query(&Assignment::new().with("snow", true)).unwrap_err();
        assert_eq!(BbnError::from(EvidenceError::UnknownVariable(String::from("snow"))), err);

        let err = engine.query(&Assignment::new().with("rain", "yes")).unwrap_err();
        assert_eq!(
            BbnError::from(EvidenceError::InvalidValue { variable: String::from("rain"), value: String::from("yes") }),
            err
        );

        // the grass is never wet without a cause
        let evidence = Assignment::new().with("rain", false).with("sprinkler", false).with("grass_wet", true);
        assert_eq!(Err(BbnError::from(EvidenceError::Impossible)), engine.query(&evidence));

        assert!(! err.is_fatal());
    }

    #[test]
    fn roots() {
        let model = DirectedModelBuilder::new()
            .with_cpt("a", &[], Initialization::Random(1))
            .with_cpt("b", &["a"], Initialization::Random(2))
            .with_cpt("c", &["b"], Initialization::Random(3))
            .with_cpt("d", &["c"], Initialization::Random(4))
            .build()
            .unwrap();

        let engine = JunctionTreeEngine::new(&model).unwrap();
        assert_eq!(3, engine.tree().len());

        let evidence = Assignment::new().with("d", false);
        let expected = engine.query(&evidence).unwrap();
        for root in 0..engine.tree().len() {
            let marginals = engine.query_from(&evidence, root).unwrap();
            for (x, y) in expected.iter().zip(marginals.iter()) {
                for (&(_, p), &(_, q)) in x.values().iter().zip(y.values().iter()) {
                    assert!((p - q).abs() < 1e-9);
                }
            }
        }

        assert_eq!(Err(BbnError::UnknownClique(3)), engine.query_from(&evidence, 3));

        let config = EngineConfig::default().with_root(RootSelection::Clique(7));
        let engine = JunctionTreeEngine::with_config(&model, config).unwrap();
        assert_eq!(Err(BbnError::UnknownClique(7)), engine.query(&evidence));
    }

    #[test]
    fn marginal_lookup() {
        let engine = JunctionTreeEngine::new(&sprinkler()).unwrap();
        let beliefs = engine.calibrate(&[], 0).unwrap();

        let rain = engine.marginal(&beliefs, "rain").unwrap();
        assert!((0.2 - rain[0]).abs() < 1e-9);
        assert_eq!(Err(BbnError::UnknownVariable(String::from("snow"))), engine.marginal(&beliefs, "snow"));
    }

    #[test]
    fn validation() {
        let model = DirectedModelBuilder::new()
            .with_factor(Factor::cpt("a", &[], |_| 0.7))
            .build()
            .unwrap();

        let err = JunctionTreeEngine::new(&model).unwrap_err();
        assert_eq!(BbnError::from(ModelError::NotACpt(String::from("a"))), err);

        // unvalidated factors are taken as they are
        let engine = JunctionTreeEngine::with_config(&model, EngineConfig::default().with_validation(false)).unwrap();
        let marginals = engine.query(&Assignment::new()).unwrap();
        assert_eq!(Some(0.7), marginals.get("a", true));
    }

    #[test]
    fn independent_components() {
        let model = DirectedModelBuilder::new()
            .with_cpt("a", &[], Initialization::Bernoulli(0.3))
            .with_cpt("b", &[], Initialization::Bernoulli(0.9))
            .build()
            .unwrap();

        let err = JunctionTreeEngine::new(&model).unwrap_err();
        assert_eq!(BbnError::from(ModelError::DisconnectedForest(2)), err);

        let config = EngineConfig::default().with_linked_components(true);
        let engine = JunctionTreeEngine::with_config(&model, config).unwrap();
        let marginals = engine.query(&Assignment::new().with("a", false)).unwrap();
        assert!((0.9 - marginals.get("b", true).unwrap()).abs() < 1e-12);
        assert_eq!(Some(0.0), marginals.get("a", true));
    }

    #[test]
    fn empty_model() {
        let model = DirectedModelBuilder::new().build().unwrap();
        let engine = JunctionTreeEngine::new(&model).unwrap();
        assert!(engine.tree().is_empty());
        assert!(engine.query(&Assignment::new()).unwrap().is_empty());
    }

    #[test]
    fn serialize() {
        let engine = JunctionTreeEngine::new(&sprinkler()).unwrap();
        let marginals = engine.query(&Assignment::new().with("rain", true)).unwrap();
        let json = serde_json::to_value(&marginals).unwrap();

        assert_eq!("rain", json["distributions"][0]["variable"]);
        assert_eq!(true, json["distributions"][0]["values"][0][0]);
        assert_eq!(1.0, json["distributions"][0]["values"][0][1]);
    }

    #[test]
    fn shared_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<JunctionTreeEngine>();
        assert_send_sync::<DirectedModel>();

        let engine = JunctionTreeEngine::new(&sprinkler()).unwrap();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let marginals = engine.query(&Assignment::new()).unwrap();
                    assert!((0.322 - marginals.get("sprinkler", true).unwrap()).abs() < 1e-9);
                });
            }
        });
    }
}
