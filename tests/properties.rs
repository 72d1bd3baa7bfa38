//! Property tests over randomly generated networks: the junction tree engine must agree with
//! brute force enumeration, whatever the structure, cardinalities and CPTs.

use bbn::inference::triangulate::triangulate;
use bbn::model::moralize::moralize;
use bbn::{
    Assignment, ConditionalInferenceEngine, DirectedModel, DirectedModelBuilder, EngineConfig, EnumerationEngine,
    Initialization, JunctionTreeEngine, Marginals, Model
};

use proptest::prelude::*;
use proptest::sample::Index;

/// The shape of a random network: the cardinality and parents of each node, and a seed for its CPTs
#[derive(Clone, Debug)]
struct Network {
    cards: Vec<usize>,
    parents: Vec<Vec<usize>>,
    seed: u64
}

impl Network {

    fn name(i: usize) -> String {
        format!("x{}", i)
    }

    fn build(&self) -> DirectedModel {
        let mut builder = DirectedModelBuilder::new();
        for (i, ps) in self.parents.iter().enumerate() {
            let name = Network::name(i);
            let parents: Vec<String> = ps.iter().map(|&p| Network::name(p)).collect();
            let parents: Vec<&str> = parents.iter().map(|s| s.as_str()).collect();

            builder = builder
                .with_cpt(&name, &parents, Initialization::Random(self.seed.wrapping_add(i as u64)))
                .with_domain(&name, (0..self.cards[i] as i64).collect::<Vec<i64>>());
        }
        builder.build().unwrap()
    }
}

/// DAGs of 2 to 6 nodes, each with at most 3 parents drawn from the nodes before it
fn networks() -> impl Strategy<Value = Network> {
    (2usize..7).prop_flat_map(|n| {
        (
            prop::collection::vec(2usize..=4, n),
            prop::collection::vec(prop::collection::vec(0usize..6, 0..4), n),
            any::<u64>()
        ).prop_map(|(cards, candidates, seed)| {
            let parents = candidates.into_iter()
                                    .enumerate()
                                    .map(|(i, mut ps)| {
                                        ps.retain(|&p| p < i);
                                        ps.sort_unstable();
                                        ps.dedup();
                                        ps
                                    })
                                    .collect();
            Network { cards, parents, seed }
        })
    })
}

fn linked() -> EngineConfig {
    EngineConfig::default().with_linked_components(true)
}

fn agree(x: &Marginals, y: &Marginals, precision: f64) -> bool {
    x.len() == y.len() && x.iter().zip(y.iter()).all(|(d, e)| {
        d.variable() == e.variable()
            && d.values().iter().zip(e.values().iter()).all(|(&(_, p), &(_, q))| (p - q).abs() < precision)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matches_enumeration(network in networks(), var in any::<Index>(), value in any::<Index>()) {
        let model = network.build();
        let engine = JunctionTreeEngine::with_config(&model, linked()).unwrap();
        let reference = EnumerationEngine::new(&model);

        let prior = engine.infer(&Assignment::new()).unwrap();
        prop_assert!(agree(&reference.infer(&Assignment::new()).unwrap(), &prior, 1e-9));
        for d in prior.iter() {
            prop_assert!((1.0 - d.total()).abs() < 1e-9);
        }

        let v = var.index(network.cards.len());
        let x = value.index(network.cards[v]);
        let evidence = Assignment::new().with(&Network::name(v), x as i64);

        let posterior = engine.infer(&evidence).unwrap();
        prop_assert!(agree(&reference.infer(&evidence).unwrap(), &posterior, 1e-9));

        // the observed variable collapses onto its value
        let observed = posterior.distribution(&Network::name(v)).unwrap();
        for (i, &(_, p)) in observed.values().iter().enumerate() {
            let expected = if i == x { 1.0 } else { 0.0 };
            prop_assert!((expected - p).abs() < 1e-9);
        }
    }

    #[test]
    fn independent_of_root(network in networks(), var in any::<Index>()) {
        let model = network.build();
        let engine = JunctionTreeEngine::with_config(&model, linked()).unwrap();

        let v = var.index(network.cards.len());
        let evidence = Assignment::new().with(&Network::name(v), 0);

        let expected = engine.query_from(&evidence, 0).unwrap();
        for root in 1..engine.tree().len() {
            prop_assert!(agree(&expected, &engine.query_from(&evidence, root).unwrap(), 1e-9));
        }
    }

    #[test]
    fn junction_tree_structure(network in networks()) {
        let model = network.build();
        let engine = JunctionTreeEngine::with_config(&model, linked()).unwrap();
        let tree = engine.tree();

        prop_assert_eq!(tree.len() - 1, tree.sepsets().len());
        prop_assert!(tree.is_connected(None));
        prop_assert!(tree.verify_running_intersection());

        for s in tree.sepsets() {
            // removing any sepset splits the tree
            prop_assert!(! tree.is_connected(Some(s.id())));
        }

        for v in 0..model.num_variables() {
            prop_assert!(tree.smallest_containing(&model.family(v)).is_some());
        }
    }

    #[test]
    fn triangulation_is_idempotent(network in networks()) {
        let model = network.build();
        let cards = model.cardinalities();
        let first = triangulate(&moralize(&model), &cards);
        let second = triangulate(&first.chordal, &cards);

        prop_assert!(second.fill_ins.is_empty());
        prop_assert_eq!(&first.chordal, &second.chordal);

        let mut x = first.cliques.clone();
        let mut y = second.cliques.clone();
        x.sort();
        y.sort();
        prop_assert_eq!(x, y);
    }
}
