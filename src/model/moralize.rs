//! Moralization of a `DirectedModel`

use super::directed::DirectedModel;
use super::undirected::UndirectedGraph;
use super::Model;

use itertools::Itertools;
use tracing::debug;

/// Compute the moral graph of a `DirectedModel`.
///
/// The moral graph holds every parent-child edge of the DAG, undirected, plus an edge between
/// every pair of parents that share a child ("marrying" the parents).
pub fn moralize(model: &DirectedModel) -> UndirectedGraph {
    let mut graph = UndirectedGraph::from(model);

    let mut married = 0;
    for v in 0..model.num_variables() {
        for (&a, &b) in model.parents(v).iter().tuple_combinations() {
            if graph.add_edge(a, b) {
                married += 1;
            }
        }
    }

    debug!(nodes = graph.len(), edges = graph.num_edges(), married, "moralized model");
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::Initialization;
    use crate::model::directed::DirectedModelBuilder;

    #[test]
    fn v_structure() {
        let model = DirectedModelBuilder::new()
            .with_cpt("a", &[], Initialization::Uniform)
            .with_cpt("b", &[], Initialization::Uniform)
            .with_cpt("c", &["a", "b"], Initialization::Uniform)
            .build()
            .unwrap();

        let moral = moralize(&model);
        assert_eq!(vec![(0, 1), (0, 2), (1, 2)], moral.edges());
    }

    #[test]
    fn already_married() {
        // the parents of c are already connected, no edge is added
        let model = DirectedModelBuilder::new()
            .with_cpt("a", &[], Initialization::Uniform)
            .with_cpt("b", &["a"], Initialization::Uniform)
            .with_cpt("c", &["a", "b"], Initialization::Uniform)
            .build()
            .unwrap();

        let moral = moralize(&model);
        assert_eq!(3, moral.num_edges());
    }

    #[test]
    /// The Huang & Darwiche example network: f has parents d and e, h has parents e and g
    fn huang_darwiche() {
        let model = DirectedModelBuilder::new()
            .with_cpt("a", &[], Initialization::Uniform)
            .with_cpt("b", &["a"], Initialization::Uniform)
            .with_cpt("c", &["a"], Initialization::Uniform)
            .with_cpt("d", &["b"], Initialization::Uniform)
            .with_cpt("e", &["c"], Initialization::Uniform)
            .with_cpt("f", &["d", "e"], Initialization::Uniform)
            .with_cpt("g", &["c"], Initialization::Uniform)
            .with_cpt("h", &["e", "g"], Initialization::Uniform)
            .build()
            .unwrap();

        let moral = moralize(&model);
        assert_eq!(11, moral.num_edges());
        assert!(moral.has_edge(3, 4));
        assert!(moral.has_edge(4, 6));
        assert!(! moral.has_edge(1, 2));
    }
}
