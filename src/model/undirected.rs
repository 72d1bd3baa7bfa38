//! Defines an `UndirectedGraph`, the Markovian view of a model used while compiling a junction
//! tree.

use crate::variable::VarId;
use super::directed::DirectedModel;
use super::Model;

use itertools::Itertools;

use std::collections::BTreeSet;

/// An undirected graph over the `Variable`s of a model.
///
/// # Representation
/// The graph is an arena indexed by `VarId`: every node owns the sorted set of its neighbours.
/// Edges are always stored symmetrically. Removing a node clears its adjacency and marks it
/// inactive; its id is never reused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndirectedGraph {

    /// The neighbours of each node
    adjacency: Vec<BTreeSet<VarId>>,

    /// `false` once a node has been removed
    active: Vec<bool>

}

impl UndirectedGraph {

    /// Construct a graph of `n` nodes and no edges
    pub fn new(n: usize) -> Self {
        UndirectedGraph {
            adjacency: vec![BTreeSet::new(); n],
            active: vec![true; n]
        }
    }

    /// The number of nodes that have not been removed
    pub fn len(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The remaining nodes, ascending
    pub fn nodes(&self) -> impl Iterator<Item = VarId> + '_ {
        self.active.iter().enumerate().filter(|&(_, &a)| a).map(|(v, _)| v)
    }

    /// Check if `v` is a node of the graph that has not been removed
    pub fn contains(&self, v: VarId) -> bool {
        self.active.get(v).cloned().unwrap_or(false)
    }

    /// The neighbours of `v`
    ///
    /// # Panics
    /// if `v` was never a node of the graph
    pub fn neighbours(&self, v: VarId) -> &BTreeSet<VarId> {
        &self.adjacency[v]
    }

    /// Add the edge `a - b`.
    ///
    /// # Returns
    /// `true` if the edge is new. Self loops and edges touching removed nodes are ignored.
    pub fn add_edge(&mut self, a: VarId, b: VarId) -> bool {
        if a == b || ! self.contains(a) || ! self.contains(b) {
            return false;
        }

        let added = self.adjacency[a].insert(b);
        self.adjacency[b].insert(a);
        added
    }

    pub fn has_edge(&self, a: VarId, b: VarId) -> bool {
        self.adjacency.get(a).map(|n| n.contains(&b)).unwrap_or(false)
    }

    pub fn num_edges(&self) -> usize {
        self.adjacency.iter().map(|n| n.len()).sum::<usize>() / 2
    }

    /// All edges `(a, b)` with `a < b`, in ascending order
    pub fn edges(&self) -> Vec<(VarId, VarId)> {
        self.adjacency.iter()
                      .enumerate()
                      .flat_map(|(a, ns)| ns.range(a + 1..).map(move |&b| (a, b)))
                      .collect()
    }

    /// The cluster of `v`: `v` together with its neighbours, ascending
    pub fn cluster(&self, v: VarId) -> Vec<VarId> {
        let mut cluster: Vec<VarId> = self.adjacency[v].iter().cloned().collect();
        let pos = cluster.binary_search(&v).unwrap_or_else(|p| p);
        cluster.insert(pos, v);
        cluster
    }

    /// The edges missing between the neighbours of `v`: adding them makes the cluster of `v`
    /// complete.
    pub fn fill_in(&self, v: VarId) -> Vec<(VarId, VarId)> {
        self.adjacency[v].iter()
                         .tuple_combinations()
                         .filter(|&(&a, &b)| ! self.has_edge(a, b))
                         .map(|(&a, &b)| (a, b))
                         .collect()
    }

    /// Check if every pair of `nodes` is connected
    pub fn is_complete(&self, nodes: &[VarId]) -> bool {
        nodes.iter().tuple_combinations().all(|(&a, &b)| self.has_edge(a, b))
    }

    /// Remove `v` and every edge touching it
    pub fn remove_node(&mut self, v: VarId) {
        let ns = std::mem::take(&mut self.adjacency[v]);
        for n in ns {
            self.adjacency[n].remove(&v);
        }
        self.active[v] = false;
    }
}

impl<'a> From<&'a DirectedModel> for UndirectedGraph {

    /// The skeleton of the DAG: every parent-child edge, undirected
    fn from(model: &'a DirectedModel) -> Self {
        let mut graph = UndirectedGraph::new(model.num_variables());
        for v in 0..model.num_variables() {
            for &p in model.parents(v) {
                graph.add_edge(p, v);
            }
        }
        graph
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::Initialization;
    use crate::model::directed::DirectedModelBuilder;

    /// The Misconception loop A - B - C - D - A from Koller & Friedman Section 4.1
    fn misconception() -> UndirectedGraph {
        let mut g = UndirectedGraph::new(4);
        assert!(g.add_edge(0, 1));
        assert!(g.add_edge(1, 2));
        assert!(g.add_edge(2, 3));
        assert!(g.add_edge(3, 0));
        g
    }

    #[test]
    fn edges() {
        let mut g = misconception();
        assert_eq!(4, g.len());
        assert_eq!(4, g.num_edges());
        assert!(g.has_edge(0, 3));
        assert!(g.has_edge(3, 0));
        assert!(! g.has_edge(0, 2));
        assert_eq!(vec![(0, 1), (0, 3), (1, 2), (2, 3)], g.edges());

        // duplicates and self loops
        assert!(! g.add_edge(1, 0));
        assert!(! g.add_edge(2, 2));
        assert_eq!(4, g.num_edges());
    }

    #[test]
    fn clusters() {
        let g = misconception();
        assert_eq!(vec![0, 1, 3], g.cluster(0));
        assert_eq!(vec![(1, 3)], g.fill_in(0));
        assert!(! g.is_complete(&g.cluster(0)));
        assert!(g.is_complete(&[0, 1]));
        assert!(g.is_complete(&[]));
    }

    #[test]
    fn remove() {
        let mut g = misconception();
        g.remove_node(0);

        assert_eq!(3, g.len());
        assert!(! g.contains(0));
        assert_eq!(vec![1, 2, 3], g.nodes().collect::<Vec<_>>());
        assert_eq!(2, g.num_edges());
        assert!(g.neighbours(0).is_empty());
        assert!(! g.neighbours(1).contains(&0));

        // removed nodes take no new edges
        assert!(! g.add_edge(0, 2));
    }

    #[test]
    fn skeleton() {
        let model = DirectedModelBuilder::new()
            .with_cpt("rain", &[], Initialization::Uniform)
            .with_cpt("sprinkler", &["rain"], Initialization::Uniform)
            .with_cpt("grass_wet", &["rain", "sprinkler"], Initialization::Uniform)
            .with_cpt("slippery", &["grass_wet"], Initialization::Uniform)
            .build()
            .unwrap();

        let g = UndirectedGraph::from(&model);
        assert_eq!(vec![(0, 1), (0, 2), (1, 2), (2, 3)], g.edges());
    }
}
