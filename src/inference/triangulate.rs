//! Triangulation of a moral graph by greedy min-fill elimination.
//!
//! Each step eliminates the node whose cluster (the node and its remaining neighbours) needs the
//! fewest fill-in edges to become complete. Ties go to the cluster with the smallest table, then
//! to the smallest id, so the result is deterministic.

use crate::model::undirected::UndirectedGraph;
use crate::variable::VarId;

use tracing::{debug, trace};

/// The cardinality assumed for a node whose domain is unknown
const DEFAULT_CARDINALITY: usize = 2;

/// The size of the potential table over `vars`
pub fn weight(vars: &[VarId], cards: &[usize]) -> u64 {
    vars.iter()
        .map(|&v| cards.get(v).cloned().unwrap_or(DEFAULT_CARDINALITY) as u64)
        .fold(1u64, |acc, c| acc.saturating_mul(c))
}


/// The priority of a node during elimination. Smaller keys are eliminated first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct EliminationKey {

    /// The number of edges needed to make the cluster of the node complete
    pub fill_in: usize,

    /// The size of the table over the cluster of the node
    pub weight: u64,

    /// The id of the node
    pub id: VarId

}

impl EliminationKey {

    /// Compute the key of `v` in the current state of `graph`
    pub fn of(graph: &UndirectedGraph, v: VarId, cards: &[usize]) -> Self {
        EliminationKey {
            fill_in: graph.fill_in(v).len(),
            weight: weight(&graph.cluster(v), cards),
            id: v
        }
    }
}


/// The result of triangulating a graph
#[derive(Clone, Debug, PartialEq)]
pub struct Triangulation {

    /// The maximal cliques of the chordal graph, each sorted, in the order they were found
    pub cliques: Vec<Vec<VarId>>,

    /// The order the nodes were eliminated in
    pub elimination_order: Vec<VarId>,

    /// The input graph together with every fill-in edge
    pub chordal: UndirectedGraph,

    /// The edges added during elimination, in the order they were added
    pub fill_ins: Vec<(VarId, VarId)>

}

/// Triangulate `graph`.
///
/// # Args
/// * `graph`: the moral graph
/// * `cards`: the cardinality of every node, indexed by `VarId`
pub fn triangulate(graph: &UndirectedGraph, cards: &[usize]) -> Triangulation {
    let mut working = graph.clone();
    let mut chordal = graph.clone();
    let mut cliques: Vec<Vec<VarId>> = Vec::new();
    let mut elimination_order = Vec::with_capacity(graph.len());
    let mut fill_ins = Vec::new();

    loop {
        let key = match working.nodes().map(|v| EliminationKey::of(&working, v, cards)).min() {
            Some(key) => key,
            None => break
        };

        let v = key.id;
        let cluster = working.cluster(v);

        for (a, b) in working.fill_in(v) {
            working.add_edge(a, b);
            if chordal.add_edge(a, b) {
                fill_ins.push((a, b));
            }
        }

        // clusters found later never contain an eliminated node, so a recorded clique is maximal
        if ! cliques.iter().any(|c| is_subset(&cluster, c)) {
            cliques.push(cluster);
        }

        trace!(node = v, fill_in = key.fill_in, weight = key.weight, "eliminated node");
        working.remove_node(v);
        elimination_order.push(v);
    }

    debug!(
        cliques = cliques.len(),
        fill_ins = fill_ins.len(),
        largest = cliques.iter().map(|c| c.len()).max().unwrap_or(0),
        "triangulated graph"
    );

    Triangulation { cliques, elimination_order, chordal, fill_ins }
}

/// Check if the sorted `small` is a subset of the sorted `big`
pub fn is_subset(small: &[VarId], big: &[VarId]) -> bool {
    small.iter().all(|v| big.binary_search(v).is_ok())
}
