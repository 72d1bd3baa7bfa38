//! Defines a `JunctionTree`: the cliques of a triangulated model joined into a tree by sepsets.
//!
//! The tree is assembled Kruskal style. Every clique starts as a tree of its own, and candidate
//! sepsets between pairs of cliques are inserted in order of decreasing mass (the size of the
//! intersection), then increasing cost (the combined table size of both cliques), skipping any
//! candidate whose cliques are already in the same tree. A maximum weight spanning tree over the
//! intersections of the cliques of a chordal graph satisfies the running intersection property.

use crate::util::{BbnError, ModelError, Result};
use crate::variable::VarId;
use super::triangulate::{is_subset, weight};

use tracing::{debug, trace};

use std::cmp::Reverse;
use std::collections::VecDeque;


/// A clique of the junction tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clique {
    id: usize,
    variables: Vec<VarId>
}

impl Clique {

    pub fn id(&self) -> usize {
        self.id
    }

    /// The variables of the clique, ascending
    pub fn variables(&self) -> &[VarId] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn contains(&self, var: VarId) -> bool {
        self.variables.binary_search(&var).is_ok()
    }
}


/// A separator between two neighbouring cliques
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SepSet {

    id: usize,

    /// The two cliques, smaller id first
    cliques: (usize, usize),

    /// The intersection of the two cliques, ascending
    label: Vec<VarId>,

    /// The number of variables in the label
    mass: usize,

    /// The combined table size of the two cliques
    cost: u64

}

impl SepSet {

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn cliques(&self) -> (usize, usize) {
        self.cliques
    }

    pub fn label(&self) -> &[VarId] {
        &self.label
    }

    pub fn mass(&self) -> usize {
        self.mass
    }

    pub fn cost(&self) -> u64 {
        self.cost
    }

    /// The clique on the other side of `clique`, if `clique` is one of the two
    pub fn other(&self, clique: usize) -> Option<usize> {
        match self.cliques {
            (a, b) if a == clique => Some(b),
            (a, b) if b == clique => Some(a),
            _ => None
        }
    }
}


#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JunctionTree {

    cliques: Vec<Clique>,

    sepsets: Vec<SepSet>,

    /// ```(neighbour, sepset)``` for every clique, in insertion order
    adjacency: Vec<Vec<(usize, usize)>>

}

impl JunctionTree {

    /// Assemble the junction tree of a set of cliques.
    ///
    /// # Args
    /// * `cliques`: the maximal cliques of a chordal graph, each sorted
    /// * `cards`: the cardinality of every variable, indexed by `VarId`
    /// * `link_components`: also consider sepsets with an empty label, joining independent
    ///   components of the model into one tree
    ///
    /// # Errors
    /// * `ModelError::DisconnectedForest` if the sepsets do not join the cliques into one tree
    pub fn build(cliques: Vec<Vec<VarId>>, cards: &[usize], link_components: bool) -> Result<Self> {
        let n = cliques.len();
        let weights: Vec<u64> = cliques.iter().map(|c| weight(c, cards)).collect();

        ///////////////////////////////////////////////////////////////////////
        // 1) Candidates, ordered by (-mass, cost, cliques)
        let mut candidates: Vec<(usize, usize, Vec<VarId>)> = Vec::new();
        for a in 0..n {
            for b in (a + 1)..n {
                let label: Vec<VarId> = cliques[a].iter().cloned().filter(|v| cliques[b].binary_search(v).is_ok()).collect();
                if ! label.is_empty() || link_components {
                    candidates.push((a, b, label));
                }
            }
        }

        candidates.sort_by_key(|&(a, b, ref label)| (Reverse(label.len()), weights[a] + weights[b], a, b));

        ///////////////////////////////////////////////////////////////////////
        // 2) The forest, one tree per clique
        let mut tree_of: Vec<usize> = (0..n).collect();
        let mut members: Vec<Vec<usize>> = (0..n).map(|c| vec![c]).collect();
        let mut trees = n;

        let mut sepsets = Vec::with_capacity(n.saturating_sub(1));
        let mut adjacency = vec![Vec::new(); n];

        ///////////////////////////////////////////////////////////////////////
        // 3) Insert sepsets until the forest is a single tree. Once two cliques share a tree they
        //    always will, so one pass over the ordered candidates suffices.
        for (a, b, label) in candidates {
            if trees <= 1 {
                break;
            }

            let (ta, tb) = (tree_of[a], tree_of[b]);
            if ta == tb {
                continue;
            }

            let id = sepsets.len();
            trace!(sepset = id, a, b, mass = label.len(), "inserting sepset");

            adjacency[a].push((b, id));
            adjacency[b].push((a, id));
            sepsets.push(SepSet {
                id,
                cliques: (a, b),
                mass: label.len(),
                label,
                cost: weights[a] + weights[b]
            });

            // graft the smaller tree onto the larger
            let (big, small) = if members[ta].len() >= members[tb].len() { (ta, tb) } else { (tb, ta) };
            let grafted = std::mem::take(&mut members[small]);
            for &c in grafted.iter() {
                tree_of[c] = big;
            }
            members[big].extend(grafted);
            trees -= 1;
        }

        ///////////////////////////////////////////////////////////////////////
        // 4) Postcondition: exactly one tree
        if n > 0 && trees != 1 {
            return Err(BbnError::from(ModelError::DisconnectedForest(trees)));
        }

        let cliques: Vec<Clique> = cliques.into_iter()
                                          .enumerate()
                                          .map(|(id, variables)| Clique { id, variables })
                                          .collect();

        let tree = JunctionTree { cliques, sepsets, adjacency };
        debug!(cliques = tree.len(), sepsets = tree.sepsets.len(), treewidth = tree.treewidth(), "built junction tree");

        Ok(tree)
    }

    /// The number of cliques
    pub fn len(&self) -> usize {
        self.cliques.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cliques.is_empty()
    }

    pub fn cliques(&self) -> &[Clique] {
        &self.cliques
    }

    pub fn clique(&self, id: usize) -> Option<&Clique> {
        self.cliques.get(id)
    }

    pub fn sepsets(&self) -> &[SepSet] {
        &self.sepsets
    }

    pub fn sepset(&self, id: usize) -> Option<&SepSet> {
        self.sepsets.get(id)
    }

    /// The ```(neighbour, sepset)``` pairs of a clique. Unknown cliques have no neighbours.
    pub fn neighbours(&self, clique: usize) -> &[(usize, usize)] {
        self.adjacency.get(clique).map(|n| n.as_slice()).unwrap_or(&[])
    }

    /// The sepset joining two neighbouring cliques
    pub fn sepset_between(&self, a: usize, b: usize) -> Option<&SepSet> {
        self.neighbours(a)
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, s)| &self.sepsets[s])
    }

    /// The smallest clique containing every variable in `vars`, smallest id on ties
    pub fn smallest_containing(&self, vars: &[VarId]) -> Option<usize> {
        self.cliques
            .iter()
            .filter(|c| is_subset(vars, &c.variables))
            .min_by_key(|c| (c.len(), c.id))
            .map(|c| c.id)
    }

    /// The clique with the most variables, smallest id on ties
    pub fn largest(&self) -> Option<usize> {
        self.cliques
            .iter()
            .min_by_key(|c| (Reverse(c.len()), c.id))
            .map(|c| c.id)
    }

    /// The cliques on the path from `from` to `to`, both included
    pub fn path(&self, from: usize, to: usize) -> Option<Vec<usize>> {
        if from >= self.len() || to >= self.len() {
            return None;
        }

        let mut previous: Vec<Option<usize>> = vec![None; self.len()];
        let mut seen = vec![false; self.len()];
        let mut queue = VecDeque::new();
        seen[from] = true;
        queue.push_back(from);

        while let Some(c) = queue.pop_front() {
            if c == to {
                break;
            }
            for &(n, _) in self.neighbours(c) {
                if ! seen[n] {
                    seen[n] = true;
                    previous[n] = Some(c);
                    queue.push_back(n);
                }
            }
        }

        if ! seen[to] {
            return None;
        }

        let mut path = vec![to];
        let mut current = to;
        while let Some(p) = previous[current] {
            path.push(p);
            current = p;
        }
        path.reverse();
        Some(path)
    }

    /// Check if every clique is reachable from every other, optionally pretending one sepset is
    /// not there
    pub fn is_connected(&self, ignoring: Option<usize>) -> bool {
        if self.is_empty() {
            return true;
        }

        self.reachable(0, |_, s| Some(s) != ignoring).iter().all(|&r| r)
    }

    /// Check the running intersection property: for every variable, the cliques containing it
    /// induce a connected subtree
    pub fn verify_running_intersection(&self) -> bool {
        let vars: Vec<VarId> = {
            let mut vars: Vec<VarId> = self.cliques.iter().flat_map(|c| c.variables.iter().cloned()).collect();
            vars.sort_unstable();
            vars.dedup();
            vars
        };

        vars.into_iter().all(|v| {
            let containing: Vec<usize> = self.cliques.iter().filter(|c| c.contains(v)).map(|c| c.id).collect();
            let reached = self.reachable(containing[0], |n, _| self.cliques[n].contains(v));
            containing.iter().all(|&c| reached[c])
        })
    }

    /// The size of the largest clique, less one
    pub fn treewidth(&self) -> usize {
        self.cliques.iter().map(|c| c.len()).max().unwrap_or(0).saturating_sub(1)
    }

    /// The cliques reachable from `start` along the edges `(neighbour, sepset)` accepted by `edge`
    fn reachable<F>(&self, start: usize, edge: F) -> Vec<bool>
        where F: Fn(usize, usize) -> bool
    {
        let mut seen = vec![false; self.len()];
        let mut stack = vec![start];
        seen[start] = true;

        while let Some(c) = stack.pop() {
            for &(n, s) in self.neighbours(c) {
                if ! seen[n] && edge(n, s) {
                    seen[n] = true;
                    stack.push(n);
                }
            }
        }

        seen
    }
}
