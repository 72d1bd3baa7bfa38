//! Two-pass message passing over a junction tree.
//!
//! Messages are first collected towards a root clique, then distributed back out. A message from
//! one clique to a neighbour projects the source belief onto their sepset and lets the target
//! absorb the ratio of the new sepset belief to the old one. After both passes every clique
//! belief is the joint distribution (times the evidence) marginalized onto that clique.

use crate::util::{BbnError, Result};
use super::initialize::Beliefs;
use super::junction_tree::JunctionTree;

use tracing::trace;

/// Calibrate `beliefs` by propagating from `root`.
///
/// # Errors
/// * `BbnError::UnknownClique` if `root` is not a clique of `tree`
/// * `BbnError::NumericInconsistency` if an absorption divides a non-zero entry by zero
pub fn propagate(tree: &JunctionTree, beliefs: &mut Beliefs, root: usize) -> Result<()> {
    if root >= tree.len() {
        return Err(BbnError::UnknownClique(root));
    }

    let mut marked = vec![false; tree.len()];
    collect_evidence(tree, beliefs, &mut marked, root, None)?;

    marked.iter_mut().for_each(|m| *m = false);
    distribute_evidence(tree, beliefs, &mut marked, root)
}

/// Mark `clique`, collect from every unmarked neighbour, then send to `caller`
pub fn collect_evidence(
    tree: &JunctionTree,
    beliefs: &mut Beliefs,
    marked: &mut [bool],
    clique: usize,
    caller: Option<usize>
) -> Result<()> {
    marked[clique] = true;

    for &(n, _) in tree.neighbours(clique) {
        if ! marked[n] {
            collect_evidence(tree, beliefs, marked, n, Some(clique))?;
        }
    }

    match caller {
        Some(c) => pass_message(tree, beliefs, clique, c),
        None => Ok(())
    }
}

/// Mark `clique`, then for every unmarked neighbour send to it and distribute from it
pub fn distribute_evidence(
    tree: &JunctionTree,
    beliefs: &mut Beliefs,
    marked: &mut [bool],
    clique: usize
) -> Result<()> {
    marked[clique] = true;

    for &(n, _) in tree.neighbours(clique) {
        if ! marked[n] {
            pass_message(tree, beliefs, clique, n)?;
            distribute_evidence(tree, beliefs, marked, n)?;
        }
    }

    Ok(())
}

/// Pass a message from `source` to its neighbour `target` through the sepset between them.
///
/// # Errors
/// * `BbnError::UnknownClique` if the two cliques are not neighbours
/// * `BbnError::NumericInconsistency` if the target belief cannot absorb the message
pub fn pass_message(tree: &JunctionTree, beliefs: &mut Beliefs, source: usize, target: usize) -> Result<()> {
    let sepset = tree.sepset_between(source, target).ok_or(BbnError::UnknownClique(target))?;
    let id = sepset.id();

    let new = beliefs.cliques[source].project(sepset.label())?;
    let old = std::mem::replace(&mut beliefs.sepsets[id], new);

    beliefs.cliques[target].absorb(&beliefs.sepsets[id], &old).map_err(|e| match e {
        BbnError::DivideByZero => BbnError::NumericInconsistency { clique: target, sepset: id },
        e => e
    })?;

    trace!(source, target, sepset = id, "passed message");
    Ok(())
}
