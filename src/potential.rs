//! Definition of the potential module
//!
//! A `Potential` is a dense, non-negative table over a set of `Variable`s, stored as an ndarray
//! with one axis per `Variable`. Clique and sepset beliefs of a junction tree are `Potential`s.
//! The axes are always ordered by ascending `VarId`, so two `Potential`s over overlapping scopes
//! agree on the relative order of the shared axes.

use crate::util::{BbnError, Result};
use crate::variable::VarId;

use ndarray::prelude as nd;
use ndarray::Dimension;

/// Alias f64 ndarray::ArrayD as Table
pub type Table = nd::ArrayD<f64>;


#[derive(Clone, Debug, PartialEq)]
pub struct Potential {

    /// The scope of the `Potential`, sorted ascending
    scope: Vec<VarId>,

    /// The values of the `Potential`, one axis per member of `scope`
    table: Table

}

impl Potential {

    /// Create the unit `Potential` over the given scope.
    ///
    /// # Args
    /// * `scope`: the `Variable`s of the `Potential`, in any order
    /// * `cards`: the cardinality of every `Variable` in the model, indexed by `VarId`
    pub fn ones(scope: &[VarId], cards: &[usize]) -> Self {
        let mut scope = scope.to_vec();
        scope.sort_unstable();
        scope.dedup();

        let shape: Vec<usize> = scope.iter().map(|&v| cards[v]).collect();

        Potential {
            scope,
            table: Table::ones(nd::IxDyn(&shape))
        }
    }

    /// Create a `Potential` from an existing table.
    ///
    /// # Errors
    /// * `BbnError::InvalidScope` if the scope is not strictly ascending or does not match the
    ///   dimensionality of the table
    pub fn from_table(scope: Vec<VarId>, table: Table) -> Result<Self> {
        if scope.len() != table.ndim() || scope.windows(2).any(|w| w[0] >= w[1]) {
            return Err(BbnError::InvalidScope);
        }

        Ok(Potential { scope, table })
    }

    pub fn scope(&self) -> &[VarId] {
        &self.scope
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Check if `var` is in the scope of this `Potential`
    pub fn contains(&self, var: VarId) -> bool {
        self.scope.binary_search(&var).is_ok()
    }

    /// The value at a configuration of the scope, given as value indices in scope order
    pub fn value(&self, config: &[usize]) -> Option<f64> {
        self.table.get(nd::IxDyn(config)).cloned()
    }

    /// The total mass of the `Potential`
    pub fn sum(&self) -> f64 {
        self.table.sum()
    }

    /// Project the `Potential` onto a subset of its scope by summing out every other `Variable`.
    ///
    /// # Errors
    /// * `BbnError::InvalidScope` if `onto` is not a subset of the scope
    pub fn project(&self, onto: &[VarId]) -> Result<Potential> {
        if ! onto.iter().all(|&v| self.contains(v)) {
            return Err(BbnError::InvalidScope);
        }

        // sum out from the last axis down so the remaining axis indices stay valid
        let mut table = self.table.clone();
        for (axis, var) in self.scope.iter().enumerate().rev() {
            if ! onto.contains(var) {
                table = table.sum_axis(nd::Axis(axis));
            }
        }

        let scope = self.scope.iter().cloned().filter(|v| onto.contains(v)).collect();
        Ok(Potential { scope, table })
    }

    /// The (unnormalized) marginal of a single `Variable` of the scope, in domain order
    pub fn marginal(&self, var: VarId) -> Result<Vec<f64>> {
        Ok(self.project(&[var])?.table.iter().cloned().collect())
    }

    /// Absorb an updated sepset belief: every entry is multiplied by ```new / old``` evaluated at
    /// the matching sepset configuration.
    ///
    /// # Notes
    /// A zero entry stays zero regardless of the ratio, so 0/0 never occurs. A zero in `old`
    /// under a non-zero entry is still undefined.
    ///
    /// # Errors
    /// * `BbnError::InvalidScope` if the two beliefs disagree on scope or are not a subset of
    ///   this `Potential`'s scope
    /// * `BbnError::DivideByZero` if a non-zero entry meets a zero in `old`
    pub fn absorb(&mut self, new: &Potential, old: &Potential) -> Result<()> {
        if new.scope != old.scope {
            return Err(BbnError::InvalidScope);
        }

        let axes: Vec<usize> = new.scope
                                  .iter()
                                  .map(|v| self.scope.binary_search(v).map_err(|_| BbnError::InvalidScope))
                                  .collect::<Result<_>>()?;

        let mut sub = vec![0; axes.len()];
        for (idx, t) in self.table.indexed_iter_mut() {
            if *t == 0.0 {
                continue;
            }

            for (s, &axis) in sub.iter_mut().zip(axes.iter()) {
                *s = idx[axis];
            }

            let denom = old.table[nd::IxDyn(&sub)];
            if denom == 0.0 {
                return Err(BbnError::DivideByZero);
            }

            *t *= new.table[nd::IxDyn(&sub)] / denom;
        }

        Ok(())
    }

    /// Zero every entry where `var` does not take the value at index `keep`. A `Variable` outside
    /// the scope leaves the `Potential` unchanged.
    pub fn mask(&mut self, var: VarId, keep: usize) {
        if let Ok(axis) = self.scope.binary_search(&var) {
            for (i, mut lane) in self.table.axis_iter_mut(nd::Axis(axis)).enumerate() {
                if i != keep {
                    lane.fill(0.0);
                }
            }
        }
    }

    /// Multiply every entry by `f` evaluated at its configuration (value indices in scope order)
    pub fn multiply_by<F>(&mut self, mut f: F)
        where F: FnMut(&[usize]) -> f64
    {
        for (idx, v) in self.table.indexed_iter_mut() {
            *v *= f(idx.slice());
        }
    }
}

// Unit tests
#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn close(a: &Table, b: &Table) -> bool {
        a.shape() == b.shape() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < EPS)
    }

    #[test]
    fn ones() {
        let phi = Potential::ones(&[2, 0], &[3, 4, 2]);
        assert_eq!(&[0, 2], phi.scope());
        assert_eq!(&[3, 2], phi.table().shape());
        assert!(phi.contains(2));
        assert!(! phi.contains(1));
        assert_eq!(6.0, phi.sum());
        assert_eq!(Some(1.0), phi.value(&[2, 1]));
        assert_eq!(None, phi.value(&[3, 0]));
    }

    #[test]
    fn from_table() {
        let tbl = nd::arr2(&[[0.5, 0.5]]).into_dyn();
        assert!(Potential::from_table(vec![0, 1], tbl.clone()).is_ok());
        assert_eq!(Err(BbnError::InvalidScope), Potential::from_table(vec![1, 0], tbl.clone()));
        assert_eq!(Err(BbnError::InvalidScope), Potential::from_table(vec![0], tbl));
    }

    #[test]
    /// Example taken from Koller & Friedman Figure 9.7
    fn project() {
        let table = nd::Array::from_shape_vec(
            (3, 2, 2),
            vec![ 0.25, 0.35, 0.08, 0.16, 0.05, 0.07, 0., 0., 0.15, 0.21, 0.09, 0.18 ]
        ).unwrap().into_dyn();

        let phi = Potential::from_table(vec![0, 1, 2], table).unwrap();

        let projected = phi.project(&[0, 2]).unwrap();
        assert_eq!(&[0, 2], projected.scope());

        let expected = nd::arr2(&[[0.33, 0.51], [0.05, 0.07], [0.24, 0.39]]).into_dyn();
        assert!(close(&expected, projected.table()));

        let marginal = phi.marginal(0).unwrap();
        assert!((0.84 - marginal[0]).abs() < EPS);
        assert!((0.12 - marginal[1]).abs() < EPS);
        assert!((0.63 - marginal[2]).abs() < EPS);

        // projecting onto nothing leaves the total mass
        let scalar = phi.project(&[]).unwrap();
        assert!(scalar.scope().is_empty());
        assert!((1.59 - scalar.sum()).abs() < EPS);

        assert_eq!(Err(BbnError::InvalidScope), phi.project(&[0, 3]));
    }

    #[test]
    /// Example taken from Koller & Friedman Figure 4.3
    fn absorb() {
        let tbl = nd::arr2(&[[ 0.5, 0.2 ], [ 0., 0. ], [ 0.3, 0.45 ]]).into_dyn();
        let mut phi = Potential::from_table(vec![0, 1], tbl).unwrap();

        let new = Potential::ones(&[0], &[3, 2]);
        let old = Potential::from_table(vec![0], nd::arr1(&[ 0.8, 0., 0.6 ]).into_dyn()).unwrap();

        phi.absorb(&new, &old).unwrap();

        let expected = nd::arr2(&[[0.625, 0.25], [0., 0.], [ 0.5, 0.75 ]]).into_dyn();
        assert!(close(&expected, phi.table()));
    }

    #[test]
    fn absorb_scaled() {
        let mut phi = Potential::ones(&[0, 1], &[2, 2]);
        let old = Potential::ones(&[1], &[2, 2]);
        let new = Potential::from_table(vec![1], nd::arr1(&[ 0.2, 0.8 ]).into_dyn()).unwrap();

        phi.absorb(&new, &old).unwrap();

        let expected = nd::arr2(&[[0.2, 0.8], [0.2, 0.8]]).into_dyn();
        assert!(close(&expected, phi.table()));
    }

    #[test]
    fn absorb_divide_by_zero() {
        let tbl = nd::arr2(&[[ 0.5, 0.2 ], [ 0., 0. ], [ 0.3, 0.45 ]]).into_dyn();
        let mut phi = Potential::from_table(vec![0, 1], tbl).unwrap();

        let new = Potential::ones(&[0], &[3, 2]);
        let old = Potential::from_table(vec![0], nd::arr1(&[ 0., 0., 0. ]).into_dyn()).unwrap();

        assert_eq!(Err(BbnError::DivideByZero), phi.absorb(&new, &old));
    }

    #[test]
    fn absorb_bad_scope() {
        let mut phi = Potential::ones(&[0, 1], &[2, 2, 2]);
        let outside = Potential::ones(&[2], &[2, 2, 2]);
        let inside = Potential::ones(&[1], &[2, 2, 2]);

        assert_eq!(Err(BbnError::InvalidScope), phi.absorb(&outside, &outside));
        assert_eq!(Err(BbnError::InvalidScope), phi.absorb(&inside, &outside));
    }

    #[test]
    fn mask() {
        let mut phi = Potential::ones(&[0, 1], &[3, 2]);
        phi.mask(0, 1);
        let expected = nd::arr2(&[[0., 0.], [1., 1.], [0., 0.]]).into_dyn();
        assert_eq!(&expected, phi.table());

        // not in scope
        phi.mask(4, 0);
        assert_eq!(&expected, phi.table());
    }

    #[test]
    fn multiply_by() {
        let mut phi = Potential::ones(&[0, 1], &[3, 2]);
        phi.multiply_by(|idx| (idx[0] * 2 + idx[1]) as f64);
        let expected = nd::arr2(&[[0., 1.], [2., 3.], [4., 5.]]).into_dyn();
        assert_eq!(&expected, phi.table());
    }
}
