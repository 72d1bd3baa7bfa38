//! Defines a `DirectedModel`, which is a Bayesian model that represents the factorization of
//! a probability distribution P

use crate::factor::Factor;
use crate::inference::{JunctionTreeEngine, Marginals};
use crate::init::Initialization;
use crate::util::{BbnError, ModelError, Result};
use crate::variable::{configurations, Assignment, Value, VarId, Variable};
use crate::config::DEFAULT_TOLERANCE;
use super::Model;

use bidir_map::BidirMap;
use indexmap::IndexMap;
use itertools::Itertools;
use tracing::debug;

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;
use std::sync::OnceLock;


/// Represents a Bayesian Network - a Directed Probabilistic Graphical Model.
///
/// # Representation
/// Every `Variable` is introduced by exactly one `Factor`, its Conditional Probability Table.
/// The parameters of that `Factor` other than the `Variable` itself are its parents, so the
/// `Factor`s implicitly define the edges of the DAG. `Variable`s are identified by the position
/// of the `Factor` that introduces them.
pub struct DirectedModel {

    /// The `Variable`s of the model, indexed by `VarId`
    variables: Vec<Variable>,

    /// The user-defined names of each `Variable`. This is a two way lookup ```(VarId->Name)```
    /// and ```(Name->VarId)```
    names: BidirMap<VarId, String>,

    /// The CPT introducing each `Variable`
    factors: Vec<Factor>,

    /// The parents of each `Variable`, sorted
    parents: Vec<Vec<VarId>>,

    /// The children of each `Variable`, sorted
    children: Vec<Vec<VarId>>,

    /// A topological order of the DAG
    order: Vec<VarId>,

    /// The compiled junction tree, built on the first query
    engine: OnceLock<JunctionTreeEngine>

}

impl DirectedModel {

    /// Get the `Variable` with the given id
    pub fn variable(&self, var: VarId) -> Option<&Variable> {
        self.variables.get(var)
    }

    /// Get the `Factor` introducing the given variable in this model.
    pub fn factor(&self, var: VarId) -> Option<&Factor> {
        self.factors.get(var)
    }

    /// The parents of `var`, sorted. Unknown variables have no parents.
    pub fn parents(&self, var: VarId) -> &[VarId] {
        self.parents.get(var).map(|p| p.as_slice()).unwrap_or(&[])
    }

    /// The children of `var`, sorted. Unknown variables have no children.
    pub fn children(&self, var: VarId) -> &[VarId] {
        self.children.get(var).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// The family of `var`: the variable itself together with its parents, sorted
    pub fn family(&self, var: VarId) -> Vec<VarId> {
        let mut family = self.parents(var).to_vec();
        family.push(var);
        family.sort_unstable();
        family
    }

    /// Get a topological order of the `DirectedModel`. Among the variables that are ready, the one
    /// with the smallest id comes first.
    pub fn topological_order(&self) -> &[VarId] {
        &self.order
    }

    /// Build the by-name `Assignment` of a configuration of `vars`
    pub fn assignment(&self, vars: &[VarId], config: &[usize]) -> Assignment {
        let mut assignment = Assignment::new();
        for (&v, &idx) in vars.iter().zip(config.iter()) {
            let var = &self.variables[v];
            if let Some(value) = var.value(idx) {
                assignment.set(var.name(), value.clone());
            }
        }
        assignment
    }

    /// Evaluate the CPT of `var` on a configuration of its family (as returned by `family`)
    pub fn evaluate_family(&self, var: VarId, config: &[usize]) -> f64 {
        let family = self.family(var);
        self.factors[var].evaluate(&self.assignment(&family, config))
    }

    /// Determine the probability of a full `Assignment` to the `Variable`s in the model.
    ///
    /// Specifically, this computes ```P(zeta)```, where ```zeta``` is a full assignment, by the
    /// chain rule.
    ///
    /// # Errors
    /// * `BbnError::IncompleteAssignment` if a `Variable` of the model is not assigned
    pub fn probability(&self, assignment: &Assignment) -> Result<f64> {
        if self.variables.iter().any(|v| assignment.get(v.name()).is_none()) {
            return Err(BbnError::IncompleteAssignment);
        }

        Ok(self.factors.iter().map(|f| f.evaluate(assignment)).product())
    }

    /// Check that every `Factor` is a conditional probability table: for every configuration of
    /// the parents the values are finite, non-negative and sum to 1 within `tolerance`.
    ///
    /// # Errors
    /// * `ModelError::NotACpt` naming the first offending `Variable`
    pub fn validate(&self, tolerance: f64) -> Result<()> {
        for (v, var) in self.variables.iter().enumerate() {
            let parents = self.parents(v);
            let cards: Vec<usize> = parents.iter().map(|&p| self.variables[p].cardinality()).collect();

            for config in configurations(&cards) {
                let mut assignment = self.assignment(parents, &config);
                let mut sum = 0.0;

                for value in var.domain() {
                    assignment.set(var.name(), value.clone());
                    let p = self.factors[v].evaluate(&assignment);
                    if ! p.is_finite() || p < 0.0 {
                        return Err(BbnError::from(ModelError::NotACpt(String::from(var.name()))));
                    }
                    sum += p;
                }

                if (sum - 1.0).abs() > tolerance {
                    return Err(BbnError::from(ModelError::NotACpt(String::from(var.name()))));
                }
            }
        }

        Ok(())
    }

    /// The junction tree engine of this model, compiled with the default configuration on first
    /// use
    pub fn engine(&self) -> Result<&JunctionTreeEngine> {
        if let Some(engine) = self.engine.get() {
            return Ok(engine);
        }

        let engine = JunctionTreeEngine::new(self)?;
        Ok(self.engine.get_or_init(|| engine))
    }

    /// Compute the marginal distribution of every `Variable` given the evidence.
    ///
    /// The junction tree is compiled on the first query and reused afterwards.
    pub fn query(&self, evidence: &Assignment) -> Result<Marginals> {
        self.engine()?.query(evidence)
    }
}

impl Model for DirectedModel {

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn lookup_variable(&self, name: &str) -> Option<VarId> {
        self.names.get_by_second(&String::from(name)).cloned()
    }

    fn lookup_name(&self, var: VarId) -> Option<&str> {
        self.names.get_by_first(&var).map(|s| s.as_str())
    }
}

impl fmt::Debug for DirectedModel {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DirectedModel")
         .field("variables", &self.variables)
         .field("factors", &self.factors)
         .field("parents", &self.parents)
         .finish()
    }

}


/// A `Factor` declared to the builder. Tabular CPTs are built once every domain is known.
enum Declaration {
    Function(Factor),
    Table { variable: String, parents: Vec<String>, init: Initialization }
}

impl Declaration {

    fn variable(&self) -> Option<&str> {
        match self {
            Declaration::Function(f) => f.variable(),
            Declaration::Table { variable, .. } => Some(variable.as_str())
        }
    }

    fn scope(&self) -> Vec<&str> {
        match self {
            Declaration::Function(f) => f.scope().iter().map(|s| s.as_str()).collect(),
            Declaration::Table { variable, parents, .. } => {
                Some(variable.as_str()).into_iter().chain(parents.iter().map(|s| s.as_str())).collect()
            }
        }
    }
}


/// An implementation of the [builder pattern] for creating a `DirectedModel`.
///
/// `Factor`s may be added in any order. Each `Factor` introduces one `Variable`: either the one it
/// declares, or the only one of its parameters that no other `Factor` introduces.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
pub struct DirectedModelBuilder {

    /// The declared `Factor`s, in order
    declarations: Vec<Declaration>,

    /// The domains of non-binary `Variable`s
    domains: IndexMap<String, Vec<Value>>,

    /// Tolerance used to validate tabular CPTs
    tolerance: f64,

    /// The error state of the builder
    err: Option<BbnError>

}

impl Default for DirectedModelBuilder {
    fn default() -> Self {
        DirectedModelBuilder::new()
    }
}

impl DirectedModelBuilder {

    /// Construct a new `DirectedModelBuilder` representing an empty `DirectedModel`
    pub fn new() -> Self {
        DirectedModelBuilder {
            declarations: Vec::new(),
            domains: IndexMap::new(),
            tolerance: DEFAULT_TOLERANCE,
            err: None
        }
    }

    /// Add a `Factor` to the model.
    pub fn with_factor(mut self, factor: Factor) -> Self {
        if self.err.is_none() {
            self.declarations.push(Declaration::Function(factor));
        }
        self
    }

    /// Add several `Factor`s to the model, in order.
    pub fn with_factors<I>(self, factors: I) -> Self
        where I: IntoIterator<Item = Factor>
    {
        factors.into_iter().fold(self, |b, f| b.with_factor(f))
    }

    /// Add a `Variable` with a tabular CPT to the model.
    ///
    /// # Args
    /// * `var`: the name of the variable to add to the model
    /// * `parents`: the names of the parent variables, in the order of the table axes
    /// * `init`: the initialization mechanism for the CPT of `var` in the model
    pub fn with_cpt(mut self, var: &str, parents: &[&str], init: Initialization) -> Self {
        if self.err.is_none() {
            self.declarations.push(Declaration::Table {
                variable: String::from(var),
                parents: parents.iter().map(|&p| String::from(p)).collect(),
                init
            });
        }
        self
    }

    /// Declare the domain of a `Variable`. `Variable`s without a declared domain are binary.
    ///
    /// An empty domain, a domain repeating a value, or a second domain for the same `Variable`
    /// puts the builder in an error state: `ModelError::InvalidDomain` is returned by `build`.
    pub fn with_domain<V: Into<Value>>(mut self, var: &str, values: Vec<V>) -> Self {
        if self.err.is_some() {
            return self;
        }

        let domain: Vec<Value> = values.into_iter().map(|v| v.into()).collect();
        if self.domains.contains_key(var) {
            self.err = Some(BbnError::from(ModelError::InvalidDomain(String::from(var))));
            return self;
        }

        match Variable::new(var, domain) {
            Ok(v) => {
                self.domains.insert(String::from(var), v.domain().to_vec());
            },
            Err(e) => {
                self.err = Some(e);
            }
        }
        self
    }

    /// Set the tolerance used to validate tabular CPTs
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Complete building the model.
    ///
    /// # Returns
    /// the `DirectedModel`, or an error if one was generated during the building process
    ///
    /// # Postcondition
    /// This call consumes the `DirectedModelBuilder`
    pub fn build(self) -> Result<DirectedModel> {
        if let Some(e) = self.err {
            return Err(e);
        }

        let DirectedModelBuilder { declarations, mut domains, tolerance, .. } = self;

        ///////////////////////////////////////////////////////////////////////
        // 1) Check the parameter lists
        for decl in declarations.iter() {
            let scope = decl.scope();
            if scope.iter().unique().count() != scope.len() {
                return Err(BbnError::from(ModelError::DuplicateParameter(scope.iter().join(", "))));
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Determine which variable each factor introduces
        let names = introduced_variables(&declarations)?;

        let mut lookup: BidirMap<VarId, String> = BidirMap::new();
        for (id, name) in names.iter().enumerate() {
            lookup.insert(id, name.clone());
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) Build the variables
        let mut variables = Vec::with_capacity(names.len());
        for name in names.iter() {
            let var = match domains.shift_remove(name) {
                Some(domain) => Variable::new(name, domain)?,
                None => Variable::binary(name)
            };
            variables.push(var);
        }

        if let Some(name) = domains.keys().next() {
            return Err(BbnError::from(ModelError::UnknownVariable(name.clone())));
        }

        ///////////////////////////////////////////////////////////////////////
        // 4) Resolve the parents of each variable
        let mut parents: Vec<Vec<VarId>> = Vec::with_capacity(names.len());
        let mut declared: Vec<Vec<VarId>> = Vec::with_capacity(names.len());
        for (id, decl) in declarations.iter().enumerate() {
            let mut ps = Vec::new();
            for p in decl.scope().into_iter().filter(|&p| p != names[id]) {
                match lookup.get_by_second(&String::from(p)) {
                    Some(&pid) => ps.push(pid),
                    None => {
                        return Err(BbnError::from(ModelError::MissingParent {
                            parent: String::from(p),
                            child: names[id].clone()
                        }));
                    }
                }
            }

            declared.push(ps.clone());
            ps.sort_unstable();
            parents.push(ps);
        }

        let mut children: Vec<Vec<VarId>> = vec![Vec::new(); names.len()];
        for (id, ps) in parents.iter().enumerate() {
            for &p in ps.iter() {
                children[p].push(id);
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 5) Build the CPTs
        let mut factors = Vec::with_capacity(names.len());
        for (id, decl) in declarations.into_iter().enumerate() {
            let factor = match decl {
                Declaration::Function(f) => f,
                Declaration::Table { init, .. } => {
                    let ps: Vec<&Variable> = declared[id].iter().map(|&p| &variables[p]).collect();
                    init.build_cpt(&variables[id], &ps, tolerance)?
                }
            };
            factors.push(factor);
        }

        ///////////////////////////////////////////////////////////////////////
        // 6) Topological order
        let order = topological_order(&parents, &children).map_err(|v| {
            BbnError::from(ModelError::Cyclic(names[v].clone()))
        })?;

        debug!(
            variables = variables.len(),
            edges = parents.iter().map(|p| p.len()).sum::<usize>(),
            "built directed model"
        );

        Ok(DirectedModel {
            variables,
            names: lookup,
            factors,
            parents,
            children,
            order,
            engine: OnceLock::new()
        })
    }
}

/// Determine the name of the variable each declaration introduces, in declaration order.
///
/// Explicit declarations are taken as is. The rest are resolved to a fixed point: a factor with
/// exactly one parameter that no other factor introduces introduces that parameter.
fn introduced_variables(declarations: &[Declaration]) -> Result<Vec<String>> {
    let mut known: HashSet<&str> = HashSet::new();
    let mut introduced: Vec<Option<&str>> = Vec::with_capacity(declarations.len());

    for decl in declarations.iter() {
        let var = decl.variable();
        if let Some(v) = var {
            if ! known.insert(v) {
                return Err(BbnError::from(ModelError::DuplicateVariable(String::from(v))));
            }
        }
        introduced.push(var);
    }

    let mut changed = true;
    while changed {
        changed = false;

        for (i, decl) in declarations.iter().enumerate() {
            if introduced[i].is_some() {
                continue;
            }

            let unknown: Vec<&str> = decl.scope().into_iter().filter(|p| ! known.contains(p)).collect();
            if unknown.len() == 1 {
                known.insert(unknown[0]);
                introduced[i] = Some(unknown[0]);
                changed = true;
            }
        }
    }

    introduced.into_iter()
              .zip(declarations.iter())
              .map(|(v, decl)| match v {
                  Some(v) => Ok(String::from(v)),
                  None => {
                      // every parameter is introduced elsewhere, so the leading one is a duplicate
                      let scope = decl.scope();
                      match scope.first() {
                          Some(&first) if scope.iter().all(|p| known.contains(p)) => {
                              Err(BbnError::from(ModelError::DuplicateVariable(String::from(first))))
                          },
                          _ => Err(BbnError::from(ModelError::UnresolvedFactor(scope.iter().join(", "))))
                      }
                  }
              })
              .collect()
}

/// Kahn's algorithm, always releasing the smallest ready id first.
///
/// # Returns
/// the order, or the smallest id on a cycle (or downstream of one) if the graph is not acyclic
fn topological_order(parents: &[Vec<VarId>], children: &[Vec<VarId>]) -> std::result::Result<Vec<VarId>, VarId> {
    let mut indegree: Vec<usize> = parents.iter().map(|p| p.len()).collect();
    let mut ready: BinaryHeap<Reverse<VarId>> = indegree.iter()
                                                        .enumerate()
                                                        .filter(|&(_, &d)| d == 0)
                                                        .map(|(v, _)| Reverse(v))
                                                        .collect();

    let mut order = Vec::with_capacity(parents.len());
    while let Some(Reverse(v)) = ready.pop() {
        order.push(v);
        for &c in children[v].iter() {
            indegree[c] -= 1;
            if indegree[c] == 0 {
                ready.push(Reverse(c));
            }
        }
    }

    if order.len() == parents.len() {
        Ok(order)
    } else {
        // invariant: some variable still has an unsatisfied parent
        Err(indegree.iter().position(|&d| d > 0).unwrap_or(0))
    }
}
