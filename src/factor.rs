//! Definition of the factor module
//!
//! A `Factor` is a conditional probability table (CPT) of one `Variable` given its parents,
//! represented as a pure function from an `Assignment` of its parameters to a probability.
//!
//! The parameters of a `Factor` are declared explicitly, by name. The names double as the
//! identifiers of the `Variable`s in the model: a `Factor` over `(grass_wet, rain, sprinkler)`
//! has an edge from the `Factor`s introducing `rain` and `sprinkler` in the network.

use crate::variable::Assignment;

use itertools::Itertools;

use std::fmt;
use std::sync::Arc;

/// The function wrapped by a `Factor`.
pub type FactorFn = dyn Fn(&Assignment) -> f64 + Send + Sync;


#[derive(Clone)]
pub struct Factor {

    /// The variable this `Factor` introduces, when declared explicitly. Otherwise it is inferred
    /// when the model is built.
    variable: Option<String>,

    /// The parameter names, in declaration order
    scope: Vec<String>,

    /// The probability function
    function: Arc<FactorFn>

}

impl Factor {

    /// Create a new `Factor` over the given parameters.
    ///
    /// The variable this `Factor` introduces is inferred when the model is built: it is the unique
    /// parameter that no other `Factor` in the model introduces.
    ///
    /// # Args
    /// * `scope`: the parameter names
    /// * `function`: the probability of an assignment to `scope`
    pub fn new<F>(scope: &[&str], function: F) -> Self
        where F: Fn(&Assignment) -> f64 + Send + Sync + 'static
    {
        Factor {
            variable: None,
            scope: scope.iter().map(|&s| String::from(s)).collect(),
            function: Arc::new(function)
        }
    }

    /// Create a new `Factor` representing ```P(variable | parents)```.
    ///
    /// The scope of the `Factor` is `variable` followed by `parents`.
    pub fn cpt<F>(variable: &str, parents: &[&str], function: F) -> Self
        where F: Fn(&Assignment) -> f64 + Send + Sync + 'static
    {
        let scope = Some(variable).into_iter().chain(parents.iter().cloned()).map(String::from).collect();

        Factor {
            variable: Some(String::from(variable)),
            scope,
            function: Arc::new(function)
        }
    }

    /// The explicitly declared variable of this `Factor`, if there is one
    pub fn variable(&self) -> Option<&str> {
        self.variable.as_ref().map(|s| s.as_str())
    }

    /// The parameter names of this `Factor`
    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    /// Evaluate the `Factor` on an assignment covering its scope
    pub fn evaluate(&self, assignment: &Assignment) -> f64 {
        (self.function)(assignment)
    }
}

impl fmt::Debug for Factor {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.variable {
            Some(ref v) => write!(f, "Factor({} | {})", v, self.scope[1..].iter().join(", ")),
            None => write!(f, "Factor({})", self.scope.iter().join(", "))
        }
    }

}

// Unit tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpt() {
        let f = Factor::cpt("sprinkler", &["rain"], |a| {
            match (a["rain"] == true, a["sprinkler"] == true) {
                (true, true) => 0.01,
                (true, false) => 0.99,
                (false, true) => 0.4,
                (false, false) => 0.6
            }
        });

        assert_eq!(Some("sprinkler"), f.variable());
        assert_eq!(&[String::from("sprinkler"), String::from("rain")], f.scope());

        let a = Assignment::new().with("rain", false).with("sprinkler", true);
        assert_eq!(0.4, f.evaluate(&a));

        // out of scope values are ignored
        let a = a.with("grass_wet", true);
        assert_eq!(0.4, f.evaluate(&a));

        assert_eq!("Factor(sprinkler | rain)", format!("{:?}", f));
    }

    #[test]
    fn inferred() {
        let f = Factor::new(&["guest", "prize", "monty"], |_| 1.0 / 3.0);
        assert_eq!(None, f.variable());
        assert_eq!(3, f.scope().len());
        assert_eq!("Factor(guest, prize, monty)", format!("{:?}", f));
    }
}
