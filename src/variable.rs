//! Definition of the variable module
//!
//! A `Variable` represents a discrete random variable in a Bayesian Belief Network. Each
//! `Variable` has a name and an ordered domain of `Value`s. Internally, a value is referred to by
//! its index in the domain, so the first value of every domain is index `0`.

use crate::util::{BbnError, ModelError, Result};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::ops::Index;

/// The stable identifier of a `Variable` within a model. Identifiers are handed out in the order
/// the introducing factors were declared.
pub type VarId = usize;


/// A single value in the domain of a `Variable`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A truth value - the default domain is `[true, false]`
    Bool(bool),

    /// An integer tag
    Int(i64),

    /// A named value
    Label(String)
}

impl Value {

    /// Get the value as a `bool`, if it is one
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None
        }
    }

    /// Get the value as an integer, if it is one
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            _ => None
        }
    }

    /// Get the value as a label, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Label(s) => Some(s.as_str()),
            _ => None
        }
    }
}

impl fmt::Display for Value {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Label(s) => write!(f, "{}", s)
        }
    }

}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self { Value::Int(i) }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self { Value::Int(i64::from(i)) }
}

impl<'a> From<&'a str> for Value {
    fn from(s: &'a str) -> Self { Value::Label(String::from(s)) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::Label(s) }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool { self.as_bool() == Some(*other) }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool { self.as_int() == Some(*other) }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool { self.as_str() == Some(other) }
}

impl<'a> PartialEq<&'a str> for Value {
    fn eq(&self, other: &&'a str) -> bool { self.as_str() == Some(*other) }
}


/// A discrete random variable: a name and an ordered domain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Variable {

    /// The name of the `Variable`
    name: String,

    /// The possible values of the `Variable`, in order
    domain: Vec<Value>

}

impl Variable {

    /// Construct a new binary `Variable` with the domain `[true, false]`
    pub fn binary(name: &str) -> Variable {
        Variable {
            name: String::from(name),
            domain: boolean_domain()
        }
    }

    /// Construct a new `Variable` over the given domain.
    ///
    /// # Errors
    /// * `ModelError::InvalidDomain` if the domain is empty or repeats a value
    pub fn new(name: &str, domain: Vec<Value>) -> Result<Variable> {
        if domain.is_empty() || domain.iter().enumerate().any(|(i, v)| domain[..i].contains(v)) {
            return Err(BbnError::from(ModelError::InvalidDomain(String::from(name))));
        }

        Ok(Variable { name: String::from(name), domain })
    }

    /// Get the name of the `Variable`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the domain of the `Variable`
    pub fn domain(&self) -> &[Value] {
        &self.domain
    }

    /// Get the number of values the `Variable` can take
    pub fn cardinality(&self) -> usize {
        self.domain.len()
    }

    /// Get the index of a value in the domain of this `Variable`
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.domain.iter().position(|v| v == value)
    }

    /// Get the value at an index of the domain
    pub fn value(&self, idx: usize) -> Option<&Value> {
        self.domain.get(idx)
    }
}

impl fmt::Display for Variable {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }

}

/// The default domain of a `Variable`
pub fn boolean_domain() -> Vec<Value> {
    vec![Value::Bool(true), Value::Bool(false)]
}


/// Iterator over every configuration of a list of `Variable`s, given by their cardinalities.
///
/// Configurations are vectors of value indices, yielded in row-major order (the last `Variable`
/// changes fastest). An empty list has exactly one, empty, configuration.
pub struct Configurations {
    cards: Vec<usize>,
    next: Option<Vec<usize>>
}

impl Iterator for Configurations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;

        let mut succ = current.clone();
        for i in (0..succ.len()).rev() {
            succ[i] += 1;
            if succ[i] < self.cards[i] {
                self.next = Some(succ);
                break;
            }
            succ[i] = 0;
        }

        Some(current)
    }
}

/// Enumerate all configurations of `Variable`s with the given cardinalities
pub fn configurations(cards: &[usize]) -> Configurations {
    let next = if cards.iter().any(|&c| c == 0) { None } else { Some(vec![0; cards.len()]) };
    Configurations { cards: cards.to_vec(), next }
}


/// A (partial) assignment of `Value`s to named `Variable`s.
///
/// An `Assignment` is what a `Factor` function receives when it is evaluated, and it is also how
/// evidence is handed to an inference engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    values: IndexMap<String, Value>
}

impl Assignment {

    /// Construct a new, empty `Assignment`
    pub fn new() -> Self {
        Assignment { values: IndexMap::new() }
    }

    /// Assign `value` to the variable named `name`, replacing any previous value
    pub fn set<V: Into<Value>>(&mut self, name: &str, value: V) {
        self.values.insert(String::from(name), value.into());
    }

    /// Builder-style version of `set`
    pub fn with<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.set(name, value);
        self
    }

    /// Get the value assigned to the variable named `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Remove the value assigned to `name`
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the assigned `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> Index<&'a str> for Assignment {
    type Output = Value;

    /// # Panics
    /// if nothing is assigned to `name`. A `Factor` is only ever evaluated on assignments that
    /// cover its scope.
    fn index(&self, name: &'a str) -> &Value {
        match self.values.get(name) {
            Some(v) => v,
            None => panic!("no value assigned to '{}'", name)
        }
    }
}

impl<'a, V: Into<Value>> std::iter::FromIterator<(&'a str, V)> for Assignment {

    fn from_iter<I: IntoIterator<Item = (&'a str, V)>>(iter: I) -> Self {
        let mut a = Assignment::new();
        for (name, value) in iter {
            a.set(name, value);
        }
        a
    }

}
