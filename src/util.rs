//! Defines the `Error` types for the bbn library

use thiserror::Error;

use std::result;

pub type Result<T> = result::Result<T, BbnError>;

/// Defects in the structure of a model, or in the junction tree compiled from it.
///
/// These are always fatal. A `ModelError` raised after the model was built signals a defect in
/// moralization or triangulation rather than bad input data.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {

    /// More than one factor introduces the same variable
    #[error("variable '{0}' is introduced by more than one factor")]
    DuplicateVariable(String),

    /// A factor lists the same parameter twice
    #[error("factor over ({0}) lists a parameter more than once")]
    DuplicateParameter(String),

    /// It could not be determined which variable a factor introduces
    #[error("unable to determine which variable the factor over ({0}) introduces")]
    UnresolvedFactor(String),

    /// A factor refers to a variable that no factor introduces
    #[error("parent '{parent}' of '{child}' is not introduced by any factor")]
    MissingParent { parent: String, child: String },

    /// A domain was declared for a variable that is not in the model
    #[error("domain declared for unknown variable '{0}'")]
    UnknownVariable(String),

    /// A domain is empty or repeats a value
    #[error("domain of '{0}' is empty or repeats a value")]
    InvalidDomain(String),

    /// A tabular initialization is incompatible with the variable it initializes
    #[error("invalid initialization for '{variable}': {reason}")]
    InvalidInitialization { variable: String, reason: String },

    /// A factor is not a normalized, non-negative conditional probability table
    #[error("factor for '{0}' is not a conditional probability table")]
    NotACpt(String),

    /// The parent/child relation contains a cycle
    #[error("model contains a cycle through '{0}'")]
    Cyclic(String),

    /// No clique of the junction tree contains the family of a factor
    #[error("no clique contains the family of '{0}'")]
    NoContainingClique(String),

    /// Sepset insertion did not join the forest into a single tree
    #[error("junction tree forest still holds {0} trees after sepset insertion")]
    DisconnectedForest(usize),

}

/// Problems with the evidence supplied to a query. These are reported to the caller.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvidenceError {

    /// Evidence refers to a variable that is not in the model
    #[error("evidence references unknown variable '{0}'")]
    UnknownVariable(String),

    /// The observed value is not in the domain of the variable
    #[error("'{value}' is not in the domain of '{variable}'")]
    InvalidValue { variable: String, value: String },

    /// The evidence has zero probability under the model
    #[error("evidence has zero probability under the model")]
    Impossible,

}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum BbnError {

    /// A structural defect in the model or its junction tree
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Invalid evidence
    #[error(transparent)]
    Evidence(#[from] EvidenceError),

    /// Absorption through a sepset found a zero denominator under a non-zero potential entry
    #[error("numeric inconsistency absorbing into clique {clique} through sepset {sepset}")]
    NumericInconsistency { clique: usize, sepset: usize },

    /// Exactly what it sounds like
    #[error("encountered division by zero")]
    DivideByZero,

    /// Represents an incomplete assignment where a complete assignment was required
    #[error("missing assignments to the required variables")]
    IncompleteAssignment,

    /// Represents an error where a certain constraint on a scope was not satisfied
    #[error("provided scope did not satisfy constraints")]
    InvalidScope,

    /// A variable name that the model does not know
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// A clique index outside of the junction tree
    #[error("junction tree has no clique {0}")]
    UnknownClique(usize),

}

impl BbnError {

    /// Check if the error signals a defect in the model or in the computation, as opposed to bad
    /// input supplied with a query.
    pub fn is_fatal(&self) -> bool {
        match self {
            BbnError::Evidence(_) | BbnError::UnknownVariable(_) | BbnError::UnknownClique(_) => false,
            _ => true
        }
    }

}
