//! Exact inference for discrete Bayesian Belief Networks by junction tree propagation.
//!
//! A `DirectedModel` is built from one CPT `Factor` per `Variable`. Queries compile the model
//! into a junction tree once (moralize, triangulate, connect the cliques, multiply the factors
//! in) and then answer ```P(X | evidence)``` for every `Variable` by two-pass Hugin propagation.

pub mod config;
pub mod factor;
pub mod inference;
pub mod init;
pub mod model;
pub mod potential;
pub mod util;
pub mod variable;

pub use crate::config::{EngineConfig, RootSelection};
pub use crate::factor::Factor;
pub use crate::inference::{ConditionalInferenceEngine, Distribution, EnumerationEngine, JunctionTreeEngine, Marginals};
pub use crate::init::Initialization;
pub use crate::model::directed::{DirectedModel, DirectedModelBuilder};
pub use crate::model::Model;
pub use crate::util::{BbnError, EvidenceError, ModelError, Result};
pub use crate::variable::{Assignment, Value, Variable};
