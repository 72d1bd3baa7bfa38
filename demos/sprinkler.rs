//! Provides an example of how to use bbn to perform inference on a Bayesian Network.
//!
//! Run with `RUST_LOG=bbn=debug` to trace the junction tree compilation.

use bbn as b;
use ndarray::prelude as nd;
use tracing_subscriber::EnvFilter;

fn main() -> b::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    /////////////////////////////////////////////////////
    // Step 1: Build Model
    let model = b::DirectedModelBuilder::new()
        .with_cpt("rain", &[], b::Initialization::Bernoulli(0.2))
        .with_cpt(
            "sprinkler",
            &["rain"],
            b::Initialization::Table(nd::arr2(&[[0.01, 0.99], [0.4, 0.6]]).into_dyn())
        )
        .with_factor(b::Factor::cpt("grass_wet", &["sprinkler", "rain"], |a| {
            let p = match (a["sprinkler"] == true, a["rain"] == true) {
                (true, true) => 0.99,
                (true, false) => 0.9,
                (false, true) => 0.8,
                (false, false) => 0.0
            };
            if a["grass_wet"] == true { p } else { 1.0 - p }
        }))
        .build()?;

    /////////////////////////////////////////////////////
    // Step 2: Query without and with evidence
    let prior = model.query(&b::Assignment::new())?;
    println!("P(grass_wet = true) = {:.5}", prior.get("grass_wet", true).unwrap_or_default());

    let evidence = b::Assignment::new().with("grass_wet", true);
    let posterior = model.query(&evidence)?;
    for d in posterior.iter() {
        for (value, p) in d.values() {
            println!("P({} = {} | grass_wet = true) = {:.5}", d.variable(), value, p);
        }
    }

    Ok(())
}
