//! The Monty Hall problem. Every factor is a plain function, and the variable each one
//! introduces is worked out when the model is built.

use bbn as b;
use tracing_subscriber::EnvFilter;

fn main() -> b::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let doors = vec!["A", "B", "C"];

    let model = b::DirectedModelBuilder::new()
        .with_factor(b::Factor::new(&["prize"], |_| 1.0 / 3.0))
        .with_factor(b::Factor::new(&["guest"], |_| 1.0 / 3.0))
        .with_factor(b::Factor::new(&["monty", "prize", "guest"], |a| {
            if a["monty"] == a["prize"] || a["monty"] == a["guest"] {
                0.0
            } else if a["prize"] == a["guest"] {
                0.5
            } else {
                1.0
            }
        }))
        .with_domain("prize", doors.clone())
        .with_domain("guest", doors.clone())
        .with_domain("monty", doors.clone())
        .build()?;

    let evidence = b::Assignment::new().with("guest", "A").with("monty", "B");
    let marginals = model.query(&evidence)?;

    for door in doors {
        println!(
            "P(prize = {} | guest = A, monty = B) = {:.4}",
            door,
            marginals.get("prize", door).unwrap_or_default()
        );
    }

    Ok(())
}
