use std::time::Instant;

use mazeforge::{Builder, MazeFactory, Order};

/// Builds the largest default skill level repeatedly with every builder.
fn main() -> mazeforge::Result<()> {
    let mut args = std::env::args();
    args.next(); // Skip executable name
    let num_iters = args
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1);

    let factory = MazeFactory::default();
    let skill = (factory.config().skills.len() - 1) as u8;

    for builder in Builder::ALL {
        let started = Instant::now();
        for seed in 0..num_iters as u64 {
            let order = Order::new(skill, builder, false, Some(seed));
            factory.order(&order)?;
            factory.wait_till_delivered(&order)?;
        }
        println!(
            "{builder}: {num_iters} mazes in {:.2?} ({:.2?} each)",
            started.elapsed(),
            started.elapsed() / num_iters.max(1) as u32
        );
    }
    Ok(())
}
