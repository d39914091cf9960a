//! DTW k-means on synthetic daily bars (o/c ratio, volume, high, low).
//!
//! Run with `RUST_LOG=info` to see per-round progress.

use std::collections::BTreeMap;

use rand::prelude::*;
use tracing_subscriber::EnvFilter;
use tsclump::{DtwKmeans, ProgressLogger, Series};

const DAYS: usize = 60;

/// One bar per day; `trend` is the daily drift of the close.
fn synthetic_bars(rng: &mut StdRng, trend: f64, base_volume: f64) -> Series {
    let mut price = 100.0;
    let mut steps = Vec::with_capacity(DAYS);
    for _ in 0..DAYS {
        let open = price;
        price *= 1.0 + trend + (rng.random::<f64>() - 0.5) * 0.004;
        let high = open.max(price) * (1.0 + rng.random::<f64>() * 0.002);
        let low = open.min(price) * (1.0 - rng.random::<f64>() * 0.002);
        let volume = base_volume * (0.9 + rng.random::<f64>() * 0.2);
        steps.push(vec![open / price, volume, high / 100.0, low / 100.0]);
    }
    Series::from_steps(steps).unwrap()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut rng = StdRng::seed_from_u64(7);
    let mut data = BTreeMap::new();
    for i in 0..4 {
        data.insert(format!("UP{i}"), synthetic_bars(&mut rng, 0.004, 1.0));
        data.insert(format!("FLAT{i}"), synthetic_bars(&mut rng, 0.0, 1.0));
        data.insert(format!("DOWN{i}"), synthetic_bars(&mut rng, -0.004, 1.0));
    }

    let engine = DtwKmeans::new(3).with_n_iter(10).with_window(Some(2)).with_seed(42);
    match engine.fit_with_observer(&data, &mut ProgressLogger) {
        Ok(model) => {
            for c in 0..model.num_clusters() {
                println!("cluster {c}: {:?}", model.members(c));
            }
            for stats in model.history() {
                println!(
                    "round {:2}: {:3} DTW evaluations, {:3} pruned",
                    stats.round, stats.dtw_evaluations, stats.lb_pruned
                );
            }
        }
        Err(e) => eprintln!("clustering failed: {e}"),
    }
}
