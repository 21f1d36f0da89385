use backprop::{EpochReport, Network, TrainItem, TrainingHyperParameters};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Two noisy gaussian blobs, trained in best-of-N mode with eta annealing.
fn blobs<R: Rng>(rng: &mut R, count: usize) -> backprop::Result<Vec<TrainItem>> {
    (0..count)
        .map(|i| {
            let label = (i % 2) as f64;
            let center = if label == 0. { -1. } else { 1. };
            let x = center + rng.gen_range(-1.2..1.2);
            let y = center + rng.gen_range(-1.2..1.2);
            TrainItem::new(vec![x, y], label, 2)
        })
        .collect()
}

fn main() -> backprop::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let rng = &mut StdRng::seed_from_u64(7);
    let training = blobs(rng, 400)?;
    let validation = blobs(rng, 100)?;

    let tp = match std::env::var("TRAINING_CONFIG") {
        Ok(path) => TrainingHyperParameters::from_json_file(path)?,
        Err(_) => TrainingHyperParameters {
            epochs: -4,
            mini_batch_size: 10,
            eta: 0.5,
            eta_decay_fraction: 8.,
            lambda: 1.,
            print_cost: true,
            ..Default::default()
        },
    };

    let mut network = Network::new(vec![2, 6, 2], rng)?;
    let outcome = network.train(&training, &tp, &validation, rng, &mut |report: &EpochReport| {
        println!("Epoch {}: {:.4} | Cost: {:.5} | eta {}", report.epoch, report.accuracy.unwrap_or(0.), report.cost.unwrap_or(f64::NAN), report.eta);
    })?;

    println!("{outcome:?}");
    println!("Validation accuracy of restored network: {:.4}", network.evaluate(&validation));
    Ok(())
}
