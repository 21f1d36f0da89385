use backprop::{LogReporter, Matrix, Network, TrainItem, TrainingHyperParameters};
use rand::{rngs::StdRng, SeedableRng};

/// Trains a small network on the XOR truth table, then saves and reloads it.
fn main() -> backprop::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let items = [([0., 0.], 0.), ([0., 1.], 1.), ([1., 0.], 1.), ([1., 1.], 0.)]
        .into_iter()
        .map(|(values, label)| TrainItem::new(values.to_vec(), label, 2))
        .collect::<backprop::Result<Vec<_>>>()?;

    let rng = &mut StdRng::seed_from_u64(2024);
    let mut network = Network::new(vec![2, 8, 2], rng)?;

    let tp = TrainingHyperParameters {
        epochs: 500,
        mini_batch_size: 1,
        eta: 1.,
        print_cost: true,
        ..Default::default()
    };
    network.train(&items, &tp, &items, rng, &mut LogReporter)?;

    let path = std::env::temp_dir().join("xor_network.json");
    network.save(&path)?;
    let restored = Network::load(&path)?;

    for item in items.iter() {
        let input: &Matrix = item.values();
        println!("{:?} -> class {} (expected {})", input.read_values(), restored.classify(input), item.label());
    }

    println!("{restored}");
    Ok(())
}
