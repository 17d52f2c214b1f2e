use hidden_mlp::{Dataset, Network, TracingProgress};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

fn main() -> hidden_mlp::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Classic XOR dataset.
    let xs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let train = Dataset::from_rows(xs.clone(), ys)?;

    // 2 -> 2 -> 1 network with sigmoid outputs and the default rates.
    let mut rng = StdRng::seed_from_u64(0);
    let mut net = Network::new_with_rng(2, 2, 1, false, Default::default(), &mut rng)?;

    net.train_with(&train, 20_000, &mut rng, &mut TracingProgress)?;

    let mse = net.mean_error(&train)?;
    println!("train_mse={mse:.6}");
    for x in xs {
        let y = net.forward(&x)?[0];
        println!("x={x:?} y={y:.4}");
    }

    Ok(())
}
