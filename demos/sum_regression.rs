use hidden_mlp::{Dataset, NetworkBuilder, ProgressEvent, Rates};
use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;

fn main() -> hidden_mlp::Result<()> {
    // Task: learn y = x0 + x1 with a linear output unit.
    let mut rng = StdRng::seed_from_u64(1);
    let dist = Uniform::new(-1.0_f64, 1.0_f64);

    let mut sample = |n: usize| {
        let mut xs = Vec::with_capacity(n);
        let mut ys = Vec::with_capacity(n);
        for _ in 0..n {
            let x0 = dist.sample(&mut rng);
            let x1 = dist.sample(&mut rng);
            xs.push(vec![x0, x1]);
            ys.push(vec![x0 + x1]);
        }
        Dataset::from_rows(xs, ys)
    };
    let train = sample(256)?;
    let test = sample(64)?;

    let mut net = NetworkBuilder::new(2, 6, 1)?
        .regression(true)
        .rates(Rates::new(0.05, 0.1)?)?
        .build_with_seed(0);

    let mut shuffle_rng = StdRng::seed_from_u64(2);
    let mut report = |e: ProgressEvent| {
        if let ProgressEvent::Epoch { epoch, mse } = e {
            println!("epoch {epoch:>4} mse {mse:.6}");
        }
    };
    net.train_with(&train, 200, &mut shuffle_rng, &mut report)?;

    let test_mse = net.mean_error(&test)?;
    println!("test_mse={test_mse:.6}");
    Ok(())
}
