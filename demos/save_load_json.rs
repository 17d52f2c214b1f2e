use hidden_mlp::{Dataset, Network, NoProgress};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> hidden_mlp::Result<()> {
    let xs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let train = Dataset::from_rows(xs, ys)?;

    let mut rng = StdRng::seed_from_u64(0);
    let mut net = Network::new_with_rng(2, 3, 1, false, Default::default(), &mut rng)?;
    net.train_with(&train, 2_000, &mut rng, &mut NoProgress)?;

    let path = "target/tmp_network.json";
    net.save_json(path)?;

    let mut loaded = Network::load_json(path)?;
    assert_eq!(loaded, net);
    println!(
        "saved and loaded network: {path} y(1,0)={:.4}",
        loaded.forward(&[1.0, 0.0])?[0]
    );
    Ok(())
}
