use hidden_mlp::{NetworkBuilder, NoProgress, SparseDataset, SparseInput};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> hidden_mlp::Result<()> {
    // Bag-of-features classification: the label is 1 when feature 3 is present.
    let features = 8;
    let rows: Vec<(Vec<usize>, f64)> = vec![
        (vec![0, 3], 1.0),
        (vec![1, 2], 0.0),
        (vec![3, 5, 7], 1.0),
        (vec![4, 6], 0.0),
        (vec![2, 3], 1.0),
        (vec![0, 7], 0.0),
    ];

    // Every row lists all features so absent ones are written as zero and
    // never leak a value from the previous sample.
    let inputs: Vec<SparseInput> = rows
        .iter()
        .map(|(present, _)| {
            (0..features)
                .map(|i| (i, if present.contains(&i) { 1.0 } else { 0.0 }))
                .collect()
        })
        .collect();
    let targets = rows.iter().map(|(_, label)| vec![*label]).collect();
    let train = SparseDataset::new(inputs.clone(), targets)?;

    let mut net = NetworkBuilder::new(features, 4, 1)?.build_with_seed(0);
    net.train_sparse_with(&train, 2_000, &mut StdRng::seed_from_u64(0), &mut NoProgress)?;

    for (input, (present, label)) in inputs.iter().zip(&rows) {
        let y = net.forward_sparse(input)?[0];
        println!("features={present:?} label={label} y={y:.3}");
    }
    Ok(())
}
