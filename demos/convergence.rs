use kmeans_mr::*;

fn main() -> Result<()> {
    env_logger::init();
    let (sample_cnt, sample_dims, k, max_rounds) = (50000, 8, 6, 500);

    // Generate some random data
    let mut samples = vec![0.0f64;sample_cnt * sample_dims];
    samples.iter_mut().for_each(|v| *v = rand::random());
    let table = ColumnTable::from_rows(&samples, sample_dims, 5000)?;

	let conf = KMeansConfig::build()
        .seed(1337)
        .abort_strategy(AbortStrategy::NoImprovementForXIterations {
            // Stop after there has not been an improvement for 3 rounds
            x: 3,
            // Only count as improvement if > 0.0005 difference
            threshold: 0.0005f64,
            // Do not directly stop after a growing error
            abort_on_negative: false
        })
		.build();

    let kmean = KMeans::new(&table)?;
    let result = kmean.kmeans_lloyd(k, max_rounds, KMeans::init_kmeanplusplus, &conf)?;

    println!("Stopped after {} of {} rounds", result.rounds(), max_rounds);
    println!("Centroids: {:?}", result.centroids);
    println!("Error: {}", result.distsum);
    Ok(())
}
