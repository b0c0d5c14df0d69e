use kmeans_mr::*;

fn main() -> Result<()> {
    env_logger::init();
    let (sample_cnt, sample_dims, k, rounds) = (20000, 200, 4, 25);

    // Generate some random data
    let mut samples = vec![0.0f64;sample_cnt * sample_dims];
    samples.iter_mut().for_each(|v| *v = rand::random());
    let table = ColumnTable::from_rows(&samples, sample_dims, 2500)?;

	let conf = KMeansConfig::<f64>::build()
		.init_done(&|_| println!("Initialization completed."))
		.iteration_done(&|s, nr, new_distsum|
			println!("Round {} - Error: {:.2} -> {:.2} | Improvement: {:.2}",
				nr, s.distsum, new_distsum, s.distsum - new_distsum))
		.build();

    // Four worker threads, independent of rayon's global pool
    let kmean = KMeans::with_executor(&table, RayonExecutor::with_threads(4)?)?;
    let result = kmean.kmeans_lloyd(k, rounds, KMeans::init_kmeanplusplus, &conf)?;

    println!("Centroid frequencies: {:?}", result.centroid_frequency);
    println!("Error: {}", result.distsum);
    Ok(())
}
