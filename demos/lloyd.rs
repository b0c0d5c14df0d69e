use kmeans_mr::*;
use rand::prelude::*;

/// Gaussian-ish blobs with a leading id column, laid out column by column.
fn generate_columns(rnd: &mut StdRng, rows: usize, dims: usize, blobs: usize) -> Vec<Vec<f64>> {
    let centers: Vec<f64> = (0..blobs * dims).map(|_| rnd.gen_range(-50.0..50.0)).collect();
    let mut columns = vec![Vec::with_capacity(rows); dims + 1];
    for r in 0..rows {
        let blob = rnd.gen_range(0..blobs);
        columns[0].push(r as f64);
        for d in 0..dims {
            let noise: f64 = (0..4).map(|_| rnd.gen_range(-1.0..1.0)).sum();
            columns[d + 1].push(centers[blob * dims + d] + noise);
        }
    }
    columns
}

fn main() -> Result<()> {
    env_logger::init();
    let (rows, dims, k, rounds) = (100_000, 4, 7, 10);

    // Skip the first (id) column, cluster on the rest
    let mut rnd = StdRng::seed_from_u64(42);
    let table = ColumnTable::from_columns(generate_columns(&mut rnd, rows, dims, k), 4096)?.without_column(0)?;

    let kmean = KMeans::new(&table)?;
    let conf = KMeansConfig::build()
        .random_generator(rnd)
        .iteration_done(&|_, _, error| println!("Error is {}", error))
        .build();
    let result = kmean.kmeans_lloyd(k, rounds, KMeans::init_random_sample, &conf)?;

    println!("Clusters:");
    for c in result.centroids.rows() {
        c.iter().for_each(|v| print!("{:.2}, ", v));
        println!();
    }
    Ok(())
}
