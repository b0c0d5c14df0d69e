use kmeans_mr::*;
use rand::prelude::*;

/// Row-major partitions, to run the engine against a table that is not a [`ColumnTable`].
struct RowPartition {
    dims: usize,
    values: Vec<f64>
}
impl Partition<f64> for RowPartition {
    fn row_count(&self) -> usize { self.values.len() / self.dims }
    fn column_count(&self) -> usize { self.dims }
    fn value(&self, column: usize, row: usize) -> f64 { self.values[row * self.dims + column] }
}

struct RowTable {
    dims: usize,
    partitions: Vec<RowPartition>
}
impl RowTable {
    fn new(samples: &[f64], dims: usize, partition_rows: usize) -> Self {
        let partitions = samples.chunks(partition_rows * dims)
            .map(|c| RowPartition { dims, values: c.to_vec() })
            .collect();
        Self { dims, partitions }
    }
}
impl PartitionedTable<f64> for RowTable {
    type Part = RowPartition;
    fn column_count(&self) -> usize { self.dims }
    fn partitions(&self) -> &[RowPartition] { &self.partitions }
    fn validate(&self) -> Result<()> {
        match self.partitions.iter().find(|p| p.values.len() % self.dims != 0) {
            Some(p) => Err(Error::DimensionMismatch { expected: self.dims, found: p.values.len() % self.dims }),
            None => Ok(())
        }
    }
}

/// Executor losing the result of one partition, or all results after the first round.
struct FlakyExecutor {
    fail_partition: Option<usize>,
    drop_last: bool
}
impl Executor for FlakyExecutor {
    fn execute<P, R, F>(&self, partitions: &[P], task: F) -> Vec<Result<R>>
            where P: Sync, R: Send, F: Fn(usize, &P) -> Result<R> + Sync + Send {
        let mut results: Vec<Result<R>> = partitions.iter().enumerate()
            .map(|(idx, p)| match self.fail_partition {
                Some(fail) if fail == idx => Err(Error::InvalidParameter("worker did not respond".into())),
                _ => task(idx, p)
            })
            .collect();
        if self.drop_last {
            results.pop();
        }
        results
    }
}

fn random_samples(seed: u64, rows: usize, dims: usize) -> Vec<f64> {
    let mut rnd = StdRng::seed_from_u64(seed);
    (0..rows * dims).map(|_| rnd.gen_range(-10.0..10.0)).collect()
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn two_blob_scenario() {
    let table = ColumnTable::from_rows(&[0.0, 0.0, 0.0, 1.0, 10.0, 10.0, 10.0, 11.0], 2, 2).unwrap();
    let kmean = KMeans::new(&table).unwrap();
    let conf = KMeansConfig::build().seed(0).build();

    let first = kmean.kmeans_lloyd(2, 1, KMeans::init_precomputed(vec![0.0, 0.0, 10.0, 10.0]), &conf).unwrap();
    assert_eq!(first.centroids.as_slice(), &[0.0, 0.5, 10.0, 10.5]);
    assert_eq!(first.centroid_frequency, vec![2, 2]);
    // the round's error is measured against the centroids the round started with
    assert_eq!(first.errors, vec![2.0]);

    // every row is 0.5 away from its new centroid: 0.25 + 0.25 per cluster
    let after = kmean.assign(&first.centroids).unwrap();
    assert_eq!(after.error(), 1.0);
    assert_eq!(after.counts(), &[2, 2]);

    let more = kmean.kmeans_lloyd(2, 3, KMeans::init_precomputed(vec![0.0, 0.0, 10.0, 10.0]), &conf).unwrap();
    assert_eq!(more.errors, vec![2.0, 1.0, 1.0]);
    assert_eq!(more.centroids, first.centroids);
}

#[test]
fn monotonic_error_for_any_init() {
    for seed in 0..8 {
        let samples = random_samples(seed, 3000, 4);
        let table = RowTable::new(&samples, 4, 128);
        let kmean = KMeans::new(&table).unwrap();
        for init in 0..2 {
            let conf = KMeansConfig::build().seed(seed).build();
            let res = match init {
                0 => kmean.kmeans_lloyd(9, 10, KMeans::init_random_sample, &conf),
                _ => kmean.kmeans_lloyd(9, 10, KMeans::init_kmeanplusplus, &conf),
            }.unwrap();
            assert_eq!(res.errors.len(), 10);
            assert!(res.errors.windows(2).all(|w| w[1] <= w[0] || approx_eq(w[0], w[1])), "{:?}", res.errors);
        }
    }
}

#[test]
fn partitioning_does_not_change_aggregates() {
    let samples = random_samples(99, 5000, 3);
    let centroids = CentroidMatrix::from_vec(random_samples(100, 12, 3), 12, 3).unwrap();

    let reference = ColumnTable::from_rows(&samples, 3, 5000).unwrap();
    let reference = KMeans::new(&reference).unwrap().assign(&centroids).unwrap();
    for partition_rows in [1, 7, 64, 999, 4999] {
        let table = RowTable::new(&samples, 3, partition_rows);
        let agg = KMeans::new(&table).unwrap().assign(&centroids).unwrap();
        assert_eq!(agg.counts(), reference.counts());
        assert!(agg.sums().iter().zip(reference.sums()).all(|(a, b)| approx_eq(*a, *b)));
        assert!(approx_eq(agg.error(), reference.error()));
    }
}

#[test]
fn merging_task_outputs_in_any_order() {
    let samples = random_samples(5, 900, 2);
    let table = ColumnTable::from_rows(&samples, 2, 300).unwrap();
    let centroids = CentroidMatrix::from_vec(vec![-5.0, -5.0, 0.0, 0.0, 5.0, 5.0], 3, 2).unwrap();
    let parts: Vec<_> = table.partitions().iter()
        .map(|partition| PartialAggregate::from_partition(&TaskInput { centroids: &centroids, partition }))
        .collect();
    let (a, b, c) = (&parts[0], &parts[1], &parts[2]);

    let orders = [
        a.clone().merge(b).merge(c),
        a.clone().merge(&b.clone().merge(c)),
        a.clone().merge(c).merge(b),
        c.clone().merge(b).merge(a),
    ];
    for o in &orders[1..] {
        assert_eq!(o.counts(), orders[0].counts());
        assert!(o.sums().iter().zip(orders[0].sums()).all(|(x, y)| approx_eq(*x, *y)));
        assert!(approx_eq(o.error(), orders[0].error()));
    }
    assert_eq!(orders[0].counts().iter().sum::<usize>(), 900);
}

#[test]
fn empty_cluster_is_left_unchanged() {
    let samples = random_samples(3, 200, 2);
    let table = ColumnTable::from_rows(&samples, 2, 50).unwrap();
    let kmean = KMeans::new(&table).unwrap();
    let far_away = [1.0e6, -1.0e6];
    let res = kmean.kmeans_lloyd(2, 5, KMeans::init_precomputed(vec![0.0, 0.0, far_away[0], far_away[1]]), &KMeansConfig::default()).unwrap();
    assert_eq!(res.centroids.nth(1), &far_away);
    assert_eq!(res.centroid_frequency, vec![200, 0]);
}

#[test]
fn failed_partition_aborts_the_run() {
    let samples = random_samples(1, 100, 2);
    let table = ColumnTable::from_rows(&samples, 2, 10).unwrap();
    let kmean = KMeans::with_executor(&table, FlakyExecutor { fail_partition: Some(3), drop_last: false }).unwrap();
    let res = kmean.kmeans_lloyd(3, 10, KMeans::init_random_sample, &KMeansConfig::build().seed(1).build());
    assert!(matches!(res, Err(Error::PartitionFailed { partition: 3, .. })));
}

#[test]
fn missing_results_abort_the_run() {
    let samples = random_samples(2, 100, 2);
    let table = ColumnTable::from_rows(&samples, 2, 10).unwrap();
    let kmean = KMeans::with_executor(&table, FlakyExecutor { fail_partition: None, drop_last: true }).unwrap();
    let res = kmean.kmeans_lloyd(3, 10, KMeans::init_precomputed(vec![0.0; 6]), &KMeansConfig::default());
    assert!(matches!(res, Err(Error::MissingResults { expected: 10, found: 9 })));
}

#[test]
fn ragged_table_is_rejected() {
    let table = RowTable { dims: 2, partitions: vec![RowPartition { dims: 2, values: vec![1.0, 2.0, 3.0] }] };
    assert!(matches!(KMeans::new(&table), Err(Error::DimensionMismatch { .. })));
}
