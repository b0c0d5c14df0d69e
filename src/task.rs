//! Map phase: nearest-centroid assignment over a single partition.
use crate::{distance::squared_euclidean, memory::*, table::Partition};

/// Everything a single partition task reads. Both references are borrowed for the duration of
/// one invocation only; the task never mutates either of them.
pub struct TaskInput<'a, T: Primitive, P: Partition<T>> {
    pub centroids: &'a CentroidMatrix<T>,
    pub partition: &'a P
}
impl<'a, T: Primitive, P: Partition<T>> Clone for TaskInput<'a, T, P> {
    fn clone(&self) -> Self { *self }
}
impl<'a, T: Primitive, P: Partition<T>> Copy for TaskInput<'a, T, P> {}


/// Output of one partition task (or of merging several).
///
/// ## Fields
/// - **sums**: Per centroid, per dimension sum of all rows assigned to it [row-major, k×d]
/// - **counts**: Amount of rows assigned to each centroid
/// - **error**: Total of all rows' squared distances to their nearest centroid
#[derive(Clone, Debug, PartialEq)]
pub struct PartialAggregate<T: Primitive> {
    pub(crate) k: usize,
    pub(crate) dims: usize,
    pub(crate) sums: Vec<T>,
    pub(crate) counts: Vec<usize>,
    pub(crate) error: T
}
impl<T: Primitive> PartialAggregate<T> {
    /// Neutral element of the merge: all sums, counts and the error are zero.
    pub fn empty(k: usize, dims: usize) -> Self {
        Self {
            k, dims,
            sums: vec![T::zero(); k * dims],
            counts: vec![0usize; k],
            error: T::zero()
        }
    }

    /// Run the map step on one partition.
    ///
    /// Every row is assigned to its nearest centroid (squared euclidean distance, ties going to
    /// the lowest centroid index). The row's values are added to that centroid's sums, its count
    /// is incremented and the row's squared distance is added to the error.
    ///
    /// ## Panics
    /// If the partition's column count differs from the centroids' dimensions, or if there are
    /// no centroids (k = 0).
    pub fn from_partition<P: Partition<T>>(input: &TaskInput<'_, T, P>) -> Self {
        let (centroids, partition) = (input.centroids, input.partition);
        assert_eq!(partition.column_count(), centroids.dims(), "partition/centroid dimension mismatch");
        assert!(centroids.k() > 0, "no centroids to assign rows to");

        let mut result = Self::empty(centroids.k(), centroids.dims());
        let mut row_buf = vec![T::zero(); centroids.dims()];
        for row in 0..partition.row_count() {
            partition.read_row(row, &mut row_buf);
            let (nearest, min_sqr) = nearest_centroid(&row_buf, centroids);
            result.error += min_sqr;
            let dims = result.dims;
            result.sums[nearest * dims..(nearest + 1) * dims].iter_mut()
                .zip(row_buf.iter())
                .for_each(|(s, v)| *s += v);
            result.counts[nearest] += 1;
        }
        result
    }

    pub fn k(&self) -> usize { self.k }
    pub fn dims(&self) -> usize { self.dims }
    pub fn sums(&self) -> &[T] { &self.sums }
    pub fn counts(&self) -> &[usize] { &self.counts }
    pub fn error(&self) -> T { self.error }

    /// Summed feature values of all rows assigned to centroid **idx**.
    pub fn centroid_sum(&self, idx: usize) -> &[T] {
        &self.sums[idx * self.dims..(idx + 1) * self.dims]
    }

    /// Derive the next round's centroids: each centroid with at least one assigned row becomes
    /// the mean of its rows, all others are copied unchanged from **previous**.
    pub fn mean_centroids(&self, previous: &CentroidMatrix<T>) -> CentroidMatrix<T> {
        assert_eq!((previous.k(), previous.dims()), (self.k, self.dims), "centroid shape mismatch");
        let mut next = previous.clone();
        for c in 0..self.k {
            if self.counts[c] == 0 {
                continue;
            }
            let cnt = T::from(self.counts[c]).unwrap_or_else(T::nan);
            next.set_nth_from_iter(c, self.centroid_sum(c).iter().map(|&s| s / cnt));
        }
        next
    }
}

/// Find the centroid nearest to **sample**.
///
/// Returns the centroid index and the squared distance to it. Comparison is strict, so on ties
/// the first (lowest-index) centroid wins. If every distance overflows, the row stays on
/// centroid 0 with an infinite distance.
pub fn nearest_centroid<T: Primitive>(sample: &[T], centroids: &CentroidMatrix<T>) -> (usize, T) {
    let mut nearest = 0;
    let mut min_sqr = T::infinity();
    for (idx, c) in centroids.rows().enumerate() {
        let sqr = squared_euclidean(sample, c);
        if sqr < min_sqr {
            nearest = idx;
            min_sqr = sqr;
        }
    }
    (nearest, min_sqr)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnTable, PartitionedTable};
    use rand::prelude::*;

    fn centroids(values: Vec<f64>, k: usize, dims: usize) -> CentroidMatrix<f64> {
        CentroidMatrix::from_vec(values, k, dims).unwrap()
    }

    #[test]
    fn two_blob_partition() {
        let table = ColumnTable::from_rows(&[0.0, 0.0, 0.0, 1.0, 10.0, 10.0, 10.0, 11.0], 2, 4).unwrap();
        let c = centroids(vec![0.0, 0.0, 10.0, 10.0], 2, 2);
        let res = PartialAggregate::from_partition(&TaskInput { centroids: &c, partition: &table.partitions()[0] });

        assert_eq!(res.counts(), &[2, 2]);
        assert_eq!(res.sums(), &[0.0, 1.0, 20.0, 21.0]);
        assert_eq!(res.error(), 2.0);
        assert_eq!(c, centroids(vec![0.0, 0.0, 10.0, 10.0], 2, 2));
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let c = centroids(vec![1.0, 0.0, -1.0, 0.0, 1.0, 0.0], 3, 2);
        assert_eq!(nearest_centroid(&[0.0, 0.0], &c), (0, 1.0));
        assert_eq!(nearest_centroid(&[-1.0, 0.0], &c), (1, 0.0));
    }

    #[test]
    fn empty_partition_yields_neutral_aggregate() {
        let part = crate::table::ColumnChunks::<f64>::new(vec![vec![], vec![]]);
        let c = centroids(vec![0.0, 0.0], 1, 2);
        let res = PartialAggregate::from_partition(&TaskInput { centroids: &c, partition: &part });
        assert_eq!(res, PartialAggregate::empty(1, 2));
    }

    #[test]
    fn assignments_match_brute_force() {
        let mut rnd = StdRng::seed_from_u64(1337);
        let (rows, dims, k) = (500, 3, 6);
        let samples: Vec<f64> = (0..rows * dims).map(|_| rnd.gen_range(-5.0..5.0)).collect();
        let c = centroids((0..k * dims).map(|_| rnd.gen_range(-5.0..5.0)).collect(), k, dims);

        let mut should_counts = vec![0usize; k];
        let mut should_error = 0.0;
        for s in samples.chunks_exact(dims) {
            let dists: Vec<f64> = c.rows()
                .map(|c| s.iter().zip(c).map(|(a, b)| (a - b) * (a - b)).sum())
                .collect();
            let (best_idx, best_dist) = dists.iter().cloned().enumerate()
                .fold((usize::MAX, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best });
            assert_eq!(nearest_centroid(s, &c).0, best_idx);
            should_counts[best_idx] += 1;
            should_error += best_dist;
        }

        let table = ColumnTable::from_rows(&samples, dims, rows).unwrap();
        let res = PartialAggregate::from_partition(&TaskInput { centroids: &c, partition: &table.partitions()[0] });
        assert_eq!(res.counts(), &should_counts[..]);
        assert_approx_eq!(res.error(), should_error, 1e-9);
    }

    #[test]
    fn mean_keeps_empty_centroids() {
        let prev = centroids(vec![0.0, 0.0, 1337.0, 42.0], 2, 2);
        let agg = PartialAggregate { k: 2, dims: 2, sums: vec![3.0, 6.0, 0.0, 0.0], counts: vec![3, 0], error: 0.0 };
        let next = agg.mean_centroids(&prev);
        assert_eq!(next.as_slice(), &[1.0, 2.0, 1337.0, 42.0]);
    }

    #[test]
    fn overflowing_distances_report_infinity() {
        let c = centroids(vec![-1e200, -1e200, 0.0, 0.0], 2, 2);
        let table = ColumnTable::from_rows(&[1e200, 1e200], 2, 1).unwrap();
        let res = PartialAggregate::from_partition(&TaskInput { centroids: &c, partition: &table.partitions()[0] });
        assert_eq!(res.counts(), &[1, 0]);
        assert!(res.error().is_infinite());
        assert_eq!(nearest_centroid(&[1e200, 1e200], &c), (0, f64::INFINITY));
    }

    #[test]
    #[should_panic(expected = "no centroids")]
    fn zero_centroids_panic() {
        let table = ColumnTable::from_rows(&[1.0, 2.0], 2, 1).unwrap();
        let c = CentroidMatrix::<f64>::zeros(0, 2);
        PartialAggregate::from_partition(&TaskInput { centroids: &c, partition: &table.partitions()[0] });
    }

    #[test]
    #[should_panic]
    fn dimension_mismatch_panics() {
        let table = ColumnTable::from_rows(&[1.0, 2.0, 3.0], 3, 1).unwrap();
        let c = centroids(vec![0.0, 0.0], 1, 2);
        PartialAggregate::from_partition(&TaskInput { centroids: &c, partition: &table.partitions()[0] });
    }
}
