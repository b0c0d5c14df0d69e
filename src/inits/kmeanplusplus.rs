use crate::{
    executor::{collect_all, Executor},
    memory::*,
    table::{Partition, PartitionedTable},
    task::nearest_centroid,
    Error, KMeans, KMeansConfig, KMeansState, Result
};
use rand::distributions::{WeightedError, WeightedIndex};
use rand::prelude::*;
use std::ops::DerefMut;

/// Squared distance of every row to its nearest centroid in **centroids**, in table row order.
/// One task per partition, dispatched through the executor.
fn nearest_distances<T, Tab, E>(kmean: &KMeans<'_, T, Tab, E>, centroids: &CentroidMatrix<T>) -> Result<Vec<T>>
        where T: Primitive, Tab: PartitionedTable<T>, E: Executor {
    let partitions = kmean.table.partitions();
    let results = kmean.executor.execute(partitions, |_, partition| {
        let mut buf = vec![T::zero(); centroids.dims()];
        Ok((0..partition.row_count()).map(|row| {
            partition.read_row(row, &mut buf);
            nearest_centroid(&buf, centroids).1
        }).collect::<Vec<T>>())
    });
    Ok(collect_all(partitions.len(), results)?.into_iter().flatten().collect())
}

#[inline(always)]
pub fn calculate<T, Tab, E>(kmean: &KMeans<'_, T, Tab, E>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()>
        where T: Primitive, Tab: PartitionedTable<T>, E: Executor {
    let mut buf = vec![T::zero(); kmean.sample_dims];
    {
        // Randomly select first centroid
        let first_idx = config.rnd.borrow_mut().gen_range(0..kmean.sample_cnt);
        kmean.read_row(first_idx, &mut buf)?;
        state.centroids.set_nth_from_iter(0, buf.iter().cloned());
    }
    for k in 1..state.k {
        // For each following centroid...
        let chosen = CentroidMatrix::from_vec(state.centroids.as_slice()[..k * kmean.sample_dims].to_vec(), k, kmean.sample_dims)
            .ok_or(Error::DimensionMismatch { expected: kmean.sample_dims, found: state.centroids.dims() })?;
        let distances = nearest_distances(kmean, &chosen)?;

        // Use rand's WeightedIndex to randomly draw a centroid, while respecting their distances
        let sampled_row = match WeightedIndex::<T>::new(distances.iter()) {
            Ok(index) => index.sample(config.rnd.borrow_mut().deref_mut()),
            // every row coincides with a chosen centroid
            Err(WeightedError::AllWeightsZero) => config.rnd.borrow_mut().gen_range(0..kmean.sample_cnt),
            Err(e) => return Err(Error::InvalidParameter(format!("k-means++ weights: {}", e)))
        };
        kmean.read_row(sampled_row, &mut buf)?;
        state.centroids.set_nth_from_iter(k, buf.iter().cloned());
    }
    Ok(())
}
