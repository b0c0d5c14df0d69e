use crate::{executor::Executor, memory::*, table::PartitionedTable, Error, KMeans, KMeansState, Result};

#[inline(always)]
pub fn calculate<T, Tab, E>(kmean: &KMeans<'_, T, Tab, E>, state: &mut KMeansState<T>, computed: Vec<T>) -> Result<()>
        where T: Primitive, Tab: PartitionedTable<T>, E: Executor {
    let found = computed.len();
    state.centroids = CentroidMatrix::from_vec(computed, state.k, kmean.sample_dims)
        .ok_or(Error::DimensionMismatch { expected: state.k * kmean.sample_dims, found })?;
    Ok(())
}
