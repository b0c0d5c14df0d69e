use crate::{executor::Executor, memory::*, table::PartitionedTable, Error, KMeans, KMeansConfig, KMeansState, Result};
use log::{debug, info, warn};

pub(crate) struct Lloyd<T> where T: Primitive {
	_p: std::marker::PhantomData<T>
}
impl<T> Lloyd<T> where T: Primitive {
    /// One round: map/reduce over all partitions, then replace the centroids with the means.
    /// Nothing in **state** is touched unless every partition delivered its aggregate.
    fn round<Tab, E>(data: &KMeans<'_, T, Tab, E>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<T>
                where Tab: PartitionedTable<T>, E: Executor {
        let combined = data.map_reduce(&state.centroids, config.cancel)?;
        if config.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let empty = combined.counts().iter().filter(|&&c| c == 0).count();
        if empty > 0 {
            warn!("{} of {} centroids received no rows and keep their position", empty, state.k);
        }
        state.centroids = combined.mean_centroids(&state.centroids);
        state.centroid_frequency = combined.counts().to_vec();
        state.errors.push(combined.error());
        Ok(combined.error())
    }

    #[inline(always)] pub fn calculate<'t, 'a, Tab, E, F>(data: &KMeans<'t, T, Tab, E>, k: usize, rounds: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where Tab: PartitionedTable<T>, E: Executor,
                      for<'c> F: FnOnce(&KMeans<'t, T, Tab, E>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        if k == 0 {
            return Err(Error::InvalidParameter("k must be > 0".into()));
        }
        if rounds == 0 {
            return Err(Error::InvalidParameter("rounds must be > 0".into()));
        }
        if k > data.sample_cnt {
            return Err(Error::InvalidParameter(format!("k ({}) exceeds the amount of rows ({})", k, data.sample_cnt)));
        }
        if config.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut state = KMeansState::new(k, data.sample_dims);

        // Initialize clusters and notify subscriber
        init(data, &mut state, config)?;
        if state.centroids.k() != k {
            return Err(Error::InvalidParameter(format!("init produced {} centroids, expected {}", state.centroids.k(), k)));
        }
        if state.centroids.dims() != data.sample_dims {
            return Err(Error::DimensionMismatch { expected: data.sample_dims, found: state.centroids.dims() });
        }
        debug!("initialized {} centroids over {} rows in {} partitions", k, data.sample_cnt, data.table.partitions().len());
        (config.init_done)(&state);
        let mut abort_strategy = config.abort_strategy.create_logic();

        for i in 1..=rounds {
            if config.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let new_distsum = Self::round(data, &mut state, config)?;
            info!("round {}/{}: error {}", i, rounds, new_distsum);

			// Notify subscriber about finished round
			(config.iteration_done)(&state, i, new_distsum);
            state.distsum = new_distsum;
            if !abort_strategy.next(new_distsum) {
                info!("stopping after round {}: no further improvement", i);
                break;
            }
        }
        Ok(state)
    }
}
