use crate::{executor::Executor, memory::*, table::PartitionedTable, Error, KMeans, KMeansConfig, KMeansState, Result};
use rand::seq::index;
use std::ops::DerefMut;

#[inline(always)] pub fn calculate<T, Tab, E>(kmean: &KMeans<'_, T, Tab, E>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()>
            where T: Primitive, Tab: PartitionedTable<T>, E: Executor {
    if state.k > kmean.sample_cnt {
        return Err(Error::InvalidParameter(format!("cannot sample {} distinct rows out of {}", state.k, kmean.sample_cnt)));
    }
    // k distinct rows, every index in [0, sample_cnt)
    let rows = index::sample(config.rnd.borrow_mut().deref_mut(), kmean.sample_cnt, state.k);
    let mut buf = vec![T::zero(); kmean.sample_dims];
    for (ci, row) in rows.iter().enumerate() {
        kmean.read_row(row, &mut buf)?;
        state.centroids.set_nth_from_iter(ci, buf.iter().cloned());
    }
    log::debug!("random sample init picked rows {:?}", rows.iter().collect::<Vec<_>>());
    Ok(())
}
