use crate::{
    executor::{collect_all, Executor, RayonExecutor},
    memory::*,
    table::{Partition, PartitionedTable},
    task::{PartialAggregate, TaskInput},
    AbortStrategy, Error, Result
};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use rand::prelude::*;

pub type InitDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>);
pub type IterationDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>, usize, T);

/// This is a structure holding various configuration options for a k-means run, such as
/// the random number generator used for the centroid initialization, the abort strategy, or a
/// couple of callbacks, that can be set to get status information from a running calculation.
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called, when the initialization phase finished
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the initialization
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each round
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the round (updated centroids)
    /// - **round**: Number of the finished round (starting at 1)
    /// - **distsum**: The round's total squared error (**state** contains the previous round's distsum)
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Random number generator to use
    pub(crate) rnd: Box<RefCell<dyn RngCore>>,
    /// The abort-strategy to use for the running calculation
    pub(crate) abort_strategy: AbortStrategy<T>,
    /// Flag that, once set, cancels the running calculation
    pub(crate) cancel: Option<&'a AtomicBool>
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_,_,_| {},
            rnd: Box::new(RefCell::new(StdRng::from_entropy())),
            abort_strategy: AbortStrategy::FixedRounds,
            cancel: None
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.map(|c| c.load(Ordering::Relaxed)).unwrap_or(false)
    }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("abort_strategy", &self.abort_strategy)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after the centroid initialization, before the first round.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each round of a running k-means calculation.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the random number generator that should be used in the k-means calculation.
    /// Use a seeded generator for deterministically repeatable results.
    pub fn random_generator<R: RngCore + 'static>(mut self, rnd: R) -> Self {
        self.config.rnd = Box::new(RefCell::new(rnd)); self
    }
    /// Shorthand for a [`StdRng`] seeded with **seed**.
    pub fn seed(self, seed: u64) -> Self {
        self.random_generator(StdRng::seed_from_u64(seed))
    }
    /// Set the abort-strategy to use during a running k-means calculation. For more information,
    /// see documentation of [`AbortStrategy`].
    /// ## Default
    /// [`AbortStrategy::FixedRounds`]
    pub fn abort_strategy(mut self, abort_strategy: AbortStrategy<T>) -> Self {
        self.config.abort_strategy = abort_strategy; self
    }
    /// Set a flag that cancels the run once it is set. Partition tasks that have not started
    /// yet are skipped, and the interrupted round is discarded as a whole.
    pub fn cancel_flag(mut self, cancel: &'a AtomicBool) -> Self {
        self.config.cancel = Some(cancel); self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config }
}


/// State of a k-means run, as well as its final result.
/// All mutations are done in this structure, making [`KMeans`] immutable, and therefore allowing
/// multiple runs over the same table in parallel.
///
/// ## Fields
/// - **k**: The amount of clusters that were requested
/// - **distsum**: Total squared error of the most recent round (infinity before the first round)
/// - **centroids**: Current cluster centers (k×d)
/// - **centroid_frequency**: Amount of rows assigned to each centroid in the most recent round
/// - **errors**: Total squared error of every round that ran, in order
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub distsum: T,
    pub centroids: CentroidMatrix<T>,
    pub centroid_frequency: Vec<usize>,
    pub errors: Vec<T>
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(k: usize, sample_dims: usize) -> Self {
        Self {
            k,
            distsum: T::infinity(),
            centroids: CentroidMatrix::zeros(k, sample_dims),
            centroid_frequency: vec![0usize; k],
            errors: Vec::new()
        }
    }

    /// Amount of dimensions of each centroid.
    pub fn sample_dims(&self) -> usize { self.centroids.dims() }

    /// Amount of rounds that were executed.
    pub fn rounds(&self) -> usize { self.errors.len() }
}


/// Entrypoint of this crate's API-Surface.
///
/// Create an instance of this struct on top of a [`PartitionedTable`]. The table is only
/// borrowed; every run reads it through the configured [`Executor`], which runs one partition
/// task per partition.
///
/// ## Supported variants
/// - k-Means clustering (Lloyd, map/reduce) [`KMeans::kmeans_lloyd`]
///
/// ## Supported initialization methods
/// - Random-Sample [`KMeans::init_random_sample`]
/// - K-Mean++ [`KMeans::init_kmeanplusplus`]
/// - Precomputed [`KMeans::init_precomputed`]
pub struct KMeans<'t, T, Tab, E = RayonExecutor> where T: Primitive, Tab: PartitionedTable<T>, E: Executor {
    pub(crate) table: &'t Tab,
    pub(crate) executor: E,
    pub(crate) sample_cnt: usize,
    pub(crate) sample_dims: usize,
    _p: PhantomData<T>
}
impl<'t, T, Tab> KMeans<'t, T, Tab, RayonExecutor> where T: Primitive, Tab: PartitionedTable<T> {
    /// Create a new instance of the [`KMeans`] structure, running partition tasks on rayon's
    /// global thread pool.
    ///
    /// ## Errors
    /// If the table is ragged, has no columns or no rows.
    pub fn new(table: &'t Tab) -> Result<Self> {
        Self::with_executor(table, RayonExecutor::new())
    }
}
impl<'t, T, Tab, E> KMeans<'t, T, Tab, E> where T: Primitive, Tab: PartitionedTable<T>, E: Executor {
    /// Create a new instance of the [`KMeans`] structure that dispatches partition tasks through
    /// **executor**.
    pub fn with_executor(table: &'t Tab, executor: E) -> Result<Self> {
        table.validate()?;
        let sample_dims = table.column_count();
        if sample_dims == 0 {
            return Err(Error::InvalidParameter("table has no columns".into()));
        }
        let sample_cnt = table.row_count();
        if sample_cnt == 0 {
            return Err(Error::EmptyTable);
        }
        Ok(Self { table, executor, sample_cnt, sample_dims, _p: PhantomData })
    }

    /// Amount of rows in the underlying table.
    pub fn sample_cnt(&self) -> usize { self.sample_cnt }
    /// Amount of columns (dimensions) in the underlying table.
    pub fn sample_dims(&self) -> usize { self.sample_dims }

    /// Copy the table-wide **row** into **buf**.
    pub(crate) fn read_row(&self, row: usize, buf: &mut [T]) -> Result<()> {
        let (pidx, local) = self.table.locate(row)?;
        self.table.partitions()[pidx].read_row(local, buf);
        Ok(())
    }

    /// Run the partition task over every partition and merge all results. This is one
    /// complete map/reduce pass; **centroids** are only read.
    pub(crate) fn map_reduce(&self, centroids: &CentroidMatrix<T>, cancel: Option<&AtomicBool>) -> Result<PartialAggregate<T>> {
        if centroids.k() == 0 {
            return Err(Error::InvalidParameter("k must be > 0".into()));
        }
        if centroids.dims() != self.sample_dims {
            return Err(Error::DimensionMismatch { expected: self.sample_dims, found: centroids.dims() });
        }
        let partitions = self.table.partitions();
        log::debug!("dispatching {} partition tasks", partitions.len());
        let results = self.executor.execute(partitions, |_, partition| {
            if cancel.map(|c| c.load(Ordering::Relaxed)).unwrap_or(false) {
                return Err(Error::Cancelled);
            }
            Ok(PartialAggregate::from_partition(&TaskInput { centroids, partition }))
        });
        let aggregates = collect_all(partitions.len(), results)?;
        PartialAggregate::merge_all(aggregates)
            .unwrap_or_else(|| Ok(PartialAggregate::empty(centroids.k(), centroids.dims())))
    }

    /// Assign every row of the table to its nearest of the given **centroids** and return the
    /// merged statistics, without updating anything.
    pub fn assign(&self, centroids: &CentroidMatrix<T>) -> Result<PartialAggregate<T>> {
        self.map_reduce(centroids, None)
    }

    /// Lloyd's k-means, run as a map/reduce loop over the table's partitions.
    ///
    /// Each round broadcasts the current centroids to one task per partition, merges the
    /// partial aggregates once all partitions returned, and moves every non-empty centroid to
    /// the mean of its rows. Centroids without rows keep their position.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **rounds**: Amount of rounds to run (fewer, if the configured abort strategy stops early)
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance, containing several configuration options for the calculation.
    ///
    /// ## Returns
    /// Instance of [`KMeansState`], containing the final centroids and the error of every round.
    ///
    /// ## Example
    /// ```rust
    /// use kmeans_mr::*;
    ///
    /// let rows = vec![0.0f64, 0.0, 0.0, 1.0, 10.0, 10.0, 10.0, 11.0];
    /// let table = ColumnTable::from_rows(&rows, 2, 2).unwrap();
    /// let kmean = KMeans::new(&table).unwrap();
    /// let conf = KMeansConfig::build().seed(42).build();
    /// let result = kmean.kmeans_lloyd(2, 10, KMeans::init_kmeanplusplus, &conf).unwrap();
    ///
    /// assert_eq!(result.errors.len(), 10);
    /// println!("Centroids: {:?}", result.centroids);
    /// ```
    pub fn kmeans_lloyd<'a, F>(&self, k: usize, rounds: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<'t, T, Tab, E>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        crate::variants::Lloyd::calculate(self, k, rounds, init, config)
    }

    /// K-Mean++ initialization method
    ///
    /// ## Description
    /// Selects one uniformly random row as first centroid. Every further centroid is drawn with
    /// a probability proportional to each row's squared distance to its nearest, already chosen
    /// centroid. The distances are computed partition-parallel through the executor.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_kmeanplusplus(kmean: &KMeans<'t, T, Tab, E>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
        crate::inits::kmeanplusplus::calculate(kmean, state, config)
    }

    /// Random sample initialization method (a.k.a. Forgy)
    ///
    /// ## Description
    /// Selects k distinct rows, uniformly at random, as initial centroids.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_random_sample(kmean: &KMeans<'t, T, Tab, E>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
        crate::inits::randomsample::calculate(kmean, state, config)
    }

    /// Precomputed initialization method
    ///
    /// ## Description
    /// Uses the given **centroids** [row-major, k×d] as initial centroids.
    pub fn init_precomputed(centroids: Vec<T>)
            -> impl FnOnce(&KMeans<'t, T, Tab, E>, &mut KMeansState<T>, &KMeansConfig<'_, T>) -> Result<()> {
        move |kmean: &KMeans<'t, T, Tab, E>, state: &mut KMeansState<T>, _: &KMeansConfig<'_, T>| {
            crate::inits::precomputed::calculate(kmean, state, centroids)
        }
    }
}
