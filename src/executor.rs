//! Execution facilities, running one task per partition.
use crate::{Error, Result};
use rayon::prelude::*;

/// Runs a task once per partition and hands back every partition's result.
///
/// Implementations decide where tasks run (worker pool, calling thread, remote workers). They
/// must return exactly one entry per partition, in partition order. Failures of individual
/// invocations are reported as `Err` entries; retrying is the executor's business, the driver
/// aborts the run on the first failure it sees.
pub trait Executor: Sync {
    fn execute<P, R, F>(&self, partitions: &[P], task: F) -> Vec<Result<R>>
        where P: Sync, R: Send, F: Fn(usize, &P) -> Result<R> + Sync + Send;
}


/// Partition-parallel executor on top of rayon.
///
/// By default tasks are spread over rayon's global thread pool. Use
/// [`RayonExecutor::with_threads`] to run on a dedicated pool of fixed size instead.
#[derive(Default)]
pub struct RayonExecutor {
    pool: Option<rayon::ThreadPool>
}
impl RayonExecutor {
    pub fn new() -> Self { Self::default() }

    /// Create an executor with its own pool of **threads** worker threads.
    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("kmeans-worker-{}", i))
            .build()
            .map_err(|e| Error::InvalidParameter(format!("failed to build thread pool: {}", e)))?;
        Ok(Self { pool: Some(pool) })
    }

    /// Amount of threads tasks are distributed over.
    pub fn current_num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads()
        }
    }
}
impl std::fmt::Debug for RayonExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RayonExecutor").field("threads", &self.current_num_threads()).finish()
    }
}
impl Executor for RayonExecutor {
    fn execute<P, R, F>(&self, partitions: &[P], task: F) -> Vec<Result<R>>
            where P: Sync, R: Send, F: Fn(usize, &P) -> Result<R> + Sync + Send {
        let run = || -> Vec<Result<R>> {
            partitions.par_iter()
                .enumerate()
                .map(|(idx, p)| task(idx, p))
                .collect()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run()
        }
    }
}


/// Executes all partition tasks one after another on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialExecutor;
impl Executor for SequentialExecutor {
    fn execute<P, R, F>(&self, partitions: &[P], task: F) -> Vec<Result<R>>
            where P: Sync, R: Send, F: Fn(usize, &P) -> Result<R> + Sync + Send {
        partitions.iter().enumerate().map(|(idx, p)| task(idx, p)).collect()
    }
}


/// Check an executor's output: exactly one successful result per partition.
pub(crate) fn collect_all<R>(expected: usize, results: Vec<Result<R>>) -> Result<Vec<R>> {
    if results.len() != expected {
        return Err(Error::MissingResults { expected, found: results.len() });
    }
    results.into_iter().enumerate()
        .map(|(partition, r)| r.map_err(|e| match e {
            Error::Cancelled => Error::Cancelled,
            e => Error::PartitionFailed { partition, source: Box::new(e) }
        }))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_keep_partition_order() {
        let parts: Vec<usize> = (0..64).collect();
        let pooled = RayonExecutor::with_threads(4).unwrap();
        for res in [
            RayonExecutor::new().execute(&parts, |idx, p| Ok(idx * 1000 + p)),
            pooled.execute(&parts, |idx, p| Ok(idx * 1000 + p)),
            SequentialExecutor.execute(&parts, |idx, p| Ok(idx * 1000 + p)),
        ] {
            let res = collect_all(parts.len(), res).unwrap();
            assert_eq!(res, parts.iter().map(|p| p * 1001).collect::<Vec<_>>());
        }
        assert_eq!(pooled.current_num_threads(), 4);
    }

    #[test]
    fn failed_partition_is_reported() {
        let parts = [0, 1, 2];
        let res = SequentialExecutor.execute(&parts, |idx, _| {
            if idx == 1 { Err(Error::InvalidParameter("worker lost".into())) } else { Ok(idx) }
        });
        assert!(matches!(collect_all(3, res), Err(Error::PartitionFailed { partition: 1, .. })));
    }

    #[test]
    fn missing_results_are_reported() {
        let res: Vec<Result<usize>> = vec![Ok(0), Ok(1)];
        assert!(matches!(collect_all(3, res), Err(Error::MissingResults { expected: 3, found: 2 })));
    }

    #[test]
    fn cancellation_is_not_wrapped() {
        let res: Vec<Result<usize>> = vec![Ok(0), Err(Error::Cancelled)];
        assert!(matches!(collect_all(2, res), Err(Error::Cancelled)));
    }
}
