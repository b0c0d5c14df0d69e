//! # kmeans-mr - API documentation
//!
//! kmeans-mr computes k-means clustering over large, horizontally partitioned tables, by running
//! Lloyd's algorithm as a map/reduce loop.
//!
//! ## Design target
//! The dataset is never copied into one big buffer. It stays where it is, split into contiguous
//! row ranges (partitions), and is only ever read through the [`PartitionedTable`] and
//! [`Partition`] traits. Every round then works in three steps:
//! - **map**: one task per partition assigns each of its rows to the nearest centroid and sums up
//!   a [`PartialAggregate`] (per-centroid feature sums, per-centroid row counts, squared error).
//! - **reduce**: all partial aggregates are merged. Merging is associative and commutative, so the
//!   order in which partitions finish does not matter.
//! - **update**: every centroid with at least one row moves to the mean of its rows. Centroids
//!   without rows keep their position.
//!
//! Tasks are dispatched by an [`Executor`]. The default [`RayonExecutor`] runs them on rayon's
//! thread pool; any other facility (a fixed pool, the calling thread, remote workers) can be
//! plugged in by implementing the trait.
//!
//! ## Supported centroid initializations
//! The outcome of each K-Means run depends on the initialization of its clusters. For a list of
//! implemented initialization methods, see [`KMeans`]. All of them draw their randomness from the
//! generator in [`KMeansConfig`], so seeded runs are repeatable.
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use kmeans_mr::*;
//!
//! fn main() {
//!     let (sample_cnt, sample_dims, k, rounds) = (20000, 20, 4, 10);
//!
//!     // Generate some random data, split into partitions of 1000 rows
//!     let mut samples = vec![0.0f64;sample_cnt * sample_dims];
//!     samples.iter_mut().for_each(|v| *v = rand::random());
//!     let table = ColumnTable::from_rows(&samples, sample_dims, 1000).unwrap();
//!
//!     // Run 10 rounds, using random samples as initial centroids
//!     let kmean = KMeans::new(&table).unwrap();
//!     let conf = KMeansConfig::build().seed(7).build();
//!     let result = kmean.kmeans_lloyd(k, rounds, KMeans::init_random_sample, &conf).unwrap();
//!
//!     println!("Centroids: {:?}", result.centroids);
//!     println!("Errors: {:?}", result.errors);
//! }
//! ```
//!
//! ## Example (using the status event callbacks)
//! ```rust
//! use kmeans_mr::*;
//!
//! fn main() {
//!     let (sample_cnt, sample_dims, k, rounds) = (20000, 20, 4, 25);
//!
//!     let mut samples = vec![0.0f64;sample_cnt * sample_dims];
//!     samples.iter_mut().for_each(|v| *v = rand::random());
//!     let table = ColumnTable::from_rows(&samples, sample_dims, 1000).unwrap();
//!
//!	    let conf = KMeansConfig::<f64>::build()
//!		    .init_done(&|_| println!("Initialization completed."))
//!		    .iteration_done(&|s, nr, new_distsum|
//!			    println!("Round {} - Error: {:.2} -> {:.2} | Improvement: {:.2}",
//!				    nr, s.distsum, new_distsum, s.distsum - new_distsum))
//!		    .build();
//!
//!     let kmean = KMeans::new(&table).unwrap();
//!     let result = kmean.kmeans_lloyd(k, rounds, KMeans::init_kmeanplusplus, &conf).unwrap();
//!     println!("Centroids: {:?}", result.centroids);
//! }
//! ```
//!
//! ## Logging
//! Progress is reported through the [`log`] facade (`debug` for initialization and dispatch,
//! `info` per round, `warn` for empty clusters). Install any logger to see it.

#[macro_use] mod helpers;
mod memory;
mod error;
mod distance;
mod table;
mod task;
mod aggregate;
mod executor;
mod api;
mod variants;
mod inits;
mod abort_strategy;

pub use abort_strategy::AbortStrategy;
pub use api::{KMeansState, KMeansConfig, KMeansConfigBuilder, KMeans, InitDoneCallbackFn, IterationDoneCallbackFn};
pub use error::{Error, Result};
pub use executor::{Executor, RayonExecutor, SequentialExecutor};
pub use memory::{CentroidMatrix, Primitive};
pub use table::{ColumnChunks, ColumnTable, Partition, PartitionedTable};
pub use task::{nearest_centroid, PartialAggregate, TaskInput};
