/*!
This crate orchestrates reproducible benchmarking of tree-induction methods. It enumerates a configuration space of `datasets × methods × depths × noise_levels × folds`, executes one fold per configuration point (optionally across a bounded worker pool), and reduces per-fold result rows into stable summary rows keyed by `(method, dataset, depth, noise_level)`.

Failures stay local to their unit of work: an engine that reports an `InductionError`, or even panics, costs only that configuration its metrics. The configuration's row is still emitted, carrying the failure, so the shape of the configuration space is preserved for downstream analysis.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod dataset;
mod fold;
mod grid;
mod noise;
mod report;
mod run;

pub use self::dataset::{Dataset, SplitData};
pub use self::fold::{run_fold, FoldTask, Method, SearchFailedError};
pub use self::grid::{enumerate_tasks, task_count, BenchmarkOptions};
pub use self::noise::inject_label_noise;
pub use self::report::{summarize, BenchmarkRow, RowFailure, RowKey, CSV_COLUMNS};
pub use self::run::run_benchmark;
