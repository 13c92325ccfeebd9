use crate::dataset::Dataset;
use crate::fold::{FoldTask, Method};
use itertools::iproduct;

/// Options controlling the configuration space and how it is executed.
#[derive(Clone, Debug)]
pub struct BenchmarkOptions {
	/// The depth budgets to benchmark. `0` means unbounded.
	pub depths: Vec<usize>,
	/// The label-noise fractions to inject, each in `[0, 1)`.
	pub noise_levels: Vec<f64>,
	/// The number of cross-validation folds per configuration.
	pub n_folds: usize,
	/// The fraction of each dataset held out for validation.
	pub val_fraction: f64,
	/// The worker pool size. `0` selects sequential mode.
	pub n_threads: usize,
	/// The base seed from which fold splits and noise draws derive.
	pub seed: u64,
}

impl Default for BenchmarkOptions {
	fn default() -> Self {
		Self {
			depths: vec![2, 3, 4],
			noise_levels: vec![0.0],
			n_folds: 1,
			val_fraction: 0.2,
			n_threads: 0,
			seed: 42,
		}
	}
}

/// Enumerate the Cartesian product `datasets × methods × depths × noise_levels × folds` in a stable order. Order only affects scheduling, never the summary: rows are identified by key.
pub fn enumerate_tasks<'a>(
	datasets: &'a [Dataset],
	methods: &'a [Method],
	options: &BenchmarkOptions,
) -> Vec<FoldTask<'a>> {
	iproduct!(
		datasets.iter(),
		methods.iter(),
		options.depths.iter().copied(),
		options.noise_levels.iter().copied(),
		0..options.n_folds
	)
	.map(|(dataset, method, depth, noise_level, fold)| FoldTask {
		dataset,
		method,
		depth,
		noise_level,
		fold,
	})
	.collect()
}

/// The number of fold executions the full configuration space requires.
pub fn task_count(datasets: &[Dataset], methods: &[Method], options: &BenchmarkOptions) -> usize {
	datasets.len()
		* methods.len()
		* options.depths.len()
		* options.noise_levels.len()
		* options.n_folds
}

#[cfg(test)]
mod test {
	use super::*;
	use ndarray::prelude::*;
	use std::sync::Arc;
	use treebench_tree::{GreedyInfoGainEngine, InductionConfig};

	#[test]
	fn test_enumeration_covers_the_product() {
		let dataset = Dataset::new(
			"d".to_owned(),
			Array2::zeros((4, 2)),
			vec![0, 1, 0, 1],
		)
		.unwrap();
		let datasets = vec![dataset];
		let methods = vec![Method::new(
			"greedy_info_gain",
			Arc::new(GreedyInfoGainEngine),
			InductionConfig::default(),
		)];
		let options = BenchmarkOptions {
			depths: vec![2, 3],
			noise_levels: vec![0.0, 0.1],
			n_folds: 5,
			..Default::default()
		};
		let tasks = enumerate_tasks(&datasets, &methods, &options);
		assert_eq!(tasks.len(), 20);
		assert_eq!(tasks.len(), task_count(&datasets, &methods, &options));
	}
}
