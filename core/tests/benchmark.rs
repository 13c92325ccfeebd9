use ndarray::prelude::*;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use std::sync::Arc;
use std::time::Duration;
use treebench_core::{
	run_benchmark, BenchmarkOptions, BenchmarkRow, Dataset, Method, RowFailure,
};
use treebench_tree::{
	GreedyInfoGainEngine, InductionConfig, InductionError, InductionEngine, Tree,
};

/// 100 instances, 10 binary features, binary labels driven by features 0 and 1.
fn synthetic_dataset(name: &str) -> Dataset {
	let mut rng = Xoshiro256Plus::seed_from_u64(7);
	let features = Array2::from_shape_fn((100, 10), |_| if rng.gen::<bool>() { 1.0 } else { 0.0 });
	let labels = (0..100)
		.map(|i| {
			if features[[i, 0]] == 1.0 || features[[i, 1]] == 1.0 {
				1
			} else {
				0
			}
		})
		.collect();
	Dataset::new(name.to_owned(), features, labels).unwrap()
}

fn greedy_method() -> Method {
	Method::new(
		"greedy_info_gain",
		Arc::new(GreedyInfoGainEngine),
		InductionConfig {
			min_support: 1,
			..Default::default()
		},
	)
}

struct TimeoutEngine;

impl InductionEngine for TimeoutEngine {
	fn induce(
		&self,
		_features: ArrayView2<f32>,
		_labels: &[usize],
		_config: &InductionConfig,
	) -> Result<Tree, InductionError> {
		Err(InductionError::Timeout)
	}
}

fn progress_for(
	datasets: &[Dataset],
	methods: &[Method],
	options: &BenchmarkOptions,
) -> treebench_util::progress_counter::ProgressCounter {
	let total = treebench_core::task_count(datasets, methods, options) as u64;
	treebench_util::progress_counter::ProgressCounter::new(total)
}

#[test]
fn test_end_to_end_single_summary_row() {
	let datasets = vec![synthetic_dataset("synthetic")];
	let methods = vec![greedy_method()];
	let options = BenchmarkOptions {
		depths: vec![2],
		noise_levels: vec![0.0],
		n_folds: 3,
		..Default::default()
	};
	let progress = progress_for(&datasets, &methods, &options);
	let summary = run_benchmark(&datasets, &methods, &options, &progress).unwrap();
	assert_eq!(summary.len(), 1);
	let row = &summary[0];
	assert_eq!(row.method, "greedy_info_gain");
	assert_eq!(row.dataset, "synthetic");
	assert_eq!(row.depth, 2);
	assert_eq!(row.noise_level, 0.0);
	assert_eq!(row.fold, None);
	let train_accuracy = row.train_accuracy.unwrap();
	assert!((0.0..=1.0).contains(&train_accuracy));
	let test_accuracy = row.test_accuracy.unwrap();
	assert!((0.0..=1.0).contains(&test_accuracy));
	assert!(progress.is_complete());
}

#[test]
fn test_failed_method_is_isolated() {
	let datasets = vec![synthetic_dataset("synthetic")];
	let methods = vec![
		greedy_method(),
		Method::new(
			"branch_and_bound_optimal",
			Arc::new(TimeoutEngine),
			InductionConfig {
				time_limit: Some(Duration::from_secs(0)),
				..Default::default()
			},
		),
	];
	let options = BenchmarkOptions {
		depths: vec![2],
		noise_levels: vec![0.0],
		n_folds: 2,
		..Default::default()
	};
	let progress = progress_for(&datasets, &methods, &options);
	let summary = run_benchmark(&datasets, &methods, &options, &progress).unwrap();
	assert_eq!(summary.len(), 2);
	let failed = summary
		.iter()
		.find(|row| row.method == "branch_and_bound_optimal")
		.unwrap();
	assert_eq!(failed.train_accuracy, None);
	assert_eq!(failed.test_accuracy, None);
	assert_eq!(
		failed.failure,
		Some(RowFailure::Induction(InductionError::Timeout))
	);
	let succeeded = summary
		.iter()
		.find(|row| row.method == "greedy_info_gain")
		.unwrap();
	assert!(succeeded.train_accuracy.is_some());
	assert!(succeeded.test_accuracy.is_some());
}

#[test]
fn test_sequential_and_parallel_tables_are_identical() {
	let datasets = vec![synthetic_dataset("a"), synthetic_dataset("b")];
	let methods = vec![greedy_method()];
	let sequential_options = BenchmarkOptions {
		depths: vec![1, 2],
		noise_levels: vec![0.0, 0.1],
		n_folds: 3,
		n_threads: 0,
		..Default::default()
	};
	let parallel_options = BenchmarkOptions {
		n_threads: 4,
		..sequential_options.clone()
	};
	let progress = progress_for(&datasets, &methods, &sequential_options);
	let sequential = run_benchmark(&datasets, &methods, &sequential_options, &progress).unwrap();
	let progress = progress_for(&datasets, &methods, &parallel_options);
	let parallel = run_benchmark(&datasets, &methods, &parallel_options, &progress).unwrap();
	// Durations vary between runs; everything else must match exactly.
	assert_eq!(clear_durations(sequential), clear_durations(parallel));
}

fn clear_durations(rows: Vec<BenchmarkRow>) -> Vec<BenchmarkRow> {
	rows.into_iter()
		.map(|mut row| {
			row.fit_duration_secs = None;
			row
		})
		.collect()
}

#[test]
fn test_empty_configuration_space_is_fatal() {
	let datasets: Vec<Dataset> = Vec::new();
	let methods = vec![greedy_method()];
	let options = BenchmarkOptions::default();
	let progress = progress_for(&datasets, &methods, &options);
	assert!(run_benchmark(&datasets, &methods, &options, &progress).is_err());
}
