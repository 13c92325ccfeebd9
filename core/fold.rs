use crate::dataset::Dataset;
use crate::grid::BenchmarkOptions;
use crate::noise::inject_label_noise;
use crate::report::{BenchmarkRow, RowFailure};
use num_traits::ToPrimitive;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use treebench_metrics::{Accuracy, StreamingMetric};
use treebench_util::round::round5;
use treebench_tree::{FitError, InductionConfig, InductionEngine, Inducer};

/// One induction method under benchmark: a display name, the engine to invoke, and the config passed through the adapter. The per-task depth budget overrides `config.max_depth`.
#[derive(Clone)]
pub struct Method {
	pub name: String,
	pub engine: Arc<dyn InductionEngine>,
	pub config: InductionConfig,
}

impl Method {
	pub fn new(
		name: impl Into<String>,
		engine: Arc<dyn InductionEngine>,
		config: InductionConfig,
	) -> Self {
		Self {
			name: name.into(),
			engine,
			config,
		}
	}
}

/// One point in the benchmark's configuration space.
#[derive(Clone)]
pub struct FoldTask<'a> {
	pub dataset: &'a Dataset,
	pub method: &'a Method,
	pub depth: usize,
	pub noise_level: f64,
	pub fold: usize,
}

/// An unexpected engine failure that is not a recognized `InductionError`. It aborts this fold's metrics but must never abort sibling folds or configurations.
#[derive(Clone, Debug, Error)]
#[error("induction failed unexpectedly for {method} on {dataset} at depth {depth}, noise {noise_level}, fold {fold}: {message}")]
pub struct SearchFailedError {
	pub method: String,
	pub dataset: String,
	pub depth: usize,
	pub noise_level: f64,
	pub fold: usize,
	pub message: String,
}

/// Execute exactly one configuration point: split, inject noise into the training labels only, induce, and score train and validation accuracy. A recognized `InductionError` produces a row with absent metrics; an unrecognized failure (including an engine panic) is returned as `SearchFailedError` for the orchestrator to isolate.
pub fn run_fold(task: &FoldTask, options: &BenchmarkOptions) -> Result<BenchmarkRow, SearchFailedError> {
	let split_seed = options.seed.wrapping_add(task.fold.to_u64().unwrap());
	let split = task.dataset.split(options.val_fraction, split_seed);
	// Validation labels stay clean; only the training partition is corrupted.
	let train_labels = inject_label_noise(&split.train_labels, task.noise_level, split_seed);
	let mut config = task.method.config.clone();
	config.max_depth = task.depth;
	let inducer = Inducer::new(task.method.engine.as_ref());
	let start = Instant::now();
	let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
		inducer.induce(split.train_features.view(), &train_labels, &config)
	}));
	let fit_duration_secs = start.elapsed().as_secs_f64();
	let result = match result {
		Ok(result) => result,
		Err(panic) => return Err(search_failed(task, panic_message(panic.as_ref()))),
	};
	match result {
		Ok(tree) => {
			let train_accuracy = tree
				.train_accuracy(train_labels.len())
				.map_err(|err| search_failed(task, err.to_string()))?;
			let mut accuracy = Accuracy::new();
			for (features, label) in split
				.test_features
				.outer_iter()
				.zip(split.test_labels.iter())
			{
				let prediction = tree
					.predict(features)
					.map_err(|err| search_failed(task, err.to_string()))?;
				accuracy.update((prediction, *label));
			}
			Ok(BenchmarkRow {
				method: task.method.name.clone(),
				dataset: task.dataset.name.clone(),
				n_features: task.dataset.n_features(),
				n_transactions: task.dataset.n_transactions(),
				noise_level: task.noise_level,
				depth: task.depth,
				fold: Some(task.fold),
				train_accuracy: Some(train_accuracy),
				test_accuracy: accuracy.finalize().map(round5),
				fit_duration_secs: Some(fit_duration_secs),
				failure: None,
			})
		}
		Err(FitError::Induction(err)) => Ok(unavailable_row(task, RowFailure::Induction(err))),
		Err(FitError::InvalidInput(err)) => Err(search_failed(task, err.to_string())),
	}
}

/// A present-but-metric-less row for a configuration that produced no model.
pub(crate) fn unavailable_row(task: &FoldTask, failure: RowFailure) -> BenchmarkRow {
	BenchmarkRow {
		method: task.method.name.clone(),
		dataset: task.dataset.name.clone(),
		n_features: task.dataset.n_features(),
		n_transactions: task.dataset.n_transactions(),
		noise_level: task.noise_level,
		depth: task.depth,
		fold: Some(task.fold),
		train_accuracy: None,
		test_accuracy: None,
		fit_duration_secs: None,
		failure: Some(failure),
	}
}

fn search_failed(task: &FoldTask, message: String) -> SearchFailedError {
	SearchFailedError {
		method: task.method.name.clone(),
		dataset: task.dataset.name.clone(),
		depth: task.depth,
		noise_level: task.noise_level,
		fold: task.fold,
		message,
	}
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
	if let Some(message) = panic.downcast_ref::<&str>() {
		(*message).to_owned()
	} else if let Some(message) = panic.downcast_ref::<String>() {
		message.clone()
	} else {
		"engine panicked".to_owned()
	}
}
