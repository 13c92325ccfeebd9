use crate::dataset::Dataset;
use crate::fold::{run_fold, unavailable_row, FoldTask, Method};
use crate::grid::{enumerate_tasks, BenchmarkOptions};
use crate::report::{summarize, BenchmarkRow, RowFailure};
use anyhow::{bail, Result};
use treebench_util::progress_counter::ProgressCounter;
use treebench_util::thread_pool::ThreadPool;

/// Run the full benchmark: validate the setup, enumerate the configuration space, execute every fold either sequentially or across a bounded worker pool, and reduce fold rows into the summary table. Failures local to one configuration surface as metric-less rows; only setup errors abort the run. `progress` is incremented once per completed fold.
pub fn run_benchmark(
	datasets: &[Dataset],
	methods: &[Method],
	options: &BenchmarkOptions,
	progress: &ProgressCounter,
) -> Result<Vec<BenchmarkRow>> {
	validate_setup(datasets, methods, options)?;
	let tasks = enumerate_tasks(datasets, methods, options);
	let rows = if options.n_threads == 0 {
		run_sequential(&tasks, options, progress)
	} else {
		run_parallel(tasks, options, progress)
	};
	Ok(summarize(rows, options.n_folds))
}

fn validate_setup(
	datasets: &[Dataset],
	methods: &[Method],
	options: &BenchmarkOptions,
) -> Result<()> {
	if datasets.is_empty() {
		bail!("the benchmark needs at least one dataset");
	}
	if methods.is_empty() {
		bail!("the benchmark needs at least one induction method");
	}
	if options.depths.is_empty() {
		bail!("the benchmark needs at least one depth budget");
	}
	if options.noise_levels.is_empty() {
		bail!("the benchmark needs at least one noise level");
	}
	if options.n_folds == 0 {
		bail!("the benchmark needs at least one fold");
	}
	if !(0.0..1.0).contains(&options.val_fraction) {
		bail!(
			"the validation fraction must be in [0, 1), got {}",
			options.val_fraction
		);
	}
	for noise_level in &options.noise_levels {
		if !(0.0..1.0).contains(noise_level) {
			bail!("noise levels must be in [0, 1), got {}", noise_level);
		}
	}
	Ok(())
}

fn run_sequential(
	tasks: &[FoldTask],
	options: &BenchmarkOptions,
	progress: &ProgressCounter,
) -> Vec<BenchmarkRow> {
	tasks
		.iter()
		.map(|task| execute(task, options, progress))
		.collect()
}

fn run_parallel(
	tasks: Vec<FoldTask>,
	options: &BenchmarkOptions,
	progress: &ProgressCounter,
) -> Vec<BenchmarkRow> {
	let pool = ThreadPool::new(options.n_threads);
	// Partition the space into disjoint subsets. Each worker writes rows only into its own output slot; the pool join is the only synchronization, there is no shared accumulator.
	let mut chunks: Vec<Vec<FoldTask>> = (0..options.n_threads).map(|_| Vec::new()).collect();
	for (i, task) in tasks.into_iter().enumerate() {
		chunks[i % options.n_threads].push(task);
	}
	let mut outputs: Vec<Vec<BenchmarkRow>> = (0..chunks.len()).map(|_| Vec::new()).collect();
	let work = chunks
		.into_iter()
		.zip(outputs.iter_mut())
		.map(|(chunk, output)| {
			let progress = progress.clone();
			move || {
				for task in &chunk {
					output.push(execute(task, options, &progress));
				}
			}
		})
		.collect();
	pool.execute(work);
	outputs.into_iter().flatten().collect()
}

fn execute(task: &FoldTask, options: &BenchmarkOptions, progress: &ProgressCounter) -> BenchmarkRow {
	let row = match run_fold(task, options) {
		Ok(row) => row,
		// An unrecognized failure is isolated to this configuration; its row stays in the table.
		Err(err) => unavailable_row(task, RowFailure::Search(err.to_string())),
	};
	progress.inc(1);
	row
}
