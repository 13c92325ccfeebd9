//! This module contains the main entrypoint to the treebench cli.

use anyhow::{bail, Context, Result};
use clap::Clap;
use colored::Colorize;
use ndarray::prelude::*;
use std::{
	path::{Path, PathBuf},
	sync::mpsc::{channel, TryRecvError},
	sync::Arc,
	thread::{sleep, spawn},
	time::Duration,
};
use treebench_core::{
	run_benchmark, task_count, BenchmarkOptions, BenchmarkRow, Dataset, Method, CSV_COLUMNS,
};
use treebench_tree::{
	FitMethod, GreedyInfoGainEngine, InductionConfig, Tree, TreeClassifier,
};
use treebench_util::progress_counter::ProgressCounter;

#[derive(Clap)]
#[clap(
	about = "Benchmark decision tree induction methods across a configuration grid.",
	setting = clap::AppSettings::DisableHelpSubcommand,
)]
enum Options {
	#[clap(name = "bench")]
	Bench(Box<BenchOptions>),
	#[clap(name = "export")]
	Export(Box<ExportOptions>),
}

#[derive(Clap, Debug)]
#[clap(about = "run a benchmark")]
#[clap(long_about = "run a benchmark over datasets, methods, depth budgets, noise levels, and folds")]
struct BenchOptions {
	#[clap(
		short,
		long = "file",
		about = "the path to a dataset file, repeatable",
		required = true,
		multiple = true
	)]
	files: Vec<PathBuf>,
	#[clap(
		short,
		long = "method",
		about = "an induction method to benchmark, repeatable",
		default_value = "greedy_info_gain",
		multiple = true
	)]
	methods: Vec<String>,
	#[clap(
		short,
		long = "depth",
		about = "a depth budget to benchmark, 0 means unbounded, repeatable",
		default_values = &["2", "3", "4"],
		multiple = true
	)]
	depths: Vec<usize>,
	#[clap(
		long = "noise",
		about = "a training label noise fraction in [0, 1), repeatable",
		default_value = "0.0",
		multiple = true
	)]
	noise_levels: Vec<f64>,
	#[clap(
		long,
		about = "the number of cross-validation folds per configuration",
		default_value = "1"
	)]
	folds: usize,
	#[clap(
		long,
		about = "the fraction of each dataset held out for validation",
		default_value = "0.2"
	)]
	val_fraction: f64,
	#[clap(
		long,
		about = "the minimum number of training transactions per leaf",
		default_value = "1"
	)]
	min_support: usize,
	#[clap(long, about = "the time limit per induction call, in seconds")]
	time_limit: Option<u64>,
	#[clap(
		long,
		about = "the worker pool size, 0 runs sequentially",
		default_value = "0"
	)]
	threads: usize,
	#[clap(long, about = "the base seed for splits and noise", default_value = "42")]
	seed: u64,
	#[clap(short, long, about = "the path to write the result table to, as csv")]
	output: Option<PathBuf>,
	#[clap(
		long,
		about = "a directory to write one graphviz diagram per dataset and method to"
	)]
	diagrams: Option<PathBuf>,
	#[clap(long = "no-progress", about = "disable the progress display", parse(from_flag = std::ops::Not::not))]
	progress: bool,
}

#[derive(Clap, Debug)]
#[clap(about = "export a diagram")]
#[clap(long_about = "export a serialized tree as a graphviz diagram")]
struct ExportOptions {
	#[clap(short, long, about = "the path to a serialized tree")]
	file: PathBuf,
	#[clap(short, long, about = "the path to write the diagram to")]
	output: Option<PathBuf>,
}

fn main() {
	let options = Options::parse();
	let result = match options {
		Options::Bench(options) => cli_bench(*options),
		Options::Export(options) => cli_export(*options),
	};
	if let Err(error) = result {
		eprintln!("{}: {}", "error".red().bold(), error);
		error
			.chain()
			.skip(1)
			.for_each(|cause| eprintln!("  {} {}", "->".red().bold(), cause));
		std::process::exit(1);
	}
}

fn cli_bench(options: BenchOptions) -> Result<()> {
	let datasets = options
		.files
		.iter()
		.map(|path| read_dataset(path))
		.collect::<Result<Vec<_>>>()?;
	let methods = options
		.methods
		.iter()
		.map(|name| {
			let config = InductionConfig {
				min_support: options.min_support,
				fit_method: fit_method_for_name(name)?,
				time_limit: options.time_limit.map(Duration::from_secs),
				..Default::default()
			};
			Ok(Method::new(
				name.clone(),
				Arc::new(GreedyInfoGainEngine),
				config,
			))
		})
		.collect::<Result<Vec<_>>>()?;
	let benchmark_options = BenchmarkOptions {
		depths: options.depths.clone(),
		noise_levels: options.noise_levels.clone(),
		n_folds: options.folds,
		val_fraction: options.val_fraction,
		n_threads: options.threads,
		seed: options.seed,
	};
	let progress =
		ProgressCounter::new(task_count(&datasets, &methods, &benchmark_options) as u64);

	// The watcher thread redraws the progress line until the run completes or fails. The channel lets a failed run stop it before the counter completes.
	let (stop_sender, stop_receiver) = channel();
	let watcher = if options.progress {
		let progress = progress.clone();
		Some(spawn(move || loop {
			match stop_receiver.try_recv() {
				Ok(()) | Err(TryRecvError::Disconnected) => break,
				Err(TryRecvError::Empty) => {}
			}
			eprint!(
				"\r{} {} / {} folds",
				"benchmarking".blue().bold(),
				progress.get(),
				progress.total(),
			);
			if progress.is_complete() {
				eprintln!();
				break;
			}
			sleep(Duration::from_millis(100));
		}))
	} else {
		None
	};
	let result = run_benchmark(&datasets, &methods, &benchmark_options, &progress);
	stop_sender.send(()).ok();
	if let Some(watcher) = watcher {
		watcher.join().ok();
	}
	let rows = result?;

	write_report(&rows, options.output.as_deref())?;
	if let Some(dir) = &options.diagrams {
		write_diagrams(dir, &datasets, &methods, &benchmark_options)?;
	}
	Ok(())
}

fn cli_export(options: ExportOptions) -> Result<()> {
	let json = std::fs::read_to_string(&options.file)
		.with_context(|| format!("failed to read tree file {}", options.file.display()))?;
	let tree = Tree::from_json(&json)
		.with_context(|| format!("failed to decode tree file {}", options.file.display()))?;
	let output_path = match options.output {
		Some(output) => output,
		None => options.file.with_extension("dot"),
	};
	std::fs::write(&output_path, tree.export_diagram())
		.with_context(|| format!("failed to write diagram to {}", output_path.display()))?;
	eprintln!("The diagram was written to {}.", output_path.display());
	Ok(())
}

/// Read a whitespace-separated dataset file, one transaction per line, the class label first and the binary features after it.
fn read_dataset(path: &Path) -> Result<Dataset> {
	let text = std::fs::read_to_string(path)
		.with_context(|| format!("failed to read dataset file {}", path.display()))?;
	let mut labels = Vec::new();
	let mut values = Vec::new();
	let mut n_features = None;
	for (line_index, line) in text.lines().enumerate() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}
		let mut fields = line.split_whitespace();
		let label = fields
			.next()
			.and_then(|field| field.parse::<usize>().ok())
			.with_context(|| {
				format!("{}:{}: invalid class label", path.display(), line_index + 1)
			})?;
		labels.push(label);
		let start = values.len();
		for field in fields {
			let value = field.parse::<f32>().with_context(|| {
				format!(
					"{}:{}: invalid feature value {:?}",
					path.display(),
					line_index + 1,
					field
				)
			})?;
			values.push(value);
		}
		let width = values.len() - start;
		match n_features {
			None => n_features = Some(width),
			Some(n_features) if n_features != width => bail!(
				"{}:{}: expected {} features, found {}",
				path.display(),
				line_index + 1,
				n_features,
				width
			),
			Some(_) => {}
		}
	}
	let features = Array2::from_shape_vec((labels.len(), n_features.unwrap_or(0)), values)
		.with_context(|| format!("failed to shape the feature matrix of {}", path.display()))?;
	let name = path
		.file_stem()
		.and_then(|stem| stem.to_str())
		.unwrap_or("dataset")
		.to_owned();
	Dataset::new(name, features, labels)
		.with_context(|| format!("invalid dataset file {}", path.display()))
}

fn fit_method_for_name(name: &str) -> Result<FitMethod> {
	match name {
		"greedy_info_gain" => Ok(FitMethod::GreedyInfoGain),
		"murtree_exact" => Ok(FitMethod::MurtreeExact),
		"branch_and_bound_optimal" => Ok(FitMethod::BranchAndBoundOptimal),
		_ => bail!("unknown induction method {:?}", name),
	}
}

fn write_report(rows: &[BenchmarkRow], output: Option<&Path>) -> Result<()> {
	let target: Box<dyn std::io::Write> = match output {
		Some(path) => Box::new(
			std::fs::File::create(path)
				.with_context(|| format!("failed to open output file {}", path.display()))?,
		),
		None => Box::new(std::io::stdout()),
	};
	let mut writer = csv::Writer::from_writer(target);
	writer.write_record(&CSV_COLUMNS)?;
	for row in rows {
		writer.write_record(row.csv_record())?;
	}
	writer.flush()?;
	if let Some(path) = output {
		eprintln!("The result table was written to {}.", path.display());
	}
	Ok(())
}

/// Fit each dataset with each method at the largest requested depth budget and write one diagram per pair. A method that finds no tree for a dataset skips that diagram with a note, never aborts the export.
fn write_diagrams(
	dir: &Path,
	datasets: &[Dataset],
	methods: &[Method],
	options: &BenchmarkOptions,
) -> Result<()> {
	std::fs::create_dir_all(dir)
		.with_context(|| format!("failed to create diagram directory {}", dir.display()))?;
	let max_depth = options.depths.iter().copied().max().unwrap_or(0);
	for dataset in datasets {
		for method in methods {
			let config = InductionConfig {
				max_depth,
				..method.config.clone()
			};
			let mut classifier = TreeClassifier::new(config);
			if let Err(error) =
				classifier.fit(method.engine.as_ref(), dataset.features.view(), &dataset.labels)
			{
				eprintln!(
					"{}: no diagram for {} with {}: {}",
					"note".yellow().bold(),
					dataset.name,
					method.name,
					error
				);
				continue;
			}
			let path = dir.join(format!("{}_{}.dot", dataset.name, method.name));
			match classifier.tree() {
				Ok(tree) => {
					std::fs::write(&path, tree.export_diagram())
						.with_context(|| format!("failed to write {}", path.display()))?;
					eprintln!("The diagram was written to {}.", path.display());
				}
				Err(error) => eprintln!(
					"{}: no diagram for {} with {}: {}",
					"note".yellow().bold(),
					dataset.name,
					method.name,
					error
				),
			}
		}
	}
	Ok(())
}
