use std::collections::BTreeMap;
use treebench_metrics::{Mean, StreamingMetric};
use treebench_tree::InductionError;
use treebench_util::finite::Finite;
use treebench_util::round::round5;

/// One result row of the benchmark. Rows with equal `(method, dataset, depth, noise_level)` keys describe the folds of a single configuration and are reduced to one summary row by arithmetic mean. A configuration whose induction failed keeps its row, with absent metrics and the failure attached, so the configuration space stays fully accounted for.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkRow {
	pub method: String,
	pub dataset: String,
	pub n_features: usize,
	pub n_transactions: usize,
	pub noise_level: f64,
	pub depth: usize,
	/// The fold index, or `None` for a fold-aggregated summary row.
	pub fold: Option<usize>,
	pub train_accuracy: Option<f64>,
	pub test_accuracy: Option<f64>,
	pub fit_duration_secs: Option<f64>,
	pub failure: Option<RowFailure>,
}

/// Why a configuration produced no metrics.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RowFailure {
	/// The engine reported a recognized failure: no model for this configuration.
	Induction(InductionError),
	/// The engine failed in an unrecognized way (including a panic); isolated to this configuration.
	Search(String),
}

/// The grouping key identifying one configuration across its folds. In parallel mode report order is not enumeration order, so this key, not row position, identifies a row.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct RowKey {
	pub method: String,
	pub dataset: String,
	pub depth: usize,
	pub noise_level: Finite<f64>,
}

impl BenchmarkRow {
	pub fn key(&self) -> RowKey {
		RowKey {
			method: self.method.clone(),
			dataset: self.dataset.clone(),
			depth: self.depth,
			// Noise levels were validated finite at setup.
			noise_level: Finite::new(self.noise_level).unwrap(),
		}
	}

	pub fn csv_record(&self) -> Vec<String> {
		vec![
			self.dataset.clone(),
			self.n_features.to_string(),
			self.n_transactions.to_string(),
			self.method.clone(),
			self.noise_level.to_string(),
			self.depth.to_string(),
			match self.fold {
				Some(fold) => fold.to_string(),
				None => "mean".to_owned(),
			},
			format_metric(self.train_accuracy),
			format_metric(self.test_accuracy),
			format_metric(self.fit_duration_secs),
		]
	}
}

/// The fixed column order of the reporting boundary: identifying columns first, then the varying axes, then the metric columns.
pub const CSV_COLUMNS: [&str; 10] = [
	"name",
	"features",
	"transactions",
	"method",
	"noise_level",
	"depth",
	"fold",
	"train_acc",
	"test_acc",
	"duration",
];

fn format_metric(value: Option<f64>) -> String {
	match value {
		Some(value) => value.to_string(),
		None => String::new(),
	}
}

/// Reduce fold rows into summary rows. Rows are grouped by key; with more than one fold each numeric column is reduced by the arithmetic mean of the values that are present (absent metrics are excluded from the mean, not treated as zero) and rounded to 5 decimal digits. With a single fold the raw rows pass through. Output is sorted by key, so sequential and parallel runs produce identical tables.
pub fn summarize(rows: Vec<BenchmarkRow>, n_folds: usize) -> Vec<BenchmarkRow> {
	let mut groups: BTreeMap<RowKey, Vec<BenchmarkRow>> = BTreeMap::new();
	for row in rows {
		groups.entry(row.key()).or_insert_with(Vec::new).push(row);
	}
	groups
		.into_iter()
		.flat_map(|(_, group)| {
			if n_folds > 1 {
				vec![reduce_folds(group)]
			} else {
				group
			}
		})
		.collect()
}

fn reduce_folds(group: Vec<BenchmarkRow>) -> BenchmarkRow {
	let mut train_accuracy = Mean::new();
	let mut test_accuracy = Mean::new();
	let mut fit_duration = Mean::new();
	let mut failure = None;
	for row in &group {
		if let Some(value) = row.train_accuracy {
			train_accuracy.update(value);
		}
		if let Some(value) = row.test_accuracy {
			test_accuracy.update(value);
		}
		if let Some(value) = row.fit_duration_secs {
			fit_duration.update(value);
		}
		if failure.is_none() {
			failure = row.failure.clone();
		}
	}
	let first = &group[0];
	BenchmarkRow {
		method: first.method.clone(),
		dataset: first.dataset.clone(),
		n_features: first.n_features,
		n_transactions: first.n_transactions,
		noise_level: first.noise_level,
		depth: first.depth,
		fold: None,
		train_accuracy: train_accuracy.finalize().map(round5),
		test_accuracy: test_accuracy.finalize().map(round5),
		fit_duration_secs: fit_duration.finalize().map(round5),
		failure,
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn row(test_accuracy: Option<f64>, fold: usize) -> BenchmarkRow {
		BenchmarkRow {
			method: "greedy_info_gain".to_owned(),
			dataset: "anneal".to_owned(),
			n_features: 10,
			n_transactions: 100,
			noise_level: 0.0,
			depth: 2,
			fold: Some(fold),
			train_accuracy: test_accuracy,
			test_accuracy,
			fit_duration_secs: Some(0.001),
			failure: None,
		}
	}

	#[test]
	fn test_mean_across_folds() {
		let rows = vec![row(Some(0.80), 0), row(Some(0.90), 1), row(Some(0.70), 2)];
		let summary = summarize(rows, 3);
		assert_eq!(summary.len(), 1);
		assert_eq!(summary[0].fold, None);
		assert_eq!(summary[0].test_accuracy, Some(0.80));
	}

	#[test]
	fn test_absent_metrics_are_excluded_from_the_mean() {
		let rows = vec![row(Some(0.80), 0), row(None, 1)];
		let summary = summarize(rows, 2);
		assert_eq!(summary[0].test_accuracy, Some(0.80));
	}

	#[test]
	fn test_all_absent_stays_absent() {
		let rows = vec![row(None, 0), row(None, 1)];
		let summary = summarize(rows, 2);
		assert_eq!(summary[0].test_accuracy, None);
		assert_eq!(summary[0].train_accuracy, None);
	}

	#[test]
	fn test_single_fold_passes_through() {
		let rows = vec![row(Some(0.75), 0)];
		let summary = summarize(rows, 1);
		assert_eq!(summary.len(), 1);
		assert_eq!(summary[0].fold, Some(0));
		assert_eq!(summary[0].test_accuracy, Some(0.75));
	}

	#[test]
	fn test_summary_is_sorted_by_key() {
		let mut a = row(Some(0.5), 0);
		a.method = "b_method".to_owned();
		let mut b = row(Some(0.5), 0);
		b.method = "a_method".to_owned();
		let summary = summarize(vec![a, b], 1);
		assert_eq!(summary[0].method, "a_method");
		assert_eq!(summary[1].method, "b_method");
	}

	#[test]
	fn test_csv_record_order_matches_columns() {
		let record = row(Some(0.5), 0).csv_record();
		assert_eq!(record.len(), CSV_COLUMNS.len());
		assert_eq!(record[0], "anneal");
		assert_eq!(record[3], "greedy_info_gain");
		assert_eq!(record[6], "0");
	}
}
