use crate::artifact::Tree;
use crate::error::{FitError, InductionError, InvalidInputError};
use ndarray::prelude::*;
use std::time::Duration;
use treebench_util::finite::Finite;

/// The internal data structure the engine should use to encode the training matrix. This is a performance hint only and must not change the induced tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DataStructure {
	DenseBitset,
	SparseBitset,
	RowMajor,
}

/// The search strategy the engine should run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FitMethod {
	GreedyInfoGain,
	MurtreeExact,
	BranchAndBoundOptimal,
}

impl FitMethod {
	pub fn name(&self) -> &'static str {
		match self {
			Self::GreedyInfoGain => "greedy_info_gain",
			Self::MurtreeExact => "murtree_exact",
			Self::BranchAndBoundOptimal => "branch_and_bound_optimal",
		}
	}
}

/// The knobs recognized by induction engines. Adding an engine means adding a `FitMethod` variant, not a new estimator type.
#[derive(Clone, Debug)]
pub struct InductionConfig {
	/// A split is only valid if each resulting child covers at least this many training examples.
	pub min_support: usize,
	/// The depth of the induced tree will never exceed this value. `0` means unbounded.
	pub max_depth: usize,
	pub data_structure: DataStructure,
	pub fit_method: FitMethod,
	/// A time budget enforced by the engine itself. The benchmark adds no additional timeout layer.
	pub time_limit: Option<Duration>,
}

impl Default for InductionConfig {
	fn default() -> Self {
		Self {
			min_support: 1,
			max_depth: 0,
			data_structure: DataStructure::SparseBitset,
			fit_method: FitMethod::GreedyInfoGain,
			time_limit: None,
		}
	}
}

/// The seam to an external tree-induction engine. The search algorithm behind this trait is a black box to the rest of the system; it receives validated input and returns a structurally valid artifact or a typed failure.
pub trait InductionEngine: Send + Sync {
	fn induce(
		&self,
		features: ArrayView2<f32>,
		labels: &[usize],
		config: &InductionConfig,
	) -> Result<Tree, InductionError>;
}

/// Wraps an [`InductionEngine`](trait.InductionEngine.html) with input validation and failure-marker normalization. Malformed input fails with `InvalidInputError` before the engine is called; a degenerate failure-marker artifact returned by the engine is mapped to `InductionError::NoTree`.
pub struct Inducer<'a> {
	engine: &'a dyn InductionEngine,
}

impl<'a> Inducer<'a> {
	pub fn new(engine: &'a dyn InductionEngine) -> Self {
		Self { engine }
	}

	pub fn induce(
		&self,
		features: ArrayView2<f32>,
		labels: &[usize],
		config: &InductionConfig,
	) -> Result<Tree, FitError> {
		validate_input(features, labels)?;
		let tree = self.engine.induce(features, labels, config)?;
		if tree.is_failure_marker() {
			return Err(InductionError::NoTree.into());
		}
		Ok(tree)
	}
}

fn validate_input(features: ArrayView2<f32>, labels: &[usize]) -> Result<(), InvalidInputError> {
	if features.nrows() == 0 {
		return Err(InvalidInputError("the training set is empty".to_owned()));
	}
	if features.nrows() != labels.len() {
		return Err(InvalidInputError(format!(
			"features have {} rows but there are {} labels",
			features.nrows(),
			labels.len()
		)));
	}
	if features.iter().any(|value| Finite::new(*value).is_err()) {
		return Err(InvalidInputError(
			"features contain non-finite values".to_owned(),
		));
	}
	// Class ids index per-class count tables inside engines, so a stray huge label must never reach them.
	if let Some(max_label) = labels.iter().max() {
		if *max_label > labels.len() {
			return Err(InvalidInputError(format!(
				"class label {} exceeds the training sample count {}",
				max_label,
				labels.len()
			)));
		}
	}
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::artifact::{LeafNode, Node, Tree};

	struct MarkerEngine;

	impl InductionEngine for MarkerEngine {
		fn induce(
			&self,
			_features: ArrayView2<f32>,
			_labels: &[usize],
			_config: &InductionConfig,
		) -> Result<Tree, InductionError> {
			Ok(Tree::from_nodes(vec![Node::Leaf(LeafNode {
				outcome: None,
				error: usize::MAX,
			})])
			.unwrap())
		}
	}

	#[test]
	fn test_rejects_row_count_mismatch() {
		let features = arr2(&[[0.0, 1.0], [1.0, 0.0]]);
		let result = Inducer::new(&MarkerEngine).induce(
			features.view(),
			&[0],
			&InductionConfig::default(),
		);
		assert!(matches!(result, Err(FitError::InvalidInput(_))));
	}

	#[test]
	fn test_rejects_non_finite_features() {
		let features = arr2(&[[0.0, f32::NAN]]);
		let result = Inducer::new(&MarkerEngine).induce(
			features.view(),
			&[0],
			&InductionConfig::default(),
		);
		assert!(matches!(result, Err(FitError::InvalidInput(_))));
	}

	#[test]
	fn test_rejects_out_of_range_labels() {
		let features = arr2(&[[0.0, 1.0], [1.0, 0.0]]);
		let result = Inducer::new(&MarkerEngine).induce(
			features.view(),
			&[0, usize::MAX],
			&InductionConfig::default(),
		);
		assert!(matches!(result, Err(FitError::InvalidInput(_))));
	}

	#[test]
	fn test_failure_marker_becomes_no_tree() {
		let features = arr2(&[[0.0, 1.0]]);
		let result = Inducer::new(&MarkerEngine).induce(
			features.view(),
			&[0],
			&InductionConfig::default(),
		);
		assert!(matches!(
			result,
			Err(FitError::Induction(InductionError::NoTree))
		));
	}
}
