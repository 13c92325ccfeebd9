use crate::artifact::{FitResult, Tree};
use crate::error::{FitError, PredictError, TreeNotFoundError, UnfittedModelError};
use crate::induce::{InductionConfig, InductionEngine, Inducer};
use ndarray::prelude::*;

/// An estimator-style wrapper pairing an induction config with a fitted artifact. `fit` must be called before `predict`, `tree`, or `fit_result`; calling them earlier is a contract violation reported as `UnfittedModelError`. A fit whose engine found no tree leaves the classifier fitted but model-less, and later calls report `TreeNotFoundError`.
pub struct TreeClassifier {
	config: InductionConfig,
	tree: Option<Tree>,
	fit: Option<FitResult>,
	fitted: bool,
}

impl TreeClassifier {
	pub fn new(config: InductionConfig) -> Self {
		Self {
			config,
			tree: None,
			fit: None,
			fitted: false,
		}
	}

	pub fn config(&self) -> &InductionConfig {
		&self.config
	}

	/// Induce a tree for the given training data. Invalid input fails fast; an engine failure is returned as an error but still marks the classifier as fitted-without-a-model, matching the lifecycle in the artifact docs.
	pub fn fit(
		&mut self,
		engine: &dyn InductionEngine,
		features: ArrayView2<f32>,
		labels: &[usize],
	) -> Result<(), FitError> {
		self.tree = None;
		self.fit = None;
		self.fitted = false;
		match Inducer::new(engine).induce(features, labels, &self.config) {
			Ok(tree) => {
				// The sample count was validated to be nonzero, so the fit result cannot fail.
				self.fit = Some(tree.fit_result(labels.len())?);
				self.tree = Some(tree);
				self.fitted = true;
				Ok(())
			}
			Err(FitError::Induction(err)) => {
				self.fitted = true;
				Err(FitError::Induction(err))
			}
			Err(err) => Err(err),
		}
	}

	pub fn tree(&self) -> Result<&Tree, PredictError> {
		if !self.fitted {
			return Err(UnfittedModelError.into());
		}
		match &self.tree {
			Some(tree) => Ok(tree),
			None => Err(TreeNotFoundError.into()),
		}
	}

	pub fn fit_result(&self) -> Result<FitResult, PredictError> {
		if !self.fitted {
			return Err(UnfittedModelError.into());
		}
		match self.fit {
			Some(fit) => Ok(fit),
			None => Err(TreeNotFoundError.into()),
		}
	}

	pub fn predict(&self, features: ArrayView2<f32>) -> Result<Vec<usize>, PredictError> {
		let tree = self.tree()?;
		tree.predict_all(features)
	}
}
