use thiserror::Error;

/// Raised when a prediction or metric is requested before `fit` was called. Always a contract violation by the caller, never swallowed.
#[derive(Clone, Copy, Debug, Error)]
#[error("this model has not been fit, call `fit` first")]
pub struct UnfittedModelError;

/// Raised when `fit` completed but the engine produced no tree, and a prediction or metric is requested anyway.
#[derive(Clone, Copy, Debug, Error)]
#[error("no tree was found during induction, check the fit outcome for details")]
pub struct TreeNotFoundError;

/// Malformed training data or a structurally invalid artifact. Fails fast, before any engine call, and is never retried.
#[derive(Clone, Debug, Error)]
#[error("invalid input: {0}")]
pub struct InvalidInputError(pub String);

/// A failure reported by the induction engine itself. The benchmark treats this as "no model for this configuration", not as a crash.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum InductionError {
	#[error("the induction engine exceeded its time limit")]
	Timeout,
	#[error("the induction engine found no tree satisfying the constraints")]
	NoTree,
	#[error("the induction engine does not implement the requested fit method")]
	UnsupportedMethod,
	#[error("the induction engine reported an internal error: {0}")]
	Engine(String),
}

#[derive(Clone, Debug, Error)]
pub enum FitError {
	#[error(transparent)]
	InvalidInput(#[from] InvalidInputError),
	#[error(transparent)]
	Induction(#[from] InductionError),
}

#[derive(Clone, Debug, Error)]
pub enum PredictError {
	#[error(transparent)]
	Unfitted(#[from] UnfittedModelError),
	#[error(transparent)]
	TreeNotFound(#[from] TreeNotFoundError),
	#[error(transparent)]
	InvalidInput(#[from] InvalidInputError),
}
