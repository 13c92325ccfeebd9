/*!
This crate implements the binary decision-tree artifact produced by tree-induction engines, the operations over it (prediction, depth, size, training accuracy, graphviz export), and the validated seam through which external induction engines are invoked.

Trees are stored as a `Vec` of `Node`s where index 0 is the root. A node is either a branch carrying a feature test and two child indexes, or a leaf carrying a class outcome. The artifact is immutable once induced. The serialized form is the record `{ "tree": [ { "left", "right", "value": { "test", "out", "error" } } ] }`, which is kept bit-exact for compatibility with persisted artifacts; see the `wire` module.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod artifact;
mod classifier;
mod diagram;
mod error;
mod greedy;
mod induce;
mod predict;
mod wire;

pub use self::artifact::{BranchNode, FitResult, LeafNode, Node, Tree};
pub use self::classifier::TreeClassifier;
pub use self::error::{
	FitError, InductionError, InvalidInputError, PredictError, TreeNotFoundError,
	UnfittedModelError,
};
pub use self::greedy::GreedyInfoGainEngine;
pub use self::induce::{DataStructure, FitMethod, InductionConfig, InductionEngine, Inducer};
pub use self::wire::{WireNode, WireTree, WireValue};
