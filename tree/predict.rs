use crate::artifact::{Node, Tree};
use crate::error::{InvalidInputError, PredictError, TreeNotFoundError};
use ndarray::prelude::*;

impl Tree {
	/// Make a prediction for a single example. Features follow the binary/one-hot convention: at each branch, a feature value of 1 sends the example right, anything else sends it left. An instance with fewer features than the tree tests is `InvalidInputError`; a decoded artifact carries no feature-count bound of its own.
	pub fn predict(&self, features: ArrayView1<f32>) -> Result<usize, PredictError> {
		if self.is_failure_marker() {
			return Err(TreeNotFoundError.into());
		}
		// Start at the root node and traverse until we reach a leaf.
		let mut node_index = 0;
		loop {
			match &self.nodes()[node_index] {
				Node::Branch(branch) => {
					let value = features.get(branch.test).ok_or_else(|| {
						InvalidInputError(format!(
							"the instance has {} features but the tree tests feature {}",
							features.len(),
							branch.test
						))
					})?;
					node_index = if *value == 1.0 {
						branch.right
					} else {
						branch.left
					};
				}
				Node::Leaf(leaf) => {
					return leaf.outcome.ok_or_else(|| TreeNotFoundError.into())
				}
			}
		}
	}

	/// Make a prediction for every row of `features`.
	pub fn predict_all(&self, features: ArrayView2<f32>) -> Result<Vec<usize>, PredictError> {
		features
			.outer_iter()
			.map(|features| self.predict(features))
			.collect()
	}
}

#[cfg(test)]
mod test {
	use crate::artifact::test_tree;
	use crate::artifact::{LeafNode, Node, Tree};
	use crate::error::PredictError;
	use ndarray::prelude::*;

	#[test]
	fn test_predict_routes_by_branch_convention() {
		let tree = test_tree();
		// feature 0 == 0 goes left to the class 0 leaf.
		assert_eq!(tree.predict(aview1(&[0.0, 1.0])).unwrap(), 0);
		// feature 0 == 1, feature 1 == 0 goes right then left.
		assert_eq!(tree.predict(aview1(&[1.0, 0.0])).unwrap(), 0);
		// feature 0 == 1, feature 1 == 1 goes right then right.
		assert_eq!(tree.predict(aview1(&[1.0, 1.0])).unwrap(), 1);
	}

	#[test]
	fn test_predict_all() {
		let tree = test_tree();
		let features = arr2(&[[0.0, 0.0], [1.0, 1.0]]);
		assert_eq!(tree.predict_all(features.view()).unwrap(), vec![0, 1]);
	}

	#[test]
	fn test_predict_fails_on_failure_marker() {
		let tree = Tree::from_nodes(vec![Node::Leaf(LeafNode {
			outcome: None,
			error: usize::MAX,
		})])
		.unwrap();
		assert!(matches!(
			tree.predict(aview1(&[0.0])),
			Err(PredictError::TreeNotFound(_))
		));
	}

	#[test]
	fn test_predict_rejects_narrow_instance() {
		// The root routes feature 0 == 1 to a branch testing feature 1, which this instance does not have.
		let tree = test_tree();
		assert!(matches!(
			tree.predict(aview1(&[1.0])),
			Err(PredictError::InvalidInput(_))
		));
	}
}
