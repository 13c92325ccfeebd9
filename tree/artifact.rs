use crate::error::InvalidInputError;
use crate::wire::WireTree;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use treebench_util::round::round5;

/// A learned decision tree. Trees are stored as a `Vec` of `Node`s, index 0 is the root. Each branch has two indexes into the `Vec`, one for each of its children. The artifact is created atomically by a successful induction call and is immutable afterward.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "WireTree", into = "WireTree")]
pub struct Tree {
	nodes: Vec<Node>,
}

/// A node is either a branch or a leaf. The sentinel convention of the wire format (`left == right` meaning "no children") exists only at the serialization boundary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
	Branch(BranchNode),
	Leaf(LeafNode),
}

/// A `BranchNode` is an internal node in a tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BranchNode {
	/// This is the index of the feature this node tests.
	pub test: usize,
	/// This is the index in the tree's node vector for this node's left child, taken when the tested feature is not 1.
	pub left: usize,
	/// This is the index in the tree's node vector for this node's right child, taken when the tested feature is 1.
	pub right: usize,
	/// The number of training examples misclassified by the subtree rooted at this node.
	pub error: usize,
}

/// The leaves in a tree hold the class outcome for examples that get sent to them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeafNode {
	/// The class to output. A lone root leaf with no outcome is the failure marker emitted by engines that found no tree.
	pub outcome: Option<usize>,
	/// The number of training examples misclassified by this leaf.
	pub error: usize,
}

impl Node {
	pub fn error(&self) -> usize {
		match self {
			Self::Branch(BranchNode { error, .. }) => *error,
			Self::Leaf(LeafNode { error, .. }) => *error,
		}
	}

	pub fn is_leaf(&self) -> bool {
		matches!(self, Self::Leaf(_))
	}
}

/// Metrics derived from a fitted tree. These are recomputed from the artifact on demand, never stored redundantly inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitResult {
	/// The longest root-to-leaf edge count. A lone root leaf has depth 0.
	pub depth: usize,
	/// The total node count.
	pub size: usize,
	/// `1 - root_error / train_sample_count`, rounded to 5 decimal digits.
	pub train_accuracy: f64,
}

impl Tree {
	/// Build a tree from a node vector, verifying that the nodes form a finite rooted binary tree: every branch has two distinct in-bounds children, no node is shared or part of a cycle, and every node is reachable from the root.
	pub fn from_nodes(nodes: Vec<Node>) -> Result<Tree, InvalidInputError> {
		validate(&nodes)?;
		Ok(Tree { nodes })
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// The total misclassified-example count recorded at the root at fit time.
	pub fn root_error(&self) -> usize {
		self.nodes[0].error()
	}

	/// The total node count.
	pub fn size(&self) -> usize {
		self.nodes.len()
	}

	/// The longest root-to-leaf edge count. A lone root leaf has depth 0.
	pub fn depth(&self) -> usize {
		self.node_depth(0)
	}

	fn node_depth(&self, node_index: usize) -> usize {
		match &self.nodes[node_index] {
			Node::Leaf(_) => 0,
			Node::Branch(branch) => {
				1 + self.node_depth(branch.left).max(self.node_depth(branch.right))
			}
		}
	}

	/// An artifact consisting of a single leaf with no valid outcome means the engine produced no model. It must never be used for prediction.
	pub fn is_failure_marker(&self) -> bool {
		if self.root_error() == usize::MAX {
			return true;
		}
		match self.nodes.as_slice() {
			[Node::Leaf(leaf)] => leaf.outcome.is_none(),
			_ => false,
		}
	}

	/// The training accuracy, `1 - root_error / sample_count`, rounded to 5 decimal digits.
	pub fn train_accuracy(&self, sample_count: usize) -> Result<f64, InvalidInputError> {
		if sample_count == 0 {
			return Err(InvalidInputError(
				"cannot compute accuracy for an empty training set".to_owned(),
			));
		}
		let error = self.root_error().to_f64().unwrap();
		let count = sample_count.to_f64().unwrap();
		Ok(round5(1.0 - error / count))
	}

	pub fn fit_result(&self, sample_count: usize) -> Result<FitResult, InvalidInputError> {
		Ok(FitResult {
			depth: self.depth(),
			size: self.size(),
			train_accuracy: self.train_accuracy(sample_count)?,
		})
	}
}

fn validate(nodes: &[Node]) -> Result<(), InvalidInputError> {
	if nodes.is_empty() {
		return Err(InvalidInputError("tree has no nodes".to_owned()));
	}
	let mut visited = vec![false; nodes.len()];
	let mut stack = vec![0];
	while let Some(node_index) = stack.pop() {
		if visited[node_index] {
			return Err(InvalidInputError(format!(
				"node {} is reachable more than once, the nodes do not form a tree",
				node_index
			)));
		}
		visited[node_index] = true;
		if let Node::Branch(branch) = &nodes[node_index] {
			if branch.left == branch.right {
				return Err(InvalidInputError(format!(
					"branch node {} has identical children",
					node_index
				)));
			}
			for &child in &[branch.left, branch.right] {
				if child == 0 {
					return Err(InvalidInputError(format!(
						"branch node {} points back at the root",
						node_index
					)));
				}
				if child >= nodes.len() {
					return Err(InvalidInputError(format!(
						"branch node {} has out-of-bounds child {}",
						node_index, child
					)));
				}
				stack.push(child);
			}
		}
	}
	if let Some(node_index) = visited.iter().position(|visited| !visited) {
		return Err(InvalidInputError(format!(
			"node {} is not reachable from the root",
			node_index
		)));
	}
	Ok(())
}

#[cfg(test)]
pub(crate) fn test_tree() -> Tree {
	// Tests feature 0 at the root, feature 1 on the right. Training errors: 1 + 0 + 2 = 3 at the root.
	Tree::from_nodes(vec![
		Node::Branch(BranchNode {
			test: 0,
			left: 1,
			right: 2,
			error: 3,
		}),
		Node::Leaf(LeafNode {
			outcome: Some(0),
			error: 1,
		}),
		Node::Branch(BranchNode {
			test: 1,
			left: 3,
			right: 4,
			error: 2,
		}),
		Node::Leaf(LeafNode {
			outcome: Some(0),
			error: 2,
		}),
		Node::Leaf(LeafNode {
			outcome: Some(1),
			error: 0,
		}),
	])
	.unwrap()
}

#[test]
fn test_depth_and_size() {
	let tree = test_tree();
	assert_eq!(tree.depth(), 2);
	assert_eq!(tree.size(), 5);
	assert_eq!(tree.root_error(), 3);
}

#[test]
fn test_single_leaf_depth() {
	let tree = Tree::from_nodes(vec![Node::Leaf(LeafNode {
		outcome: Some(1),
		error: 0,
	})])
	.unwrap();
	assert_eq!(tree.depth(), 0);
	assert_eq!(tree.size(), 1);
	assert!(!tree.is_failure_marker());
}

#[test]
fn test_failure_marker() {
	let tree = Tree::from_nodes(vec![Node::Leaf(LeafNode {
		outcome: None,
		error: usize::MAX,
	})])
	.unwrap();
	assert!(tree.is_failure_marker());
}

#[test]
fn test_train_accuracy() {
	let tree = test_tree();
	assert!((tree.train_accuracy(9).unwrap() - 0.66667).abs() < 1e-9);
	assert!(tree.train_accuracy(0).is_err());
}

#[test]
fn test_validate_rejects_shared_subtree() {
	let nodes = vec![
		Node::Branch(BranchNode {
			test: 0,
			left: 1,
			right: 2,
			error: 0,
		}),
		Node::Branch(BranchNode {
			test: 1,
			left: 3,
			right: 2,
			error: 0,
		}),
		Node::Leaf(LeafNode {
			outcome: Some(0),
			error: 0,
		}),
		Node::Leaf(LeafNode {
			outcome: Some(1),
			error: 0,
		}),
	];
	assert!(Tree::from_nodes(nodes).is_err());
}

#[test]
fn test_validate_rejects_unreachable_node() {
	let nodes = vec![
		Node::Leaf(LeafNode {
			outcome: Some(0),
			error: 0,
		}),
		Node::Leaf(LeafNode {
			outcome: Some(1),
			error: 0,
		}),
	];
	assert!(Tree::from_nodes(nodes).is_err());
}
