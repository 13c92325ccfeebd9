/*!
The on-the-wire artifact format shared with external induction engines and with persisted artifacts. The shape is kept bit-exact: `{ "tree": [ { "left": int, "right": int, "value": { "test": int|null, "out": label|null, "error": int } } ] }`. A wire node is a leaf iff `left == right`; both indexes then point at node 0 by convention. Decoding applies the structural validation in `Tree::from_nodes`, so sentinel ambiguity never leaks past this boundary.
*/

use crate::artifact::{BranchNode, LeafNode, Node, Tree};
use crate::error::InvalidInputError;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WireTree {
	pub tree: Vec<WireNode>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WireNode {
	pub left: usize,
	pub right: usize,
	pub value: WireValue,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WireValue {
	pub test: Option<usize>,
	pub out: Option<usize>,
	pub error: usize,
}

impl From<Tree> for WireTree {
	fn from(tree: Tree) -> WireTree {
		let tree = tree
			.nodes()
			.iter()
			.map(|node| match node {
				Node::Branch(branch) => WireNode {
					left: branch.left,
					right: branch.right,
					value: WireValue {
						test: Some(branch.test),
						out: None,
						error: branch.error,
					},
				},
				Node::Leaf(leaf) => WireNode {
					left: 0,
					right: 0,
					value: WireValue {
						test: None,
						out: leaf.outcome,
						error: leaf.error,
					},
				},
			})
			.collect();
		WireTree { tree }
	}
}

impl TryFrom<WireTree> for Tree {
	type Error = InvalidInputError;

	fn try_from(wire: WireTree) -> Result<Tree, InvalidInputError> {
		let nodes = wire
			.tree
			.iter()
			.enumerate()
			.map(|(node_index, node)| {
				if node.left == node.right {
					Ok(Node::Leaf(LeafNode {
						outcome: node.value.out,
						error: node.value.error,
					}))
				} else {
					let test = node.value.test.ok_or_else(|| {
						InvalidInputError(format!("branch node {} has no test", node_index))
					})?;
					Ok(Node::Branch(BranchNode {
						test,
						left: node.left,
						right: node.right,
						error: node.value.error,
					}))
				}
			})
			.collect::<Result<Vec<_>, InvalidInputError>>()?;
		Tree::from_nodes(nodes)
	}
}

impl Tree {
	/// Decode a tree from its serialized record, validating the structure.
	pub fn from_json(json: &str) -> Result<Tree, InvalidInputError> {
		serde_json::from_str(json).map_err(|err| InvalidInputError(err.to_string()))
	}

	/// Encode the tree as its serialized record.
	pub fn to_json(&self) -> String {
		serde_json::to_string(self).unwrap()
	}
}
