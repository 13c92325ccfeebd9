use crate::artifact::{Node, Tree};
use std::fmt::Write;

impl Tree {
	/// Render the tree as a graphviz dot document for external rendering. Branches are labeled by the feature they test, leaves by class and error, and the root also carries the whole tree's error. Edge labels record the branch taken: 0 = left/test-false, 1 = right/test-true. Node identifiers are node indexes, so repeated export of the same artifact yields identical text.
	pub fn export_diagram(&self) -> String {
		let mut dot = String::new();
		writeln!(dot, "digraph Tree {{").unwrap();
		writeln!(dot, "graph [ranksep=0];").unwrap();
		writeln!(dot, "node [shape=record];").unwrap();
		match &self.nodes()[0] {
			Node::Leaf(leaf) => {
				writeln!(
					dot,
					"leaf_0 [label=\"{{{{class|{}}}|{{error|{}}}}}\"];",
					outcome_label(leaf.outcome),
					leaf.error
				)
				.unwrap();
			}
			Node::Branch(branch) => {
				writeln!(
					dot,
					"node_0 [label=\"{{{{feat|{}}}|{{error|{}}}}}\"];",
					branch.test, branch.error
				)
				.unwrap();
				self.write_dot_subtree(&mut dot, branch.left, 0, 0);
				self.write_dot_subtree(&mut dot, branch.right, 0, 1);
			}
		}
		dot.push('}');
		dot
	}

	fn write_dot_subtree(&self, dot: &mut String, node_index: usize, parent: usize, edge: usize) {
		match &self.nodes()[node_index] {
			Node::Leaf(leaf) => {
				writeln!(
					dot,
					"leaf_{} [label=\"{{{{class|{}}}|{{error|{}}}}}\"];",
					node_index,
					outcome_label(leaf.outcome),
					leaf.error
				)
				.unwrap();
				writeln!(dot, "node_{} -> leaf_{} [label={}];", parent, node_index, edge).unwrap();
			}
			Node::Branch(branch) => {
				writeln!(dot, "node_{} [label=\"{{{{feat|{}}}}}\"];", node_index, branch.test)
					.unwrap();
				writeln!(dot, "node_{} -> node_{} [label={}];", parent, node_index, edge).unwrap();
				self.write_dot_subtree(dot, branch.left, node_index, 0);
				self.write_dot_subtree(dot, branch.right, node_index, 1);
			}
		}
	}
}

fn outcome_label(outcome: Option<usize>) -> String {
	match outcome {
		Some(outcome) => outcome.to_string(),
		None => "?".to_owned(),
	}
}
