/*!
A reference induction engine implementing `FitMethod::GreedyInfoGain`: top-down information-gain splitting on binary features, honoring `min_support`, `max_depth`, and `time_limit`. Exact and optimal searches are expected to plug in from external engines through the same [`InductionEngine`](../trait.InductionEngine.html) seam; this engine reports `UnsupportedMethod` for them. The `data_structure` hint is ignored here, it only matters to engines with specialized encodings.
*/

use crate::artifact::{BranchNode, LeafNode, Node, Tree};
use crate::error::InductionError;
use crate::induce::{FitMethod, InductionConfig, InductionEngine};
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use std::time::Instant;

pub struct GreedyInfoGainEngine;

impl InductionEngine for GreedyInfoGainEngine {
	fn induce(
		&self,
		features: ArrayView2<f32>,
		labels: &[usize],
		config: &InductionConfig,
	) -> Result<Tree, InductionError> {
		if config.fit_method != FitMethod::GreedyInfoGain {
			return Err(InductionError::UnsupportedMethod);
		}
		if labels.is_empty() {
			return Err(InductionError::Engine("no training examples".to_owned()));
		}
		let deadline = config.time_limit.map(|limit| Instant::now() + limit);
		let n_classes = labels.iter().max().unwrap() + 1;
		let min_support = config.min_support.max(1);
		let remaining_depth = match config.max_depth {
			0 => None,
			max_depth => Some(max_depth),
		};
		let mut grower = TreeGrower {
			features,
			labels,
			n_classes,
			min_support,
			deadline,
			nodes: Vec::new(),
		};
		let rows = (0..labels.len()).collect();
		grower.grow(rows, remaining_depth)?;
		Tree::from_nodes(grower.nodes).map_err(|err| InductionError::Engine(err.to_string()))
	}
}

// The features view and the label slice come in with independent lifetimes, and `ArrayView2` is invariant over its lifetime, so the grower has to keep the two apart.
struct TreeGrower<'a, 'b> {
	features: ArrayView2<'a, f32>,
	labels: &'b [usize],
	n_classes: usize,
	min_support: usize,
	deadline: Option<Instant>,
	nodes: Vec<Node>,
}

impl<'a, 'b> TreeGrower<'a, 'b> {
	/// Grow the subtree covering `rows` and return its node index. The node vector is filled in preorder so the root lands at index 0.
	fn grow(
		&mut self,
		rows: Vec<usize>,
		remaining_depth: Option<usize>,
	) -> Result<usize, InductionError> {
		if let Some(deadline) = self.deadline {
			if Instant::now() >= deadline {
				return Err(InductionError::Timeout);
			}
		}
		let counts = self.class_counts(&rows);
		let (majority, majority_count) = argmax(&counts);
		let leaf_error = rows.len() - majority_count;
		let split = if leaf_error > 0 && remaining_depth != Some(0) {
			self.choose_best_split(&rows, &counts)
		} else {
			None
		};
		let node_index = self.nodes.len();
		match split {
			None => {
				self.nodes.push(Node::Leaf(LeafNode {
					outcome: Some(majority),
					error: leaf_error,
				}));
			}
			Some(split) => {
				// Children are filled in after the recursion because their indexes and errors are not known yet.
				self.nodes.push(Node::Branch(BranchNode {
					test: split.feature_index,
					left: 0,
					right: 0,
					error: 0,
				}));
				let remaining_depth = remaining_depth.map(|depth| depth - 1);
				let left = self.grow(split.left_rows, remaining_depth)?;
				let right = self.grow(split.right_rows, remaining_depth)?;
				let error = self.nodes[left].error() + self.nodes[right].error();
				if let Node::Branch(branch) = &mut self.nodes[node_index] {
					branch.left = left;
					branch.right = right;
					branch.error = error;
				}
			}
		}
		Ok(node_index)
	}

	fn class_counts(&self, rows: &[usize]) -> Vec<usize> {
		let mut counts = vec![0; self.n_classes];
		for row in rows {
			counts[self.labels[*row]] += 1;
		}
		counts
	}

	fn choose_best_split(&self, rows: &[usize], counts: &[usize]) -> Option<Split> {
		let parent_entropy = entropy(counts, rows.len());
		let mut best: Option<(f64, Split)> = None;
		for feature_index in 0..self.features.ncols() {
			let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
				.iter()
				.partition(|row| self.features[[**row, feature_index]] != 1.0);
			if left_rows.len() < self.min_support || right_rows.len() < self.min_support {
				continue;
			}
			let left_counts = self.class_counts(&left_rows);
			let right_counts = self.class_counts(&right_rows);
			let n = rows.len().to_f64().unwrap();
			let weighted_child_entropy = left_rows.len().to_f64().unwrap() / n
				* entropy(&left_counts, left_rows.len())
				+ right_rows.len().to_f64().unwrap() / n
					* entropy(&right_counts, right_rows.len());
			let gain = parent_entropy - weighted_child_entropy;
			if gain <= 1e-12 {
				continue;
			}
			let is_improvement = match &best {
				None => true,
				Some((best_gain, _)) => gain > *best_gain,
			};
			if is_improvement {
				best = Some((
					gain,
					Split {
						feature_index,
						left_rows,
						right_rows,
					},
				));
			}
		}
		best.map(|(_, split)| split)
	}
}

struct Split {
	feature_index: usize,
	left_rows: Vec<usize>,
	right_rows: Vec<usize>,
}

fn entropy(counts: &[usize], n: usize) -> f64 {
	let n = n.to_f64().unwrap();
	counts
		.iter()
		.filter(|count| **count > 0)
		.map(|count| {
			let p = count.to_f64().unwrap() / n;
			-p * p.log2()
		})
		.sum()
}

fn argmax(counts: &[usize]) -> (usize, usize) {
	let mut best_index = 0;
	let mut best_count = 0;
	for (index, count) in counts.iter().enumerate() {
		if *count > best_count {
			best_index = index;
			best_count = *count;
		}
	}
	(best_index, best_count)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::induce::Inducer;
	use std::time::Duration;

	fn and_dataset() -> (Array2<f32>, Vec<usize>) {
		// Labels are feature0 AND feature1; feature 2 is constant noise.
		let mut rows = Vec::new();
		let mut labels = Vec::new();
		for a in 0..2usize {
			for b in 0..2usize {
				for _ in 0..5 {
					rows.push([a as f32, b as f32, 0.0]);
					labels.push(a & b);
				}
			}
		}
		let features =
			Array2::from_shape_vec((rows.len(), 3), rows.concat()).unwrap();
		(features, labels)
	}

	#[test]
	fn test_fit_perfectly_separable() {
		let (features, labels) = and_dataset();
		let config = InductionConfig::default();
		let tree = Inducer::new(&GreedyInfoGainEngine)
			.induce(features.view(), &labels, &config)
			.unwrap();
		assert_eq!(tree.root_error(), 0);
		assert_eq!(tree.depth(), 2);
		// Train-accuracy consistency: predictions disagree with the labels exactly root_error times.
		let predictions = tree.predict_all(features.view()).unwrap();
		let misclassified = predictions
			.iter()
			.zip(labels.iter())
			.filter(|(prediction, label)| prediction != label)
			.count();
		assert_eq!(misclassified, tree.root_error());
		assert!((tree.train_accuracy(labels.len()).unwrap() - 1.0).abs() < 1e-9);
	}

	#[test]
	fn test_induce_with_independent_input_lifetimes() {
		// The labels live strictly shorter than the features view.
		let (features, labels) = and_dataset();
		let view = features.view();
		let tree = {
			let labels = labels.clone();
			Inducer::new(&GreedyInfoGainEngine)
				.induce(view, &labels, &InductionConfig::default())
				.unwrap()
		};
		assert_eq!(tree.root_error(), 0);
	}

	#[test]
	fn test_max_depth_is_honored() {
		let (features, labels) = and_dataset();
		let config = InductionConfig {
			max_depth: 1,
			..Default::default()
		};
		let tree = Inducer::new(&GreedyInfoGainEngine)
			.induce(features.view(), &labels, &config)
			.unwrap();
		assert!(tree.depth() <= 1);
	}

	#[test]
	fn test_min_support_blocks_small_splits() {
		let (features, labels) = and_dataset();
		let config = InductionConfig {
			min_support: labels.len(),
			..Default::default()
		};
		let tree = Inducer::new(&GreedyInfoGainEngine)
			.induce(features.view(), &labels, &config)
			.unwrap();
		// No valid split exists, so the whole training set collapses into one leaf.
		assert_eq!(tree.size(), 1);
		assert_eq!(tree.depth(), 0);
	}

	#[test]
	fn test_zero_time_limit_times_out() {
		let (features, labels) = and_dataset();
		let config = InductionConfig {
			time_limit: Some(Duration::from_secs(0)),
			..Default::default()
		};
		let result = GreedyInfoGainEngine.induce(features.view(), &labels, &config);
		assert!(matches!(result, Err(InductionError::Timeout)));
	}

	#[test]
	fn test_other_fit_methods_are_unsupported() {
		let (features, labels) = and_dataset();
		let config = InductionConfig {
			fit_method: FitMethod::BranchAndBoundOptimal,
			..Default::default()
		};
		let result = GreedyInfoGainEngine.induce(features.view(), &labels, &config);
		assert!(matches!(result, Err(InductionError::UnsupportedMethod)));
	}

	#[test]
	fn test_train_accuracy_consistency_with_noise() {
		let (features, mut labels) = and_dataset();
		// Corrupt a few labels so the tree cannot be perfect at depth 1.
		labels[0] = 1;
		labels[5] = 0;
		let config = InductionConfig {
			max_depth: 1,
			..Default::default()
		};
		let tree = Inducer::new(&GreedyInfoGainEngine)
			.induce(features.view(), &labels, &config)
			.unwrap();
		let predictions = tree.predict_all(features.view()).unwrap();
		let misclassified = predictions
			.iter()
			.zip(labels.iter())
			.filter(|(prediction, label)| prediction != label)
			.count();
		assert_eq!(misclassified, tree.root_error());
	}
}
