use ndarray::prelude::*;
use num_traits::ToPrimitive;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use treebench_tree::InvalidInputError;

/// A named binary-feature classification dataset. The feature matrix is read-only for the duration of a benchmark run and may be shared freely across worker threads.
#[derive(Debug)]
pub struct Dataset {
	pub name: String,
	pub features: Array2<f32>,
	pub labels: Vec<usize>,
}

/// The train/validation partitions produced for one fold.
#[derive(Debug)]
pub struct SplitData {
	pub train_features: Array2<f32>,
	pub train_labels: Vec<usize>,
	pub test_features: Array2<f32>,
	pub test_labels: Vec<usize>,
}

impl Dataset {
	pub fn new(
		name: String,
		features: Array2<f32>,
		labels: Vec<usize>,
	) -> Result<Self, InvalidInputError> {
		if features.nrows() != labels.len() {
			return Err(InvalidInputError(format!(
				"dataset \"{}\" has {} feature rows but {} labels",
				name,
				features.nrows(),
				labels.len()
			)));
		}
		if features.nrows() == 0 {
			return Err(InvalidInputError(format!("dataset \"{}\" is empty", name)));
		}
		Ok(Self {
			name,
			features,
			labels,
		})
	}

	pub fn n_features(&self) -> usize {
		self.features.ncols()
	}

	pub fn n_transactions(&self) -> usize {
		self.features.nrows()
	}

	/// Split into train and validation partitions with a fixed validation fraction. The row order is shuffled by a seeded rng so that each fold index sees a different, reproducible partition.
	pub fn split(&self, val_fraction: f64, seed: u64) -> SplitData {
		let n_rows = self.n_transactions();
		let mut indices: Vec<usize> = (0..n_rows).collect();
		let mut rng = Xoshiro256Plus::seed_from_u64(seed);
		indices.shuffle(&mut rng);
		let n_train = ((1.0 - val_fraction) * n_rows.to_f64().unwrap())
			.to_usize()
			.unwrap();
		let (train_indices, test_indices) = indices.split_at(n_train);
		SplitData {
			train_features: self.features.select(Axis(0), train_indices),
			train_labels: train_indices.iter().map(|i| self.labels[*i]).collect(),
			test_features: self.features.select(Axis(0), test_indices),
			test_labels: test_indices.iter().map(|i| self.labels[*i]).collect(),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn dataset() -> Dataset {
		// Rows are all distinct so two different permutations cannot select identical data.
		let features = Array2::from_shape_fn((10, 3), |(i, j)| (i * 3 + j) as f32);
		let labels = (0..10).collect();
		Dataset::new("test".to_owned(), features, labels).unwrap()
	}

	#[test]
	fn test_new_rejects_mismatched_labels() {
		let features = Array2::zeros((3, 2));
		assert!(Dataset::new("bad".to_owned(), features, vec![0, 1]).is_err());
	}

	#[test]
	fn test_split_sizes_and_determinism() {
		let dataset = dataset();
		let split = dataset.split(0.2, 7);
		assert_eq!(split.train_labels.len(), 8);
		assert_eq!(split.test_labels.len(), 2);
		assert_eq!(split.train_features.nrows(), 8);
		let again = dataset.split(0.2, 7);
		assert_eq!(split.train_labels, again.train_labels);
		assert_eq!(split.test_labels, again.test_labels);
		let other = dataset.split(0.2, 8);
		let same_partition = split.train_labels == other.train_labels
			&& split.test_labels == other.test_labels
			&& split.train_features == other.train_features;
		assert!(!same_partition);
	}
}
