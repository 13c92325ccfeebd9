use super::StreamingMetric;
use num_traits::ToPrimitive;

/// The streaming arithmetic mean of a sequence of `f64`s. `finalize` returns `None` if no values were observed.
#[derive(Debug, Default)]
pub struct Mean {
	n: u64,
	sum: f64,
}

impl Mean {
	pub fn new() -> Self {
		Self::default()
	}
}

impl StreamingMetric<'_> for Mean {
	type Input = f64;
	type Output = Option<f64>;

	fn update(&mut self, value: Self::Input) {
		self.n += 1;
		self.sum += value;
	}

	fn merge(&mut self, other: Self) {
		self.n += other.n;
		self.sum += other.sum;
	}

	fn finalize(self) -> Option<f64> {
		if self.n == 0 {
			None
		} else {
			Some(self.sum / self.n.to_f64().unwrap())
		}
	}
}

#[test]
fn test_mean() {
	let mut mean = Mean::new();
	assert_eq!(mean.finalize(), None);
	let mut mean = Mean::new();
	for value in &[0.80, 0.90, 0.70] {
		mean.update(*value);
	}
	let mut other = Mean::new();
	other.update(0.80);
	mean.merge(other);
	assert!((mean.finalize().unwrap() - 0.80).abs() < f64::EPSILON);
}
