use num_traits::ToPrimitive;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

/// Deterministically corrupt a `noise_level` fraction of labels before a fold is induced. Returns a new label vector; the input is never mutated. `noise_level == 0` is the identity transform and draws nothing from the rng, so repeated runs at the same `(dataset, noise_level, fold)` stay reproducible.
pub fn inject_label_noise(labels: &[usize], noise_level: f64, seed: u64) -> Vec<usize> {
	let mut noisy = labels.to_vec();
	if noise_level <= 0.0 {
		return noisy;
	}
	let mut alphabet = labels.to_vec();
	alphabet.sort_unstable();
	alphabet.dedup();
	if alphabet.len() < 2 {
		// With a single observed class there is nothing to flip a label to.
		return noisy;
	}
	let n_flips = (noise_level * labels.len().to_f64().unwrap())
		.floor()
		.to_usize()
		.unwrap();
	let mut rng = Xoshiro256Plus::seed_from_u64(seed);
	let mut indices: Vec<usize> = (0..labels.len()).collect();
	indices.shuffle(&mut rng);
	for index in indices.into_iter().take(n_flips) {
		let current = noisy[index];
		let choices: Vec<usize> = alphabet
			.iter()
			.copied()
			.filter(|label| *label != current)
			.collect();
		noisy[index] = choices[rng.gen_range(0, choices.len())];
	}
	noisy
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_zero_noise_is_identity() {
		let labels = vec![0, 1, 0, 1, 1];
		assert_eq!(inject_label_noise(&labels, 0.0, 42), labels);
	}

	#[test]
	fn test_same_seed_is_deterministic() {
		let labels: Vec<usize> = (0..100).map(|i| i % 2).collect();
		let a = inject_label_noise(&labels, 0.2, 42);
		let b = inject_label_noise(&labels, 0.2, 42);
		assert_eq!(a, b);
	}

	#[test]
	fn test_flips_the_requested_fraction() {
		let labels: Vec<usize> = (0..100).map(|i| i % 2).collect();
		let noisy = inject_label_noise(&labels, 0.2, 42);
		let n_flipped = labels
			.iter()
			.zip(noisy.iter())
			.filter(|(label, noisy)| label != noisy)
			.count();
		assert_eq!(n_flipped, 20);
	}

	#[test]
	fn test_different_seeds_differ() {
		let labels: Vec<usize> = (0..100).map(|i| i % 2).collect();
		let a = inject_label_noise(&labels, 0.2, 1);
		let b = inject_label_noise(&labels, 0.2, 2);
		assert_ne!(a, b);
	}

	#[test]
	fn test_single_class_is_left_alone() {
		let labels = vec![1; 10];
		assert_eq!(inject_label_noise(&labels, 0.5, 42), labels);
	}
}
