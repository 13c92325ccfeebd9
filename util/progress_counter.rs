use std::sync::{
	atomic::{AtomicU64, Ordering},
	Arc,
};

/// A counter that can be shared across worker threads to report how many units of work have completed.
#[derive(Clone, Debug)]
pub struct ProgressCounter {
	current: Arc<AtomicU64>,
	total: u64,
}

impl ProgressCounter {
	pub fn new(total: u64) -> Self {
		Self {
			current: Arc::new(AtomicU64::new(0)),
			total,
		}
	}
	pub fn total(&self) -> u64 {
		self.total
	}
	pub fn get(&self) -> u64 {
		self.current.load(Ordering::Relaxed)
	}
	pub fn inc(&self, amount: u64) {
		self.current.fetch_add(amount, Ordering::Relaxed);
	}
	pub fn is_complete(&self) -> bool {
		self.get() >= self.total
	}
}

#[test]
fn test_progress_counter() {
	let counter = ProgressCounter::new(2);
	assert!(!counter.is_complete());
	counter.inc(1);
	let clone = counter.clone();
	clone.inc(1);
	assert_eq!(counter.get(), 2);
	assert!(counter.is_complete());
}
