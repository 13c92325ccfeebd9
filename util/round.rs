/// Round to 5 decimal digits, the fixed precision of every reported metric.
pub fn round5(value: f64) -> f64 {
	(value * 1e5).round() / 1e5
}

#[test]
fn test_round5() {
	assert!((round5(2.0 / 3.0) - 0.66667).abs() < 1e-9);
	assert!((round5(0.8) - 0.8).abs() < 1e-9);
}
