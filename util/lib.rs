/*!
Small utilities shared by the other treebench crates: finite float validation, metric rounding, a bounded thread pool, and an atomic progress counter.
*/

pub mod finite;
pub mod progress_counter;
pub mod round;
pub mod thread_pool;
