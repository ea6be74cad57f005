pub mod performance_sample;

pub use performance_sample::{format_timestamp, parse_timestamp, PerformanceSample};
