pub mod performance_queries;

pub use performance_queries::{ensure_schema, insert_sample, latest_for_site, samples_on_date};
