pub mod baseline;
pub mod cache;
pub mod records;

pub use baseline::Baseline;
pub use cache::EvaluationCache;
pub use records::{append_csv_row, append_json_line, write_json_atomic};
