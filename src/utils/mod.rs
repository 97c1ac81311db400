pub mod constants;
pub mod filename;
pub mod progress;
pub mod timestamp;

pub use constants::*;
pub use filename::export_filename;
pub use progress::ProgressReporter;
pub use timestamp::{from_excel_serial, parse_timestamp, to_excel_serial};
