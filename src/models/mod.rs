pub mod district;
pub mod table;
pub mod temporal;

pub use district::District;
pub use table::{LoadReport, TemporalTable};
pub use temporal::TemporalRecord;
