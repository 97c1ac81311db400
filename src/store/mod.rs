pub mod record_store;

pub use record_store::{filter_by_date, LoadedDistrict, Selection, TemporalRecordStore};
