pub mod district_reader;
pub mod schema;
pub mod xlsx_reader;

pub use district_reader::DistrictReader;
pub use schema::ColumnMap;
pub use xlsx_reader::{CellValue, XlsxReader};
