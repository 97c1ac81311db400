pub mod table_view;

pub use table_view::{format_count, no_data_message, selection_header, TableView};
