//! Import normalization — turns CSV uploads, pasted spreadsheet grids,
//! JSON documents, and Google Sheets ranges into canonical campaigns.

pub mod csv;
pub mod dates;
pub mod headers;
pub mod json;
pub mod rows;
pub mod sheets;
pub mod template;
pub mod text;
pub mod validate;
pub mod value;

pub use csv::{parse_csv, parse_rows, ImportReport, RowFailure};
pub use json::parse_json;
pub use sheets::SheetsClient;
