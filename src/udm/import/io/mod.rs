pub mod csv_read;
pub mod dialect;
pub mod encoding;

pub use csv_read::{CsvReader, CsvRows};
pub use dialect::Dialect;
pub use encoding::TextEncoding;
