pub mod date;
pub mod relative;
pub mod words;

pub use date::{DateStyle, format_date, format_in_zone, format_rd_date};
pub use relative::format_relative;
pub use words::format_words;
