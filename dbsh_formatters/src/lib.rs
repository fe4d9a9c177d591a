#![forbid(unsafe_code)]

mod csv;
mod error;
mod footer;
mod formatter;
mod json;
mod table;
pub mod writers;

pub use dbsh_driver::Results;
pub use error::{Error, Result};
pub use formatter::{Formatter, FormatterManager, FormatterOptions};
