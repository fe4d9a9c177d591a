//! # dbsh driver
//!
//! Interfaces shared by the dbsh database drivers: the [`Connection`] trait the shell commands
//! are built on, the values and results they exchange, and the parser for argument text.

#![forbid(unsafe_code)]

mod aliases;
mod connection;
mod driver;
mod driver_manager;
mod error;
pub mod literal;
mod value;

pub use aliases::{Aliases, DATABASE_ALIAS};
pub use connection::{
    Connection, ID_FIELD, MockConnection, QueryResult, Results, Row,
    convert_to_numbered_placeholders,
};
pub use driver::{Driver, MockDriver};
pub use driver_manager::DriverManager;
pub use error::{Error, Result};
pub use literal::ParseError;
pub use value::{Document, Value};
