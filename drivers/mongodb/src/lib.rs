//! MongoDB driver for dbsh.
//!
//! Connection strings use the `mongodb` and `mongodb+srv` schemes.  Shell input is evaluated by
//! the [`expression`] interpreter, which understands the `db.<collection>.<method>(...)` call
//! chains of the MongoDB shell without executing arbitrary code.

#![forbid(unsafe_code)]

mod conversion;
mod driver;
pub mod expression;
mod tls;

pub use driver::{Connection, Driver};
