//! PostgreSQL driver for dbsh.
//!
//! Connection strings use the `postgres` and `postgresql` schemes.  Shell input is SQL; filter
//! documents given to the dot-commands are translated into parameterised `WHERE` clauses.

#![forbid(unsafe_code)]

mod driver;
mod filter;
mod parameter;

pub use driver::{Connection, Driver};
