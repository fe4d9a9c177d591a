mod command;
mod error;
mod executor;
mod expression;

pub use error::{Error, Result};
pub use executor::Executor;
