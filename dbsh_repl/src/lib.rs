#![forbid(unsafe_code)]

pub mod commands;
pub mod executors;
mod session;
pub mod shell;

pub use session::Session;
