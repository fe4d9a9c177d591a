mod aggregate;
mod arguments;
mod clear;
mod collections;
mod command;
mod count;
mod databases;
mod describe;
mod display;
mod distinct;
mod error;
mod exit;
mod export;
mod find_one;
mod help;
mod indexes;
mod pretty;
mod query;
mod queryp;
mod quit;
mod stats;
mod tables;
#[cfg(test)]
mod testing;
mod top;
mod use_database;

pub use command::{CommandManager, CommandOptions, LoopCondition, ShellCommand};
pub(crate) use display::display;
pub use error::{Error, Result};
