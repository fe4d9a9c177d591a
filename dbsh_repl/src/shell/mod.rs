mod helper;
mod repl;

pub use repl::{Shell, ShellBuilder};
