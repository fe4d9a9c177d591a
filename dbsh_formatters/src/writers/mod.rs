mod file;
mod memory;
mod stdout;
mod writer;

pub use file::FileWriter;
pub use memory::MemoryWriter;
pub use stdout::StdoutWriter;
pub use writer::{Output, Writer};
