use crate::writers::MemoryWriter;
use std::fmt::{Debug, Display};
use std::io;
use std::io::Write;

/// A destination for formatted results; `Display` names the destination or, for memory
/// writers, renders what was written.
pub trait Writer: Debug + Display + Write + Send + Sync {}

/// Output handed to formatters and commands: the terminal, an export file or an in-memory
/// buffer.
#[derive(Debug)]
pub struct Output {
    writer: Box<dyn Writer>,
}

impl Output {
    #[must_use]
    pub fn new(writer: Box<dyn Writer>) -> Self {
        Self { writer }
    }

    /// Write formatted text; lets `write!` and `writeln!` target an `Output` directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails
    pub fn write_fmt(&mut self, arguments: std::fmt::Arguments) -> io::Result<()> {
        self.writer.write_fmt(arguments)
    }
}

/// Captures output in memory.
impl Default for Output {
    fn default() -> Self {
        Output::new(Box::<MemoryWriter>::default())
    }
}

impl Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.writer, f)
    }
}

impl Write for Output {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        self.writer.write(buffer)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::StdoutWriter;

    #[test]
    fn test_stdout_output() {
        let output = Output::new(Box::new(StdoutWriter));
        assert_eq!(output.to_string(), "stdout");
    }

    #[test]
    fn test_memory_output() -> anyhow::Result<()> {
        let mut output = Output::default();
        writeln!(output, "{} rows", 2)?;
        output.write_all(b"done")?;
        output.flush()?;
        assert_eq!(output.to_string(), "2 rows\ndone");
        Ok(())
    }
}
