use crate::writers::writer::Writer;
use std::fmt::Display;
use std::io::{Result, Write};

/// Collects output in a buffer; the shell's tests read command output back through `Display`.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    buffer: Vec<u8>,
}

impl Display for MemoryWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.buffer))
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        self.buffer.extend_from_slice(buffer);
        Ok(buffer.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Writer for MemoryWriter {}
