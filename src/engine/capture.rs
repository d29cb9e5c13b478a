use std::io::{self, Write};

/// In-memory sink receiving an engine's protocol output for one query.
///
/// Each query owns a fresh capture; nothing written here reaches any other
/// output channel, and the buffer is dropped once scanned.
#[derive(Debug, Default)]
pub struct CapturedOutput {
    buf: Vec<u8>,
}

impl CapturedOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Captured text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn into_text(self) -> String {
        match String::from_utf8(self.buf) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
