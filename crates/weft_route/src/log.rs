//! Progress and trace output for routing runs.
//!
//! The router reports warnings and errors through the diagnostic sink; the
//! human-oriented progress table and (when the device's debug flag is set)
//! the per-step search trace go through a [`RouteLog`]. The default target
//! is stderr; tests inject a buffer to capture the output.

use std::io::{self, Write};

/// A line-oriented writer for router progress and trace output.
pub struct RouteLog {
    writer: Box<dyn Write>,
}

impl RouteLog {
    /// Creates a log writing to the given target.
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }

    /// Creates a log writing to stderr.
    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    /// Creates a log that discards everything.
    pub fn discard() -> Self {
        Self::new(Box::new(io::sink()))
    }

    /// Writes one line. Output failures are ignored; progress reporting
    /// must never abort a routing run.
    pub fn line(&mut self, line: &str) {
        let _ = writeln!(self.writer, "{line}");
    }
}

impl Default for RouteLog {
    fn default() -> Self {
        Self::stderr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// A writer handing its bytes to a shared buffer, for capture in tests.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuf(pub(crate) Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lines_are_captured() {
        let buf = SharedBuf::default();
        let mut log = RouteLog::new(Box::new(buf.clone()));
        log.line("Routing..");
        log.line("Routing complete.");
        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text, "Routing..\nRouting complete.\n");
    }

    #[test]
    fn discard_swallows_output() {
        let mut log = RouteLog::discard();
        log.line("nothing to see");
    }
}
