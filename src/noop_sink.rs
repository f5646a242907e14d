use std::io::{self, Write};

use crate::sink::Sink;

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of record assembly and encoding
/// without any real I/O.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl Write for NoopSink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for NoopSink {}
