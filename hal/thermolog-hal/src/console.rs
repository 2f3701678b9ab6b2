//! Interactive console abstractions
//!
//! The console is the operator's text channel: line-oriented input that
//! can be polled without blocking, and a formatted output sink.

use core::fmt;

use heapless::{Deque, String};

/// Interactive text console
///
/// Output goes through [`core::fmt::Write`] so callers can use `write!`.
/// Output is best-effort; a console with nobody listening must not stall
/// the caller.
pub trait Console: fmt::Write {
    /// Check whether at least one input byte is waiting
    fn has_input(&mut self) -> bool;

    /// Take the next input byte, if any
    fn read_byte(&mut self) -> Option<u8>;

    /// Discard everything currently buffered on the input side
    fn drain_input(&mut self) {
        while self.has_input() {
            if self.read_byte().is_none() {
                break;
            }
        }
    }
}

impl<T: Console + ?Sized> Console for &mut T {
    fn has_input(&mut self) -> bool {
        (**self).has_input()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
}

/// Console over a serial port
///
/// Wraps any `embedded-io` port (UART, USB CDC) that can report whether a
/// read would block.
pub struct SerialConsole<U> {
    port: U,
}

impl<U> SerialConsole<U> {
    /// Wrap a serial port
    pub fn new(port: U) -> Self {
        Self { port }
    }

    /// Consume the console and return the port
    pub fn into_inner(self) -> U {
        self.port
    }
}

impl<U: embedded_io::Write> fmt::Write for SerialConsole<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.port.write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

impl<U> Console for SerialConsole<U>
where
    U: embedded_io::Read + embedded_io::ReadReady + embedded_io::Write,
{
    fn has_input(&mut self) -> bool {
        self.port.read_ready().unwrap_or(false)
    }

    fn read_byte(&mut self) -> Option<u8> {
        if !self.has_input() {
            return None;
        }
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(1) => Some(buf[0]),
            _ => None,
        }
    }
}

/// In-memory console
///
/// Input is queued with [`BufferedConsole::push_input`]; output accumulates
/// up to `OUT` bytes and further text is dropped.
#[derive(Debug, Default)]
pub struct BufferedConsole<const IN: usize, const OUT: usize> {
    input: Deque<u8, IN>,
    output: String<OUT>,
}

impl<const IN: usize, const OUT: usize> BufferedConsole<IN, OUT> {
    /// Create an empty console
    pub fn new() -> Self {
        Self {
            input: Deque::new(),
            output: String::new(),
        }
    }

    /// Queue `text` as operator input
    ///
    /// Returns the number of bytes accepted before the input buffer filled.
    pub fn push_input(&mut self, text: &str) -> usize {
        text.bytes()
            .take_while(|&b| self.input.push_back(b).is_ok())
            .count()
    }

    /// Bytes still waiting to be read
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Everything written so far
    pub fn output(&self) -> &str {
        self.output.as_str()
    }

    /// Forget previous output
    pub fn clear_output(&mut self) {
        self.output.clear();
    }
}

impl<const IN: usize, const OUT: usize> fmt::Write for BufferedConsole<IN, OUT> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s).map_err(|_| fmt::Error)
    }
}

impl<const IN: usize, const OUT: usize> Console for BufferedConsole<IN, OUT> {
    fn has_input(&mut self) -> bool {
        !self.input.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }
}
