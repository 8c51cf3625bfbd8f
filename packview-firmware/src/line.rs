//! Console line assembly
//!
//! Collects UART bytes into lines. Backspace edits, control bytes are
//! ignored, and a line that overflows the buffer is discarded whole.

use heapless::String;

/// Longest accepted console line
pub const LINE_LEN: usize = 160;

pub struct LineBuffer {
    line: String<LINE_LEN>,
    overflow: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            line: String::new(),
            overflow: false,
        }
    }

    /// Feed one byte; returns a completed, non-empty line
    pub fn push(&mut self, byte: u8) -> Option<String<LINE_LEN>> {
        match byte {
            b'\r' | b'\n' => {
                if core::mem::take(&mut self.overflow) {
                    self.line.clear();
                    return None;
                }
                if self.line.is_empty() {
                    return None;
                }
                Some(core::mem::take(&mut self.line))
            }
            0x08 | 0x7F => {
                self.line.pop();
                None
            }
            b if b.is_ascii() && !b.is_ascii_control() => {
                if self.line.push(char::from(b)).is_err() {
                    self.overflow = true;
                }
                None
            }
            _ => None,
        }
    }
}
