//! Byte-stream scanning for the controller's line protocol.
//!
//! The device never announces state transitions structurally: the login,
//! password, and shell prompts are bare literals embedded in the stream
//! without line terminators. [`PromptBuffer`] accumulates raw bytes, strips
//! telnet option negotiation, and supports the two read patterns the
//! session needs: substring prompt matching during authentication and CRLF
//! line extraction once the shell is ready.

/// Cap on buffered bytes; a stream that never produces a prompt or line
/// terminator is discarded from the front past this point.
const MAX_BUFFER: usize = 16 * 1024;

/// Telnet IAC byte introducing an option negotiation sequence.
const IAC: u8 = 0xFF;

/// Accumulating scanner over one connection's inbound bytes.
#[derive(Debug, Default)]
pub struct PromptBuffer {
    data: Vec<u8>,
    in_iac: bool,
    iac_option_bytes: usize,
}

impl PromptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw transport bytes, filtering telnet IAC sequences.
    ///
    /// The controllers negotiate basic telnet options on connect; we ignore
    /// the negotiation entirely (WILL/WONT/DO/DONT plus one option byte,
    /// other commands are two bytes, `IAC IAC` escapes a literal 0xFF).
    pub fn push(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if self.iac_option_bytes > 0 {
                self.iac_option_bytes -= 1;
                continue;
            }
            if self.in_iac {
                self.in_iac = false;
                match b {
                    IAC => self.data.push(IAC),
                    0xFB..=0xFE => self.iac_option_bytes = 1,
                    _ => {}
                }
                continue;
            }
            if b == IAC {
                self.in_iac = true;
                continue;
            }
            self.data.push(b);
        }

        if self.data.len() > MAX_BUFFER {
            let excess = self.data.len() - MAX_BUFFER;
            self.data.drain(..excess);
        }
    }

    /// Whether the buffered bytes contain `literal` as a substring.
    pub fn contains(&self, literal: &str) -> bool {
        let needle = literal.as_bytes();
        if needle.is_empty() {
            return false;
        }
        self.data.windows(needle.len()).any(|w| w == needle)
    }

    /// Drop everything buffered so far.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Extract every complete line, leaving any partial trailing line
    /// buffered. Lines are terminated by `\n`; a preceding `\r` is trimmed.
    pub fn drain_lines(&mut self) -> Vec<String> {
        let Some(last_newline) = self.data.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.data.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.data, rest);

        let mut lines = Vec::new();
        for segment in complete.split(|&b| b == b'\n') {
            let segment = match segment.last() {
                Some(b'\r') => &segment[..segment.len() - 1],
                _ => segment,
            };
            lines.push(String::from_utf8_lossy(segment).into_owned());
        }
        // split() yields one empty trailing segment after the final '\n'.
        lines.pop();
        lines
    }

    /// Discard a trailing prompt literal, if present.
    ///
    /// The shell prompt arrives without a line terminator and would
    /// otherwise sit in the buffer forever as a partial line.
    pub fn discard_trailing(&mut self, literal: &str) {
        let needle = literal.as_bytes();
        if !needle.is_empty() && self.data.ends_with(needle) {
            self.data.truncate(self.data.len() - needle.len());
        }
    }

    #[cfg(test)]
    fn buffered(&self) -> &[u8] {
        &self.data
    }
}
