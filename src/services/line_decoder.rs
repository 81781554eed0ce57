//! Reassembles telnet feed bytes into lines

/// Longest line kept; bytes past this are dropped until the next terminator
pub const MAX_LINE_LEN: usize = 255;

/// Fixed-capacity line accumulator that survives between reads
pub struct LineBuffer {
    buf: [u8; MAX_LINE_LEN],
    len: usize,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; MAX_LINE_LEN],
            len: 0,
        }
    }

    /// Append a byte. Returns false when the buffer is full and the byte was dropped.
    pub fn push(&mut self, c: u8) -> bool {
        if self.len < MAX_LINE_LEN {
            self.buf[self.len] = c;
            self.len += 1;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Contents with trailing whitespace removed
    pub fn trimmed(&self) -> &[u8] {
        let end = self
            .as_bytes()
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(0, |i| i + 1);
        &self.buf[..end]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == MAX_LINE_LEN
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits an arbitrarily chunked byte stream on `\n` / `\r`
#[derive(Default)]
pub struct LineDecoder {
    buffer: LineBuffer,
    /// Current line overflowed; cleared on the terminator
    truncated: bool,
    truncated_lines: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed whatever bytes are available now. Each complete, non-empty line
    /// is handed to `on_line`; the return value counts the lines it accepted.
    /// A partial trailing line stays buffered for the next call.
    pub fn feed<F>(&mut self, bytes: &[u8], mut on_line: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let mut accepted = 0;

        for &c in bytes {
            if c == b'\n' || c == b'\r' {
                self.truncated = false;
                if !self.buffer.is_empty() {
                    {
                        let line = String::from_utf8_lossy(self.buffer.trimmed());
                        if !line.is_empty() && on_line(&line) {
                            accepted += 1;
                        }
                    }
                    self.buffer.clear();
                }
            } else if self.buffer.is_full() {
                if !self.truncated {
                    tracing::trace!("telnet line exceeds {} bytes, truncating", MAX_LINE_LEN);
                    self.truncated = true;
                    self.truncated_lines += 1;
                }
            } else {
                self.buffer.push(c);
            }
        }

        accepted
    }

    /// Drop any partially received line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.truncated = false;
    }

    /// Lines cut short at `MAX_LINE_LEN` so far
    pub fn truncated_lines(&self) -> usize {
        self.truncated_lines
    }

    /// Bytes of the line currently being assembled
    pub fn pending(&self) -> &[u8] {
        self.buffer.as_bytes()
    }
}
