//! Bounded capture of toolchain output
//!
//! Only trailing bytes are ever kept: the end of a compiler log is where the
//! errors and the size summary are.

/// Stdout kept in a successful report.
pub const STDOUT_TAIL_SUCCESS: usize = 5000;

/// Stdout kept in a failed report.
pub const STDOUT_TAIL_FAILURE: usize = 2000;

/// Stderr kept in a failed report.
pub const STDERR_TAIL: usize = 5000;

/// Trailing part of `text`, at most `max_bytes` long, cut on a char boundary.
pub fn tail(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

/// Byte buffer that keeps only the last `capacity` bytes written to it.
#[derive(Debug, Clone)]
pub struct TailBuffer {
    buf: Vec<u8>,
    capacity: usize,
    dropped: u64,
}

impl TailBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity.min(8192)),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
        if self.buf.len() > self.capacity {
            let excess = self.buf.len() - self.capacity;
            self.buf.drain(..excess);
            self.dropped += excess as u64;
        }
    }

    /// Bytes discarded from the front so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn into_string_lossy(self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}
