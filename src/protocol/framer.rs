//! Line Framer
//!
//! Resegments raw socket reads into complete text lines.
//!
//! The server writes UTF-8 text, but the socket hands it to us in arbitrary
//! byte chunks: a multi-byte character may be chopped anywhere, including
//! between two reads. The framer therefore decodes eagerly and carries
//! *decoded text*, not raw bytes, across feed calls: whenever a chunk ends
//! mid-line, every complete character seen so far is decoded into a carry
//! string, and only the trailing incomplete sequence (at most 3 bytes)
//! stays in the byte window for the next read.
//!
//! Malformed sequences never fail the framer; they decode to the
//! replacement character.

use bytes::BytesMut;

/// Initial capacity of the receive window
const WINDOW_CAPACITY: usize = 4096;

/// Incremental byte-to-line tokenizer, UTF-8 safe across chunk boundaries
#[derive(Debug, Default)]
pub struct LineFramer {
    /// Unconsumed bytes: mid-line tail of the last chunk, at most a few
    /// bytes of an incomplete UTF-8 sequence after each feed
    window: BytesMut,

    /// Decoded text of the current (unterminated) line
    carry: String,
}

impl LineFramer {
    /// Create an empty framer
    pub fn new() -> Self {
        Self {
            window: BytesMut::with_capacity(WINDOW_CAPACITY),
            carry: String::new(),
        }
    }

    /// Feed one chunk of freshly-read bytes, returning every line completed
    /// by it (without the trailing newline)
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.window.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(nl) = self.window.iter().position(|&b| b == b'\n') {
            let line_bytes = self.window.split_to(nl + 1);
            let mut line = std::mem::take(&mut self.carry);
            line.push_str(&String::from_utf8_lossy(&line_bytes[..nl]));
            lines.push(line);
        }

        // No more newlines: decode every complete character into the carry
        // and keep only an incomplete trailing sequence buffered.
        let complete = complete_prefix_len(&self.window);
        if complete > 0 {
            let decoded = self.window.split_to(complete);
            self.carry.push_str(&String::from_utf8_lossy(&decoded));
        }

        lines
    }

    /// Bytes currently buffered waiting for the rest of a character
    pub fn buffered_bytes(&self) -> usize {
        self.window.len()
    }

    /// Decoded text of the current unterminated line, if any
    pub fn partial_line(&self) -> &str {
        &self.carry
    }

    /// Drop any partial line and buffered bytes
    pub fn reset(&mut self) {
        self.window.clear();
        self.carry.clear();
    }
}

/// Length of the longest prefix of `bytes` that does not end inside a
/// multi-byte UTF-8 sequence.
///
/// Walks back at most three bytes from the end looking for a leading byte;
/// if the sequence it starts is still missing continuation bytes, the
/// prefix stops before it. Invalid leads and orphaned continuation bytes
/// count as complete (they decode to replacement characters regardless of
/// what follows).
fn complete_prefix_len(bytes: &[u8]) -> usize {
    let len = bytes.len();
    // Scan back over trailing continuation bytes (0b10xxxxxx), at most 3.
    let mut i = len;
    let mut trailing = 0;
    while i > 0 && trailing < 3 && bytes[i - 1] & 0b1100_0000 == 0b1000_0000 {
        i -= 1;
        trailing += 1;
    }

    if i == 0 || trailing == 3 && bytes[i - 1] & 0b1100_0000 == 0b1000_0000 {
        // Nothing but continuation bytes: cannot become valid, flush it all.
        return len;
    }

    let lead = bytes[i - 1];
    let expected = match lead {
        b if b & 0b1000_0000 == 0 => 1,
        b if b & 0b1110_0000 == 0b1100_0000 => 2,
        b if b & 0b1111_0000 == 0b1110_0000 => 3,
        b if b & 0b1111_1000 == 0b1111_0000 => 4,
        // Invalid lead byte: it will never decode cleanly, flush it.
        _ => return len,
    };

    let have = 1 + trailing;
    if have < expected {
        // Incomplete sequence: hold the lead and its continuations back.
        i - 1
    } else {
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_prefix_plain_ascii() {
        assert_eq!(complete_prefix_len(b"abc"), 3);
    }

    #[test]
    fn complete_prefix_holds_incomplete_tail() {
        // "é" is 0xC3 0xA9; feed only the lead byte
        assert_eq!(complete_prefix_len(&[b'a', 0xC3]), 1);
        // lead plus one of two continuations of a 3-byte char
        assert_eq!(complete_prefix_len(&[0xE4, 0xB8]), 0);
    }

    #[test]
    fn complete_prefix_flushes_orphan_continuations() {
        assert_eq!(complete_prefix_len(&[0x80, 0x80]), 2);
    }
}
