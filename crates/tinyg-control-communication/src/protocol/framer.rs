//! Line reassembly for the receive side
//!
//! Serial reads hand over arbitrary chunks; frames are `\n` terminated and
//! may carry a trailing `\r`.

/// A line longer than this without a terminator is dropped
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Buffers partial reads and yields complete lines
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append freshly read bytes
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        if self.buffer.len() > MAX_LINE_LENGTH && !self.buffer.contains(&b'\n') {
            tracing::warn!(
                "Discarding {} buffered bytes without line terminator",
                self.buffer.len()
            );
            self.buffer.clear();
        }
    }

    /// Next complete line, without its terminator
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.buffer.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    /// Bytes waiting for a terminator
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reassembles_split_frames() {
        let mut framer = LineFramer::new();
        framer.push(br#"{"r":{"mpo":{"x""#);
        assert_eq!(framer.next_line(), None);
        framer.push(b":3.0}},\"f\":[1,0,4]}\r\n{\"r\"");
        assert_eq!(
            framer.next_line().unwrap(),
            br#"{"r":{"mpo":{"x":3.0}},"f":[1,0,4]}"#.to_vec()
        );
        assert_eq!(framer.next_line(), None);
        assert_eq!(framer.pending(), 4);
    }

    #[test]
    fn test_multiple_lines_in_one_read() {
        let mut framer = LineFramer::new();
        framer.push(b"a\nb\r\n\nc");
        assert_eq!(framer.next_line().unwrap(), b"a".to_vec());
        assert_eq!(framer.next_line().unwrap(), b"b".to_vec());
        assert_eq!(framer.next_line().unwrap(), Vec::<u8>::new());
        assert_eq!(framer.next_line(), None);
    }

    #[test]
    fn test_oversized_garbage_is_dropped() {
        let mut framer = LineFramer::new();
        framer.push(&vec![b'x'; MAX_LINE_LENGTH + 1]);
        assert_eq!(framer.pending(), 0);
    }
}
