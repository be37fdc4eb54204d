//! Fixed capacity output buffer for rendered sentences.

use std::fmt::{self, Write};

use crate::constants::RENDER_CAPACITY;
use crate::geo::checksum;

/// Cursor over a fixed size byte array.
///
/// Writes past the capacity are truncated and reported, never grown.
/// Implements [`fmt::Write`] so sentences can be rendered with `write!`.
#[derive(Clone)]
pub struct RenderBuffer {
    data: [u8; RENDER_CAPACITY],
    len: usize,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self {
            data: [0; RENDER_CAPACITY],
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        RENDER_CAPACITY
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn remaining(&self) -> usize {
        RENDER_CAPACITY - self.len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Copy as many bytes as fit. Returns the number written.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.remaining());
        self.data[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        n
    }

    /// Append `$body*HH\r\n`, where `body` is rendered from `args` and `HH`
    /// is its checksum.
    ///
    /// If the complete sentence does not fit, everything written by this
    /// call is rolled back and `false` is returned; earlier sentences stay.
    pub fn append_sentence(&mut self, args: fmt::Arguments<'_>) -> bool {
        let start = self.len;
        let fits = self.push_bytes(b"$") == 1 && self.write_fmt(args).is_ok() && {
            let sum = checksum(&self.data[start..self.len]);
            write!(self, "*{:02X}\r\n", sum).is_ok()
        };
        if !fits {
            log::trace!(
                "sentence does not fit ({} of {} bytes used), dropped",
                start,
                RENDER_CAPACITY
            );
            self.len = start;
        }
        fits
    }

    /// Append a pre-formatted sentence verbatim, terminated by CRLF.
    ///
    /// Trailing whitespace of `sentence` is replaced by a single CRLF. Rolled
    /// back like [`append_sentence`](Self::append_sentence) if it does not fit.
    pub fn append_raw(&mut self, sentence: &str) -> bool {
        let start = self.len;
        let body = sentence.trim_end();
        let fits = self.push_bytes(body.as_bytes()) == body.len() && self.push_bytes(b"\r\n") == 2;
        if !fits {
            self.len = start;
        }
        fits
    }
}

impl Write for RenderBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.push_bytes(s.as_bytes()) == s.len() {
            Ok(())
        } else {
            Err(fmt::Error)
        }
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RenderBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderBuffer")
            .field("len", &self.len)
            .field("text", &String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::verify_checksum;

    #[test]
    fn test_push_truncates() {
        let mut buf = RenderBuffer::new();
        let big = vec![b'x'; RENDER_CAPACITY + 10];
        assert_eq!(buf.push_bytes(&big), RENDER_CAPACITY);
        assert_eq!(buf.len(), RENDER_CAPACITY);
        assert_eq!(buf.push_bytes(b"y"), 0);
        assert!(write!(buf, "z").is_err());
        assert_eq!(buf.len(), RENDER_CAPACITY);
    }

    #[test]
    fn test_append_sentence_checksum() {
        let mut buf = RenderBuffer::new();
        assert!(buf.append_sentence(format_args!("PFLAU,,,,1,0,{},0,{},{},{}", 90, 0, 720, "DD1234")));
        let text = std::str::from_utf8(buf.as_bytes()).unwrap();
        assert!(text.starts_with("$PFLAU,"));
        assert!(text.ends_with("\r\n"));
        assert!(verify_checksum(text).is_ok());
    }

    #[test]
    fn test_append_sentence_rollback_keeps_previous() {
        let mut buf = RenderBuffer::new();
        assert!(buf.append_sentence(format_args!("GPRMC,1")));
        let first_len = buf.len();

        let long = "X".repeat(RENDER_CAPACITY);
        assert!(!buf.append_sentence(format_args!("PFLAA,{}", long)));
        assert_eq!(buf.len(), first_len);
        assert!(verify_checksum(std::str::from_utf8(buf.as_bytes()).unwrap()).is_ok());
    }

    #[test]
    fn test_append_sentence_rollback_when_checksum_does_not_fit() {
        let mut buf = RenderBuffer::new();
        // Body fills the buffer exactly, no room for "*HH\r\n"
        let body = "A".repeat(RENDER_CAPACITY - 1);
        assert!(!buf.append_sentence(format_args!("{}", body)));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_append_raw() {
        let mut buf = RenderBuffer::new();
        assert!(buf.append_raw("$WIMWV,242.8,R,6.9,N,A*20\n"));
        assert_eq!(buf.as_bytes(), b"$WIMWV,242.8,R,6.9,N,A*20\r\n");

        let mut buf = RenderBuffer::new();
        assert!(!buf.append_raw(&"W".repeat(RENDER_CAPACITY)));
        assert!(buf.is_empty());
    }
}
