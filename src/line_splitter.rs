// ABOUTME: Splits a byte stream into LF-delimited lines without a per-line allocation
// ABOUTME: Zero-length lines are preserved verbatim — they are disconnect sentinels downstream
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Default read-ahead buffer size. The spec recommends ≥128 KiB for
/// throughput against a gzip-decompressed stream.
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Transforms an [`AsyncRead`] byte stream into a lazy sequence of
/// LF-delimited lines.
///
/// Each call to [`LineSplitter::next_line`] returns a slice borrowed from
/// an internal buffer — callers that need to retain the bytes past the next
/// call must copy them. This is restartable per stream (construct a new
/// `LineSplitter` for a new reader) but is not itself slice-aware; pairing
/// one splitter with one slice's decompressed stream is the caller's job
/// (see [`crate::slice_reader`]).
pub struct LineSplitter<R> {
    reader: R,
    buf: Vec<u8>,
    /// Start of not-yet-consumed data in `buf`.
    pos: usize,
    /// End of valid data in `buf`.
    filled: usize,
    eof: bool,
}

impl<R: AsyncRead + Unpin> LineSplitter<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_SIZE)
    }

    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buf: vec![0u8; capacity.max(1)],
            pos: 0,
            filled: 0,
            eof: false,
        }
    }

    /// Returns the next line (without its trailing LF), or `None` at
    /// end-of-stream. A final unterminated line is flushed as though it
    /// were LF-terminated. Fails only if the underlying reader fails.
    pub async fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        loop {
            if let Some(offset) = memchr_lf(&self.buf[self.pos..self.filled]) {
                let line_end = self.pos + offset;
                let line_start = self.pos;
                self.pos = line_end + 1;
                return Ok(Some(&self.buf[line_start..line_end]));
            }

            if self.eof {
                if self.pos < self.filled {
                    let line_start = self.pos;
                    let line_end = self.filled;
                    self.pos = self.filled;
                    return Ok(Some(&self.buf[line_start..line_end]));
                }
                return Ok(None);
            }

            self.fill_more().await?;
        }
    }

    async fn fill_more(&mut self) -> io::Result<()> {
        if self.pos > 0 {
            self.buf.copy_within(self.pos..self.filled, 0);
            self.filled -= self.pos;
            self.pos = 0;
        }
        if self.filled == self.buf.len() {
            self.buf.resize(self.buf.len() * 2, 0);
        }
        let read = self.reader.read(&mut self.buf[self.filled..]).await?;
        if read == 0 {
            self.eof = true;
        } else {
            self.filled += read;
        }
        Ok(())
    }
}

fn memchr_lf(haystack: &[u8]) -> Option<usize> {
    haystack.iter().position(|&b| b == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    async fn collect(input: &[u8]) -> Vec<Vec<u8>> {
        let mut splitter = LineSplitter::with_capacity(Cursor::new(input.to_vec()), 8);
        let mut lines = Vec::new();
        while let Some(line) = splitter.next_line().await.unwrap() {
            lines.push(line.to_vec());
        }
        lines
    }

    #[tokio::test]
    async fn splits_on_lf() {
        let lines = collect(b"alpha\nbeta\ngamma\n").await;
        assert_eq!(lines, vec![b"alpha".to_vec(), b"beta".to_vec(), b"gamma".to_vec()]);
    }

    #[tokio::test]
    async fn preserves_empty_lines() {
        let lines = collect(b"alpha\n\nbeta\n").await;
        assert_eq!(lines, vec![b"alpha".to_vec(), b"".to_vec(), b"beta".to_vec()]);
    }

    #[tokio::test]
    async fn flushes_final_unterminated_line() {
        let lines = collect(b"alpha\nbeta").await;
        assert_eq!(lines, vec![b"alpha".to_vec(), b"beta".to_vec()]);
    }

    #[tokio::test]
    async fn empty_input_yields_no_lines() {
        let lines = collect(b"").await;
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn trailing_empty_line_is_preserved_not_dropped() {
        // Verifies the §9 open question's resolution: a trailing empty
        // line (input ending in "\n\n") must be treated the same as any
        // other empty line, not silently dropped at end-of-stream.
        let lines = collect(b"alpha\n\n").await;
        assert_eq!(lines, vec![b"alpha".to_vec(), b"".to_vec()]);
    }

    #[tokio::test]
    async fn handles_lines_longer_than_initial_buffer() {
        let long_line = vec![b'x'; 100];
        let mut input = long_line.clone();
        input.push(b'\n');
        input.extend_from_slice(b"short\n");
        let lines = collect(&input).await;
        assert_eq!(lines, vec![long_line, b"short".to_vec()]);
    }
}
