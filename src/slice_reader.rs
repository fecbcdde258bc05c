// ABOUTME: Opens a cached gzip slice, decompresses it streaming, and parses timestamp+payload lines
// ABOUTME: Fixed 28-byte timestamp prefix, one space separator, then the JSON payload; empty = disconnect
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::line_splitter::{LineSplitter, DEFAULT_BUFFER_SIZE};
use async_compression::tokio::bufread::GzipDecoder;
use replay_core::ReplayError;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, BufReader};

/// Width of the fixed timestamp prefix: a 24-character ISO-8601 UTC
/// timestamp with millisecond precision (e.g. `2020-03-01T00:00:13.123Z`),
/// right-padded with spaces to 28 bytes.
pub const TIMESTAMP_WIDTH: usize = 28;

/// One parsed line from a slice: either a timestamped record or a
/// disconnect sentinel (an empty line).
#[derive(Debug, PartialEq, Eq)]
pub enum SliceLine<'a> {
    Record {
        timestamp: &'a [u8],
        payload: &'a [u8],
    },
    Disconnect,
}

/// Streaming reader over one decompressed slice file.
pub struct SliceReader<R> {
    splitter: LineSplitter<R>,
    lines_seen: usize,
    records_seen: usize,
}

impl SliceReader<GzipDecoder<BufReader<File>>> {
    /// Open `path` as a gzip file and prepare it for streaming reads.
    pub async fn open(path: &Path) -> Result<Self, ReplayError> {
        let file = File::open(path).await?;
        let buffered = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let decoder = GzipDecoder::new(buffered);
        Ok(Self::from_reader(decoder))
    }
}

impl<R: AsyncRead + Unpin> SliceReader<R> {
    /// Build a reader directly over any async byte stream — used by tests
    /// and by callers that already have a decompressed reader.
    #[must_use]
    pub fn from_reader(reader: R) -> Self {
        Self {
            splitter: LineSplitter::with_capacity(reader, DEFAULT_BUFFER_SIZE),
            lines_seen: 0,
            records_seen: 0,
        }
    }

    /// Parse and return the next line, or `None` at end-of-slice.
    pub async fn next_line(&mut self) -> Result<Option<SliceLine<'_>>, ReplayError> {
        let Some(line) = self
            .splitter
            .next_line()
            .await
            .map_err(|err| ReplayError::Decode(err.to_string()))?
        else {
            return Ok(None);
        };

        self.lines_seen += 1;

        if line.is_empty() {
            return Ok(Some(SliceLine::Disconnect));
        }

        if line.len() < TIMESTAMP_WIDTH + 1 {
            return Err(ReplayError::Decode(format!(
                "truncated line: expected at least {} bytes, got {}",
                TIMESTAMP_WIDTH + 1,
                line.len()
            )));
        }

        self.records_seen += 1;
        let (timestamp, rest) = line.split_at(TIMESTAMP_WIDTH);
        // rest[0] is the separator space; skip it.
        let payload = &rest[1..];
        Ok(Some(SliceLine::Record { timestamp, payload }))
    }

    /// How many lines (records or disconnects) have been read so far.
    #[must_use]
    pub const fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    /// True once at least one non-empty record line has been read — lets
    /// the driver detect an "entirely empty" slice after exhausting it.
    #[must_use]
    pub const fn had_any_records(&self) -> bool {
        self.records_seen > 0
    }
}
