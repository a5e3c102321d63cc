//! Chunked CSV Ingest
//!
//! Streams a claims extract in fixed-size chunks so files much larger
//! than memory still feed the accumulators. Header resolution runs per
//! chunk: a chunk whose header cannot be resolved is skipped and counted,
//! it never aborts the run.
//!
//! The reader yields raw chunks; [`columns`] resolves headers and
//! [`validator`] turns records into typed rows.

pub mod columns;
pub mod validator;

pub use columns::{ColumnMap, SchemaMismatch};
pub use validator::{validate_chunk, ValidatedChunk};

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::PipelineError;

/// One chunk of raw records plus the header row they were read under.
#[derive(Debug)]
pub struct RawChunk {
    /// 1-based chunk index within the file.
    pub index: usize,
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

/// Ingest counters reported at the end of phase 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestStats {
    pub chunks_read: usize,
    pub chunks_skipped: usize,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
}

/// Streaming chunk reader over a claims extract.
pub struct ChunkReader {
    records: csv::StringRecordsIntoIter<File>,
    headers: StringRecord,
    chunk_size: usize,
    next_index: usize,
}

impl std::fmt::Debug for ChunkReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkReader")
            .field("headers", &self.headers)
            .field("chunk_size", &self.chunk_size)
            .field("next_index", &self.next_index)
            .finish_non_exhaustive()
    }
}

impl ChunkReader {
    /// Open an extract for chunked reading.
    ///
    /// Fails fast when the file does not exist so the caller can log the
    /// absence before any CSV machinery runs.
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::InputNotFound(path.to_path_buf()));
        }

        let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = reader.headers()?.clone();

        Ok(Self {
            records: reader.into_records(),
            headers,
            chunk_size,
            next_index: 1,
        })
    }

    /// Read the next chunk, or `None` at end of file.
    pub fn next_chunk(&mut self) -> Result<Option<RawChunk>, PipelineError> {
        let mut records = Vec::with_capacity(self.chunk_size);
        while records.len() < self.chunk_size {
            match self.records.next() {
                Some(record) => records.push(record?),
                None => break,
            }
        }

        if records.is_empty() {
            return Ok(None);
        }

        let chunk = RawChunk {
            index: self.next_index,
            headers: self.headers.clone(),
            records,
        };
        self.next_index += 1;
        Ok(Some(chunk))
    }
}

// ============================================================================
// Tests
// ============================================================================
