use super::Batch;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use thiserror::Error;

// Rough per-event estimate used to pre-size the output buffer
const ESTIMATED_EVENT_SIZE: usize = 256;

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error during serialization: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Batch is empty")]
    EmptyBatch,
}

/// Encodes a batch as the JSON array of its events.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchSerializer {
    compress: bool,
}

impl BatchSerializer {
    pub fn new(compress: bool) -> Self {
        Self { compress }
    }

    pub fn is_compressed(&self) -> bool {
        self.compress
    }

    pub fn serialize_json_array(&self, batch: &Batch) -> Result<Vec<u8>, SerializationError> {
        if batch.is_empty() {
            return Err(SerializationError::EmptyBatch);
        }

        let mut buffer = Vec::with_capacity(batch.size().saturating_mul(ESTIMATED_EVENT_SIZE));
        serde_json::to_writer(&mut buffer, batch.events())?;
        Ok(buffer)
    }

    /// Request body: the JSON array, gzipped when compression is on.
    pub fn serialize(&self, batch: &Batch) -> Result<Vec<u8>, SerializationError> {
        let json = self.serialize_json_array(batch)?;
        if !self.compress {
            return Ok(json);
        }

        let mut encoder = GzEncoder::new(Vec::with_capacity(json.len() / 2), Compression::default());
        encoder.write_all(&json)?;
        Ok(encoder.finish()?)
    }
}
