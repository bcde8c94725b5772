//! Payload framer — splits file bytes into fixed-capacity chunks.
//!
//! The chunk list covers the file exactly once, in order, with no gaps or
//! overlaps. The final chunk keeps its true length; nothing is ever padded,
//! so the receiver strips nothing.

use bytes::Bytes;

use glint_core::wire::{frame_checksum, CHECKSUM_LEN, MAX_CHUNK_COUNT, MAX_CHUNK_SIZE};

use crate::error::BuildError;

/// One contiguous slice of the source file. Derived deterministically;
/// immutable once produced.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Position in `[0, total_chunks)`.
    pub index: u16,
    pub data: Bytes,
    /// Truncated blake3 over `data`, computed once at framing time.
    pub checksum: [u8; CHECKSUM_LEN],
}

/// Split `data` into chunks of at most `chunk_size` bytes.
///
/// Fails with `EmptyFile` on zero-length input, `InvalidConfiguration` on a
/// zero chunk size, and `OversizeFile` when the chunk count would not fit the
/// wire's u16 index field.
pub fn chunk_bytes(data: &[u8], chunk_size: usize) -> Result<Vec<Chunk>, BuildError> {
    if chunk_size == 0 {
        return Err(BuildError::InvalidConfiguration(
            "chunk_size must be positive".into(),
        ));
    }
    // The wire carries chunk lengths in u16 fields; a bigger chunk would
    // build frames no receiver can decode.
    if chunk_size > MAX_CHUNK_SIZE {
        return Err(BuildError::InvalidConfiguration(format!(
            "chunk_size {chunk_size} exceeds wire maximum {MAX_CHUNK_SIZE}"
        )));
    }
    if data.is_empty() {
        return Err(BuildError::EmptyFile);
    }

    let count = data.len().div_ceil(chunk_size);
    if count > MAX_CHUNK_COUNT {
        return Err(BuildError::oversize(count));
    }

    let chunks = data
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, slice)| Chunk {
            index: index as u16,
            data: Bytes::copy_from_slice(slice),
            checksum: frame_checksum(slice),
        })
        .collect();

    Ok(chunks)
}
