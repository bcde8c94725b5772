//! Engine error taxonomy.
//!
//! Everything here is detected synchronously while a session is Building,
//! before a single frame is displayed. Once transmission starts there is no
//! error path left: the sender cannot observe receiver-side failure, so
//! unreliability is absorbed by redundancy, not propagated.

use crate::session::SessionState;
use glint_core::wire::MAX_CHUNK_COUNT;

/// Failures while building a frame sequence.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Zero-length input carries no recoverable payload; rejected outright
    /// rather than special-cased through the scheduler.
    #[error("file is empty")]
    EmptyFile,

    /// The chunk index field is u16 on the wire; this file would need more.
    #[error("file needs {chunks} chunks, wire format allows {max}")]
    OversizeFile { chunks: usize, max: usize },

    /// A non-positive knob. Static precondition, never a runtime race.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The session is in the wrong state for the requested operation, e.g.
    /// a build was requested while a transfer is already underway.
    #[error("operation not permitted while session is {0:?}")]
    SessionNotIdle(SessionState),

    #[error("failed to read source file: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    pub(crate) fn oversize(chunks: usize) -> Self {
        BuildError::OversizeFile {
            chunks,
            max: MAX_CHUNK_COUNT,
        }
    }
}

/// Failures in the symbol adapter.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A serialized frame exceeded the negotiated symbol capacity. The framer
    /// guarantees this never happens; seeing it means an internal invariant
    /// was violated, not that the input was bad.
    #[error("frame of {len} bytes exceeds symbol capacity {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// The underlying symbol generator refused the payload.
    #[error("symbol generation failed: {0}")]
    Symbol(String),
}
