//! Symbol adapter — the seam between frames and QR generation.
//!
//! Symbol encoding itself is an external capability behind `SymbolRenderer`;
//! the engine only cares about two things: the byte capacity the renderer
//! offers at a given error-correction level (which bounds the framer's chunk
//! size), and turning one encoded frame into one renderable matrix.

use glint_core::config::EcLevel;
use glint_core::wire::DATA_FRAME_OVERHEAD;

use crate::error::RenderError;
use crate::schedule::Frame;

/// A rendered symbol: a square grid of dark/light modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    pub width: usize,
    /// Row-major, `width * width` entries; true = dark module.
    pub modules: Vec<bool>,
}

impl Matrix {
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.width + x]
    }
}

/// The external symbol-generation capability.
///
/// Implementations must be pure: the same bytes and level always yield the
/// same matrix.
pub trait SymbolRenderer {
    /// Maximum payload bytes one symbol can carry at `ec`.
    fn capacity(&self, ec: EcLevel) -> usize;

    fn render(&self, bytes: &[u8], ec: EcLevel) -> Result<Matrix, RenderError>;
}

/// Wraps a renderer with the capacity contract the framer negotiated.
pub struct SymbolAdapter<R> {
    renderer: R,
    ec: EcLevel,
}

impl<R: SymbolRenderer> SymbolAdapter<R> {
    pub fn new(renderer: R, ec: EcLevel) -> Self {
        Self { renderer, ec }
    }

    pub fn ec(&self) -> EcLevel {
        self.ec
    }

    /// Largest serialized frame the symbol can carry.
    pub fn max_frame_bytes(&self) -> usize {
        self.renderer.capacity(self.ec)
    }

    /// Largest chunk size the framer may use so that every data frame fits.
    /// Header and parity frames are smaller than a full data frame as long as
    /// the filename stays reasonable.
    pub fn max_chunk_size(&self) -> usize {
        self.max_frame_bytes().saturating_sub(DATA_FRAME_OVERHEAD)
    }

    /// Render one frame. `PayloadTooLarge` cannot happen when the framer
    /// respected `max_chunk_size`; if it surfaces anyway it is an internal
    /// invariant violation, logged as such.
    pub fn render_frame(&self, frame: &Frame) -> Result<Matrix, RenderError> {
        let len = frame.bytes.len();
        let max = self.max_frame_bytes();
        if len > max {
            tracing::error!(len, max, "frame exceeds negotiated symbol capacity");
            return Err(RenderError::PayloadTooLarge { len, max });
        }
        self.renderer.render(&frame.bytes, self.ec)
    }
}
