//! glint-engine — transfer framing and scheduling for the glint sender.
//!
//! Turns a file into a bounded, self-describing, loss-tolerant cyclic frame
//! sequence and clocks its display. The receiver can never ask for anything:
//! every reliability decision is made here, up front, structurally.

pub mod clock;
pub mod error;
pub mod framer;
pub mod schedule;
pub mod session;
pub mod symbol;

pub use clock::{ClockHandle, DisplayClock, FramePosition};
pub use error::{BuildError, RenderError};
pub use framer::{chunk_bytes, Chunk};
pub use schedule::{build_sequence, Frame, FrameKind, FrameSequence};
pub use session::{SessionState, TransferMeta, TransferSession};
pub use symbol::{Matrix, SymbolAdapter, SymbolRenderer};
