//! Transfer session — metadata and the lifecycle state machine.
//!
//! Idle → Building → Transmitting → {Completed, Aborted}. All validation is
//! front-loaded into Building; once transmission starts, the only transitions
//! are the operator's stop and cancel. Completion is always an operator
//! decision — with no return channel the protocol can never infer it.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::watch;

use glint_core::config::TransferConfig;
use glint_core::wire::{SessionAnnounce, SessionId};

use crate::clock::{ClockHandle, DisplayClock, FramePosition};
use crate::error::BuildError;
use crate::framer::chunk_bytes;
use crate::schedule::{build_sequence, FrameSequence};

/// Transfer metadata, fixed at Building time and immutable afterwards.
#[derive(Debug, Clone)]
pub struct TransferMeta {
    /// Random token. A receiver that sees it change knows the sender
    /// restarted the transfer and discards partial state.
    pub session_id: SessionId,
    pub filename: String,
    pub total_bytes: u64,
    /// blake3 over the whole file, for end-to-end verification.
    pub content_hash: [u8; 32],
    pub chunk_size: usize,
    pub total_chunks: u16,
    pub created_at: SystemTime,
}

impl TransferMeta {
    /// The header-frame body announcing this transfer.
    pub fn announce(&self) -> SessionAnnounce {
        SessionAnnounce {
            filename: self.filename.clone(),
            total_bytes: self.total_bytes,
            content_hash: self.content_hash,
            chunk_size: self.chunk_size as u32,
            total_chunks: self.total_chunks,
        }
    }
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No file loaded.
    Idle,
    /// Frame sequence built (or being built); waiting for start.
    Building,
    /// Display clock is cycling the sequence.
    Transmitting,
    /// Operator confirmed receipt.
    Completed,
    /// Operator cancelled.
    Aborted,
}

impl SessionState {
    fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Aborted)
    }
}

/// One transfer at a time. Owned by the sending process; nothing survives it.
pub struct TransferSession {
    state: SessionState,
    meta: Option<TransferMeta>,
    sequence: Option<Arc<FrameSequence>>,
    clock: Option<ClockHandle>,
}

impl Default for TransferSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            meta: None,
            sequence: None,
            clock: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn meta(&self) -> Option<&TransferMeta> {
        self.meta.as_ref()
    }

    pub fn sequence(&self) -> Option<&Arc<FrameSequence>> {
        self.sequence.as_ref()
    }

    /// Read `path` and build its frame sequence.
    pub fn load(&mut self, path: &Path, cfg: &TransferConfig) -> Result<(), BuildError> {
        // Check state before touching the filesystem.
        self.ensure_loadable()?;
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        self.load_bytes(&filename, &data, cfg)
    }

    /// Build the frame sequence for in-memory content.
    ///
    /// Permitted from Idle or a terminal state (which first discards the prior
    /// sequence); `SessionNotIdle` otherwise. On failure the session returns
    /// to Idle with nothing loaded.
    pub fn load_bytes(
        &mut self,
        filename: &str,
        data: &[u8],
        cfg: &TransferConfig,
    ) -> Result<(), BuildError> {
        self.ensure_loadable()?;

        // Terminal → Idle: discard whatever the previous transfer left.
        self.meta = None;
        self.sequence = None;
        self.clock = None;
        self.state = SessionState::Building;

        match Self::build(filename, data, cfg) {
            Ok((meta, sequence)) => {
                tracing::info!(
                    filename,
                    bytes = meta.total_bytes,
                    chunks = meta.total_chunks,
                    frames = sequence.len(),
                    session_id = %hex::encode(meta.session_id),
                    "frame sequence built"
                );
                self.meta = Some(meta);
                self.sequence = Some(Arc::new(sequence));
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Idle;
                Err(e)
            }
        }
    }

    fn ensure_loadable(&self) -> Result<(), BuildError> {
        match self.state {
            SessionState::Idle => Ok(()),
            s if s.is_terminal() => Ok(()),
            s => Err(BuildError::SessionNotIdle(s)),
        }
    }

    fn build(
        filename: &str,
        data: &[u8],
        cfg: &TransferConfig,
    ) -> Result<(TransferMeta, FrameSequence), BuildError> {
        cfg.validate()
            .map_err(|knob| BuildError::InvalidConfiguration(knob.into()))?;

        let chunks = chunk_bytes(data, cfg.chunk_size)?;
        let meta = TransferMeta {
            session_id: rand::random(),
            filename: filename.to_string(),
            total_bytes: data.len() as u64,
            content_hash: *blake3::hash(data).as_bytes(),
            chunk_size: cfg.chunk_size,
            total_chunks: chunks.len() as u16,
            created_at: SystemTime::now(),
        };
        let sequence = build_sequence(meta.session_id, &meta.announce(), &chunks, cfg);
        Ok((meta, sequence))
    }

    /// Building → Transmitting: start the display clock. Returns a
    /// subscription to the current-frame channel.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(&mut self, interval: Duration) -> Result<watch::Receiver<FramePosition>, BuildError> {
        if self.state != SessionState::Building || self.sequence.is_none() {
            return Err(BuildError::SessionNotIdle(self.state));
        }
        // A zero interval would kill the clock task on its first tick and
        // strand the session in Transmitting with a dead display loop.
        if interval.is_zero() {
            return Err(BuildError::InvalidConfiguration(
                "frame_interval_ms must be positive".into(),
            ));
        }
        let sequence = Arc::clone(self.sequence.as_ref().unwrap());
        let clock = DisplayClock::spawn(sequence, interval);
        let frames = clock.frames();
        self.clock = Some(clock);
        self.state = SessionState::Transmitting;
        tracing::info!(interval_ms = interval.as_millis() as u64, "transmission started");
        Ok(frames)
    }

    /// Transmitting → Completed. The operator confirmed receipt out of band;
    /// the last frame stays on screen.
    pub fn stop(&mut self) {
        self.finish(SessionState::Completed);
    }

    /// Transmitting → Aborted.
    pub fn cancel(&mut self) {
        self.finish(SessionState::Aborted);
    }

    fn finish(&mut self, terminal: SessionState) {
        if self.state != SessionState::Transmitting {
            tracing::debug!(state = ?self.state, "stop/cancel ignored outside Transmitting");
            return;
        }
        if let Some(clock) = &self.clock {
            clock.stop();
        }
        self.state = terminal;
        tracing::info!(state = ?terminal, "transmission finished");
    }
}
