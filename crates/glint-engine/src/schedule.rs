//! Redundancy scheduler — builds the cyclic frame sequence.
//!
//! The receiver observes some arbitrary, possibly short window of frames and
//! can never ask for a resend. The cycle therefore carries structural
//! redundancy: every pass repeats the header and all data frames, and XOR
//! parity frames let a receiver holding all-but-one chunk of a group recover
//! the missing one without re-observing it.
//!
//! The sequence itself is a flat, read-only list built once per session.
//! Cyclic playback is the display clock's iteration policy, not a property of
//! this data structure.

use bytes::Bytes;

use glint_core::config::TransferConfig;
use glint_core::wire::{encode_frame, FramePayload, SessionAnnounce, SessionId};

use crate::framer::Chunk;

/// What a frame in the sequence is, without re-decoding its bytes.
/// Used for progress reporting during display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Header,
    Data { chunk_index: u16 },
    Parity { group_id: u16 },
}

/// One fully encoded frame, ready for the symbol adapter.
#[derive(Debug, Clone)]
pub struct Frame {
    pub kind: FrameKind,
    pub bytes: Bytes,
}

/// The finite, restartable sequence displayed each cycle. Immutable after
/// construction, so the display path needs no locking.
#[derive(Debug)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    total_chunks: u16,
    passes: usize,
    parity_groups: usize,
}

impl FrameSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> &Frame {
        &self.frames[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn total_chunks(&self) -> u16 {
        self.total_chunks
    }

    /// Repetition passes per cycle.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn parity_groups(&self) -> usize {
        self.parity_groups
    }
}

/// Build one cycle of frames for `chunks`.
///
/// Pure and deterministic: the same announce, chunk list, and configuration
/// always produce an identical sequence. The caller validates the
/// configuration first; a zero group size here would be a programming error.
pub fn build_sequence(
    session_id: SessionId,
    announce: &SessionAnnounce,
    chunks: &[Chunk],
    cfg: &TransferConfig,
) -> FrameSequence {
    let total_chunks = chunks.len() as u16;

    // Base pass: header first, then every chunk in index order. The header
    // recurs once per pass so a receiver joining mid-cycle learns the
    // transfer geometry within one pass at most.
    let mut main: Vec<FramePayload> = Vec::with_capacity(cfg.repetition_factor * (chunks.len() + 1));
    for _ in 0..cfg.repetition_factor {
        main.push(FramePayload::Header(announce.clone()));
        for chunk in chunks {
            main.push(FramePayload::Data {
                chunk_index: chunk.index,
                total_chunks,
                payload: chunk.data.to_vec(),
            });
        }
    }

    let parity = if cfg.parity {
        parity_payloads(chunks, cfg.parity_group_size, cfg.chunk_size)
    } else {
        Vec::new()
    };
    let parity_groups = parity.len();

    let interleaved = interleave(main, parity);

    let frames = interleaved
        .iter()
        .map(|payload| Frame {
            kind: kind_of(payload),
            bytes: Bytes::from(encode_frame(session_id, payload)),
        })
        .collect();

    FrameSequence {
        frames,
        total_chunks,
        passes: cfg.repetition_factor,
        parity_groups,
    }
}

fn kind_of(payload: &FramePayload) -> FrameKind {
    match payload {
        FramePayload::Header(_) => FrameKind::Header,
        FramePayload::Data { chunk_index, .. } => FrameKind::Data {
            chunk_index: *chunk_index,
        },
        FramePayload::Parity { group_id, .. } => FrameKind::Parity {
            group_id: *group_id,
        },
    }
}

/// One parity frame per contiguous group of `group_size` chunk indices.
/// The final group may be short and covers only its members.
///
/// The XOR is always `chunk_size` bytes: short chunks contribute as if
/// zero-extended, and the receiver truncates a recovered chunk to its true
/// length (known from the announce).
fn parity_payloads(chunks: &[Chunk], group_size: usize, chunk_size: usize) -> Vec<FramePayload> {
    chunks
        .chunks(group_size)
        .enumerate()
        .map(|(group_id, group)| {
            let mut xor = vec![0u8; chunk_size];
            for chunk in group {
                for (acc, byte) in xor.iter_mut().zip(chunk.data.iter()) {
                    *acc ^= byte;
                }
            }
            FramePayload::Parity {
                group_id: group_id as u16,
                start_index: group[0].index,
                member_count: group.len() as u16,
                xor,
            }
        })
        .collect()
}

/// Spread `parity` evenly through `main` instead of appending it as a block,
/// so a short capture window samples a mix of data and parity frames.
fn interleave(main: Vec<FramePayload>, parity: Vec<FramePayload>) -> Vec<FramePayload> {
    if parity.is_empty() {
        return main;
    }

    let stride = main.len().div_ceil(parity.len() + 1).max(1);
    let mut out = Vec::with_capacity(main.len() + parity.len());
    let mut parity_iter = parity.into_iter();

    for (i, payload) in main.into_iter().enumerate() {
        out.push(payload);
        if (i + 1) % stride == 0 {
            if let Some(p) = parity_iter.next() {
                out.push(p);
            }
        }
    }
    out.extend(parity_iter);
    out
}
