//! glint integration test harness.
//!
//! These tests drive the whole sender pipeline — framer → scheduler → wire —
//! and then play receiver: decode captured frames, tolerate drops, recover
//! chunks from parity, and verify the reassembled file against the announced
//! digest. Everything runs in-process; the "channel" is a plain Vec of frame
//! byte strings with losses applied by each test.

use std::collections::BTreeMap;

use glint_core::config::TransferConfig;
use glint_core::wire::{decode_frame, FramePayload, SessionAnnounce};
use glint_engine::FrameSequence;

mod framing;
mod scheduling;
mod sessions;

// ── Harness ───────────────────────────────────────────────────────────────────

/// Deterministic pseudo-random payload so failures reproduce exactly.
pub fn test_payload(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect()
}

pub fn cfg(chunk_size: usize, repetition_factor: usize, parity_group_size: usize) -> TransferConfig {
    TransferConfig {
        chunk_size,
        repetition_factor,
        parity_group_size,
        parity: true,
    }
}

/// What a receiver accumulated over one capture window.
#[derive(Default)]
pub struct Capture {
    pub announce: Option<SessionAnnounce>,
    /// chunk index → payload bytes.
    pub chunks: BTreeMap<u16, Vec<u8>>,
    /// group id → (start index, member count, xor bytes).
    pub parity: BTreeMap<u16, (u16, u16, Vec<u8>)>,
}

/// Decode every captured frame into receiver state. Frames arrive in
/// arbitrary order and with arbitrary repeats; order must not matter.
pub fn capture<'a>(frames: impl IntoIterator<Item = &'a [u8]>) -> Capture {
    let mut cap = Capture::default();
    for bytes in frames {
        let (_, payload) = decode_frame(bytes).expect("sender must emit valid frames");
        match payload {
            FramePayload::Header(announce) => cap.announce = Some(announce),
            FramePayload::Data {
                chunk_index,
                payload,
                ..
            } => {
                cap.chunks.entry(chunk_index).or_insert(payload);
            }
            FramePayload::Parity {
                group_id,
                start_index,
                member_count,
                xor,
            } => {
                cap.parity
                    .entry(group_id)
                    .or_insert((start_index, member_count, xor));
            }
        }
    }
    cap
}

impl Capture {
    /// Recover missing chunks from parity, reassemble, and verify the digest.
    /// Returns None when the capture window was not sufficient.
    pub fn reassemble(mut self) -> Option<Vec<u8>> {
        let announce = self.announce.take()?;
        let chunk_size = announce.chunk_size as usize;

        // Parity recovery: a group with exactly one missing member yields it.
        for (start, count, xor) in self.parity.values() {
            let members: Vec<u16> = (*start..start + count).collect();
            let missing: Vec<u16> = members
                .iter()
                .copied()
                .filter(|i| !self.chunks.contains_key(i))
                .collect();
            if missing.len() != 1 {
                continue;
            }
            let lost = missing[0];

            let mut recovered = xor.clone();
            for index in members {
                if index == lost {
                    continue;
                }
                for (acc, byte) in recovered.iter_mut().zip(self.chunks[&index].iter()) {
                    *acc ^= byte;
                }
            }
            // The XOR is always chunk_size bytes; a short final chunk keeps
            // its true length, derived from the announced total.
            let true_len = chunk_len(&announce, lost, chunk_size);
            recovered.truncate(true_len);
            self.chunks.insert(lost, recovered);
        }

        if self.chunks.len() != announce.total_chunks as usize {
            return None;
        }

        let data: Vec<u8> = (0..announce.total_chunks)
            .flat_map(|i| self.chunks[&i].clone())
            .collect();
        if data.len() as u64 != announce.total_bytes {
            return None;
        }
        if *blake3::hash(&data).as_bytes() != announce.content_hash {
            return None;
        }
        Some(data)
    }
}

fn chunk_len(announce: &SessionAnnounce, index: u16, chunk_size: usize) -> usize {
    let total = announce.total_bytes as usize;
    if (index as usize + 1) * chunk_size <= total {
        chunk_size
    } else {
        total - index as usize * chunk_size
    }
}

/// The raw bytes of every frame in a sequence, in display order.
pub fn frame_bytes(seq: &FrameSequence) -> Vec<Vec<u8>> {
    seq.iter().map(|f| f.bytes.to_vec()).collect()
}
