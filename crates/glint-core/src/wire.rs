//! glint wire format — the byte layout of every frame a receiver must parse.
//!
//! These types ARE the protocol. A frame is the payload of exactly one QR
//! symbol, and every frame is self-describing: a receiver that captures it in
//! isolation, out of order, with no prior state, can place it correctly.
//! Changing anything here is a breaking change for every receiver in the wild.
//!
//! Layout: a fixed 22-byte header (zerocopy, `#[repr(C, packed)]` for
//! deterministic layout) followed by a type-specific body. Data and parity
//! bodies carry a small packed prefix plus raw bytes; the header-frame body is
//! JSON because it carries a variable-length filename.

use serde::{Deserialize, Serialize};
use static_assertions::assert_eq_size;
use zerocopy::{AsBytes, FromBytes, FromZeroes};

// ── Constants ─────────────────────────────────────────────────────────────────

/// First two bytes of every frame: "GL".
pub const MAGIC: u16 = 0x474C;

/// Current wire format version.
pub const WIRE_VERSION: u8 = 0x01;

/// Random token identifying one transfer instance. A receiver that sees the
/// session id change knows the sender restarted and must discard partial state.
pub type SessionId = [u8; 8];

/// Truncated blake3 over the frame body.
pub const CHECKSUM_LEN: usize = 8;

/// Chunk indices are u16 on the wire; a file may not need more chunks than
/// this. Keeping the index field narrow keeps every data frame small enough
/// for one symbol.
pub const MAX_CHUNK_COUNT: usize = u16::MAX as usize;

/// Largest chunk payload the wire can express: `body_len` and `payload_len`
/// are u16, and a data body spends `BODY_PREFIX_LEN` of that on its prefix.
/// The framer rejects any chunk size beyond this before a frame is built.
pub const MAX_CHUNK_SIZE: usize = u16::MAX as usize - BODY_PREFIX_LEN;

/// Fixed header bytes preceding every body.
pub const FRAME_HEADER_LEN: usize = 22;

/// Packed prefix of a data or parity body.
pub const BODY_PREFIX_LEN: usize = 6;

/// Wire bytes a data frame adds on top of its chunk payload.
/// The framer must respect `symbol capacity - DATA_FRAME_OVERHEAD` when
/// choosing a chunk size.
pub const DATA_FRAME_OVERHEAD: usize = FRAME_HEADER_LEN + BODY_PREFIX_LEN;

// ── Frame type ────────────────────────────────────────────────────────────────

/// Frame discriminator, carried in `FrameHeader::frame_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    /// Transfer metadata. Shown once per pass so a receiver joining
    /// mid-transmission learns the geometry quickly.
    Header = 0x01,

    /// One chunk of file content.
    Data = 0x02,

    /// Byte-wise XOR of one parity group of chunks.
    Parity = 0x03,
}

impl TryFrom<u8> for FrameType {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(FrameType::Header),
            0x02 => Ok(FrameType::Data),
            0x03 => Ok(FrameType::Parity),
            other => Err(WireError::UnknownFrameType(other)),
        }
    }
}

impl From<FrameType> for u8 {
    fn from(t: FrameType) -> u8 {
        t as u8
    }
}

// ── Fixed header ──────────────────────────────────────────────────────────────

/// Precedes every frame body.
///
/// Wire size: 22 bytes.
#[derive(Debug, Clone, AsBytes, FromBytes, FromZeroes)]
#[repr(C, packed)]
pub struct FrameHeader {
    /// Always `MAGIC`. Lets a receiver reject symbols that are not ours.
    pub magic: u16,

    /// Always `WIRE_VERSION`. A receiver seeing an unknown version drops the
    /// frame silently.
    pub version: u8,

    /// `FrameType` as u8.
    pub frame_type: u8,

    /// Transfer instance token, identical on every frame of one session.
    pub session_id: [u8; 8],

    /// Body length in bytes, not including this header.
    pub body_len: u16,

    /// First 8 bytes of blake3 over the body. A mismatch (misdecoded symbol)
    /// silently discards the frame — there is no one to report it to.
    pub checksum: [u8; 8],
}

// Compile-time size guard. If this fails, the wire format has silently changed.
assert_eq_size!(FrameHeader, [u8; 22]);

/// Prefix of a data-frame body, followed by exactly `payload_len` chunk bytes.
///
/// `payload_len` is the chunk's true length; the final chunk of a file is
/// simply shorter. No padding is ever added, so a receiver strips nothing.
#[derive(Debug, Clone, AsBytes, FromBytes, FromZeroes)]
#[repr(C, packed)]
pub struct DataPrefix {
    pub chunk_index: u16,
    pub total_chunks: u16,
    pub payload_len: u16,
}

assert_eq_size!(DataPrefix, [u8; 6]);

/// Prefix of a parity-frame body, followed by the group XOR (always exactly
/// chunk_size bytes; short members XOR as if zero-extended).
///
/// The covered chunks are the contiguous run
/// `[start_index, start_index + member_count)`.
#[derive(Debug, Clone, AsBytes, FromBytes, FromZeroes)]
#[repr(C, packed)]
pub struct ParityPrefix {
    pub group_id: u16,
    pub start_index: u16,
    pub member_count: u16,
}

assert_eq_size!(ParityPrefix, [u8; 6]);

// ── Header-frame body ─────────────────────────────────────────────────────────

/// Body of a header frame — everything a receiver needs before the first data
/// frame lands: which file, how big, how it is chunked, and the whole-file
/// digest to verify the reassembled result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAnnounce {
    pub filename: String,
    pub total_bytes: u64,
    /// blake3 of the entire file.
    pub content_hash: [u8; 32],
    pub chunk_size: u32,
    pub total_chunks: u16,
}

// ── Frame payload ─────────────────────────────────────────────────────────────

/// The decoded content of one frame, independent of wire layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramePayload {
    Header(SessionAnnounce),
    Data {
        chunk_index: u16,
        total_chunks: u16,
        payload: Vec<u8>,
    },
    Parity {
        group_id: u16,
        start_index: u16,
        member_count: u16,
        xor: Vec<u8>,
    },
}

impl FramePayload {
    pub fn frame_type(&self) -> FrameType {
        match self {
            FramePayload::Header(_) => FrameType::Header,
            FramePayload::Data { .. } => FrameType::Data,
            FramePayload::Parity { .. } => FrameType::Parity,
        }
    }
}

// ── Checksum ──────────────────────────────────────────────────────────────────

/// Truncated blake3 — the per-frame and per-chunk integrity code.
pub fn frame_checksum(bytes: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = blake3::hash(bytes);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash.as_bytes()[..CHECKSUM_LEN]);
    out
}

// ── Encode / decode ───────────────────────────────────────────────────────────

fn encode_body(payload: &FramePayload) -> Vec<u8> {
    match payload {
        FramePayload::Header(announce) => {
            // Announce fields are bounded; serialization cannot fail.
            serde_json::to_vec(announce).unwrap_or_default()
        }
        FramePayload::Data {
            chunk_index,
            total_chunks,
            payload,
        } => {
            let prefix = DataPrefix {
                chunk_index: *chunk_index,
                total_chunks: *total_chunks,
                payload_len: payload.len() as u16,
            };
            let mut body = Vec::with_capacity(BODY_PREFIX_LEN + payload.len());
            body.extend_from_slice(prefix.as_bytes());
            body.extend_from_slice(payload);
            body
        }
        FramePayload::Parity {
            group_id,
            start_index,
            member_count,
            xor,
        } => {
            let prefix = ParityPrefix {
                group_id: *group_id,
                start_index: *start_index,
                member_count: *member_count,
            };
            let mut body = Vec::with_capacity(BODY_PREFIX_LEN + xor.len());
            body.extend_from_slice(prefix.as_bytes());
            body.extend_from_slice(xor);
            body
        }
    }
}

/// Serialize one frame: fixed header + body.
pub fn encode_frame(session_id: SessionId, payload: &FramePayload) -> Vec<u8> {
    let body = encode_body(payload);
    let header = FrameHeader {
        magic: MAGIC,
        version: WIRE_VERSION,
        frame_type: payload.frame_type().into(),
        session_id,
        body_len: body.len() as u16,
        checksum: frame_checksum(&body),
    };
    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + body.len());
    frame.extend_from_slice(header.as_bytes());
    frame.extend_from_slice(&body);
    frame
}

/// Parse and verify one frame. This is what a receiver runs on every decoded
/// symbol; the sender's tests run it to prove the round trip.
pub fn decode_frame(bytes: &[u8]) -> Result<(SessionId, FramePayload), WireError> {
    let header = FrameHeader::read_from_prefix(bytes).ok_or(WireError::Truncated {
        need: FRAME_HEADER_LEN,
        have: bytes.len(),
    })?;

    // Copy packed fields to locals before use (avoids unaligned references).
    let magic = header.magic;
    let version = header.version;
    let body_len = header.body_len as usize;

    if magic != MAGIC {
        return Err(WireError::BadMagic(magic));
    }
    if version != WIRE_VERSION {
        return Err(WireError::UnknownVersion(version));
    }
    let frame_type = FrameType::try_from(header.frame_type)?;

    let body = &bytes[FRAME_HEADER_LEN..];
    if body.len() != body_len {
        return Err(WireError::BadLength {
            expected: body_len,
            actual: body.len(),
        });
    }
    if frame_checksum(body) != header.checksum {
        return Err(WireError::ChecksumMismatch);
    }

    let payload = match frame_type {
        FrameType::Header => {
            let announce: SessionAnnounce = serde_json::from_slice(body)
                .map_err(|e| WireError::BadMetadata(e.to_string()))?;
            FramePayload::Header(announce)
        }
        FrameType::Data => {
            let prefix = DataPrefix::read_from_prefix(body).ok_or(WireError::Truncated {
                need: BODY_PREFIX_LEN,
                have: body.len(),
            })?;
            let payload_len = prefix.payload_len as usize;
            let rest = &body[BODY_PREFIX_LEN..];
            if rest.len() != payload_len {
                return Err(WireError::BadLength {
                    expected: payload_len,
                    actual: rest.len(),
                });
            }
            FramePayload::Data {
                chunk_index: prefix.chunk_index,
                total_chunks: prefix.total_chunks,
                payload: rest.to_vec(),
            }
        }
        FrameType::Parity => {
            let prefix = ParityPrefix::read_from_prefix(body).ok_or(WireError::Truncated {
                need: BODY_PREFIX_LEN,
                have: body.len(),
            })?;
            FramePayload::Parity {
                group_id: prefix.group_id,
                start_index: prefix.start_index,
                member_count: prefix.member_count,
                xor: body[BODY_PREFIX_LEN..].to_vec(),
            }
        }
    };

    Ok((header.session_id, payload))
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can arise when interpreting wire-format data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("bad magic: 0x{0:04x}")]
    BadMagic(u16),

    #[error("unknown wire version: 0x{0:02x}")]
    UnknownVersion(u8),

    #[error("unknown frame type: 0x{0:02x}")]
    UnknownFrameType(u8),

    #[error("frame truncated: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("body length mismatch: header says {expected}, have {actual}")]
    BadLength { expected: usize, actual: usize },

    #[error("frame checksum mismatch")]
    ChecksumMismatch,

    #[error("malformed session announce: {0}")]
    BadMetadata(String),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
