use crate::*;
use glint_engine::{BuildError, SessionState, TransferSession};

/// Round-trip law: a lossless capture of one pass reconstructs the file.
#[test]
fn lossless_capture_reconstructs_file() {
    let data = test_payload(1, 10_000);
    let mut session = TransferSession::new();
    session.load_bytes("payload.bin", &data, &cfg(1000, 1, 8)).unwrap();

    let frames = frame_bytes(session.sequence().unwrap());
    let cap = capture(frames.iter().map(Vec::as_slice));

    let announce = cap.announce.as_ref().expect("header frame present");
    assert_eq!(announce.total_chunks, 10);
    assert_eq!(announce.total_bytes, 10_000);
    assert_eq!(announce.filename, "payload.bin");

    assert_eq!(cap.reassemble().unwrap(), data);
}

/// A file one byte past a chunk boundary gains a one-byte final chunk,
/// and that length survives the wire.
#[test]
fn short_final_chunk_survives_wire() {
    let data = test_payload(2, 1001);
    let mut session = TransferSession::new();
    session.load_bytes("odd.bin", &data, &cfg(500, 1, 8)).unwrap();

    let frames = frame_bytes(session.sequence().unwrap());
    let cap = capture(frames.iter().map(Vec::as_slice));
    assert_eq!(cap.chunks[&2].len(), 1);
    assert_eq!(cap.reassemble().unwrap(), data);
}

/// Exact multiple of chunk size: every chunk is full-length.
#[test]
fn exact_multiple_has_uniform_chunks() {
    let data = test_payload(3, 4096);
    let mut session = TransferSession::new();
    session.load_bytes("even.bin", &data, &cfg(512, 1, 8)).unwrap();

    let frames = frame_bytes(session.sequence().unwrap());
    let cap = capture(frames.iter().map(Vec::as_slice));
    assert_eq!(cap.chunks.len(), 8);
    assert!(cap.chunks.values().all(|c| c.len() == 512));
    assert_eq!(cap.reassemble().unwrap(), data);
}

/// A chunk size past the wire's u16 length fields must fail Building, not
/// build a sequence whose frames decode with wrapped lengths.
#[test]
fn oversized_chunk_config_fails_at_build_time() {
    let data = test_payload(5, 100_000);
    let mut session = TransferSession::new();
    let err = session
        .load_bytes("big", &data, &cfg(70_000, 1, 8))
        .unwrap_err();
    assert!(matches!(err, BuildError::InvalidConfiguration(_)));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.sequence().is_none());
}

#[test]
fn empty_file_rejected_at_build_time() {
    let mut session = TransferSession::new();
    let err = session.load_bytes("void", &[], &cfg(512, 3, 8)).unwrap_err();
    assert!(matches!(err, BuildError::EmptyFile));
    assert_eq!(session.state(), SessionState::Idle);
}

/// Frames decode independently, in any order, with no shared state.
#[test]
fn frames_are_self_describing_in_any_order() {
    let data = test_payload(4, 3000);
    let mut session = TransferSession::new();
    session.load_bytes("any-order", &data, &cfg(300, 2, 4)).unwrap();

    let mut frames = frame_bytes(session.sequence().unwrap());
    frames.reverse();

    let cap = capture(frames.iter().map(Vec::as_slice));
    assert_eq!(cap.reassemble().unwrap(), data);
}
