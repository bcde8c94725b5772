use crate::*;
use std::time::Duration;

use glint_core::wire::decode_frame;
use glint_engine::{BuildError, SessionState, TransferSession};

/// Full operator walk: load, transmit against a live clock, stop, reload.
#[tokio::test]
async fn lifecycle_with_live_clock() {
    let data = test_payload(30, 1_500);
    let mut session = TransferSession::new();
    session.load_bytes("live", &data, &cfg(300, 2, 4)).unwrap();
    let session_id = session.meta().unwrap().session_id;

    let mut frames = session.start(Duration::from_millis(5)).unwrap();
    assert_eq!(session.state(), SessionState::Transmitting);

    // Watch a handful of displayed frames; each must be a valid wire frame
    // of this session, and indices must advance one at a time.
    let mut prev_index = frames.borrow().index;
    for _ in 0..5 {
        tokio::time::timeout(Duration::from_secs(2), frames.changed())
            .await
            .expect("clock should tick")
            .unwrap();
        let pos = frames.borrow().clone();
        let (sid, _) = decode_frame(&pos.frame.bytes).unwrap();
        assert_eq!(sid, session_id);
        let len = session.sequence().unwrap().len();
        assert_eq!(pos.index, (prev_index + 1) % len);
        prev_index = pos.index;
    }

    session.stop();
    assert_eq!(session.state(), SessionState::Completed);

    // The stopped clock holds its last frame; the watch stays readable.
    let frozen = frames.borrow().clone();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(frames.borrow().index, frozen.index);

    // Loading after Completed discards the old transfer entirely.
    session.load_bytes("next", &data, &cfg(300, 2, 4)).unwrap();
    assert_eq!(session.state(), SessionState::Building);
    assert_ne!(session.meta().unwrap().session_id, session_id);
}

/// Loading while Transmitting is refused — cancel first is the rule.
#[tokio::test]
async fn load_requires_cancel_first() {
    let data = test_payload(31, 900);
    let mut session = TransferSession::new();
    session.load_bytes("first", &data, &cfg(300, 1, 4)).unwrap();
    session.start(Duration::from_millis(5)).unwrap();

    let err = session
        .load_bytes("second", &data, &cfg(300, 1, 4))
        .unwrap_err();
    assert!(matches!(
        err,
        BuildError::SessionNotIdle(SessionState::Transmitting)
    ));

    session.cancel();
    assert_eq!(session.state(), SessionState::Aborted);
    session.load_bytes("second", &data, &cfg(300, 1, 4)).unwrap();
    assert_eq!(session.meta().unwrap().filename, "second");
}

/// Build failures surface their specific kind and leave nothing behind.
#[test]
fn build_failures_are_typed_and_clean() {
    let mut session = TransferSession::new();

    let err = session.load_bytes("e", &[], &cfg(300, 1, 4)).unwrap_err();
    assert!(matches!(err, BuildError::EmptyFile));

    let err = session
        .load_bytes("z", &[1, 2, 3], &cfg(0, 1, 4))
        .unwrap_err();
    assert!(matches!(err, BuildError::InvalidConfiguration(_)));

    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.meta().is_none());
    assert!(session.sequence().is_none());
}
