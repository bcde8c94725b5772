//! glint-core — wire format and configuration for the glint sender.
//! The engine and CLI crates depend on this one.

pub mod config;
pub mod wire;

pub use config::{DisplayConfig, EcLevel, GlintConfig, TransferConfig};
pub use wire::{FramePayload, FrameType, SessionAnnounce, SessionId};
