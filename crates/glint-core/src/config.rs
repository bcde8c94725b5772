//! Configuration for glint.
//!
//! Resolution order: config file → defaults, with CLI flags applied on top by
//! the binary. All transfer knobs are policy: the right values depend on the
//! camera and screen actually in use, so nothing here is hard-coded beyond a
//! default.
//!
//! Config file location:
//!   1. $GLINT_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/glint/config.toml
//!   3. ~/.config/glint/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlintConfig {
    pub transfer: TransferConfig,
    pub display: DisplayConfig,
}

/// How a file is framed and how much redundancy the cycle carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Bytes of file content per chunk. Must fit the symbol capacity at the
    /// chosen error-correction level, minus wire overhead.
    pub chunk_size: usize,

    /// How many times the full pass (header + every data frame) repeats per
    /// cycle. Repetition is the first reliability primitive: there is no way
    /// for the receiver to ask for anything again.
    pub repetition_factor: usize,

    /// Chunks per XOR parity group. A receiver holding all-but-one chunk of a
    /// group recovers the last one from the group's parity frame.
    pub parity_group_size: usize,

    /// Emit parity frames at all.
    pub parity: bool,
}

/// How the frame sequence is clocked onto the screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Dwell time per frame. Faster cycling raises throughput but raises the
    /// chance a given frame is captured blurred or dropped.
    pub frame_interval_ms: u64,

    /// Symbol error-correction level.
    pub error_correction: EcLevel,
}

/// QR error-correction level. Higher levels survive worse capture conditions
/// but shrink the per-symbol byte capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcLevel {
    Low,
    Medium,
    Quartile,
    High,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for GlintConfig {
    fn default() -> Self {
        Self {
            transfer: TransferConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            repetition_factor: 3,
            parity_group_size: 8,
            parity: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 250,
            error_correction: EcLevel::Medium,
        }
    }
}

impl TransferConfig {
    /// Static preconditions, checked once before a sequence is built.
    /// Returns the first offending knob by name.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be positive");
        }
        if self.repetition_factor == 0 {
            return Err("repetition_factor must be positive");
        }
        if self.parity_group_size == 0 {
            return Err("parity_group_size must be positive");
        }
        Ok(())
    }
}

impl DisplayConfig {
    /// Static preconditions, checked before the display clock is started.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.frame_interval_ms == 0 {
            return Err("frame_interval_ms must be positive");
        }
        Ok(())
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("glint")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl GlintConfig {
    /// Load config: file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))
        } else {
            Ok(GlintConfig::default())
        }
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("GLINT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&GlintConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }
}
