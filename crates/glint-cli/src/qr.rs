//! QR implementation of the engine's symbol-rendering capability.

use glint_core::config::EcLevel;
use glint_engine::{Matrix, RenderError, SymbolRenderer};
use qrcode::{Color, QrCode};

/// Renders frames with the `qrcode` crate, always in byte mode.
pub struct QrSymbolRenderer;

fn qr_level(ec: EcLevel) -> qrcode::EcLevel {
    match ec {
        EcLevel::Low => qrcode::EcLevel::L,
        EcLevel::Medium => qrcode::EcLevel::M,
        EcLevel::Quartile => qrcode::EcLevel::Q,
        EcLevel::High => qrcode::EcLevel::H,
    }
}

impl SymbolRenderer for QrSymbolRenderer {
    /// Byte-mode capacity of a version 40 symbol, per level.
    fn capacity(&self, ec: EcLevel) -> usize {
        match ec {
            EcLevel::Low => 2953,
            EcLevel::Medium => 2331,
            EcLevel::Quartile => 1663,
            EcLevel::High => 1273,
        }
    }

    fn render(&self, bytes: &[u8], ec: EcLevel) -> Result<Matrix, RenderError> {
        let code = QrCode::with_error_correction_level(bytes, qr_level(ec))
            .map_err(|e| RenderError::Symbol(e.to_string()))?;
        Ok(Matrix {
            width: code.width(),
            modules: code
                .to_colors()
                .into_iter()
                .map(|c| c == Color::Dark)
                .collect(),
        })
    }
}
