//! Terminal output — half-block rendering of a symbol matrix.
//!
//! Two matrix rows per text line keeps the symbol roughly square on screen.
//! A receiver scans the physical screen, so contrast matters more than
//! aesthetics: the glyphs are inverted (terminal text is usually
//! light-on-dark, the symbol needs dark-on-light) and a quiet-zone border of
//! light modules surrounds the symbol.

use glint_engine::Matrix;

/// Quiet zone width in modules, per symbol spec.
const QUIET_ZONE: usize = 4;

pub fn clear() {
    print!("\x1b[2J\x1b[H");
}

pub fn draw_matrix(matrix: &Matrix) {
    print!("{}", matrix_to_string(matrix));
}

fn matrix_to_string(matrix: &Matrix) -> String {
    let side = matrix.width + 2 * QUIET_ZONE;
    // true = dark, with the quiet zone light.
    let module = |x: usize, y: usize| -> bool {
        let in_symbol = (QUIET_ZONE..QUIET_ZONE + matrix.width).contains(&x)
            && (QUIET_ZONE..QUIET_ZONE + matrix.width).contains(&y);
        in_symbol && matrix.get(x - QUIET_ZONE, y - QUIET_ZONE)
    };

    let mut out = String::with_capacity((side + 1) * side.div_ceil(2));
    for y in (0..side).step_by(2) {
        for x in 0..side {
            let top = module(x, y);
            let bottom = y + 1 < side && module(x, y + 1);
            out.push(match (top, bottom) {
                (true, true) => ' ',
                (true, false) => '\u{2584}',  // lower half block
                (false, true) => '\u{2580}',  // upper half block
                (false, false) => '\u{2588}', // full block
            });
        }
        out.push('\n');
    }
    out
}
