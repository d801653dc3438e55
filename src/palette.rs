//! Maps escape counts onto the xterm 256-color palette, and writes the
//! control sequences that select those colors.
//!
//! Slots 16 through 231 of the palette form a 6x6x6 color cube; slot 16
//! is black.  Points that never escaped (and anything slow enough to
//! be clamped) are drawn black, and everything else walks the rest of
//! the cube.

use std::cmp;
use std::io::{self, Write};

/// The largest escape count that still gets a color of its own.
pub const MAX_SHADE: usize = 255;

/// First slot of the color cube; also black.
const CUBE_BASE: u8 = 16;
/// Slots in the cube after the black one.
const CUBE_COLORS: usize = 215;

/// The control sequence that returns the terminal to its default
/// colors.
pub const RESET: &[u8] = b"\x1b[0m";

/// Turn an escape count into a palette index.  Counts above
/// `MAX_SHADE` are treated exactly like `MAX_SHADE`.
pub fn color_index(iterations: usize) -> u8 {
    let shade = cmp::min(iterations, MAX_SHADE);
    if shade == MAX_SHADE {
        CUBE_BASE
    } else {
        CUBE_BASE + 1 + (shade % CUBE_COLORS) as u8
    }
}

/// Select the foreground color for whatever is written next.
pub fn set_color<W: Write + ?Sized>(out: &mut W, index: u8) -> io::Result<()> {
    write!(out, "\x1b[38;5;{}m", index)
}

/// Return the terminal to its default colors.  Harmless to repeat.
pub fn reset_color<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    out.write_all(RESET)?;
    out.flush()
}
