// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rows are the unit of work.  Computing one is pure and can happen on
//! any thread at any time; writing one has to wait its turn.

use std::io::{self, Write};

use escape::iterations;
use grid::Grid;
use palette::{color_index, set_color};

/// The character drawn for every cell.
pub const POINT: u8 = b'@';

/// Anything that can produce rows of palette indices for a pool to
/// draw.  Implementations must be safe to call from many threads at
/// once, since every worker calls `render_row` concurrently.
pub trait RowSource: Sync {
    /// How many rows there are, top to bottom.
    fn rows(&self) -> usize;

    /// The palette indices for row `row`, left to right.
    fn render_row(&self, row: usize) -> Vec<u8>;
}

/// Takes a grid and a limit (the number of iterations to conduct
/// per-point) and renders the Mandelbrot set one row at a time.
/// Once built, this object is never mutated.
#[derive(Copy, Clone, Debug)]
pub struct Renderer {
    grid: Grid,
    limit: usize,
}

impl Renderer {
    /// Requires the grid to draw and the iteration budget for each
    /// point.
    pub fn new(grid: Grid, limit: usize) -> Self {
        Renderer { grid, limit }
    }
}

impl RowSource for Renderer {
    fn rows(&self) -> usize {
        self.grid.height()
    }

    fn render_row(&self, row: usize) -> Vec<u8> {
        (0..self.grid.width())
            .map(|column| color_index(iterations(self.grid.cell_to_point(column, row), self.limit)))
            .collect()
    }
}

/// Write one row: a color selection and a point for every cell,
/// followed by a newline.  `write_all` turns a short write into an
/// error, so any row that comes back `Ok` made it out whole.
pub fn write_row<W: Write + ?Sized>(out: &mut W, colors: &[u8]) -> io::Result<()> {
    for &color in colors {
        set_color(out, color)?;
        out.write_all(&[POINT])?;
    }
    out.write_all(b"\n")?;
    out.flush()
}
