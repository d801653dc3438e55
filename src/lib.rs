#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Terminal Mandelbrot renderer
//!
//! Draws the Mandelbrot set on a 256-color terminal, one character per
//! point, using as many threads as you like.  The Mandelbrot takes a
//! point on the complex plane and repeatedly squares it and adds the
//! original point back, measuring how quickly that number goes to
//! infinity.  That "velocity" picks the color of the character.
//!
//! The work is split by rows: with `n` workers, worker `w` computes
//! rows `w`, `w + n`, `w + 2n` and so on.  Computing is done whenever
//! a worker gets to it, but the terminal has to see the rows top to
//! bottom, so the workers pass the output between themselves around a
//! ring (see `ring`) and each one writes only when the row above it is
//! already out.

extern crate crossbeam;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate nix;
extern crate num;

pub mod errors;
pub mod escape;
pub mod grid;
pub mod palette;
pub mod pool;
pub mod ring;
pub mod row;
pub mod signals;

pub use errors::{Error, Result};
pub use grid::Grid;
pub use pool::{RenderReport, WorkerPool};
pub use ring::{DispatchRing, Turn};
pub use row::{write_row, Renderer, RowSource};
