//! Everything that can stop a render.  None of these are retried: a
//! half-drawn fractal has no sensible way to resume, so the first one
//! to happen ends the run.

use std::io;

/// The failures a render can report.
#[derive(Debug, Fail)]
pub enum Error {
    /// The integral plane has no cells in it.
    #[fail(display = "the grid must be at least 1x1, got {}x{}", _0, _1)]
    EmptyGrid(usize, usize),

    /// The corners of the complex plane are in the wrong order.
    #[fail(display = "the left lower corner is not below and to the left of the right upper corner")]
    InvertedPlane,

    /// A pool was asked to run with no workers at all.
    #[fail(display = "at least one worker is required")]
    NoWorkers,

    /// The per-worker bookkeeping could not be allocated.
    #[fail(display = "out of memory allocating {} {}", _0, _1)]
    OutOfMemory(usize, &'static str),

    /// The operating system refused to start a worker.
    #[fail(display = "could not spawn worker {}: {}", _0, _1)]
    Spawn(usize, #[cause] io::Error),

    /// A worker died before it could be joined cleanly.
    #[fail(display = "worker {} panicked", _0)]
    WorkerPanicked(usize),

    /// The pool could not account for all of its workers.
    #[fail(display = "could not join the worker threads")]
    Join,

    /// Writing a row to the output failed part way through.
    #[fail(display = "could not write row {}: {}", _0, _1)]
    Write(usize, #[cause] io::Error),

    /// Every row went out but the terminal colors could not be reset.
    #[fail(display = "could not reset the terminal: {}", _0)]
    Reset(#[cause] io::Error),

    /// Another worker failed and the ring was torn down underneath us.
    #[fail(display = "the render was cancelled")]
    Cancelled,

    /// The user asked us to stop.
    #[fail(display = "the render was interrupted")]
    Interrupted,
}

impl Error {
    /// Cancellation is always a consequence of some other failure,
    /// so when a pool collects errors from its workers it reports the
    /// first one that isn't merely fallout.
    pub fn is_fallout(&self) -> bool {
        match *self {
            Error::Cancelled => true,
            _ => false,
        }
    }
}

/// Shorthand used throughout the crate.
pub type Result<T> = ::std::result::Result<T, Error>;
