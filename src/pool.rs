//! The worker pool: spawns one scoped thread per ring slot, lets each
//! compute its rows in parallel, and funnels their output through the
//! dispatch ring so it reaches the sink in row order.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use crossbeam;
use crossbeam::thread::ScopedJoinHandle;

use errors::{Error, Result};
use palette::reset_color;
use ring::DispatchRing;
use row::{write_row, RowSource};

/// What a finished run did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderReport {
    /// Rows written to the sink.
    pub rows: usize,
    /// Threads that took part.
    pub workers: usize,
    /// The slot left armed after the last row; `rows % workers` on a
    /// clean run.  Nobody waits on it.
    pub final_slot: Option<usize>,
}

/// A fixed number of workers, ready to render.
#[derive(Copy, Clone, Debug)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// A pool of `workers` threads.  Zero is refused.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::NoWorkers);
        }
        Ok(WorkerPool { workers })
    }

    /// How many threads `run` will start.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Draw every row of `source` to `sink`, top to bottom, then reset
    /// the terminal colors.  Worker `w` computes rows `w`, `w + n`,
    /// `w + 2n`, ... and waits for its turn on the ring before writing
    /// each one.
    ///
    /// All workers are joined before this returns, whatever happens.
    /// Failures are stamped as they happen and the earliest real one
    /// wins; workers that were merely cancelled because of it are not
    /// reported.  If `interrupted` is raised the worker holding the turn
    /// stops the ring and the run ends with `Error::Interrupted`, as it
    /// does when the flag goes up after the last row is out.  The color
    /// reset is written exactly once, on success and (best effort) on
    /// failure alike.
    pub fn run<S, W>(&self, source: &S, sink: W, interrupted: &AtomicBool) -> Result<RenderReport>
    where
        S: RowSource,
        W: Write + Send,
    {
        let workers = self.workers;
        let rows = source.rows();
        if workers > rows {
            warn!(
                "{} workers for {} rows; {} will have nothing to do",
                workers,
                rows,
                workers - rows
            );
        }
        info!("rendering {} rows with {} workers", rows, workers);

        let clock = AtomicUsize::new(0);
        let mut stamps: Vec<AtomicUsize> = Vec::new();
        if stamps.try_reserve_exact(workers).is_err() {
            return Err(Error::OutOfMemory(workers, "failure stamps"));
        }
        stamps.extend((0..workers).map(|_| AtomicUsize::new(UNSTAMPED)));

        let ring = DispatchRing::new(workers, sink)?;
        let outcome = crossbeam::scope(|scope| {
            let mut handles: Vec<ScopedJoinHandle<Result<usize>>> = Vec::new();
            if handles.try_reserve_exact(workers).is_err() {
                return Err(Error::OutOfMemory(workers, "worker handles"));
            }

            let mut first: Option<(usize, Error)> = None;
            for id in 0..workers {
                let watch = Watch {
                    ring: &ring,
                    clock: &clock,
                    stamp: &stamps[id],
                };
                let spawned = scope
                    .builder()
                    .name(format!("mandel-{}", id))
                    .spawn(move |_| {
                        let result = work(id, workers, source, watch.ring, interrupted);
                        if let Err(ref e) = result {
                            watch.fail();
                            if !e.is_fallout() {
                                error!("worker {} failed: {}", id, e);
                            }
                        }
                        result
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        error!("could not spawn worker {}: {}", id, e);
                        // Workers already running would wait forever
                        // on rows the missing one owns.
                        let stamp = clock.fetch_add(1, Ordering::SeqCst);
                        ring.cancel();
                        keep_first(&mut first, stamp, Error::Spawn(id, e));
                        break;
                    }
                }
            }

            let mut written = 0;
            for (id, handle) in handles.into_iter().enumerate() {
                let joined = handle.join();
                let stamp = stamps[id].load(Ordering::SeqCst);
                match joined {
                    Ok(Ok(count)) => written += count,
                    Ok(Err(e)) => keep_first(&mut first, stamp, e),
                    Err(_) => keep_first(&mut first, stamp, Error::WorkerPanicked(id)),
                }
            }

            match first {
                Some((_, e)) => Err(e),
                None => Ok(written),
            }
        })
        .unwrap_or_else(|_| Err(Error::Join));

        let final_slot = ring.armed_slot();
        let reset = match ring.into_sink() {
            Some(mut sink) => reset_color(&mut sink),
            None => {
                warn!("the output sink was lost; the terminal colors were not reset");
                Ok(())
            }
        };

        match outcome {
            Ok(written) => {
                reset.map_err(Error::Reset)?;
                // Too late to stop anything, but the caller still has to
                // hear about it.
                if interrupted.load(Ordering::SeqCst) {
                    info!("interrupted after all {} rows were written", written);
                    return Err(Error::Interrupted);
                }
                info!("rendered {} rows", written);
                Ok(RenderReport {
                    rows: written,
                    workers,
                    final_slot,
                })
            }
            Err(e) => {
                if let Err(reset_err) = reset {
                    warn!("could not reset the terminal after failure: {}", reset_err);
                }
                Err(e)
            }
        }
    }
}

/// The stamp of a worker that never failed.
const UNSTAMPED: usize = usize::max_value();

/// One worker's view of the shared failure bookkeeping.  Failing takes
/// the next tick of the clock and then cancels the ring; dropping the
/// watch while unwinding counts as failing, so a panic in the middle
/// of computing a row can't strand the workers behind it.
struct Watch<'a, W: 'a> {
    ring: &'a DispatchRing<W>,
    clock: &'a AtomicUsize,
    stamp: &'a AtomicUsize,
}

impl<'a, W> Watch<'a, W> {
    fn fail(&self) {
        self.stamp.store(self.clock.fetch_add(1, Ordering::SeqCst), Ordering::SeqCst);
        self.ring.cancel();
    }
}

impl<'a, W> Drop for Watch<'a, W> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.fail();
        }
    }
}

/// The life of one worker: compute a row, wait for its turn, write
/// it, pass the turn on.  Returns the number of rows written.
fn work<S, W>(
    id: usize,
    workers: usize,
    source: &S,
    ring: &DispatchRing<W>,
    interrupted: &AtomicBool,
) -> Result<usize>
where
    S: RowSource,
    W: Write,
{
    let mut written = 0;
    for row in (id..source.rows()).step_by(workers) {
        let colors = source.render_row(row);
        let mut turn = ring.await_turn(id, row)?;
        // Returning with the turn unreleased cancels the ring.
        if interrupted.load(Ordering::SeqCst) {
            return Err(Error::Interrupted);
        }
        write_row(turn.sink(), &colors).map_err(|e| Error::Write(row, e))?;
        turn.release();
        debug!("worker {} wrote row {}", id, row);
        written += 1;
    }
    Ok(written)
}

/// Real failures beat cancellations; between two of the same kind the
/// earlier stamp wins.
fn keep_first(first: &mut Option<(usize, Error)>, stamp: usize, err: Error) {
    let replace = match *first {
        None => true,
        Some((held_stamp, ref held)) => match (held.is_fallout(), err.is_fallout()) {
            (true, false) => true,
            (false, true) => false,
            _ => stamp < held_stamp,
        },
    };
    if replace {
        *first = Some((stamp, err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct Numbered {
        rows: usize,
    }

    impl RowSource for Numbered {
        fn rows(&self) -> usize {
            self.rows
        }

        fn render_row(&self, row: usize) -> Vec<u8> {
            vec![row as u8]
        }
    }

    #[test]
    fn zero_workers_are_refused() {
        assert!(WorkerPool::new(0).is_err());
    }

    #[test]
    fn a_clean_run_reports_its_rows() {
        let calm = AtomicBool::new(false);
        let report = WorkerPool::new(3)
            .unwrap()
            .run(&Numbered { rows: 7 }, io::sink(), &calm)
            .unwrap();
        assert_eq!(
            report,
            RenderReport {
                rows: 7,
                workers: 3,
                final_slot: Some(1),
            }
        );
    }

    #[test]
    fn real_failures_beat_cancellations() {
        let mut first = None;
        keep_first(&mut first, 0, Error::Cancelled);
        keep_first(&mut first, 3, Error::Interrupted);
        keep_first(&mut first, 1, Error::Cancelled);
        match first {
            Some((3, Error::Interrupted)) => {}
            other => panic!("kept {:?}", other),
        }
    }

    #[test]
    fn the_earliest_real_failure_wins_whatever_the_join_order() {
        let mut first = None;
        keep_first(&mut first, 5, Error::WorkerPanicked(0));
        keep_first(&mut first, 2, Error::Interrupted);
        keep_first(&mut first, 4, Error::WorkerPanicked(3));
        match first {
            Some((2, Error::Interrupted)) => {}
            other => panic!("kept {:?}", other),
        }
    }

    #[test]
    fn the_pool_is_as_big_as_asked() {
        assert_eq!(WorkerPool::new(5).unwrap().workers(), 5);
    }

    #[test]
    fn a_late_interrupt_is_still_reported() {
        let raised = AtomicBool::new(true);
        match WorkerPool::new(2).unwrap().run(&Numbered { rows: 0 }, io::sink(), &raised) {
            Err(Error::Interrupted) => {}
            other => panic!("expected an interrupt, got {:?}", other),
        }
    }
}
