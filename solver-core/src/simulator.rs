use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::grid::{Grid, GridError};
use crate::params::{ParamsError, SimParams};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid simulation parameters: {0}")]
    InvalidParams(#[from] ParamsError),
    #[error("initial grid is {actual}x{actual}, parameters expect {expected}x{expected}")]
    GridSize { expected: usize, actual: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[cfg(feature = "parallel")]
    #[error("failed to build a pool of {threads} worker threads")]
    ThreadPool {
        threads: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
    #[error("{requested} threads requested but this build has no parallel backend")]
    ParallelUnavailable { requested: usize },
}

/// Final state of a finished run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub grid: Grid,
    /// Wall-clock time from initialisation to the end of the last step.
    pub elapsed: Duration,
    pub steps: usize,
    pub threads: NonZeroUsize,
}

/// Whether this build can run on more than one thread.
pub fn parallel_enabled() -> bool {
    cfg!(feature = "parallel")
}

/// Processor count of the host, 1 if it cannot be determined.
pub fn available_threads() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// Initialise a grid from `params`, run `steps` updates on `thread_count`
/// workers and return the final field with the elapsed time.
pub fn simulate(
    steps: usize,
    thread_count: NonZeroUsize,
    params: &SimParams,
) -> Result<RunResult, SimError> {
    let start = Instant::now();

    let mut sim = Simulator::new(*params, thread_count)?;
    sim.run(steps);

    let elapsed = start.elapsed();
    info!(steps, threads = thread_count.get(), ?elapsed, "Done");

    Ok(RunResult {
        grid: sim.into_grid(),
        elapsed,
        steps,
        threads: thread_count,
    })
}

enum Backend {
    Serial,
    #[cfg(feature = "parallel")]
    Pool(rayon::ThreadPool),
}

impl Backend {
    fn new(threads: NonZeroUsize) -> Result<Backend, SimError> {
        if threads.get() == 1 {
            Ok(Backend::Serial)
        } else {
            Backend::pool(threads)
        }
    }

    #[cfg(feature = "parallel")]
    fn pool(threads: NonZeroUsize) -> Result<Backend, SimError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .build()
            .map_err(|source| SimError::ThreadPool {
                threads: threads.get(),
                source,
            })?;
        Ok(Backend::Pool(pool))
    }

    #[cfg(not(feature = "parallel"))]
    fn pool(threads: NonZeroUsize) -> Result<Backend, SimError> {
        Err(SimError::ParallelUnavailable {
            requested: threads.get(),
        })
    }

    /// Run `f(i, row_i)` over every row of `dst`; returns once all rows
    /// are written.
    fn for_each_row<F>(&self, dst: &mut [f64], n: usize, f: F)
    where
        F: Fn(usize, &mut [f64]) + Sync + Send,
    {
        match self {
            Backend::Serial => dst
                .chunks_mut(n)
                .enumerate()
                .for_each(|(i, row)| f(i, row)),
            #[cfg(feature = "parallel")]
            Backend::Pool(pool) => pool.install(|| {
                dst.par_chunks_mut(n)
                    .enumerate()
                    .for_each(|(i, row)| f(i, row))
            }),
        }
    }
}

/// Per-run constants of the 5-point update.
#[derive(Clone, Copy)]
struct Stencil {
    alpha_sq: f64,
    dx2: f64,
    dy2: f64,
    time_step: f64,
}

impl Stencil {
    fn new(p: &SimParams) -> Stencil {
        let dx = p.dx();
        let dy = p.dy();
        Stencil {
            alpha_sq: p.alpha_sq,
            dx2: dx * dx,
            dy2: dy * dy,
            time_step: p.time_step,
        }
    }

    /// Write row `i` of the next generation from the full prior grid `src`.
    /// Neighbours outside the grid take the centre value (zero flux).
    fn update_row(&self, src: &[f64], n: usize, i: usize, dst: &mut [f64]) {
        let row = &src[i * n..(i + 1) * n];
        let prev = if i == 0 { row } else { &src[(i - 1) * n..i * n] };
        let next = if i + 1 == n { row } else { &src[(i + 1) * n..(i + 2) * n] };

        for j in 0..n {
            let center = row[j];
            let left = prev[j];
            let right = next[j];
            let top = if j == 0 { center } else { row[j - 1] };
            let bottom = if j + 1 == n { center } else { row[j + 1] };

            let rate_x = self.alpha_sq * ((left + right - 2.0 * center) / self.dx2);
            let rate_y = self.alpha_sq * ((top + bottom - 2.0 * center) / self.dy2);
            dst[j] = center + (rate_x + rate_y) * self.time_step;
        }
    }
}

/// Explicit FTCS heat solver over an N x N grid with reflecting edges.
///
/// Holds two buffers: every step reads `field` and writes `next` in full,
/// then swaps them.
pub struct Simulator {
    params: SimParams,
    stencil: Stencil,
    threads: NonZeroUsize,
    backend: Backend,
    field: Grid,
    next: Grid,
    steps_done: usize,
}

impl Simulator {
    /// Build a simulator whose field holds the hot-square initial condition.
    pub fn new(params: SimParams, threads: NonZeroUsize) -> Result<Simulator, SimError> {
        params.validate()?;
        let backend = Backend::new(threads)?;

        let n = params.num_intervals;
        // Zero-allocated, so the row pass below is the only write.
        let mut field = Grid::uniform(n, 0.0)?;
        let (lower, upper) = params.hot_region_bounds();
        let hot = lower..=upper;
        backend.for_each_row(field.as_mut_slice(), n, |i, row| {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = if hot.contains(&i) && hot.contains(&j) {
                    params.hot_region_temp
                } else {
                    params.background_temp
                };
            }
        });
        debug!(n, lower, upper, "initialised hot square");

        Ok(Simulator {
            stencil: Stencil::new(&params),
            next: Grid::uniform(n, 0.0)?,
            params,
            threads,
            backend,
            field,
            steps_done: 0,
        })
    }

    /// Build a simulator that starts from a caller-supplied field. The
    /// field must be `num_intervals` on a side.
    pub fn from_grid(
        params: SimParams,
        grid: Grid,
        threads: NonZeroUsize,
    ) -> Result<Simulator, SimError> {
        params.validate()?;
        if grid.n() != params.num_intervals {
            return Err(SimError::GridSize {
                expected: params.num_intervals,
                actual: grid.n(),
            });
        }
        let backend = Backend::new(threads)?;

        Ok(Simulator {
            stencil: Stencil::new(&params),
            next: Grid::uniform(grid.n(), 0.0)?,
            params,
            threads,
            backend,
            field: grid,
            steps_done: 0,
        })
    }

    // ---- Accessors ----

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn threads(&self) -> NonZeroUsize {
        self.threads
    }

    pub fn grid(&self) -> &Grid {
        &self.field
    }

    pub fn steps_done(&self) -> usize {
        self.steps_done
    }

    pub fn into_grid(self) -> Grid {
        self.field
    }

    // ---- Stepping ----

    /// Advance one generation.
    pub fn step(&mut self) {
        let n = self.field.n();
        let stencil = self.stencil;
        let src = self.field.as_slice();
        self.backend
            .for_each_row(self.next.as_mut_slice(), n, |i, row| {
                stencil.update_row(src, n, i, row)
            });
        self.swap_buffers();
    }

    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            info!("Computing step {}", self.steps_done);
            self.step();
        }
    }

    fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.field, &mut self.next);
        self.steps_done += 1;
    }
}
