//! Explicit finite-difference solver for 2D heat diffusion on a square
//! domain with reflecting edges, plus a gnuplot exporter for the result.

pub mod grid;
pub mod params;
pub mod render;
pub mod simulator;

pub use grid::{Grid, GridError};
pub use params::{ParamsError, SimParams};
pub use render::{RenderError, render_to_path, write_heatmap};
pub use simulator::{
    RunResult, SimError, Simulator, available_threads, parallel_enabled, simulate,
};
