//! Gnuplot heat-map export of a finished temperature field.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::grid::Grid;

/// Name of the inline data block inside the script.
pub const DATA_BLOCK: &str = "$map2";

// Tick positions and labels assume the reference 500 x 500 grid over 0.1 m.
const TICKS: &str = "('0' 0, '0.02' 100, '0.04' 200, '0.06' 300, '0.08' 400, '0.1' 499)";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write heat map to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Write the gnuplot script for `grid` to `out`: axis setup, a
/// `row column value` data block in row-major order (blank line between
/// rows) and an image plot of that block.
pub fn write_heatmap<W: Write>(out: &mut W, grid: &Grid) -> io::Result<()> {
    writeln!(out, "set ylabel 'y (m)'")?;
    writeln!(out, "set xlabel 'x (m)'")?;
    writeln!(out, "set xtics {TICKS}")?;
    writeln!(out, "set ytics {TICKS}")?;
    writeln!(out, "{DATA_BLOCK} << EOD")?;
    for (i, row) in grid.rows().enumerate() {
        for (j, value) in row.iter().enumerate() {
            writeln!(out, "{i} {j} {value:.6}")?;
        }
        writeln!(out)?;
    }
    writeln!(out, "EOD")?;
    writeln!(out, "plot '{DATA_BLOCK}' using 2:1:3 with image")?;
    write!(out, "pause -1 'Hit any key to continue'")?;
    Ok(())
}

/// Render `grid` to `path`.
///
/// The script is built in memory, written to a uniquely named temporary
/// file next to `path` and then persisted over it; on error the
/// destination is left as it was and the temporary file is removed.
pub fn render_to_path(path: &Path, grid: &Grid) -> Result<(), RenderError> {
    let io_err = |source: io::Error| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut script = Vec::with_capacity(grid.n() * grid.n() * 24);
    write_heatmap(&mut script, grid).map_err(io_err)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(&script).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(path = %path.display(), bytes = script.len(), "wrote heat map");
    Ok(())
}
