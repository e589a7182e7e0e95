use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid side must be >= 1")]
    Empty,
    #[error("expected {expected} values for an {n}x{n} grid, got {actual}")]
    Length {
        n: usize,
        expected: usize,
        actual: usize,
    },
}

/// Square temperature field, stored row-major: cell `(i, j)` is row `i`,
/// column `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    n: usize,
    data: Vec<f64>,
}

impl Grid {
    pub fn uniform(n: usize, value: f64) -> Result<Grid, GridError> {
        if n == 0 {
            return Err(GridError::Empty);
        }
        Ok(Grid {
            n,
            data: vec![value; n * n],
        })
    }

    pub fn from_vec(n: usize, data: Vec<f64>) -> Result<Grid, GridError> {
        if n == 0 {
            return Err(GridError::Empty);
        }
        if data.len() != n * n {
            return Err(GridError::Length {
                n,
                expected: n * n,
                actual: data.len(),
            });
        }
        Ok(Grid { n, data })
    }

    // ---- Accessors ----

    pub fn n(&self) -> usize {
        self.n
    }

    /// Panics if `(i, j)` is outside the grid.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "cell ({i}, {j}) outside {0}x{0} grid", self.n);
        self.data[i * self.n + j]
    }

    /// Panics if `(i, j)` is outside the grid.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(i < self.n && j < self.n, "cell ({i}, {j}) outside {0}x{0} grid", self.n);
        self.data[i * self.n + j] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n)
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}
