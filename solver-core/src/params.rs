use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("num_intervals must be >= 1")]
    NoIntervals,
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("{name} must be > 0, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be >= 0, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("hot_region_side {hot} must lie within [0, domain_side = {domain}]")]
    HotRegionTooLarge { hot: f64, domain: f64 },
}

/// Physical and discretisation parameters of one run.
///
/// Missing fields fall back to the reference configuration when
/// deserialised, so a parameter file only needs the values it changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimParams {
    /// Diffusion coefficient (alpha squared).
    pub alpha_sq: f64,
    /// Side length of the square domain.
    pub domain_side: f64,
    /// Side length of the centred hot square at t = 0.
    pub hot_region_side: f64,
    pub background_temp: f64,
    pub hot_region_temp: f64,
    pub time_step: f64,
    /// Grid resolution N (the grid is N x N).
    pub num_intervals: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            alpha_sq: 0.01,
            domain_side: 0.1,
            hot_region_side: 0.04,
            background_temp: 20.0,
            hot_region_temp: 50.0,
            time_step: 0.0000009,
            num_intervals: 500,
        }
    }
}

impl SimParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.num_intervals == 0 {
            return Err(ParamsError::NoIntervals);
        }

        for (name, value) in [
            ("alpha_sq", self.alpha_sq),
            ("domain_side", self.domain_side),
            ("hot_region_side", self.hot_region_side),
            ("background_temp", self.background_temp),
            ("hot_region_temp", self.hot_region_temp),
            ("time_step", self.time_step),
        ] {
            if !value.is_finite() {
                return Err(ParamsError::NotFinite { name, value });
            }
        }

        if self.domain_side <= 0.0 {
            return Err(ParamsError::NotPositive {
                name: "domain_side",
                value: self.domain_side,
            });
        }
        for (name, value) in [("alpha_sq", self.alpha_sq), ("time_step", self.time_step)] {
            if value < 0.0 {
                return Err(ParamsError::Negative { name, value });
            }
        }
        if self.hot_region_side < 0.0 || self.hot_region_side > self.domain_side {
            return Err(ParamsError::HotRegionTooLarge {
                hot: self.hot_region_side,
                domain: self.domain_side,
            });
        }

        Ok(())
    }

    // ---- Derived quantities ----

    pub fn dx(&self) -> f64 {
        self.domain_side / self.num_intervals as f64
    }

    pub fn dy(&self) -> f64 {
        self.dx()
    }

    /// Hot square side in cells, truncated.
    pub fn hot_region_len(&self) -> usize {
        (self.num_intervals as f64 * self.hot_region_side / self.domain_side) as usize
    }

    /// Inclusive `(lower, upper)` cell bounds of the hot square on both axes.
    pub fn hot_region_bounds(&self) -> (usize, usize) {
        let half_n = self.num_intervals / 2;
        let half_len = self.hot_region_len() / 2;
        (half_n.saturating_sub(half_len), half_n + half_len)
    }

    /// `alpha_sq * dt * (2/dx^2 + 2/dy^2)`; the FTCS scheme is stable while
    /// this stays <= 1.
    pub fn stability_number(&self) -> f64 {
        let dx = self.dx();
        let dy = self.dy();
        self.alpha_sq * self.time_step * (2.0 / (dx * dx) + 2.0 / (dy * dy))
    }

    pub fn is_stable(&self) -> bool {
        self.stability_number() <= 1.0
    }
}
