use std::num::NonZeroUsize;

use approx::assert_relative_eq;
use heat_solver_core::{Grid, SimParams, Simulator, simulate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SEED: u64 = 123;

fn threads(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn params(n: usize) -> SimParams {
    SimParams {
        num_intervals: n,
        ..SimParams::default()
    }
}

/// Random field in [background, background + 60).
fn random_grid(rng: &mut ChaCha8Rng, n: usize) -> Grid {
    let data = (0..n * n).map(|_| 20.0 + rng.gen_range(0.0..60.0)).collect();
    Grid::from_vec(n, data).unwrap()
}

#[cfg(feature = "parallel")]
fn assert_grids_close(a: &Grid, b: &Grid) {
    assert_eq!(a.n(), b.n());
    for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
        assert_relative_eq!(*x, *y, max_relative = 1e-12, epsilon = 1e-12);
    }
}

#[test]
fn random_fields_conserve_heat() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    for n in [1, 2, 3, 10, 17] {
        let g = random_grid(&mut rng, n);
        let before = g.sum();

        let mut sim = Simulator::from_grid(params(n), g, threads(1)).unwrap();
        sim.step();
        assert_relative_eq!(sim.grid().sum(), before, max_relative = 1e-12);

        sim.run(20);
        assert_relative_eq!(sim.grid().sum(), before, max_relative = 1e-10);
        assert_eq!(sim.steps_done(), 21);
    }
}

#[test]
fn uniform_fields_stay_put_at_any_size() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    for n in [1, 2, 5, 16] {
        let value = rng.gen_range(-50.0..150.0);
        let g = Grid::uniform(n, value).unwrap();
        let mut sim = Simulator::from_grid(params(n), g.clone(), threads(1)).unwrap();
        sim.run(5);
        assert_eq!(sim.grid(), &g);
    }
}

#[test]
fn random_hot_cells_lose_heat_to_neighbours() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let n = 12;
    let p = params(n);
    for _ in 0..10 {
        let i = rng.gen_range(1..n - 1);
        let j = rng.gen_range(1..n - 1);
        let mut g = Grid::uniform(n, p.background_temp).unwrap();
        g.set(i, j, p.background_temp + rng.gen_range(1.0..100.0));

        let mut sim = Simulator::from_grid(p, g.clone(), threads(1)).unwrap();
        sim.step();
        let out = sim.grid();
        assert!(out.get(i, j) < g.get(i, j));
        for (ni, nj) in [(i - 1, j), (i + 1, j), (i, j - 1), (i, j + 1)] {
            assert!(out.get(ni, nj) > p.background_temp);
        }
    }
}

#[cfg(feature = "parallel")]
#[test]
fn thread_count_does_not_change_the_result() {
    let p = params(20);
    let reference = simulate(50, threads(1), &p).unwrap();
    for t in [2, 3, 8] {
        let run = simulate(50, threads(t), &p).unwrap();
        assert_eq!(run.threads.get(), t);
        assert_grids_close(&reference.grid, &run.grid);
    }
}

#[cfg(feature = "parallel")]
#[test]
fn thread_count_does_not_change_random_fields() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let n = 23;
    let g = random_grid(&mut rng, n);

    let mut serial = Simulator::from_grid(params(n), g.clone(), threads(1)).unwrap();
    let mut pooled = Simulator::from_grid(params(n), g, threads(4)).unwrap();
    serial.run(30);
    pooled.run(30);
    assert_grids_close(serial.grid(), pooled.grid());
}

#[test]
fn reference_four_cell_scenario() {
    let p = SimParams {
        alpha_sq: 0.01,
        domain_side: 0.1,
        hot_region_side: 0.04,
        background_temp: 20.0,
        hot_region_temp: 50.0,
        time_step: 0.0000009,
        num_intervals: 4,
    };
    assert_eq!(p.hot_region_len(), 1);
    assert_eq!(p.hot_region_bounds(), (2, 2));

    let before = Simulator::new(p, threads(1)).unwrap().into_grid();
    let after = simulate(1, threads(1), &p).unwrap().grid;

    assert_eq!(before.get(2, 2), 50.0);
    assert_ne!(after.get(2, 2), before.get(2, 2));
    for (i, j) in [(1, 2), (3, 2), (2, 1), (2, 3)] {
        assert_ne!(after.get(i, j), before.get(i, j));
    }
    assert_eq!(after.get(0, 0), 20.0);
    assert_eq!(after.get(3, 3), 20.0);
}

#[test]
fn unstable_time_step_still_runs() {
    let p = SimParams {
        time_step: 0.01,
        ..params(8)
    };
    assert!(!p.is_stable());
    let run = simulate(200, threads(1), &p).unwrap();
    assert_eq!(run.steps, 200);
}
