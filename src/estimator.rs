//! Per-orbital sampling parameters: radial bound, density envelope and Z_eff

use std::f64::consts::PI;

use crate::config::{BoundStrategy, SamplerConfig};
use crate::physics::{radial_wavefunction, real_spherical_harmonic, QuantumNumbers};

/// Angular lattice resolution: θ in [0, π] and φ in [0, 2π) are both
/// stepped by π / ANGULAR_STEPS (2°).
const ANGULAR_STEPS: usize = 90;

/// Envelope floor so acceptance never divides by zero.
const MIN_DENSITY_BOUND: f64 = 1e-30;

/// Sampling radius: deliberately loose so the rejection sampler never clips
/// the outer lobes. Independent of l.
pub fn max_radius(n: u32, _l: u32) -> f64 {
    (n as f64).powi(2) * 3.0 + 5.0
}

/// Empirical shielding approximation, identical for every orbital of a shell.
pub fn effective_nuclear_charge(n: u32) -> f64 {
    (n as f64 * 0.3).max(1.0)
}

/// Tabulated density envelope for the common valence orbitals, falling back
/// to `0.01 / n²` for anything unlisted.
pub fn max_probability_density(n: u32, l: u32, m_l: i32) -> f64 {
    match (n, l, m_l) {
        (1, 0, 0) => 0.32,
        (2, 0, 0) => 0.05,
        (2, 1, 0) | (2, 1, 1) | (2, 1, -1) => 0.02,
        (3, 0, 0) => 0.015,
        (3, 1, 0) => 0.008,
        (3, 2, 0) => 0.004,
        (3, 2, 1) | (3, 2, 2) => 0.003,
        (4, 0, 0) => 0.006,
        (4, 1, 0) => 0.003,
        (4, 2, 0) => 0.002,
        (4, 3, 0) => 0.001,
        _ => 0.01 / (n.max(1) * n.max(1)) as f64,
    }
}

/// Density envelope from a grid search, scaled by `safety_margin`.
///
/// |ψ|² = R(r)² · Y(θ, φ)², so the two factors are maximized separately and
/// the product bounds every point of the joint grid. Radii are
/// `search_steps + 1` linear steps over `[0, max_radius]` (r = 0 included,
/// where s orbitals peak) plus the same number of quadratically spaced steps
/// that resolve the narrow inner lobes of high-n orbitals. Directions form a
/// 2° θ/φ lattice, which lands on the off-axis lobes of the d and f shapes.
pub fn grid_search_max_probability(
    qn: QuantumNumbers,
    z_eff: f64,
    max_radius: f64,
    search_steps: usize,
    safety_margin: f64,
) -> f64 {
    let steps = search_steps.max(1);
    let linear = (0..=steps).map(|i| max_radius * i as f64 / steps as f64);
    let quadratic = (1..=steps).map(|i| {
        let t = i as f64 / steps as f64;
        max_radius * t * t
    });
    let radial_max = linear
        .chain(quadratic)
        .map(|r| radial_wavefunction(r, qn.n, qn.l, z_eff).powi(2))
        .fold(0.0_f64, f64::max);

    let angle = PI / ANGULAR_STEPS as f64;
    let mut angular_max = 0.0_f64;
    for i in 0..=ANGULAR_STEPS {
        let theta = angle * i as f64;
        for j in 0..2 * ANGULAR_STEPS {
            let phi = angle * j as f64;
            angular_max =
                angular_max.max(real_spherical_harmonic(theta, phi, qn.l, qn.m_l).powi(2));
        }
    }

    (radial_max * angular_max * safety_margin).max(MIN_DENSITY_BOUND)
}

/// Everything the rejection sampler needs for one orbital.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParameters {
    pub max_radius: f64,
    pub max_probability_density: f64,
    pub effective_nuclear_charge: f64,
}

impl SamplingParameters {
    pub fn table(qn: QuantumNumbers) -> Self {
        SamplingParameters {
            max_radius: max_radius(qn.n, qn.l),
            max_probability_density: max_probability_density(qn.n, qn.l, qn.m_l),
            effective_nuclear_charge: effective_nuclear_charge(qn.n),
        }
    }

    pub fn grid_search(qn: QuantumNumbers, search_steps: usize, safety_margin: f64) -> Self {
        let z_eff = effective_nuclear_charge(qn.n);
        let r_max = max_radius(qn.n, qn.l);
        SamplingParameters {
            max_radius: r_max,
            max_probability_density: grid_search_max_probability(
                qn,
                z_eff,
                r_max,
                search_steps,
                safety_margin,
            ),
            effective_nuclear_charge: z_eff,
        }
    }

    pub fn for_config(qn: QuantumNumbers, config: &SamplerConfig) -> Self {
        match config.bound {
            BoundStrategy::Table => Self::table(qn),
            BoundStrategy::GridSearch => {
                Self::grid_search(qn, config.search_steps, config.safety_margin())
            }
        }
    }
}
