//! Rejection sampling of |ψ|² into normalized point clouds

use std::f64::consts::PI;

use log::{debug, warn};
use rand::Rng;

use crate::config::SamplerConfig;
use crate::estimator::SamplingParameters;
use crate::physics::{sign_from_value, spherical_to_cartesian, wave_function, QuantumNumbers};
use crate::valence::OrbitalDescriptor;

/// Accepted samples of one orbital, normalized into the viewing sphere.
///
/// `positions` and `signs` are parallel and both `count` long. `max_extent`
/// is the largest radius before normalization; `requested` is what the
/// caller asked for, so `count < requested` means the attempt cap was hit.
/// `attempts` is the number of candidates drawn, 0 for loaded clouds.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalPointCloud {
    pub positions: Vec<[f32; 3]>,
    pub signs: Vec<i8>,
    pub count: usize,
    pub max_extent: f64,
    pub requested: usize,
    pub attempts: usize,
}

impl OrbitalPointCloud {
    pub fn empty(requested: usize) -> Self {
        OrbitalPointCloud {
            positions: Vec::new(),
            signs: Vec::new(),
            count: 0,
            max_extent: 0.0,
            requested,
            attempts: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_complete(&self) -> bool {
        self.count >= self.requested
    }

    /// Positions as a flat `[x0, y0, z0, x1, ...]` buffer.
    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions.iter().flatten().copied().collect()
    }

    /// Normalized distance of each point from the nucleus.
    pub fn radii(&self) -> impl Iterator<Item = f64> + '_ {
        self.positions.iter().map(|p| {
            let [x, y, z] = p.map(f64::from);
            (x * x + y * y + z * z).sqrt()
        })
    }
}

/// Diagnostics of one generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplingStats {
    pub attempts: usize,
    pub accepted: usize,
    /// Candidates whose density exceeded the envelope; non-zero means the
    /// cloud under-represents its densest region.
    pub bound_violations: usize,
    pub max_probability: f64,
}

/// Monte-Carlo point cloud generator.
///
/// Candidates are drawn uniformly in the sampling ball (cube-root radius,
/// uniform direction) and accepted with probability `|ψ|² / envelope`.
/// The random source is supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct OrbitalSampler {
    config: SamplerConfig,
}

impl OrbitalSampler {
    pub fn new(config: SamplerConfig) -> Self {
        OrbitalSampler { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        qn: QuantumNumbers,
        point_count: usize,
        rng: &mut R,
    ) -> OrbitalPointCloud {
        self.generate_with_stats(qn, point_count, rng).0
    }

    pub fn generate_descriptor<R: Rng + ?Sized>(
        &self,
        descriptor: &OrbitalDescriptor,
        point_count: usize,
        rng: &mut R,
    ) -> OrbitalPointCloud {
        self.generate(descriptor.quantum_numbers(), point_count, rng)
    }

    pub fn generate_with_stats<R: Rng + ?Sized>(
        &self,
        qn: QuantumNumbers,
        point_count: usize,
        rng: &mut R,
    ) -> (OrbitalPointCloud, SamplingStats) {
        if point_count == 0 {
            return (OrbitalPointCloud::empty(0), SamplingStats::default());
        }
        if !qn.is_valid() {
            warn!(
                "refusing to sample invalid orbital n={}, l={}, m={}",
                qn.n, qn.l, qn.m_l
            );
            return (OrbitalPointCloud::empty(point_count), SamplingStats::default());
        }

        let params = SamplingParameters::for_config(qn, &self.config);
        let z_eff = params.effective_nuclear_charge;
        let max_prob = params.max_probability_density;
        let max_attempts = point_count.saturating_mul(self.config.attempt_factor());

        debug!(
            "sampling ({}, {}, {}) with {} bound: r_max={:.2}, z_eff={:.2}, max_prob={:.3e}",
            qn.n,
            qn.l,
            qn.m_l,
            self.config.bound.as_str(),
            params.max_radius,
            z_eff,
            max_prob
        );

        let mut raw: Vec<[f64; 3]> = Vec::with_capacity(point_count);
        let mut signs: Vec<i8> = Vec::with_capacity(point_count);
        let mut max_extent = 0.0_f64;
        let mut stats = SamplingStats {
            max_probability: max_prob,
            ..SamplingStats::default()
        };

        while raw.len() < point_count && stats.attempts < max_attempts {
            stats.attempts += 1;

            // Cube root makes the proposal uniform in volume, so the
            // acceptance weight is |ψ|² alone.
            let r = params.max_radius * rng.gen::<f64>().cbrt();
            let theta = (2.0 * rng.gen::<f64>() - 1.0).acos();
            let phi = 2.0 * PI * rng.gen::<f64>();
            let point = spherical_to_cartesian(r, theta, phi);

            let psi = wave_function(point, qn, z_eff);
            let density = psi * psi;
            if density > max_prob {
                stats.bound_violations += 1;
            }

            if rng.gen::<f64>() < density / max_prob {
                raw.push(point);
                signs.push(sign_from_value(psi));
                max_extent = max_extent.max(r);
            }
        }
        stats.accepted = raw.len();

        debug!(
            "({}, {}, {}): {} points in {} attempts",
            qn.n, qn.l, qn.m_l, stats.accepted, stats.attempts
        );
        if stats.accepted < point_count {
            warn!(
                "({}, {}, {}): attempt cap {} reached with {}/{} points",
                qn.n, qn.l, qn.m_l, max_attempts, stats.accepted, point_count
            );
        }
        if stats.bound_violations > 0 {
            warn!(
                "({}, {}, {}): density exceeded the envelope {:.3e} on {} candidates",
                qn.n, qn.l, qn.m_l, max_prob, stats.bound_violations
            );
        }

        let scale = if max_extent > 0.0 {
            self.config.view_radius / max_extent
        } else {
            1.0
        };
        let positions = raw
            .iter()
            .map(|p| p.map(|c| self.config.round(c * scale) as f32))
            .collect();

        let cloud = OrbitalPointCloud {
            positions,
            signs,
            count: stats.accepted,
            max_extent,
            requested: point_count,
            attempts: stats.attempts,
        };
        (cloud, stats)
    }
}
