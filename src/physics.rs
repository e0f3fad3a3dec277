//! Hydrogen-like quantum physics for orbital visualization
//! Single-electron wave functions with an effective nuclear charge Z_eff

use once_cell::sync::Lazy;
use std::f64::consts::PI;

/// Represents quantum numbers (n, l, m_l)
/// n: Principal quantum number (1, 2, 3, ...)
/// l: Azimuthal quantum number (0 to n-1)
/// m_l: Magnetic quantum number (-l to l)
///
/// The fields are public so the math below can be driven with raw triples;
/// use [`QuantumNumbers::new`] wherever the triple has to be physical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuantumNumbers {
    pub n: u32,
    pub l: u32,
    pub m_l: i32,
}

impl QuantumNumbers {
    pub fn new(n: u32, l: u32, m_l: i32) -> Option<Self> {
        // Validate quantum numbers
        if n == 0 || l >= n || m_l.unsigned_abs() > l {
            return None;
        }
        Some(QuantumNumbers { n, l, m_l })
    }

    pub fn is_valid(&self) -> bool {
        Self::new(self.n, self.l, self.m_l).is_some()
    }
}

/// Below this radius theta and phi are undefined.
const ORIGIN_EPSILON: f64 = 1e-10;

/// Largest n! that fits in a u64.
const FACTORIAL_TABLE_LEN: usize = 21;

static FACTORIALS: Lazy<[u64; FACTORIAL_TABLE_LEN]> = Lazy::new(|| {
    let mut table = [1u64; FACTORIAL_TABLE_LEN];
    for i in 1..FACTORIAL_TABLE_LEN {
        table[i] = table[i - 1] * i as u64;
    }
    table
});

/// Y_00, the constant s harmonic
fn y00() -> f64 {
    0.5 * (1.0 / PI).sqrt()
}

/// n! from a lazily built table. Negative n yields 1, and values past 20!
/// saturate at `u64::MAX`.
pub fn factorial(n: i32) -> u64 {
    if n < 0 {
        return 1;
    }
    let n = n as usize;
    if n < FACTORIAL_TABLE_LEN {
        return FACTORIALS[n];
    }
    (FACTORIAL_TABLE_LEN as u64..=n as u64)
        .fold(FACTORIALS[FACTORIAL_TABLE_LEN - 1], |acc, i| acc.saturating_mul(i))
}

/// Generalized Laguerre polynomial L^a_n(x)
pub fn laguerre_polynomial(x: f64, n: u32, alpha: u32) -> f64 {
    let alpha_f = alpha as f64;

    if n == 0 {
        return 1.0;
    }

    let mut l0 = 1.0;
    let mut l1 = 1.0 + alpha_f - x;

    if n == 1 {
        return l1;
    }

    for i in 2..=n {
        let i_f = i as f64;

        let l_new = ((2.0 * i_f - 1.0 + alpha_f - x) * l1 - (i_f - 1.0 + alpha_f) * l0) / i_f;
        l0 = l1;
        l1 = l_new;
    }

    l1
}

/// Calculate the radial wavefunction R_nl(r) for a hydrogen-like atom
/// with effective nuclear charge `z_eff`.
///
/// Returns 0 for `l >= n` instead of underflowing `n - l - 1`.
pub fn radial_wavefunction(r: f64, n: u32, l: u32, z_eff: f64) -> f64 {
    if r < 0.0 || n == 0 || l >= n {
        return 0.0;
    }

    let n_f = n as f64;
    let rho = 2.0 * z_eff * r / n_f;

    // Normalization constant:
    // sqrt((2Z / n)^3 * (n-l-1)! / (2n (n+l)!))
    let norm = ((2.0 * z_eff / n_f).powi(3) * factorial((n - l - 1) as i32) as f64
        / (2.0 * n_f * factorial((n + l) as i32) as f64))
        .sqrt();

    // Exponential decay
    let exp_part = (-rho / 2.0).exp();

    // Radial polynomial (Laguerre polynomial part)
    let poly = laguerre_polynomial(rho, n - l - 1, 2 * l + 1);

    norm * exp_part * rho.powi(l as i32) * poly
}

/// Real spherical harmonics in closed form, giving the familiar orbital lobes.
///
/// l = 0..=2 use the standard real combinations. For l = 3 only m = 0 is the
/// true f_z³ harmonic; every other m uses the visualization shortcut
/// `sin^|m|(θ) cos(θ) cos(mφ)` with the f_z³ normalization. That shortcut
/// is an approximation of the real f set and is kept on purpose.
/// Unsupported (l, m) pairs give 0.
pub fn real_spherical_harmonic(theta: f64, phi: f64, l: u32, m_l: i32) -> f64 {
    let (sin_theta, cos_theta) = theta.sin_cos();

    match (l, m_l) {
        (0, 0) => y00(),

        // pz, px, py
        (1, 0) => 0.5 * (3.0 / PI).sqrt() * cos_theta,
        (1, 1) => 0.5 * (3.0 / PI).sqrt() * sin_theta * phi.cos(),
        (1, -1) => 0.5 * (3.0 / PI).sqrt() * sin_theta * phi.sin(),

        // dz², dxz, dyz, dx²-y², dxy
        (2, 0) => 0.25 * (5.0 / PI).sqrt() * (3.0 * cos_theta * cos_theta - 1.0),
        (2, 1) => 0.5 * (15.0 / PI).sqrt() * sin_theta * cos_theta * phi.cos(),
        (2, -1) => 0.5 * (15.0 / PI).sqrt() * sin_theta * cos_theta * phi.sin(),
        (2, 2) => 0.25 * (15.0 / PI).sqrt() * sin_theta * sin_theta * (2.0 * phi).cos(),
        (2, -2) => 0.25 * (15.0 / PI).sqrt() * sin_theta * sin_theta * (2.0 * phi).sin(),

        // fz³
        (3, 0) => 0.25 * (7.0 / PI).sqrt() * (5.0 * cos_theta.powi(3) - 3.0 * cos_theta),
        (3, m) if m.abs() <= 3 => {
            0.25 * (7.0 / PI).sqrt()
                * sin_theta.powi(m.abs())
                * cos_theta
                * (m as f64 * phi).cos()
        }

        _ => 0.0,
    }
}

/// Spherical (r, theta, phi) to Cartesian (x, y, z)
pub fn spherical_to_cartesian(r: f64, theta: f64, phi: f64) -> [f64; 3] {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    [r * sin_theta * cos_phi, r * sin_theta * sin_phi, r * cos_theta]
}

/// Signed wave function ψ at a Cartesian point.
pub fn wave_function(point: [f64; 3], qn: QuantumNumbers, z_eff: f64) -> f64 {
    let [x, y, z] = point;
    let r = (x * x + y * y + z * z).sqrt();

    // At the nucleus only s orbitals are non-zero
    if r < ORIGIN_EPSILON {
        if qn.l == 0 {
            return radial_wavefunction(0.0, qn.n, 0, z_eff) * y00();
        }
        return 0.0;
    }

    let theta = (z / r).clamp(-1.0, 1.0).acos();
    let phi = y.atan2(x);

    radial_wavefunction(r, qn.n, qn.l, z_eff) * real_spherical_harmonic(theta, phi, qn.l, qn.m_l)
}

/// Calculate the probability density |ψ|² at a Cartesian point
pub fn probability_density(point: [f64; 3], qn: QuantumNumbers, z_eff: f64) -> f64 {
    let psi = wave_function(point, qn, z_eff);
    psi * psi
}

/// Phase of ψ as ±1; exactly zero counts as positive.
pub fn sign_from_value(v: f64) -> i8 {
    if v >= 0.0 {
        1
    } else {
        -1
    }
}
