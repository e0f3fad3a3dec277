//! Orbital point clouds for a periodic table viewer.
//!
//! An element's electron configuration is reduced to its valence subshell
//! ([`valence`]). That subshell's hydrogen-like wave function ([`physics`]) is
//! rejection-sampled into a normalized point cloud with per-point phase
//! ([`sampler`], bounded by [`estimator`]). Clouds are memoized in process
//! ([`cache`]) or precomputed to JSON and loaded lazily ([`artifacts`]).

pub mod artifacts;
pub mod cache;
pub mod config;
pub mod error;
pub mod estimator;
pub mod physics;
pub mod sampler;
pub mod valence;

pub use artifacts::{ArtifactStore, OrbitalArtifact};
pub use cache::OrbitalCache;
pub use config::{BoundStrategy, SamplerConfig};
pub use error::{OrbitalError, Result};
pub use physics::QuantumNumbers;
pub use sampler::{OrbitalPointCloud, OrbitalSampler, SamplingStats};
pub use valence::{orbital_description, parse_valence_orbital, OrbitalDescriptor, OrbitalType};
