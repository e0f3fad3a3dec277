//! Precomputed orbital artifacts: the batch writer and the lazy runtime store
//!
//! One JSON file per orbital name (`3d.json`) holds
//! `{n, l, m, name, positions, signs}` with `positions` flattened into
//! `3 * count` floats. Only m = 0 representatives are stored, so the store
//! is keyed by (n, l).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, error};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::config::DEFAULT_VIEW_RADIUS;
use crate::error::{OrbitalError, Result};
use crate::physics::QuantumNumbers;
use crate::sampler::OrbitalPointCloud;
use crate::valence::{OrbitalDescriptor, OrbitalType};

/// Where the batch generator writes, relative to the working directory.
pub const ARTIFACT_DIR: &str = "public/orbitals";

pub const BATCH_POINT_COUNT: usize = 30_000;

/// An orbital produced by the batch generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOrbital {
    pub n: u32,
    pub l: u32,
    pub m: i32,
    pub name: &'static str,
}

impl BatchOrbital {
    const fn new(n: u32, l: u32, name: &'static str) -> Self {
        BatchOrbital { n, l, m: 0, name }
    }

    pub fn quantum_numbers(&self) -> QuantumNumbers {
        QuantumNumbers {
            n: self.n,
            l: self.l,
            m_l: self.m,
        }
    }
}

/// Every valence subshell of the periodic table.
pub const BATCH_ORBITALS: [BatchOrbital; 19] = [
    BatchOrbital::new(1, 0, "1s"),
    BatchOrbital::new(2, 0, "2s"),
    BatchOrbital::new(2, 1, "2p"),
    BatchOrbital::new(3, 0, "3s"),
    BatchOrbital::new(3, 1, "3p"),
    BatchOrbital::new(3, 2, "3d"),
    BatchOrbital::new(4, 0, "4s"),
    BatchOrbital::new(4, 1, "4p"),
    BatchOrbital::new(4, 2, "4d"),
    BatchOrbital::new(4, 3, "4f"),
    BatchOrbital::new(5, 0, "5s"),
    BatchOrbital::new(5, 1, "5p"),
    BatchOrbital::new(5, 2, "5d"),
    BatchOrbital::new(5, 3, "5f"),
    BatchOrbital::new(6, 0, "6s"),
    BatchOrbital::new(6, 1, "6p"),
    BatchOrbital::new(6, 2, "6d"),
    BatchOrbital::new(7, 0, "7s"),
    BatchOrbital::new(7, 1, "7p"),
];

/// Artifact name for an (n, l) pair, e.g. `3d`.
pub fn orbital_key(n: u32, l: u32) -> Option<String> {
    OrbitalType::from_l(l).map(|t| format!("{n}{}", t.symbol()))
}

pub fn artifact_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.json"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalArtifact {
    pub n: u32,
    pub l: u32,
    pub m: i32,
    pub name: String,
    pub positions: Vec<f32>,
    pub signs: Vec<i8>,
}

impl OrbitalArtifact {
    pub fn from_cloud(name: &str, qn: QuantumNumbers, cloud: &OrbitalPointCloud) -> Self {
        OrbitalArtifact {
            n: qn.n,
            l: qn.l,
            m: qn.m_l,
            name: name.to_string(),
            positions: cloud.flat_positions(),
            signs: cloud.signs.clone(),
        }
    }

    /// Regroups the flat positions into points, checking the layout.
    pub fn into_cloud(self) -> Result<OrbitalPointCloud> {
        let malformed = |reason: String| OrbitalError::Malformed {
            name: self.name.clone(),
            reason,
        };
        if self.positions.len() != 3 * self.signs.len() {
            return Err(malformed(format!(
                "{} coordinates for {} signs",
                self.positions.len(),
                self.signs.len()
            )));
        }
        if let Some(bad) = self.signs.iter().find(|&&s| s != 1 && s != -1) {
            return Err(malformed(format!("sign {bad} is not ±1")));
        }

        let positions: Vec<[f32; 3]> = self
            .positions
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        let count = positions.len();
        Ok(OrbitalPointCloud {
            positions,
            signs: self.signs,
            count,
            // Stored clouds are already normalized
            max_extent: if count > 0 { DEFAULT_VIEW_RADIUS } else { 0.0 },
            requested: count,
            attempts: 0,
        })
    }
}

/// Serializes the artifact to `<dir>/<name>.json`, creating `dir` if
/// needed, and returns the number of bytes written.
pub fn write_artifact(dir: &Path, artifact: &OrbitalArtifact) -> Result<u64> {
    fs::create_dir_all(dir).map_err(|source| OrbitalError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = artifact_path(dir, &artifact.name);
    let json = serde_json::to_vec(artifact).map_err(|source| OrbitalError::Json {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, &json).map_err(|source| OrbitalError::Io {
        path: path.clone(),
        source,
    })?;

    debug!("wrote {} ({} bytes)", path.display(), json.len());
    Ok(json.len() as u64)
}

async fn read_artifact(path: PathBuf) -> Result<Arc<OrbitalPointCloud>> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| OrbitalError::Io {
            path: path.clone(),
            source,
        })?;
    let artifact: OrbitalArtifact =
        serde_json::from_slice(&bytes).map_err(|source| OrbitalError::Json {
            path: path.clone(),
            source,
        })?;
    Ok(Arc::new(artifact.into_cloud()?))
}

/// Read-only view over a directory of artifacts.
///
/// Loads lazily by orbital name and keeps parsed clouds for the life of the
/// store. Concurrent loads of one name share a single read. A failed load is
/// logged, returned as an empty cloud and not remembered, so a later call
/// tries again.
pub struct ArtifactStore {
    dir: PathBuf,
    slots: Mutex<HashMap<String, Arc<OnceCell<Arc<OrbitalPointCloud>>>>>,
    reads: AtomicUsize,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ArtifactStore {
            dir: dir.into(),
            slots: Mutex::new(HashMap::new()),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of artifact files read so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub async fn load(&self, descriptor: &OrbitalDescriptor) -> Arc<OrbitalPointCloud> {
        self.load_orbital(descriptor.n, descriptor.l).await
    }

    pub async fn load_orbital(&self, n: u32, l: u32) -> Arc<OrbitalPointCloud> {
        let Some(name) = orbital_key(n, l) else {
            error!("no orbital artifact for n={n}, l={l}");
            return Arc::new(OrbitalPointCloud::empty(0));
        };

        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(name.clone()).or_default())
        };
        if let Some(cloud) = slot.get() {
            return Arc::clone(cloud);
        }

        let path = artifact_path(&self.dir, &name);
        let loaded = slot
            .get_or_try_init(|| {
                self.reads.fetch_add(1, Ordering::SeqCst);
                read_artifact(path)
            })
            .await;

        match loaded {
            Ok(cloud) => Arc::clone(cloud),
            Err(err) => {
                error!("failed to load orbital {name}: {err}");
                Arc::new(OrbitalPointCloud::empty(0))
            }
        }
    }
}
