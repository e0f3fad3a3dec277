use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use log::info;
use tokio::task::JoinSet;

use orbitals::artifacts::{
    write_artifact, OrbitalArtifact, ARTIFACT_DIR, BATCH_ORBITALS, BATCH_POINT_COUNT,
};
use orbitals::{OrbitalCache, OrbitalSampler, SamplerConfig};

/// Precomputes one point cloud per valence subshell into `public/orbitals`.
/// Set `ORBITALS_SEED` for a reproducible run.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let out_dir = Path::new(ARTIFACT_DIR);
    let sampler = OrbitalSampler::new(SamplerConfig::default());
    let seed = std::env::var("ORBITALS_SEED")
        .ok()
        .and_then(|value| value.parse::<u64>().ok());
    let cache = Arc::new(match seed {
        Some(seed) => {
            info!("Using seed {seed}");
            OrbitalCache::with_seed(sampler, seed)
        }
        None => OrbitalCache::new(sampler),
    });

    info!(
        "Generating {} orbital point clouds into {}",
        BATCH_ORBITALS.len(),
        out_dir.display()
    );

    let mut jobs = JoinSet::new();
    for orbital in BATCH_ORBITALS {
        let cache = Arc::clone(&cache);
        jobs.spawn(async move {
            let cloud = cache
                .get_or_generate(orbital.quantum_numbers(), BATCH_POINT_COUNT)
                .await;
            (orbital, cloud)
        });
    }

    while let Some(joined) = jobs.join_next().await {
        let (orbital, cloud) = joined.context("orbital generation task panicked")?;
        info!(
            "{}: generated {}/{} points in {} attempts",
            orbital.name, cloud.count, cloud.requested, cloud.attempts
        );

        let artifact = OrbitalArtifact::from_cloud(orbital.name, orbital.quantum_numbers(), &cloud);
        let bytes = write_artifact(out_dir, &artifact)
            .with_context(|| format!("failed to write orbital {}", orbital.name))?;
        info!("  saved {}.json ({:.1} KB)", orbital.name, bytes as f64 / 1024.0);
    }

    info!("Done!");
    Ok(())
}
