//! In-process memoization of generated point clouds

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::error;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::OnceCell;
use tokio::task::JoinError;

use crate::physics::QuantumNumbers;
use crate::sampler::{OrbitalPointCloud, OrbitalSampler};
use crate::valence::OrbitalDescriptor;

type Slot = Arc<OnceCell<Arc<OrbitalPointCloud>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub n: u32,
    pub l: u32,
    pub m: i32,
    pub point_count: usize,
}

impl CacheKey {
    pub fn new(qn: QuantumNumbers, point_count: usize) -> Self {
        CacheKey {
            n: qn.n,
            l: qn.l,
            m: qn.m_l,
            point_count,
        }
    }

    fn quantum_numbers(&self) -> QuantumNumbers {
        QuantumNumbers {
            n: self.n,
            l: self.l,
            m_l: self.m,
        }
    }

    /// Mixed into a base seed so each key draws an independent stream.
    fn seed_offset(&self) -> u64 {
        ((self.n as u64) << 56)
            ^ ((self.l as u64) << 48)
            ^ (((self.m as i64) as u64 & 0xff) << 40)
            ^ self.point_count as u64
    }
}

/// Write-once, read-many store of generated clouds, keyed by
/// `(n, l, m, point_count)`.
///
/// Owned by the application and shared by reference. Generation runs on
/// tokio's blocking pool; concurrent requests for one key share a single
/// generation, and a generation whose caller went away still completes and
/// fills the cache. Requires a tokio runtime.
pub struct OrbitalCache {
    sampler: OrbitalSampler,
    seed: Option<u64>,
    slots: Mutex<HashMap<CacheKey, Slot>>,
    generations: Arc<AtomicUsize>,
}

impl OrbitalCache {
    /// Cache drawing fresh entropy for every generation
    pub fn new(sampler: OrbitalSampler) -> Self {
        OrbitalCache {
            sampler,
            seed: None,
            slots: Mutex::new(HashMap::new()),
            generations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Cache whose generations are reproducible from `seed`
    pub fn with_seed(sampler: OrbitalSampler, seed: u64) -> Self {
        OrbitalCache {
            seed: Some(seed),
            ..Self::new(sampler)
        }
    }

    fn slot(&self, key: CacheKey) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key).or_default())
    }

    /// Cached cloud for the key, without generating.
    pub fn get(&self, qn: QuantumNumbers, point_count: usize) -> Option<Arc<OrbitalPointCloud>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(&CacheKey::new(qn, point_count))
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of generated clouds held.
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many generations actually ran.
    pub fn generation_count(&self) -> usize {
        self.generations.load(Ordering::SeqCst)
    }

    pub async fn get_descriptor(
        &self,
        descriptor: &OrbitalDescriptor,
        point_count: usize,
    ) -> Arc<OrbitalPointCloud> {
        self.get_or_generate(descriptor.quantum_numbers(), point_count)
            .await
    }

    pub async fn get_or_generate(
        &self,
        qn: QuantumNumbers,
        point_count: usize,
    ) -> Arc<OrbitalPointCloud> {
        let key = CacheKey::new(qn, point_count);
        let slot = self.slot(key);
        if let Some(cloud) = slot.get() {
            return Arc::clone(cloud);
        }

        let sampler = self.sampler.clone();
        let seed = self.seed;
        let generations = Arc::clone(&self.generations);

        // Detached, so dropping this future does not abort the generation.
        let task = tokio::spawn(async move {
            let cloud = slot
                .get_or_try_init(|| async move {
                    generations.fetch_add(1, Ordering::SeqCst);
                    tokio::task::spawn_blocking(move || {
                        let mut rng = match seed {
                            Some(seed) => StdRng::seed_from_u64(seed ^ key.seed_offset()),
                            None => StdRng::from_entropy(),
                        };
                        Arc::new(sampler.generate(key.quantum_numbers(), key.point_count, &mut rng))
                    })
                    .await
                })
                .await?;
            Ok::<_, JoinError>(Arc::clone(cloud))
        });

        match task.await {
            Ok(Ok(cloud)) => cloud,
            Ok(Err(err)) => {
                error!("orbital generation for {key:?} failed: {err}");
                Arc::new(OrbitalPointCloud::empty(point_count))
            }
            Err(err) => {
                error!("orbital generation task for {key:?} failed: {err}");
                Arc::new(OrbitalPointCloud::empty(point_count))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> Arc<OrbitalCache> {
        Arc::new(OrbitalCache::with_seed(OrbitalSampler::default(), 7))
    }

    fn one_s() -> QuantumNumbers {
        QuantumNumbers::new(1, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_generates_once_per_key() {
        let cache = cache();
        assert!(cache.is_empty());
        assert!(cache.get(one_s(), 64).is_none());

        let first = cache.get_or_generate(one_s(), 64).await;
        let second = cache.get_or_generate(one_s(), 64).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.count, 64);
        assert_eq!(cache.generation_count(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(one_s(), 64).is_some());
    }

    #[tokio::test]
    async fn test_point_count_is_part_of_key() {
        let cache = cache();
        let small = cache.get_or_generate(one_s(), 16).await;
        let large = cache.get_or_generate(one_s(), 32).await;
        assert_eq!(small.count, 16);
        assert_eq!(large.count, 32);
        assert_eq!(cache.generation_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_share_one_generation() {
        let cache = cache();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get_or_generate(one_s(), 128).await })
            })
            .collect();

        let mut clouds = Vec::new();
        for handle in handles {
            clouds.push(handle.await.unwrap());
        }
        assert!(clouds.iter().all(|c| Arc::ptr_eq(c, &clouds[0])));
        assert_eq!(cache.generation_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dropped_request_still_fills_cache() {
        let cache = cache();
        tokio::select! {
            biased;
            _ = cache.get_or_generate(one_s(), 256) => {}
            _ = std::future::ready(()) => {}
        }

        let cloud = cache.get_or_generate(one_s(), 256).await;
        assert_eq!(cloud.count, 256);
        assert_eq!(cache.generation_count(), 1);
    }

    #[tokio::test]
    async fn test_seeded_caches_agree() {
        let a = cache().get_or_generate(one_s(), 50).await;
        let b = cache().get_or_generate(one_s(), 50).await;
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.signs, b.signs);
    }

    #[tokio::test]
    async fn test_descriptor_lookup() {
        let cache = cache();
        let descriptor = crate::valence::parse_valence_orbital("[He] 2s2 2p2");
        let cloud = cache.get_descriptor(&descriptor, 40).await;
        assert_eq!(cloud.count, 40);
        assert!(cache.get(descriptor.quantum_numbers(), 40).is_some());
    }

    #[tokio::test]
    async fn test_zero_points() {
        let cache = cache();
        let cloud = cache.get_or_generate(one_s(), 0).await;
        assert!(cloud.is_empty());
        assert!(cloud.is_complete());
    }
}
