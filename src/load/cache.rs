//! TTL-bounded memoization of fetch results, persisted across process runs.
//!
//! Each key maps to one bincode file under the cache directory, stamped
//! with its fetch time. A cached `None` ("provider had no data") is a valid
//! entry distinct from a missing file, which is what stops repeated calls
//! for chunks that are known to be absent.
//!
//! Concurrent requests for the same key may compute redundantly; writes are
//! idempotent and last-write-wins, which is safe because adapter results
//! are deterministic for a fixed key within a TTL window.

use bincode::config::{Configuration, Fixint, LittleEndian};
use chrono::Utc;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry<T> {
    fetched_at: i64,
    value: T,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        let age = Utc::now().timestamp() - self.fetched_at;
        age >= 0 && (age as u64) <= ttl.as_secs()
    }
}

/// A persistent, TTL-expiring cache in front of a compute function.
pub struct FetchCache<T> {
    cache_dir: PathBuf,
    memory: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T> FetchCache<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + 'static,
{
    pub fn new(cache_dir: &Path) -> Self {
        FetchCache {
            cache_dir: cache_dir.to_path_buf(),
            memory: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key` if it is younger than `ttl`,
    /// otherwise awaits `compute`, stores its result and returns it.
    ///
    /// Cache I/O failures are logged and degrade to a recompute; they never
    /// fail the surrounding query.
    pub async fn get_or_compute<F>(&self, key: &str, ttl: Duration, compute: F) -> T
    where
        F: Future<Output = T>,
    {
        {
            let memory = self.memory.lock().await;
            if let Some(entry) = memory.get(key) {
                if entry.is_fresh(ttl) {
                    return entry.value.clone();
                }
            }
        }

        if let Some(entry) = self.read_disk(key).await {
            if entry.is_fresh(ttl) {
                let value = entry.value.clone();
                self.memory.lock().await.insert(key.to_string(), entry);
                return value;
            }
        }

        let value = compute.await;
        let entry = CacheEntry {
            fetched_at: Utc::now().timestamp(),
            value: value.clone(),
        };
        self.write_disk(key, &entry).await;
        self.memory.lock().await.insert(key.to_string(), entry);
        value
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{key}.bin"))
    }

    async fn read_disk(&self, key: &str) -> Option<CacheEntry<T>> {
        let path = self.file_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("failed to read cache file {}: {e}", path.display());
                return None;
            }
        };
        match bincode::serde::decode_from_slice::<CacheEntry<T>, _>(&bytes, BINCODE_CONFIG) {
            Ok((entry, _)) => Some(entry),
            Err(e) => {
                warn!("failed to decode cache file {}: {e}", path.display());
                None
            }
        }
    }

    async fn write_disk(&self, key: &str, entry: &CacheEntry<T>) {
        let path = self.file_path(key);
        let bytes = match bincode::serde::encode_to_vec(entry, BINCODE_CONFIG) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("failed to encode cache entry for '{key}': {e}");
                return;
            }
        };
        let cache_dir = self.cache_dir.clone();
        let target = path.clone();
        // Write through a temp file and rename so readers never observe a
        // partially written entry.
        let result = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&cache_dir)?;
            tmp.write_all(&bytes)?;
            tmp.flush()?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("failed to write cache file {}: {e}", path.display()),
            Err(e) => warn!("cache write task failed for '{key}': {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DAY: Duration = Duration::from_secs(60 * 60 * 24);

    #[tokio::test]
    async fn computes_once_within_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let cache: FetchCache<u32> = FetchCache::new(dir.path());
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute("k", DAY, async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    7
                })
                .await;
            assert_eq!(value, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn caches_absent_results_distinctly() {
        let dir = tempfile::tempdir().unwrap();
        let cache: FetchCache<Option<u32>> = FetchCache::new(dir.path());
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = cache
                .get_or_compute("absent", DAY, async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    None
                })
                .await;
            assert_eq!(value, None);
        }
        // "no data" was cached, not retried
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache: FetchCache<String> = FetchCache::new(dir.path());
            cache
                .get_or_compute("k", DAY, async { "v".to_string() })
                .await;
        }
        let cache: FetchCache<String> = FetchCache::new(dir.path());
        let value = cache
            .get_or_compute("k", DAY, async { "recomputed".to_string() })
            .await;
        assert_eq!(value, "v");
    }

    #[tokio::test]
    async fn zero_ttl_recomputes() {
        let dir = tempfile::tempdir().unwrap();
        let cache: FetchCache<u32> = FetchCache::new(dir.path());
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_compute("k", Duration::ZERO, async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    1
                })
                .await;
            // make sure the second round is in a later second
            tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let cache: FetchCache<u32> = FetchCache::new(dir.path());
        let a = cache.get_or_compute("a", DAY, async { 1 }).await;
        let b = cache.get_or_compute("b", DAY, async { 2 }).await;
        assert_eq!((a, b), (1, 2));
    }
}
