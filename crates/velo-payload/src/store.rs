use std::num::NonZeroUsize;
use std::sync::Mutex;

use bytes::Bytes;
use lru::LruCache;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::debug;

use crate::PayloadPattern;

/// Identifies one cached buffer: exact byte length plus content pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadKey {
    pub len: usize,
    pub pattern: PayloadPattern,
}

/// Convert a megabyte request to an exact byte count. Fractional bytes are
/// truncated, so 0.1 MB resolves to 104857 bytes.
pub fn size_mb_to_bytes(size_mb: f64) -> usize {
    (size_mb * 1024.0 * 1024.0) as usize
}

/// Produce a payload of exactly `len` bytes for the given pattern.
pub fn generate(len: usize, pattern: PayloadPattern) -> Bytes {
    let mut buf = vec![0u8; len];
    match pattern {
        PayloadPattern::Random => OsRng.fill_bytes(&mut buf),
        PayloadPattern::Compressible => buf.fill(0x41),
        PayloadPattern::Incompressible => {
            for (i, b) in buf.iter_mut().enumerate() {
                *b = (i.wrapping_mul(137).wrapping_add(19) % 256) as u8;
            }
        }
    }
    Bytes::from(buf)
}

/// Bounded, process-wide payload cache.
///
/// Lookups are O(1); a miss generates the buffer under the lock, so at most
/// one generation happens per key even under concurrent first access.
/// Entries beyond the cap are evicted least-recently-used.
pub struct PayloadStore {
    cache: Mutex<LruCache<PayloadKey, Bytes>>,
}

impl PayloadStore {
    pub fn new(max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Fetch (or generate and cache) the payload for `(size_mb, pattern)`.
    ///
    /// The returned `Bytes` is a cheap clone of the cached allocation, so
    /// repeated hits within one process are reference-stable.
    pub fn get(&self, size_mb: f64, pattern: PayloadPattern) -> Bytes {
        let key = PayloadKey {
            len: size_mb_to_bytes(size_mb),
            pattern,
        };
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(buf) = cache.get(&key) {
            return buf.clone();
        }
        if cache.len() == cache.cap().get() {
            debug!(len = key.len, pattern = key.pattern.as_str(), "payload cache full, evicting lru entry");
        }
        let buf = generate(key.len, pattern);
        cache.put(key, buf.clone());
        buf
    }

    /// Populate a fixed set of keys ahead of traffic, the way the server
    /// warms its common download sizes at startup.
    pub fn prewarm(&self, sizes_mb: &[f64], patterns: &[PayloadPattern]) {
        for &size in sizes_mb {
            for &pattern in patterns {
                let _ = self.get(size, pattern);
            }
        }
        debug!(entries = self.len(), "payload cache prewarmed");
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_conversion_truncates_to_exact_bytes() {
        assert_eq!(size_mb_to_bytes(0.1), 104_857);
        assert_eq!(size_mb_to_bytes(1.0), 1_048_576);
        assert_eq!(size_mb_to_bytes(10.0), 10_485_760);
    }

    #[test]
    fn generated_length_is_exact() {
        for &mb in &[0.1, 0.5, 1.0, 2.5] {
            let len = size_mb_to_bytes(mb);
            for pattern in [
                PayloadPattern::Random,
                PayloadPattern::Compressible,
                PayloadPattern::Incompressible,
            ] {
                assert_eq!(generate(len, pattern).len(), len);
            }
        }
    }

    #[test]
    fn compressible_is_all_0x41() {
        let buf = generate(size_mb_to_bytes(0.1), PayloadPattern::Compressible);
        assert_eq!(buf.len(), 104_857);
        assert!(buf.iter().all(|&b| b == 0x41));
    }

    #[test]
    fn incompressible_matches_formula() {
        let buf = generate(4096, PayloadPattern::Incompressible);
        for (i, &b) in buf.iter().enumerate() {
            assert_eq!(b as usize, (i * 137 + 19) % 256);
        }
    }

    #[test]
    fn deterministic_patterns_regenerate_identically() {
        for pattern in [PayloadPattern::Compressible, PayloadPattern::Incompressible] {
            let a = generate(10_000, pattern);
            let b = generate(10_000, pattern);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn random_hits_are_reference_stable() {
        let store = PayloadStore::new(8);
        let a = store.get(0.1, PayloadPattern::Random);
        let b = store.get(0.1, PayloadPattern::Random);
        // Same allocation handed out twice, not a regeneration.
        assert_eq!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn store_caps_entries_with_lru_eviction() {
        let store = PayloadStore::new(2);
        store.get(0.001, PayloadPattern::Compressible);
        store.get(0.002, PayloadPattern::Compressible);
        assert_eq!(store.len(), 2);
        store.get(0.003, PayloadPattern::Compressible);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn prewarm_populates_expected_keys() {
        let store = PayloadStore::new(32);
        store.prewarm(
            &[0.1, 0.5, 1.0, 2.0],
            &[PayloadPattern::Random, PayloadPattern::Incompressible],
        );
        assert_eq!(store.len(), 8);
    }
}
