//! Cover caches keyed by album
//!
//! Both caches share one key: the SHA-256 of the album artist and the album
//! name separated by U+001F, in lowercase hex.

use std::num::NonZeroUsize;

use camino::{Utf8Path, Utf8PathBuf};
use lru::LruCache;
use rmpdc_core::artwork::AlbumArt;
use rmpdc_core::error::{Result, RmpdcError};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

pub fn cover_key(artist: &str, album: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(artist.as_bytes());
    hasher.update([0x1f]);
    hasher.update(album.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Covers stored as one file per key
#[derive(Debug, Clone)]
pub struct CoverCache {
    directory: Utf8PathBuf,
    max_size: usize,
}

impl CoverCache {
    pub async fn open(directory: impl Into<Utf8PathBuf>, max_size: usize) -> Result<Self> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await.map_err(|e| {
            RmpdcError::Cover(format!("Failed to create cache directory {}: {}", directory, e))
        })?;
        debug!("Cover cache at {}", directory);
        Ok(Self { directory, max_size })
    }

    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> Utf8PathBuf {
        self.directory.join(key)
    }

    pub async fn get(&self, key: &str) -> Result<Option<AlbumArt>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(data) if data.is_empty() => Ok(None),
            Ok(data) => Ok(Some(AlbumArt::from_data(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a cover, replacing any previous one
    pub async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        if data.len() > self.max_size {
            return Err(RmpdcError::Cover(format!(
                "Cover too large: {} bytes (max {})",
                data.len(),
                self.max_size
            )));
        }

        // Readers never see a partially written file
        let tmp = self.directory.join(format!("{}.tmp", key));
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, self.path_for(key)).await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<bool> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every cached cover, returning how many were removed
    pub async fn clear(&self) -> Result<usize> {
        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove {}: {}", entry.path().display(), e),
            }
        }
        Ok(removed)
    }
}

/// Bounded in-memory cache evicting the least recently used cover.
/// A capacity of 0 disables it.
#[derive(Debug)]
pub struct MemoryCache {
    store: Option<LruCache<String, AlbumArt>>,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            store: NonZeroUsize::new(capacity).map(LruCache::new),
        }
    }

    pub fn get(&mut self, key: &str) -> Option<AlbumArt> {
        self.store.as_mut()?.get(key).cloned()
    }

    pub fn put(&mut self, key: &str, art: AlbumArt) {
        if let Some(store) = self.store.as_mut() {
            store.put(key.to_owned(), art);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<AlbumArt> {
        self.store.as_mut()?.pop(key)
    }

    pub fn clear(&mut self) {
        if let Some(store) = self.store.as_mut() {
            store.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.store.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(byte: u8) -> AlbumArt {
        AlbumArt::from_data(vec![byte; 4])
    }

    #[test]
    fn test_cover_key_is_stable_hex() {
        let key = cover_key("Joni Mitchell", "Blue");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, cover_key("Joni Mitchell", "Blue"));
        // The separator keeps the halves apart
        assert_ne!(cover_key("ab", "c"), cover_key("a", "bc"));
    }

    #[test]
    fn test_memory_cache_evicts_least_recently_used() {
        let mut cache = MemoryCache::new(2);
        cache.put("a", art(1));
        cache.put("b", art(2));
        assert!(cache.get("a").is_some());

        cache.put("c", art(3));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_memory_cache_replace_and_zero_capacity() {
        let mut cache = MemoryCache::new(2);
        cache.put("a", art(1));
        cache.put("a", art(9));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().data, vec![9; 4]);
        assert!(cache.remove("a").is_some());
        assert!(cache.is_empty());

        let mut disabled = MemoryCache::new(0);
        disabled.put("a", art(1));
        assert!(disabled.is_empty());
    }

    #[tokio::test]
    async fn test_disk_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().join("covers")).unwrap();
        let cache = CoverCache::open(root, 1024).await.unwrap();

        let key = cover_key("Joni Mitchell", "Blue");
        assert!(cache.get(&key).await.unwrap().is_none());

        cache.put(&key, b"\x89PNG\r\n\x1a\nrest").await.unwrap();
        let stored = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(stored.mime_type, "image/png");

        assert!(cache.remove(&key).await.unwrap());
        assert!(!cache.remove(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_disk_cache_limits_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let cache = CoverCache::open(root, 8).await.unwrap();

        let err = cache.put("big", &[0u8; 9]).await.unwrap_err();
        assert!(matches!(err, RmpdcError::Cover(_)));

        cache.put("one", &[1u8; 8]).await.unwrap();
        cache.put("two", &[2u8; 8]).await.unwrap();
        assert_eq!(cache.clear().await.unwrap(), 2);
        assert!(cache.get("one").await.unwrap().is_none());
    }
}
