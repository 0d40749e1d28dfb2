//! Album cover lookup across every source
//!
//! Sources are tried in order: the memory cache, the disk cache, the daemon
//! (`albumart` then `readpicture` on the album's first track) and finally
//! the optional HTTP server. A hit from a slower source is written back to
//! the caches.

use rmpdc_core::artwork::AlbumArt;
use rmpdc_core::config::CoverConfig;
use rmpdc_core::entity::Album;
use rmpdc_core::error::{Result, RmpdcError};
use rmpdc_protocol::Connection;
use rmpdc_protocol::commands::{cover_for_directory, cover_for_song, database, run_readpicture};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::{CoverCache, MemoryCache, cover_key};
use crate::web::CoverWebServer;

/// Where a cover was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSource {
    Memory,
    Disk,
    AlbumArt,
    ReadPicture,
    Web,
}

pub struct CoverFetcher {
    memory: Mutex<MemoryCache>,
    disk: Option<CoverCache>,
    web: Option<CoverWebServer>,
    max_size: usize,
}

impl CoverFetcher {
    pub fn new(memory_capacity: usize, max_size: usize) -> Self {
        Self {
            memory: Mutex::new(MemoryCache::new(memory_capacity)),
            disk: None,
            web: None,
            max_size,
        }
    }

    pub fn with_disk_cache(mut self, cache: CoverCache) -> Self {
        self.disk = Some(cache);
        self
    }

    pub fn with_web_server(mut self, web: CoverWebServer) -> Self {
        self.web = Some(web);
        self
    }

    pub async fn from_config(config: &CoverConfig) -> Result<Self> {
        let mut fetcher = Self::new(config.memory_cache_size, config.max_cover_size);
        if config.disk_cache {
            let cache = CoverCache::open(config.cache_directory.clone(), config.max_cover_size).await?;
            fetcher = fetcher.with_disk_cache(cache);
        }
        if let Some(web) = &config.web_server {
            fetcher = fetcher.with_web_server(CoverWebServer::from_config(web, config)?);
        }
        Ok(fetcher)
    }

    pub async fn cover_for_album(&self, connection: &mut Connection, album: &Album) -> Result<Option<AlbumArt>> {
        Ok(self
            .cover_for_album_with_source(connection, album)
            .await?
            .map(|(art, _)| art))
    }

    pub async fn cover_for_album_with_source(
        &self,
        connection: &mut Connection,
        album: &Album,
    ) -> Result<Option<(AlbumArt, CoverSource)>> {
        let key = cover_key(album.artist.as_deref().unwrap_or_default(), &album.name);

        if let Some(art) = self.memory.lock().await.get(&key) {
            return Ok(Some((art, CoverSource::Memory)));
        }

        if let Some(disk) = &self.disk {
            match disk.get(&key).await {
                Ok(Some(art)) => {
                    self.memory.lock().await.put(&key, art.clone());
                    return Ok(Some((art, CoverSource::Disk)));
                }
                Ok(None) => {}
                Err(e) => warn!("Cover cache read failed for {}: {}", album.name, e),
            }
        }

        let Some((art, source)) = self.fetch_uncached(connection, album).await? else {
            debug!("No cover for album {}", album.name);
            return Ok(None);
        };

        self.store(&key, &art).await;
        Ok(Some((art, source)))
    }

    /// Drop a cover from both caches
    pub async fn invalidate(&self, album: &Album) -> Result<()> {
        let key = cover_key(album.artist.as_deref().unwrap_or_default(), &album.name);
        self.memory.lock().await.remove(&key);
        if let Some(disk) = &self.disk {
            disk.remove(&key).await?;
        }
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.memory.lock().await.clear();
        if let Some(disk) = &self.disk {
            let removed = disk.clear().await?;
            debug!("Removed {} cached covers", removed);
        }
        Ok(())
    }

    async fn fetch_uncached(
        &self,
        connection: &mut Connection,
        album: &Album,
    ) -> Result<Option<(AlbumArt, CoverSource)>> {
        let path = match database::path_for_album(connection, album).await {
            Ok(path) => path,
            Err(RmpdcError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        // The daemon resolves the cover file relative to a song, so ask with
        // the first track and only fall back to the bare directory
        let tracks = fallible_source(database::tracks_for_album(connection, album).await)?.unwrap_or_default();
        let albumart = match tracks.first() {
            Some(first) => cover_for_song(connection, &first.uri).await,
            None => cover_for_directory(connection, &path).await,
        };
        if let Some(art) = fallible_source(albumart)?.flatten() {
            return Ok(Some((art, CoverSource::AlbumArt)));
        }

        if let Some(first) = tracks.first() {
            if let Some(art) = fallible_source(run_readpicture(connection, &first.uri).await)?.flatten() {
                if !art.is_empty() {
                    return Ok(Some((art, CoverSource::ReadPicture)));
                }
            }
        }

        if let Some(web) = &self.web {
            match web.fetch(&path).await {
                Ok(Some(data)) => return Ok(Some((AlbumArt::from_data(data), CoverSource::Web))),
                Ok(None) => {}
                Err(e) => warn!("Web cover lookup failed for {}: {}", path, e),
            }
        }

        Ok(None)
    }

    async fn store(&self, key: &str, art: &AlbumArt) {
        if art.len() > self.max_size {
            debug!("Not caching cover of {} bytes", art.len());
            return;
        }
        if let Some(disk) = &self.disk {
            if let Err(e) = disk.put(key, &art.data).await {
                warn!("Failed to cache cover: {}", e);
            }
        }
        self.memory.lock().await.put(key, art.clone());
    }
}

/// Server errors mean the next source should be tried; anything else
/// ends the lookup
fn fallible_source<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RmpdcError::Server(e)) => {
            debug!("Cover source unavailable: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmpdc_core::error::{AckCode, ServerError};

    #[test]
    fn test_server_errors_fall_through() {
        let ack: Result<u8> = Err(RmpdcError::Server(ServerError {
            code: AckCode::Permission,
            command_list_index: 0,
            command: "readpicture".into(),
            message: "you don't have permission".into(),
        }));
        assert!(fallible_source(ack).unwrap().is_none());
        assert_eq!(fallible_source(Ok(3u8)).unwrap(), Some(3));
        assert!(fallible_source::<u8>(Err(RmpdcError::Timeout)).is_err());
    }

    #[tokio::test]
    async fn test_from_config_without_disk_or_web() {
        let config = CoverConfig {
            disk_cache: false,
            ..CoverConfig::default()
        };
        let fetcher = CoverFetcher::from_config(&config).await.unwrap();
        assert!(fetcher.disk.is_none());
        assert!(fetcher.web.is_none());
    }
}
