//! Chunked picture downloads (`albumart`, `readpicture`)
//!
//! The server sends at most `binarylimit` bytes per reply, so a picture is
//! fetched by repeating the command with an increasing offset until the
//! announced size has been received.

use rmpdc_core::artwork::AlbumArt;
use rmpdc_core::error::{Result, RmpdcError};
use tracing::{debug, warn};

use crate::command::Command;
use crate::connection::{Connection, MAX_BINARY_CHUNK};

struct Transfer {
    data: Vec<u8>,
    mime_type: Option<String>,
    /// The first reply carried no binary field
    empty: bool,
}

async fn transfer(connection: &mut Connection, name: &'static str, uri: &str) -> Result<Transfer> {
    let mut data: Vec<u8> = Vec::new();
    let mut mime_type = None;
    let mut total: Option<u64> = None;
    let mut offset: u64 = 0;

    loop {
        connection.send(&Command::new(name).arg(uri).arg(offset)).await?;
        let chunk = connection.read_binary_chunk().await?;

        if chunk.data.is_empty() {
            match total {
                None => mime_type = mime_type.or(chunk.mime_type),
                // The picture shrank or vanished between requests; keep what arrived
                Some(size) => warn!("{} {}: transfer ended at {} of {} bytes", name, uri, offset, size),
            }
            break;
        }

        let size = match (total, chunk.size) {
            (_, None) => {
                return Err(connection.fail(RmpdcError::Protocol(format!(
                    "{} reply without a size field",
                    name
                ))));
            }
            (Some(known), Some(size)) if known != size => {
                return Err(connection.fail(RmpdcError::Protocol(format!(
                    "{} size changed from {} to {} during transfer",
                    name, known, size
                ))));
            }
            (_, Some(size)) => size,
        };
        if total.is_none() {
            let reserve = usize::try_from(size).unwrap_or(usize::MAX).min(MAX_BINARY_CHUNK);
            data.reserve(reserve);
            total = Some(size);
        }
        if mime_type.is_none() {
            mime_type = chunk.mime_type;
        }

        let end = offset + chunk.data.len() as u64;
        if end > size {
            return Err(connection.fail(RmpdcError::Protocol(format!(
                "{} chunk at offset {} overruns the announced size {}",
                name, offset, size
            ))));
        }
        data.extend_from_slice(&chunk.data);
        offset = end;

        if offset == size {
            break;
        }
    }

    debug!("{} {}: {} bytes", name, uri, data.len());
    Ok(Transfer {
        empty: total.is_none(),
        data,
        mime_type,
    })
}

/// Download the cover art found next to `uri`
///
/// On success the caller owns the returned buffer and its length is the
/// number of bytes received. Server errors such as "No file exists" come
/// back as [`RmpdcError::Server`] and leave the connection usable.
pub async fn run_albumart(connection: &mut Connection, uri: &str) -> Result<Vec<u8>> {
    transfer(connection, "albumart", uri).await.map(|t| t.data)
}

/// Same as [`run_albumart`], with the MIME type inferred from the payload
pub async fn run_albumart_with_type(connection: &mut Connection, uri: &str) -> Result<AlbumArt> {
    run_albumart(connection, uri).await.map(AlbumArt::from_data)
}

/// Download the picture embedded in the tags of `uri`
///
/// `Ok(None)` when the file has no embedded picture.
pub async fn run_readpicture(connection: &mut Connection, uri: &str) -> Result<Option<AlbumArt>> {
    let transfer = transfer(connection, "readpicture", uri).await?;
    if transfer.empty {
        return Ok(None);
    }

    let art = match transfer.mime_type {
        Some(mime_type) => AlbumArt {
            data: transfer.data,
            mime_type,
        },
        None => AlbumArt::from_data(transfer.data),
    };
    Ok(Some(art))
}

/// Cover stored next to the song `uri`, `None` when the server has none
///
/// The daemon looks for the cover file in the directory holding `uri`.
pub async fn cover_for_song(connection: &mut Connection, uri: &str) -> Result<Option<AlbumArt>> {
    match run_albumart_with_type(connection, uri).await {
        Ok(art) if art.is_empty() => Ok(None),
        Ok(art) => Ok(Some(art)),
        Err(RmpdcError::Server(e)) if e.code == rmpdc_core::error::AckCode::NoExist => {
            debug!("No cover next to {}: {}", uri, e.message);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Cover for an album directory, `None` when the server has none
///
/// A trailing `/` makes the daemon search `directory` itself rather than
/// its parent.
pub async fn cover_for_directory(connection: &mut Connection, directory: &str) -> Result<Option<AlbumArt>> {
    let uri = format!("{}/", directory.trim_end_matches('/'));
    cover_for_song(connection, &uri).await
}
