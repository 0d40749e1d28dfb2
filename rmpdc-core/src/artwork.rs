/// Fallback when the payload matches no known image signature
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A complete picture downloaded from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumArt {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl AlbumArt {
    /// Wrap a payload, inferring the MIME type from its first bytes
    pub fn from_data(data: Vec<u8>) -> Self {
        let mime_type = sniff_mime(&data).to_string();
        Self { data, mime_type }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }
}

/// Infer an image MIME type from magic bytes
pub fn sniff_mime(data: &[u8]) -> &'static str {
    if data.starts_with(b"\xFF\xD8\xFF") {
        "image/jpeg"
    } else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        "image/gif"
    } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        "image/webp"
    } else if data.starts_with(b"BM") {
        "image/bmp"
    } else {
        OCTET_STREAM
    }
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_signatures() {
        assert_eq!(sniff_mime(b"\xFF\xD8\xFF\xE0rest"), "image/jpeg");
        assert_eq!(sniff_mime(b"\x89PNG\r\n\x1a\n\0\0"), "image/png");
        assert_eq!(sniff_mime(b"GIF89a..."), "image/gif");
        assert_eq!(sniff_mime(b"RIFF\x10\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(sniff_mime(b"BM\x36\0"), "image/bmp");
    }

    #[test]
    fn test_sniff_unknown_and_short() {
        assert_eq!(sniff_mime(b""), OCTET_STREAM);
        assert_eq!(sniff_mime(b"RIFF"), OCTET_STREAM);
        assert_eq!(sniff_mime(b"hello"), OCTET_STREAM);
    }

    #[test]
    fn test_album_art_extension() {
        let art = AlbumArt::from_data(b"\x89PNG\r\n\x1a\n".to_vec());
        assert_eq!(art.mime_type, "image/png");
        assert_eq!(art.extension(), "png");
        assert_eq!(extension_for_mime("text/plain"), "bin");
    }
}
