//! Local file inspection for upload pickers

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::error::{TransferError, TransferResult};

/// Sentinel MIME type for extensions the table does not know.
pub const UNKNOWN_MIME: &str = "application/octet-stream";

lazy_static::lazy_static! {
    static ref MIME_TYPES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("txt", "text/plain");
        m.insert("html", "text/html");
        m.insert("htm", "text/html");
        m.insert("css", "text/css");
        m.insert("csv", "text/csv");
        m.insert("json", "application/json");
        m.insert("xml", "application/xml");
        m.insert("pdf", "application/pdf");
        m.insert("zip", "application/zip");
        m.insert("gz", "application/gzip");
        m.insert("jpg", "image/jpeg");
        m.insert("jpeg", "image/jpeg");
        m.insert("png", "image/png");
        m.insert("gif", "image/gif");
        m.insert("webp", "image/webp");
        m.insert("svg", "image/svg+xml");
        m.insert("heic", "image/heic");
        m.insert("mp3", "audio/mpeg");
        m.insert("wav", "audio/wav");
        m.insert("mp4", "video/mp4");
        m.insert("mov", "video/quicktime");
        m.insert("webm", "video/webm");
        m
    };
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub exists: bool,
    pub mime: String,
    pub size: u64,
}

/// MIME type guessed from the file extension, [`UNKNOWN_MIME`] when
/// unrecognized.
pub fn mime_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| MIME_TYPES.get(ext.as_str()).copied())
        .unwrap_or(UNKNOWN_MIME)
}

/// Stat a local file. A missing path fails fast with a local-file error
/// rather than reporting `exists = false`.
pub async fn get_file_info(path: impl AsRef<Path>) -> TransferResult<FileInfo> {
    let path = path.as_ref();
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| TransferError::LocalFile {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(FileInfo {
        exists: true,
        mime: mime_for_path(path).to_string(),
        size: metadata.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn mime_lookup_is_case_insensitive_with_a_sentinel_fallback() {
        assert_eq!(mime_for_path(Path::new("a/b/photo.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("notes.txt")), "text/plain");
        assert_eq!(mime_for_path(Path::new("weird.zzz")), UNKNOWN_MIME);
        assert_eq!(mime_for_path(Path::new("no_extension")), UNKNOWN_MIME);
    }

    #[tokio::test]
    async fn existing_file_reports_exact_size_and_mime() {
        let mut file = tempfile::Builder::new()
            .suffix(".txt")
            .tempfile()
            .unwrap();
        file.write_all(b"hello cos").unwrap();
        file.flush().unwrap();

        let info = get_file_info(file.path()).await.unwrap();
        assert!(info.exists);
        assert_eq!(info.mime, "text/plain");
        assert_eq!(info.size, 9);
    }

    #[tokio::test]
    async fn missing_file_is_a_descriptive_local_error() {
        let err = get_file_info("/definitely/not/here.bin").await.unwrap_err();
        match err {
            TransferError::LocalFile { path, .. } => {
                assert_eq!(path, Path::new("/definitely/not/here.bin"));
            }
            other => panic!("expected a local file error, got {other}"),
        }
    }
}
