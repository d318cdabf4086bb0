use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::ClientResult;

/// Image bytes as served by the profile-picture endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub content_type: String,
    pub bytes: Bytes,
}

impl ProfileImage {
    /// File extension matching the content type, e.g. `png` for `image/png`.
    pub fn extension(&self) -> &'static str {
        let essence = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        mime_guess::get_mime_extensions_str(essence)
            .and_then(|exts| {
                // Prefer the conventional spelling where the table has several
                exts.iter().copied().find(|e| *e == "jpg").or(exts.first().copied())
            })
            .unwrap_or("img")
    }

    /// Write the image to `path`, or to `<dir>/<stem>.<ext>` when `path` is a directory.
    pub async fn save(&self, path: &Path, stem: &str) -> ClientResult<PathBuf> {
        let target = if path.is_dir() {
            path.join(format!("{}.{}", stem, self.extension()))
        } else {
            path.to_path_buf()
        };
        tokio::fs::write(&target, &self.bytes).await?;
        Ok(target)
    }
}

/// True when a `content-type` header value names an image.
pub fn is_image(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("image/")
}

/// Content type to declare when uploading `path`.
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
