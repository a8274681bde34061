//! Featured image sources: local files and the placeholder image service.

use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::{Error, Result};
use crate::wordpress::MediaAsset;

const PLACEHOLDER_TIMEOUT: Duration = Duration::from_secs(10);

/// MIME type from a file extension; `None` for non-image files
pub fn guess_image_mime(filename: &str) -> Option<&'static str> {
    let extension = Path::new(filename)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Read an image file from disk
pub async fn load_image(path: &Path) -> Result<MediaAsset> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Config(format!("Invalid image path: {}", path.display())))?
        .to_string();

    let mime_type = guess_image_mime(&filename).ok_or_else(|| {
        Error::Unsupported(format!(
            "Unsupported image type: {} (use jpg, png, gif, webp or svg)",
            filename
        ))
    })?;

    let bytes = tokio::fs::read(path).await?;
    info!(filename = %filename, size = bytes.len(), "Loaded image file");

    Ok(MediaAsset {
        bytes,
        filename,
        mime_type: mime_type.to_string(),
    })
}

/// File name for an image generated from a prompt
pub fn placeholder_filename(prompt: &str) -> String {
    let stem: String = prompt.replace(' ', "_").chars().take(20).collect();
    format!("ai_generated_{}.png", stem)
}

/// Fetch a stand-in image for a prompt from the placeholder source
pub async fn fetch_placeholder(client: &reqwest::Client, source_url: &str, prompt: &str) -> Result<MediaAsset> {
    info!(prompt = %prompt, url = %source_url, "Fetching placeholder image");

    let response = client
        .get(source_url)
        .timeout(PLACEHOLDER_TIMEOUT)
        .send()
        .await?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::from_status(status, body));
    }

    let bytes = response.bytes().await?.to_vec();
    Ok(MediaAsset {
        bytes,
        filename: placeholder_filename(prompt),
        mime_type: "image/png".to_string(),
    })
}
