//! Response body helpers

use std::path::Path;

use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Response};
use serde::de::DeserializeOwned;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::{debug, warn};

use crate::{charset::decode_text, error::Result};

/// Read the whole body into memory
pub async fn read_all(response: Response) -> Result<Bytes> {
    Ok(response.bytes().await?)
}

/// Read the body as text, transcoding from the declared charset when it is not UTF-8
pub async fn read_string(response: Response) -> Result<String> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = response.bytes().await?;
    decode_text(&body, content_type.as_deref())
}

/// Decode a JSON body without a target type
pub async fn read_any_json(response: Response) -> Result<serde_json::Value> {
    read_json(response).await
}

/// Decode a JSON body into `T`
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Stream the body into a new file at `path`, returning the number of bytes written.
///
/// Missing parent directories are created. If the body cannot be fully
/// written the partial file is removed.
pub async fn save_file(mut response: Response, path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut file = File::create(path).await?;
    let copied = copy_body(&mut response, &mut file).await;
    drop(file);

    match copied {
        Ok(written) => {
            debug!("Saved {} bytes to {}", written, path.display());
            Ok(written)
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(path).await {
                warn!(
                    "Failed to remove partial download {}: {}",
                    path.display(),
                    cleanup
                );
            }
            Err(e)
        }
    }
}

async fn copy_body(response: &mut Response, file: &mut File) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}
