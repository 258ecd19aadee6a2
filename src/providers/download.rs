//! Shared gzip-over-HTTP download used by all provider adapters.

use crate::providers::error::ProviderError;
use async_compression::tokio::bufread::GzipDecoder;
use futures_util::TryStreamExt;
use log::info;
use reqwest::Client;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;

/// Downloads `url` and gunzips the body into memory.
pub(crate) async fn fetch_gzipped(client: &Client, url: &str) -> Result<Vec<u8>, ProviderError> {
    info!("downloading {url}");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ProviderError::NetworkRequest(url.to_string(), e))?;

    let response = match response.error_for_status() {
        Ok(resp) => resp,
        Err(e) => {
            return Err(if let Some(status) = e.status() {
                ProviderError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                }
            } else {
                ProviderError::NetworkRequest(url.to_string(), e)
            });
        }
    };

    let stream = response
        .bytes_stream()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
    let mut decoder = GzipDecoder::new(StreamReader::new(stream));
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .await
        .map_err(|e| ProviderError::DownloadIo(url.to_string(), e))?;
    info!("downloaded and decompressed {} bytes from {url}", decompressed.len());
    Ok(decompressed)
}
