//! Thin wrapper over `reqwest::Client` mapping failures to `CheckError::Fetch`.
//!
//! Requests are issued once; there is no retry and no timeout.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, Response};
use std::io::Write;

use crate::error::CheckError;

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs a GET request and returns the raw response body.
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Retrieving remote file: {}", url);

        let response = self.send(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CheckError::fetch(url, e))?;

        debug!("Received {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }

    /// Streams the response body of a GET request into the writer made by `create_writer`.
    /// The writer is only created once the server has answered with a success status.
    #[tracing::instrument(level = "trace", skip(self, create_writer))]
    pub async fn download_file<W, F>(&self, url: &str, create_writer: F) -> Result<u64>
    where
        W: Write,
        F: FnOnce() -> Result<W>,
    {
        debug!("Downloading file from {}...", url);

        let mut response = self.send(url).await?;
        let mut writer = create_writer()?;
        let mut downloaded_bytes: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| CheckError::fetch(url, e))?
        {
            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            downloaded_bytes += chunk.len() as u64;
        }
        writer.flush().context("Failed to flush downloaded file")?;

        debug!(
            "Downloaded {:.2} MB",
            downloaded_bytes as f64 / (1024.0 * 1024.0)
        );

        Ok(downloaded_bytes)
    }

    async fn send(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CheckError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::fetch(url, status).into());
        }
        Ok(response)
    }
}
