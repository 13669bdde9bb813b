use std::path::Path;

use reqwest::Client;
use tokio::io::AsyncWriteExt;

use sheetcast_core::config::GoogleConfig;
use sheetcast_core::{Error, Result};

use super::{error_body, http_client, SourceStorage};

const SERVICE: &str = "drive";

/// Downloads source videos from Google Drive (`files/{id}?alt=media`).
pub struct DriveStorage {
    client: Client,
    api_base: String,
    access_token: String,
}

impl DriveStorage {
    pub fn new(config: &GoogleConfig, access_token: impl Into<String>) -> Self {
        Self {
            client: http_client(config.download_timeout()),
            api_base: config.drive_api_base.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    fn media_url(&self, identifier: &str) -> String {
        format!("{}/drive/v3/files/{}", self.api_base, identifier)
    }
}

#[async_trait::async_trait]
impl SourceStorage for DriveStorage {
    async fn fetch(&self, identifier: &str, dest: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(self.media_url(identifier))
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| Error::http(SERVICE, format!("request for {identifier} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(Error::http(
                SERVICE,
                format!("download of {identifier} failed ({status}): {body}"),
            ));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::http(SERVICE, format!("download of {identifier} interrupted: {e}")))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(identifier, bytes = written, "downloaded to {}", dest.display());
        Ok(written)
    }
}
