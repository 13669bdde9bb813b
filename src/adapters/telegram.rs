use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use sheetcast_core::config::TelegramConfig;
use sheetcast_core::{Error, Result};

use super::{http_client, Publisher};

const SERVICE: &str = "telegram";

/// Publishes files to a Telegram chat through the Bot API and resolves a
/// download URL for them.
pub struct TelegramPublisher {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
    lookup_timeout: Duration,
}

/// Envelope of every Bot API reply.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Message {
    video: Option<FileRef>,
    document: Option<FileRef>,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    file_id: String,
}

#[derive(Debug, Deserialize)]
struct TelegramFile {
    file_path: Option<String>,
}

/// Upload methods, tried in order until one is accepted.
const UPLOAD_METHODS: [(&str, &str); 2] = [("sendVideo", "video"), ("sendDocument", "document")];

impl TelegramPublisher {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: http_client(config.upload_timeout()),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            lookup_timeout: config.lookup_timeout(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    fn download_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.bot_token, file_path)
    }

    /// Send a request and decode the Bot API envelope.
    ///
    /// Telegram answers rejected calls with a JSON body and a 4xx status, so
    /// the body is decoded regardless of status. Returns the raw body too,
    /// for error messages. The URL carries the bot token and is stripped
    /// from transport errors.
    async fn call<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
    ) -> Result<(ApiResponse<T>, String)> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::http(SERVICE, format!("{method}: {}", e.without_url())))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(SERVICE, format!("{method}: {}", e.without_url())))?;

        let parsed = serde_json::from_str(&body).map_err(|_| {
            Error::http(SERVICE, format!("{method} returned {status}: {}", body.trim()))
        })?;
        Ok((parsed, body))
    }

    async fn send_file(
        &self,
        method: &str,
        field: &str,
        path: &Path,
    ) -> Result<(ApiResponse<Message>, String)> {
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "video.mp4".to_string());

        // Streamed from disk, never held in memory whole.
        let body = Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, length)
            .file_name(file_name)
            .mime_str("video/mp4")
            .map_err(|e| Error::Internal(format!("invalid mime type: {e}")))?;
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .part(field.to_string(), part);

        self.call(self.client.post(self.method_url(method)).multipart(form), method)
            .await
    }

    /// Resolve a `file_id` into a download URL via `getFile`.
    async fn resolve_url(&self, file_id: &str) -> Result<String> {
        let request = self
            .client
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .timeout(self.lookup_timeout);
        let (reply, body) = self.call::<TelegramFile>(request, "getFile").await?;

        match reply.result.and_then(|f| f.file_path) {
            Some(file_path) if reply.ok => Ok(self.download_url(&file_path)),
            _ => Err(Error::Upload(format!("getFile failed: {}", body.trim()))),
        }
    }
}

#[async_trait::async_trait]
impl Publisher for TelegramPublisher {
    async fn upload(&self, path: &Path) -> Result<String> {
        let mut last_body = String::new();

        for (method, field) in UPLOAD_METHODS {
            let (reply, body) = self.send_file(method, field, path).await?;
            if !reply.ok {
                tracing::warn!(method, "Telegram rejected upload: {}", body.trim());
                last_body = body;
                continue;
            }

            let file_id = reply
                .result
                .and_then(|m| m.video.or(m.document))
                .map(|f| f.file_id)
                .ok_or_else(|| Error::Upload(format!("no file_id in {method} response")))?;

            tracing::debug!(method, file_id = %file_id, "uploaded {}", path.display());
            return self.resolve_url(&file_id).await;
        }

        Err(Error::Upload(format!(
            "Telegram rejected every upload method: {}",
            last_body.trim()
        )))
    }
}
