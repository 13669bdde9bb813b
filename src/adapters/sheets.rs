use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sheetcast_core::config::SheetConfig;
use sheetcast_core::{Error, Result};

use super::{error_body, http_client, SheetStore};

/// Sheets API requests are small; this bounds a stalled connection.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Columns read on every snapshot. The layout only uses A..G.
const READ_COLUMNS: &str = "A:Z";

/// Google Sheets v4 `values` API client for one worksheet.
pub struct GoogleSheetsClient {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    tab: Option<String>,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueUpdate<'a> {
    major_dimension: &'static str,
    values: [[&'a str; 1]; 1],
}

impl GoogleSheetsClient {
    pub fn new(config: &SheetConfig, access_token: impl Into<String>) -> Self {
        Self {
            client: http_client(REQUEST_TIMEOUT),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            tab: config.tab.clone(),
            access_token: access_token.into(),
        }
    }

    /// Qualify an A1 range with the configured worksheet, if any.
    fn range(&self, a1: &str) -> String {
        match self.tab {
            Some(ref tab) => format!("'{}'!{a1}", tab.replace('\'', "''")),
            None => a1.to_string(),
        }
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| Error::Config(format!("invalid sheets api_base {:?}: {e}", self.api_base)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("sheets api_base {:?} cannot be a base", self.api_base)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = error_body(response).await;
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::sheet(format!(
                "{action} rejected, check the access token and sharing ({status}): {body}"
            )),
            _ => Error::sheet(format!("{action} failed ({status}): {body}")),
        })
    }
}

#[async_trait::async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn read_all_rows(&self) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(&self.range(READ_COLUMNS))?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await
            .map_err(|e| Error::sheet(format!("read failed: {e}")))?;

        let body: ValueRange = Self::check(response, "read")
            .await?
            .json()
            .await
            .map_err(|e| Error::sheet(format!("read returned an unexpected body: {e}")))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn write_cell(&self, row: usize, column: usize, value: &str) -> Result<()> {
        let cell = a1_cell(row, column);
        let url = self.values_url(&self.range(&cell))?;

        let response = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueUpdate {
                major_dimension: "ROWS",
                values: [[value]],
            })
            .send()
            .await
            .map_err(|e| Error::sheet(format!("write {cell} failed: {e}")))?;

        Self::check(response, &format!("write {cell}")).await?;
        tracing::trace!(cell = %cell, "cell written");
        Ok(())
    }
}

/// Formatted values arrive as strings; anything else is rendered as JSON.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Convert a 1-based column number to its letter name (1 -> A, 27 -> AA).
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A1 notation for a 1-based (row, column) pair.
pub fn a1_cell(row: usize, column: usize) -> String {
    format!("{}{row}", column_letter(column))
}
