//! Minimal Google Sheets v4 client: read a value range, add a tab, write
//! the statement layout.

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::SheetSection;
use crate::layout::SheetLayout;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("sheets API returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("sheets request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected sheets response: {0}")]
    Decode(String),

    #[error("invalid sheets base url '{0}'")]
    BaseUrl(String),
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct SheetsClient {
    http: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    token: String,
}

impl SheetsClient {
    pub fn new(
        base_url: &str,
        spreadsheet_id: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SheetsError> {
        let base_url = Url::parse(base_url).map_err(|_| SheetsError::BaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(SheetsError::BaseUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            spreadsheet_id: spreadsheet_id.into(),
            token: token.into(),
        })
    }

    /// Client for the configured spreadsheet; the token is read from the
    /// environment variable named in `token_env`.
    pub fn from_config(sheet: &SheetSection) -> Result<Self, SheetsError> {
        if sheet.id.trim().is_empty() {
            return Err(SheetsError::Authentication(
                "no spreadsheet id configured ([sheet] id)".to_string(),
            ));
        }
        let token = std::env::var(&sheet.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                SheetsError::Authentication(format!("{} is not set", sheet.token_env))
            })?;
        Self::new(
            &sheet.base_url,
            sheet.id.trim(),
            token.trim(),
            Duration::from_secs(sheet.timeout_secs),
        )
    }

    /// `{base}/v4/spreadsheets/{id}/{tail...}`, each segment percent-encoded.
    fn endpoint(&self, tail: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v4", "spreadsheets"])
                .extend(tail);
        }
        url
    }

    /// Read a range as rows of display strings.
    pub async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.endpoint(&[&self.spreadsheet_id, "values", range]);
        tracing::debug!(range, "reading sheet range");
        let resp: ValueRange = self.send(self.http.get(url)).await?;
        Ok(rows_from_values(resp.values))
    }

    /// Add a tab and return its numeric sheet id.
    pub async fn add_sheet(&self, title: &str) -> Result<i64, SheetsError> {
        let url = self.endpoint(&[&format!("{}:batchUpdate", self.spreadsheet_id)]);
        let body = add_sheet_body(title);
        let resp: BatchUpdateResponse = self.send(self.http.post(url).json(&body)).await?;
        let id = added_sheet_id(&resp.replies)?;
        tracing::info!(title, sheet_id = id, "added sheet");
        Ok(id)
    }

    /// Write every block of the layout in one values batch.
    pub async fn write_layout(&self, layout: &SheetLayout) -> Result<(), SheetsError> {
        let url = self.endpoint(&[&self.spreadsheet_id, "values:batchUpdate"]);
        let body = values_body(layout);
        let _: Value = self.send(self.http.post(url).json(&body)).await?;
        tracing::info!(title = %layout.title, "wrote statement");
        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SheetsError> {
        let resp = request.bearer_auth(&self.token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| SheetsError::Decode(e.to_string()))
    }
}

fn classify_failure(status: StatusCode, body: &str) -> SheetsError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SheetsError::Authentication(message),
        _ => SheetsError::Remote {
            status: status.as_u16(),
            message,
        },
    }
}

fn rows_from_values(values: Vec<Vec<Value>>) -> Vec<Vec<String>> {
    values
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|v| match v {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

fn add_sheet_body(title: &str) -> Value {
    json!({
        "requests": [
            { "addSheet": { "properties": { "title": title } } }
        ]
    })
}

fn added_sheet_id(replies: &[Value]) -> Result<i64, SheetsError> {
    replies
        .iter()
        .find_map(|r| r.pointer("/addSheet/properties/sheetId")?.as_i64())
        .ok_or_else(|| SheetsError::Decode("addSheet reply carries no sheetId".to_string()))
}

fn values_body(layout: &SheetLayout) -> Value {
    let data: Vec<Value> = layout
        .blocks()
        .iter()
        .map(|block| {
            let values: Vec<Vec<Value>> = block
                .cells
                .iter()
                .map(|row| row.iter().map(|c| c.to_json()).collect())
                .collect();
            json!({
                "range": block.range(&layout.title),
                "majorDimension": "ROWS",
                "values": values,
            })
        })
        .collect();
    json!({ "valueInputOption": "USER_ENTERED", "data": data })
}
