//! # Google Sheets Record Store
//!
//! Reads and writes cells through the Sheets v4 `values` endpoints:
//!
//! - `GET  /v4/spreadsheets/{id}/values/{'sheet'}` returns every row, header first
//! - `PUT  /v4/spreadsheets/{id}/values/{'sheet'!B7}` overwrites one cell
//!
//! Failures are mapped so the reconciliation writer can tell quota pressure
//! (retryable) from a bad request (final).

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{RecordStore, ServiceAccountAuth, SheetRows};
use crate::config::StoreConfig;
use crate::errors::{StoreError, StoreResult};

/// Spreadsheet column letters for a 1-based column index: 1 -> `A`, 27 -> `AA`
pub fn column_letters(column: usize) -> String {
    let mut n = column.max(1);
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Quote a sheet name for use in an A1 range
fn quoted_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// A1 reference of a single cell, e.g. `'Requisitions'!D12`
pub fn a1_cell(sheet: &str, row: usize, column: usize) -> String {
    format!("{}!{}{}", quoted_sheet(sheet), column_letters(column), row)
}

/// Build a `values` endpoint URL for `range`
fn values_url(base: &Url, spreadsheet_id: &str, range: &str) -> StoreResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| StoreError::InvalidUrl(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
    Ok(url)
}

/// Map an unsuccessful API response to a store error
fn failure_for(status: StatusCode, body: String, sheet: &str) -> StoreError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return StoreError::Transient(format!("{status}: {body}"));
    }
    if status == StatusCode::BAD_REQUEST && body.contains("Unable to parse range") {
        return StoreError::sheet_not_found(sheet);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return StoreError::Auth(format!("{status}: {body}"));
    }
    StoreError::Rejected {
        status: status.as_u16(),
        message: body,
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CellUpdate<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: [[&'a str; 1]; 1],
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Record store backed by one Google spreadsheet
#[derive(Debug)]
pub struct SheetsRecordStore {
    http: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    auth: ServiceAccountAuth,
}

impl SheetsRecordStore {
    /// Build a store from configuration, loading the service-account key
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(StoreError::InvalidUrl(
                "store.spreadsheet_id is not configured".to_string(),
            ));
        }
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", config.api_base_url)))?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let auth = ServiceAccountAuth::from_file(&config.credentials_file, http.clone())?;

        Ok(Self {
            http,
            base_url,
            spreadsheet_id: config.spreadsheet_id.clone(),
            auth,
        })
    }

    async fn checked(response: Response, sheet: &str) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(failure_for(status, body, sheet))
    }
}

#[async_trait]
impl RecordStore for SheetsRecordStore {
    async fn list_rows(&self, sheet: &str) -> StoreResult<SheetRows> {
        let url = values_url(&self.base_url, &self.spreadsheet_id, &quoted_sheet(sheet))?;
        let token = self.auth.bearer_token().await?;

        let response = self.http.get(url).bearer_auth(token).send().await?;
        let range: ValueRange = Self::checked(response, sheet).await?.json().await?;

        let mut rows = range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect::<Vec<_>>());
        let headers = rows.next().unwrap_or_default();
        let rows: Vec<Vec<String>> = rows.collect();

        debug!(sheet = sheet, rows = rows.len(), "Read sheet");
        Ok(SheetRows::new(headers, rows))
    }

    async fn write_cell(
        &self,
        sheet: &str,
        row: usize,
        column: usize,
        text: &str,
    ) -> StoreResult<()> {
        let range = a1_cell(sheet, row, column);
        let mut url = values_url(&self.base_url, &self.spreadsheet_id, &range)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        let token = self.auth.bearer_token().await?;

        let body = CellUpdate {
            range: &range,
            major_dimension: "ROWS",
            values: [[text]],
        };
        let response = self
            .http
            .put(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        Self::checked(response, sheet).await?;

        debug!(range = %range, "Wrote cell");
        Ok(())
    }
}
