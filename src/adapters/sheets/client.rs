//! Google Sheets row source
//!
//! Reads single cells through the Sheets v4 `values.get` endpoint. The
//! spreadsheet is addressed by ID, or looked up by title through the Drive v3
//! API when no ID is configured.

use super::auth::Authorizer;
use super::models::{DriveFileList, GoogleErrorBody, ValueRange};
use super::traits::RowSource;
use crate::config::{SourceConfig, SourceCredentials};
use crate::domain::ids::{CellRef, ColumnLabel};
use crate::domain::{Result, SheetPipeError, SourceError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use std::time::Duration;
use url::Url;

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Google Sheets source
pub struct GoogleSheetsSource {
    client: Client,
    api_base_url: Url,
    spreadsheet_id: String,
    sheet_name: String,
    worksheet: Option<String>,
    auth: Authorizer,
}

impl GoogleSheetsSource {
    /// Authorize and open the configured spreadsheet
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed URLs, or a `SourceError`
    /// if the spreadsheet cannot be found by title.
    pub async fn connect(config: &SourceConfig, credentials: SourceCredentials) -> Result<Self> {
        let auth = Authorizer::new(credentials.auth()?)?;
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SourceError::RequestFailed(format!("Failed to build HTTP client: {e}")))?;

        let api_base_url = parse_base_url(&config.api_base_url)?;

        let spreadsheet_id = match &config.spreadsheet_id {
            Some(id) => id.clone(),
            None => {
                let drive_base_url = parse_base_url(&config.drive_base_url)?;
                resolve_spreadsheet_id(&client, &drive_base_url, &auth, &config.target_sheet_name)
                    .await?
            }
        };

        tracing::info!(
            principal = %credentials.principal(),
            sheet = %config.target_sheet_name,
            spreadsheet_id = %spreadsheet_id,
            worksheet = config.worksheet.as_deref().unwrap_or("<first>"),
            "Opened Google Sheets source"
        );

        Ok(Self {
            client,
            api_base_url,
            spreadsheet_id,
            sheet_name: config.target_sheet_name.clone(),
            worksheet: config.worksheet.clone(),
            auth,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// A1 range for one cell, qualified by worksheet when one is configured
    fn range_for(&self, cell: &CellRef) -> String {
        match &self.worksheet {
            Some(worksheet) => format!("'{}'!{}", worksheet.replace('\'', "''"), cell),
            None => cell.to_string(),
        }
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = self.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SheetPipeError::Configuration(format!(
                    "Sheets API URL cannot be a base: {}",
                    self.api_base_url
                ))
            })?
            .pop_if_empty()
            .extend(["spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }
}

#[async_trait]
impl RowSource for GoogleSheetsSource {
    fn describe(&self) -> String {
        format!("google-sheets:{} ({})", self.sheet_name, self.spreadsheet_id)
    }

    async fn read_cell(&self, column: &ColumnLabel, row: u64) -> Result<Option<String>> {
        let cell = column.at(row);
        let range = self.range_for(&cell);
        let url = self.values_url(&range)?;

        let request = self.auth.authorize(&self.client, self.client.get(url)).await?;
        let response = request
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(format!("reading {cell}: {e}")))?;

        let response = check_status(response, &format!("cell {cell}")).await?;
        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(format!("cell {cell}: {e}")))?;

        Ok(body.first_cell())
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    Url::parse(raw)
        .map_err(|e| SheetPipeError::Configuration(format!("Invalid API URL '{raw}': {e}")))
}

/// Look up a spreadsheet ID by its title
async fn resolve_spreadsheet_id(
    client: &Client,
    drive_base_url: &Url,
    auth: &Authorizer,
    title: &str,
) -> Result<String> {
    let mut url = drive_base_url.clone();
    url.path_segments_mut()
        .map_err(|_| {
            SheetPipeError::Configuration(format!("Drive API URL cannot be a base: {drive_base_url}"))
        })?
        .pop_if_empty()
        .push("files");

    let query = format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        title.replace('\\', "\\\\").replace('\'', "\\'"),
        SPREADSHEET_MIME_TYPE
    );

    tracing::debug!(title = %title, "Looking up spreadsheet by title");

    let request = auth
        .authorize(
            client,
            client
                .get(url)
                .query(&[("q", query.as_str()), ("fields", "files(id,name)")]),
        )
        .await?;
    let response = request
        .send()
        .await
        .map_err(|e| SourceError::RequestFailed(format!("spreadsheet lookup: {e}")))?;
    let response = check_status(response, &format!("spreadsheet '{title}'")).await?;

    let list: DriveFileList = response
        .json()
        .await
        .map_err(|e| SourceError::InvalidResponse(format!("spreadsheet lookup: {e}")))?;

    let mut files = list.files.into_iter();
    let first = files.next().ok_or_else(|| {
        SourceError::NotFound(format!(
            "no spreadsheet titled '{title}' is shared with these credentials"
        ))
    })?;

    let others = files.count();
    if others > 0 {
        tracing::warn!(
            title = %title,
            chosen = %first.id,
            others = others,
            "Several spreadsheets share this title; using the first one"
        );
    }

    Ok(first.id)
}

/// Map an unsuccessful response to a `SourceError`
async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GoogleErrorBody>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    let message = format!("{what}: {message}");

    let error = match status {
        StatusCode::TOO_MANY_REQUESTS => SourceError::QuotaExceeded(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceError::Unauthorized(message),
        StatusCode::NOT_FOUND => SourceError::NotFound(message),
        s if s.is_server_error() => SourceError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => SourceError::RequestFailed(format!("HTTP {}: {}", s.as_u16(), message)),
    };
    Err(error.into())
}
