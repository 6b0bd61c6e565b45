//! Google Sheets persistence backend.
//!
//! Authenticates with a service-account key, resolves the spreadsheet by name
//! through Drive once, then appends one row per record through the Sheets
//! values API.

use std::path::Path;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator};

use leadbot_core::ports::PersistencePort;
use leadbot_types::{
    config::PersistenceConfig, record::ClientRecord, AgentError, Result,
};

use crate::retry::{http_client, is_retryable_status, transport_error, with_retry};

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

pub struct SheetsPersistence {
    config: PersistenceConfig,
    http: reqwest::Client,
    auth: OnceCell<DefaultAuthenticator>,
    spreadsheet_id: OnceCell<String>,
}

impl SheetsPersistence {
    pub fn new(config: PersistenceConfig) -> Result<Self> {
        let http = http_client(config.request_timeout_secs.max(1))?;
        let spreadsheet_id = OnceCell::new_with(
            config
                .spreadsheet_id
                .as_ref()
                .filter(|id| !id.trim().is_empty())
                .map(|id| id.trim().to_string()),
        );
        Ok(Self {
            config,
            http,
            auth: OnceCell::new(),
            spreadsheet_id,
        })
    }

    /// Key file is read once; the authenticator caches and refreshes tokens.
    async fn authenticator(&self) -> Result<&DefaultAuthenticator> {
        self.auth
            .get_or_try_init(|| async {
                let path = &self.config.credentials_path;
                let key = read_service_account_key(Path::new(path)).await.map_err(|e| {
                    AgentError::Auth(format!("Failed to load key from {}: {}", path, e))
                })?;
                ServiceAccountAuthenticator::builder(key)
                    .build()
                    .await
                    .map_err(|e| AgentError::Auth(e.to_string()))
            })
            .await
    }

    async fn access_token(&self) -> Result<String> {
        let token = self
            .authenticator()
            .await?
            .token(SCOPES)
            .await
            .map_err(|e| AgentError::Auth(e.to_string()))?;

        token
            .token()
            .map(|t| t.to_string())
            .ok_or_else(|| AgentError::Auth("OAuth token was None".to_string()))
    }

    async fn spreadsheet_id(&self, token: &str) -> Result<&str> {
        self.spreadsheet_id
            .get_or_try_init(|| self.find_spreadsheet(token))
            .await
            .map(String::as_str)
    }

    async fn find_spreadsheet(&self, token: &str) -> Result<String> {
        let name = &self.config.spreadsheet_name;
        let url = drive_query_url(name)?;
        debug!("Looking up spreadsheet '{}'", name);

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport_error(e, self.config.request_timeout_secs))?;
        let response = check_status(response, "spreadsheet lookup", true).await?;

        let listing: DriveFileList = response
            .json()
            .await
            .map_err(|e| AgentError::Persistence(e.to_string()))?;

        let file = listing.files.into_iter().next().ok_or_else(|| {
            AgentError::Persistence(format!(
                "Spreadsheet '{}' not found or not shared with the service account",
                name
            ))
        })?;
        info!("Using spreadsheet '{}' ({})", name, file.id);
        Ok(file.id)
    }

    /// Token and lookup failures are safe to retry. Once the POST may have
    /// reached the server, only failures that cannot have written a row are.
    async fn append_once(&self, row: &[Value]) -> Result<()> {
        let token = self.access_token().await?;
        let spreadsheet_id = self.spreadsheet_id(&token).await?;
        let url = append_url(spreadsheet_id, &self.config.sheet_name)?;

        let response = self
            .http
            .post(url)
            .bearer_auth(&token)
            .json(&append_body(row))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    transport_error(e, self.config.request_timeout_secs)
                } else {
                    AgentError::Persistence(format!("append outcome unknown: {}", e))
                }
            })?;
        check_status(response, "append", false).await?;
        Ok(())
    }
}

#[async_trait]
impl PersistencePort for SheetsPersistence {
    async fn append_record(&self, timestamp: &str, record: &ClientRecord) -> Result<()> {
        let row = record.to_row(timestamp);
        with_retry("sheet append", self.config.max_retries, || {
            self.append_once(&row)
        })
        .await?;
        info!(
            "Appended row for {} to '{}'",
            record.email, self.config.sheet_name
        );
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "google-sheets"
    }
}

#[derive(Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

async fn check_status(
    response: reqwest::Response,
    what: &str,
    idempotent: bool,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    let message = format!("{} failed with HTTP {}: {}", what, status, text);
    Err(status_error(status, message, idempotent))
}

/// A 5xx on a non-idempotent request may still have been applied, so it is
/// only transient when repeating the request is harmless. 429 never applies.
pub(crate) fn status_error(status: StatusCode, message: String, idempotent: bool) -> AgentError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => AgentError::Network(message),
        s if idempotent && is_retryable_status(s) => AgentError::Network(message),
        _ => AgentError::Persistence(message),
    }
}

/// A1 range that targets the whole sheet; quotes allow spaces in the title.
pub(crate) fn a1_range(sheet_name: &str) -> String {
    format!("'{}'!A1", sheet_name.replace('\'', "''"))
}

pub(crate) fn append_body(row: &[Value]) -> Value {
    json!({ "values": [row] })
}

pub(crate) fn append_url(spreadsheet_id: &str, sheet_name: &str) -> Result<Url> {
    let mut url = parse_url(SHEETS_API)?;
    url.path_segments_mut()
        .map_err(|_| AgentError::Config("Sheets API URL cannot take a path".to_string()))?
        .push(spreadsheet_id)
        .push("values")
        .push(&format!("{}:append", a1_range(sheet_name)));
    url.query_pairs_mut()
        .append_pair("valueInputOption", "USER_ENTERED")
        .append_pair("insertDataOption", "INSERT_ROWS");
    Ok(url)
}

pub(crate) fn drive_query_url(spreadsheet_name: &str) -> Result<Url> {
    let query = format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        spreadsheet_name.replace('\\', "\\\\").replace('\'', "\\'"),
        SPREADSHEET_MIME
    );
    let mut url = parse_url(DRIVE_FILES_API)?;
    url.query_pairs_mut()
        .append_pair("q", &query)
        .append_pair("fields", "files(id,name)")
        .append_pair("supportsAllDrives", "true")
        .append_pair("includeItemsFromAllDrives", "true");
    Ok(url)
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| AgentError::Config(format!("{}: {}", raw, e)))
}
