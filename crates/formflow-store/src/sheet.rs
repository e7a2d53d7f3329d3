// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `RecordStore` implementation over the Google Sheets values REST API.
//!
//! Every operation fetches or writes whole rows; there is no transactional
//! read-modify-write across calls. Updates locate the target row by id,
//! apply the patch to the decoded record, and write the full row back,
//! which keeps each mutation a single idempotent overwrite.

use std::time::Duration;

use async_trait::async_trait;
use formflow_config::model::SheetsConfig;
use formflow_core::error::FormflowError;
use formflow_core::traits::RecordStore;
use formflow_core::types::{FormStatus, UserPatch, UserRecord};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rows;

/// Wire shape of the values API for both reads and writes.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Spreadsheet-backed record store.
#[derive(Debug, Clone)]
pub struct SheetStore {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    worksheet: String,
    responses_worksheet: String,
}

impl SheetStore {
    /// Creates a store from configuration.
    ///
    /// Requires `sheets.spreadsheet_id` and `sheets.api_token` to be set.
    pub fn new(config: &SheetsConfig) -> Result<Self, FormflowError> {
        let spreadsheet_id = config
            .spreadsheet_id
            .clone()
            .ok_or_else(|| FormflowError::Config("sheets.spreadsheet_id is required".into()))?;
        let token = config
            .api_token
            .as_deref()
            .ok_or_else(|| FormflowError::Config("sheets.api_token is required".into()))?;

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| FormflowError::Config(format!("invalid sheets.api_token: {e}")))?;
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FormflowError::Store {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            spreadsheet_id,
            worksheet: config.worksheet.clone(),
            responses_worksheet: config.responses_worksheet.clone(),
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            self.base_url, self.spreadsheet_id, range
        )
    }

    /// Fetch all data rows of a worksheet (header row excluded).
    async fn fetch_rows(&self, worksheet: &str) -> Result<Vec<Vec<String>>, FormflowError> {
        let url = self.values_url(worksheet);
        let response = self
            .client
            .get(&url)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await
            .map_err(|e| FormflowError::Store {
                message: format!("GET {worksheet} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FormflowError::store(format!(
                "GET {worksheet} returned {status}"
            )));
        }

        let range: ValueRange = response.json().await.map_err(|e| FormflowError::Store {
            message: format!("malformed values response for {worksheet}: {e}"),
            source: Some(Box::new(e)),
        })?;

        let mut values = range.values;
        if !values.is_empty() {
            values.remove(0); // header row
        }
        Ok(values)
    }

    /// Append one row to the user worksheet.
    async fn append_row(&self, row: Vec<String>) -> Result<(), FormflowError> {
        let url = format!("{}:append", self.values_url(&self.worksheet));
        let body = ValueRange {
            range: None,
            values: vec![row],
        };
        let response = self
            .client
            .post(&url)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await
            .map_err(|e| FormflowError::Store {
                message: format!("append failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FormflowError::store(format!("append returned {status}")));
        }
        Ok(())
    }

    /// Overwrite one full data row. `data_index` is zero-based among data
    /// rows; the sheet row is offset by the header and one-based indexing.
    async fn write_row(&self, data_index: usize, row: Vec<String>) -> Result<(), FormflowError> {
        let sheet_row = data_index + 2;
        let range = format!("{}!A{sheet_row}:H{sheet_row}", self.worksheet);
        let url = self.values_url(&range);
        let body = ValueRange {
            range: Some(range.clone()),
            values: vec![row],
        };
        let response = self
            .client
            .put(&url)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await
            .map_err(|e| FormflowError::Store {
                message: format!("PUT {range} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FormflowError::store(format!("PUT {range} returned {status}")));
        }
        Ok(())
    }

    /// Locate a user's data row, returning its index and decoded record.
    async fn find_row(
        &self,
        user_id: &str,
    ) -> Result<Option<(usize, UserRecord)>, FormflowError> {
        let rows = self.fetch_rows(&self.worksheet).await?;
        for (idx, row) in rows.iter().enumerate() {
            if let Some(record) = rows::row_to_record(row)
                && record.id == user_id
            {
                return Ok(Some((idx, record)));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl RecordStore for SheetStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, FormflowError> {
        Ok(self.find_row(user_id).await?.map(|(_, record)| record))
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, FormflowError> {
        let rows = self.fetch_rows(&self.worksheet).await?;
        Ok(rows.iter().filter_map(|r| rows::row_to_record(r)).collect())
    }

    async fn create(
        &self,
        user_id: &str,
        username: &str,
        status: FormStatus,
    ) -> Result<(), FormflowError> {
        let mut record = UserRecord::new_pending(user_id, username);
        record.form_status = status;
        debug!(user_id, "appending new user row");
        self.append_row(rows::record_to_row(&record)).await
    }

    async fn update(&self, user_id: &str, patch: UserPatch) -> Result<(), FormflowError> {
        if patch.is_empty() {
            return Ok(());
        }
        let Some((idx, mut record)) = self.find_row(user_id).await? else {
            return Err(FormflowError::store(format!(
                "update for unknown user {user_id}"
            )));
        };
        patch.apply_to(&mut record);
        self.write_row(idx, rows::record_to_row(&record)).await
    }

    async fn list_responses(&self) -> Result<Vec<UserRecord>, FormflowError> {
        let rows = self.fetch_rows(&self.responses_worksheet).await?;
        Ok(rows.iter().filter_map(|r| rows::row_to_record(r)).collect())
    }
}
