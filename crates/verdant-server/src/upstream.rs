// SPDX-License-Identifier: Apache-2.0

use crate::ApiConfig;
use serde_json::Value;
use verdant_ingest::{UploadFields, UPLOAD_FILE_FIELD};

/// Status and raw body of an upstream call that connected. Transport
/// failures are the `Err` side of the calls below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for the two external collaborators: the calculation
/// workflow and the chat webhook. The workflow call carries no timeout —
/// calculations legitimately run for minutes and the caller owns the wait.
/// The chat call is interactive and bounded.
pub struct UpstreamClient {
    http: reqwest::Client,
    workflow_url: String,
    chat_url: Option<String>,
    chat_timeout: std::time::Duration,
}

impl UpstreamClient {
    #[must_use]
    pub fn new(api: &ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            workflow_url: api.workflow_url.clone(),
            chat_url: api.chat_url.clone(),
            chat_timeout: api.chat_timeout,
        }
    }

    /// Relay a raw body to the workflow, preserving the content type.
    pub async fn calculate_raw(
        &self,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<UpstreamResponse, String> {
        let response = self
            .http
            .post(&self.workflow_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| e.to_string())?;
        Ok(UpstreamResponse { status, body })
    }

    /// Submit an upload as the multipart form the workflow expects:
    /// `file` plus the [`UploadFields`] name/value pairs.
    pub async fn calculate_multipart(
        &self,
        fields: &UploadFields,
        file_bytes: Vec<u8>,
        file_content_type: &str,
    ) -> Result<UpstreamResponse, String> {
        let mut part = reqwest::multipart::Part::bytes(file_bytes)
            .file_name(fields.filename.clone());
        if !file_content_type.is_empty() {
            part = part
                .mime_str(file_content_type)
                .map_err(|e| format!("invalid upload content type: {e}"))?;
        }
        let mut form = reqwest::multipart::Form::new().part(UPLOAD_FILE_FIELD, part);
        for (name, value) in fields.form_fields() {
            form = form.text(name, value);
        }
        let response = self
            .http
            .post(&self.workflow_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| e.to_string())?;
        Ok(UpstreamResponse { status, body })
    }

    /// Post the chat payload and return the webhook's JSON reply.
    pub async fn chat(&self, payload: &Value) -> Result<Value, String> {
        let url = self
            .chat_url
            .as_deref()
            .ok_or_else(|| "chat webhook is not configured".to_string())?;
        let response = self
            .http
            .post(url)
            .timeout(self.chat_timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(format!("chat webhook returned status {status}"));
        }
        response.json().await.map_err(|e| e.to_string())
    }
}
