use crate::constants::IMAGE_FILE_FIELD;
use crate::error::{RemoveBgError, RequestError, Result};
use crate::settings::RequestParams;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;

/// Raw result of one background removal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResponse {
    pub data: Vec<u8>,
    /// Value of the `Content-Type` header, empty when the service sent none.
    pub content_type: String,
}

/// Uploads one image to the background removal service.
pub trait TransformClient {
    fn remove_background(
        &self,
        input_path: &Path,
        api_key: &str,
        params: &RequestParams,
    ) -> Result<TransformResponse>;
}

#[derive(Deserialize)]
struct ErrorResponse {
    errors: Vec<ErrorEntry>,
}

#[derive(Deserialize)]
struct ErrorEntry {
    title: String,
}

/// remove.bg HTTP client.
///
/// Requests go through an async reqwest client. The blocking
/// [`TransformClient`] interface drives it on a private tokio runtime.
pub struct RemoveBgClient {
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    endpoint: String,
    user_agent: String,
}

impl RemoveBgClient {
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RemoveBgError::Runtime(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            http: reqwest::Client::new(),
            runtime,
            endpoint: endpoint.into(),
            user_agent: user_agent.into(),
        })
    }

    /// Sends `input_path` as a multipart upload together with `params`.
    ///
    /// # Returns
    /// * `Ok(TransformResponse)` - body and content type of a 200 response
    /// * `Err(RemoveBgError::Request)` - 4xx, message built from the JSON error titles
    /// * `Err(RemoveBgError::UnexpectedStatus)` - any other status
    pub async fn remove_from_file(
        &self,
        input_path: &Path,
        api_key: &str,
        params: &RequestParams,
    ) -> Result<TransformResponse> {
        let data = tokio::fs::read(input_path)
            .await
            .map_err(|_| RemoveBgError::FileNotFound(input_path.to_path_buf()))?;

        let file_name = input_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut form = Form::new().part(IMAGE_FILE_FIELD, Part::bytes(data).file_name(file_name));
        for (key, value) in params {
            form = form.text(key.clone(), value.clone());
        }

        tracing::debug!("POST {} ({:?})", self.endpoint, input_path);

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Api-Key", api_key)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?;

        match status {
            200 => Ok(TransformResponse {
                data: body.to_vec(),
                content_type,
            }),
            400..=499 => Err(RequestError::new(status, parse_error_body(&body)).into()),
            _ => Err(RemoveBgError::UnexpectedStatus(status)),
        }
    }
}

impl TransformClient for RemoveBgClient {
    fn remove_background(
        &self,
        input_path: &Path,
        api_key: &str,
        params: &RequestParams,
    ) -> Result<TransformResponse> {
        self.runtime
            .block_on(self.remove_from_file(input_path, api_key, params))
    }
}

/// Joins the `errors[].title` values of an API error body.
/// Falls back to the raw body when it is not that JSON shape.
fn parse_error_body(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(parsed) => parsed
            .errors
            .into_iter()
            .map(|e| e.title)
            .collect::<Vec<_>>()
            .join(", "),
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}
