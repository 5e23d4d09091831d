use eclipse_core::InstallError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Request failed ({status}): {body}")]
    Status { status: StatusCode, body: String },
    #[error("Failed to parse JSON: {source}. Body: {body}")]
    Parse {
        source: serde_json::Error,
        body: String,
    },
}

impl From<HttpError> for InstallError {
    fn from(value: HttpError) -> Self {
        InstallError::Http(value.to_string())
    }
}

pub async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, HttpError> {
    let response = client.get(url).send().await.map_err(HttpError::Request)?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(HttpError::Status { status, body: text });
    }

    let body = response.text().await.map_err(HttpError::Request)?;
    serde_json::from_str::<T>(&body).map_err(|err| HttpError::Parse { source: err, body })
}
