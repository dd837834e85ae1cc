use std::str::FromStr;
use std::time::Duration;

use bigdecimal::BigDecimal;
use log::trace;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::errors::RemoteError;

/// Response envelope shared by the platform's services.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEnvelope<T> {
    pub is_success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub result: Option<T>,
}

pub fn build_client(timeout: Duration) -> Result<Client, RemoteError> {
    let mut headers = HeaderMap::new();
    headers.insert("Accept", HeaderValue::from_static("application/json"));

    Client::builder()
        .user_agent(concat!("cart-service/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| RemoteError::Transport(e.to_string()))
}

/// GETs `url` and decodes the envelope. A 404 yields `Ok(None)`.
pub async fn get_envelope<T: DeserializeOwned>(
    client: &Client,
    url: Url,
) -> Result<Option<RemoteEnvelope<T>>, RemoteError> {
    trace!("GET {url}");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| RemoteError::Transport(e.to_string()))?;

    match response.status() {
        StatusCode::NOT_FOUND => Ok(None),
        status if status.is_success() => response
            .json::<RemoteEnvelope<T>>()
            .await
            .map(Some)
            .map_err(|e| RemoteError::Decode(e.to_string())),
        status => Err(RemoteError::Status(status.as_u16())),
    }
}

/// Builds `base/segments...`, percent-encoding each segment.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, RemoteError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| RemoteError::Transport(format!("{base} cannot be used as a base url")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Prices travel as JSON numbers; go through their shortest decimal
/// rendering so 9.99 stays 9.99.
pub fn decimal_from_f64(value: f64) -> Result<BigDecimal, RemoteError> {
    BigDecimal::from_str(&value.to_string())
        .map_err(|e| RemoteError::Decode(format!("invalid amount {value}: {e}")))
}
