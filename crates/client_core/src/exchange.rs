//! Outbound calls to the wallet service and classification of its replies.

use std::ops::Range;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    alert::Alert,
    domain::{FieldForm, IssuePrompt, VerifyPrompt},
    error::{ApplicationError, ErrorBody},
    protocol::{FinalizeAck, FinalizeIssueRequest, FinalizeVerifyRequest, InitiateQuery},
};
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::config::ClientSettings;

/// Statuses whose bodies are decoded as application responses. Anything
/// outside this range is a transport failure.
pub const APPLICATION_STATUS_RANGE: Range<u16> = 200..500;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid service url: {0}")]
    InvalidServiceUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("service returned status {status}")]
    ServerStatus { status: u16 },
    #[error("service returned status {status} without an error message")]
    UnexpectedStatus { status: u16 },
    #[error("malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("error field is not a message: {0}")]
    MalformedError(serde_json::Value),
    #[error("exchange backend unavailable: {0}")]
    BackendUnavailable(String),
}

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The service understood the request and rejected it with a message
    /// meant for the user.
    #[error(transparent)]
    Application(#[from] ApplicationError),
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}

impl ExchangeError {
    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application(_))
    }

    /// The alert a user sees for this failure. Transport details never reach
    /// the user.
    pub fn alert(&self) -> Alert {
        match self {
            Self::Application(err) => Alert::error(err.message.clone()),
            Self::Transport(_) => Alert::internal_error(),
        }
    }
}

/// Sorts a raw response into a decoded payload, an application error or a
/// transport failure.
pub fn classify_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ExchangeError> {
    if !APPLICATION_STATUS_RANGE.contains(&status) {
        return Err(TransportError::ServerStatus { status }.into());
    }

    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(TransportError::MalformedBody)?;

    // `error` may be absent, null or a string; any other type is malformed.
    let rejection = match value.get("error") {
        None | Some(serde_json::Value::Null) => ErrorBody::default(),
        Some(serde_json::Value::String(_)) => {
            serde_json::from_value::<ErrorBody>(value.clone()).map_err(TransportError::MalformedBody)?
        }
        Some(other) => return Err(TransportError::MalformedError(other.clone()).into()),
    };
    if let Some(message) = rejection.message() {
        return Err(ApplicationError::new(message).into());
    }

    if !(200..300).contains(&status) {
        return Err(TransportError::UnexpectedStatus { status }.into());
    }

    // Decoded from the raw bytes so maps keep the order the service sent.
    serde_json::from_slice(body).map_err(|err| TransportError::MalformedBody(err).into())
}

#[async_trait]
pub trait ExchangeService: Send + Sync {
    async fn initiate_verify(&self, endpoint: &str) -> Result<VerifyPrompt, ExchangeError>;
    async fn finalize_verify(&self, endpoint: &str) -> Result<FinalizeAck, ExchangeError>;
    async fn initiate_issue(&self, endpoint: &str) -> Result<IssuePrompt, ExchangeError>;
    async fn finalize_issue(
        &self,
        endpoint: &str,
        fields: &FieldForm,
    ) -> Result<FinalizeAck, ExchangeError>;
}

/// HTTP implementation of [`ExchangeService`]. Stateless apart from the
/// connection pool; every call is one request.
#[derive(Debug, Clone)]
pub struct ExchangeClient {
    http: Client,
    service_url: String,
}

impl ExchangeClient {
    pub fn new(service_url: &str) -> Result<Self, TransportError> {
        Self::with_http_client(Client::new(), service_url)
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, TransportError> {
        Self::new(&settings.service_url)
    }

    pub fn with_http_client(http: Client, service_url: &str) -> Result<Self, TransportError> {
        let parsed = Url::parse(service_url.trim())?;
        Ok(Self {
            http,
            service_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        endpoint: &str,
    ) -> Result<T, ExchangeError> {
        let result = self
            .http
            .get(format!("{}{path}", self.service_url))
            .query(&InitiateQuery {
                url: endpoint.to_string(),
            })
            .send()
            .await;
        self.settle(path, result).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ExchangeError> {
        let result = self
            .http
            .post(format!("{}{path}", self.service_url))
            .json(body)
            .send()
            .await;
        self.settle(path, result).await
    }

    async fn settle<T: DeserializeOwned>(
        &self,
        path: &str,
        result: reqwest::Result<reqwest::Response>,
    ) -> Result<T, ExchangeError> {
        let outcome = match result {
            Ok(res) => {
                let status = res.status().as_u16();
                match res.bytes().await {
                    Ok(body) => classify_response(status, &body),
                    Err(err) => Err(TransportError::Request(err).into()),
                }
            }
            Err(err) => Err(TransportError::Request(err).into()),
        };

        if let Err(ExchangeError::Transport(err)) = &outcome {
            warn!(path, "exchange transport failure: {err}");
        }
        outcome
    }
}

#[async_trait]
impl ExchangeService for ExchangeClient {
    async fn initiate_verify(&self, endpoint: &str) -> Result<VerifyPrompt, ExchangeError> {
        self.get_json("/verify", endpoint).await
    }

    async fn finalize_verify(&self, endpoint: &str) -> Result<FinalizeAck, ExchangeError> {
        self.post_json(
            "/verify",
            &FinalizeVerifyRequest {
                url: endpoint.to_string(),
            },
        )
        .await
    }

    async fn initiate_issue(&self, endpoint: &str) -> Result<IssuePrompt, ExchangeError> {
        self.get_json("/issue", endpoint).await
    }

    async fn finalize_issue(
        &self,
        endpoint: &str,
        fields: &FieldForm,
    ) -> Result<FinalizeAck, ExchangeError> {
        self.post_json(
            "/issue",
            &FinalizeIssueRequest {
                url: endpoint.to_string(),
                fields: fields.as_map().clone(),
            },
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/exchange_tests.rs"]
mod tests;
