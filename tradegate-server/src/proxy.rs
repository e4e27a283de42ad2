//! Forwarding of trading-key registrations to the upstream service.
//!
//! One POST per call. No retries; the timeout is off unless configured.
//! Bodies are checked to be JSON but travel as their original text in both
//! directions, so number formatting and duplicate keys reach the other side
//! as sent.

use std::time::Duration;
use axum::http::{header, StatusCode};
use reqwest::{Client, Url};
use serde_json::value::RawValue;
use crate::errors::ServerResult;

/// What the upstream answered, passed back to the caller untouched.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Box<RawValue>,
}

/// Rejects anything that is not a single JSON document, keeping its text.
pub fn parse_payload(body: &[u8]) -> ServerResult<Box<RawValue>> {
    Ok(serde_json::from_slice(body)?)
}

#[derive(Clone)]
pub struct RegistrationProxy {
    client: Client,
    upstream: Url,
}

impl RegistrationProxy {
    pub fn new(upstream: Url, timeout: Option<Duration>) -> ServerResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        if upstream.scheme() != "https" {
            tracing::warn!(upstream = %upstream, "Registration upstream is not using https");
        }

        Ok(Self { client, upstream })
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    pub async fn forward(&self, payload: &RawValue) -> ServerResult<UpstreamReply> {
        let body = payload.get().to_owned();

        tracing::debug!(upstream = %self.upstream, bytes = body.len(), "Forwarding key registration");

        let response = self
            .client
            .post(self.upstream.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.json::<Box<RawValue>>().await?;

        tracing::debug!(%status, "Upstream answered key registration");
        Ok(UpstreamReply { status, body })
    }
}
