//! HTTP gateway adapter.
//!
//! Implements [`GatewayClient`] with a blocking `reqwest` client:
//!
//! ```text
//! POST {gateway}/events
//! x-api-key: {apikey}
//! content-type: application/json
//!
//! {"location":…,"timestamp":…,"states":[…]}
//! ```
//!
//! Only `200 OK` counts as delivered.  Every request is bounded by the
//! configured timeout so a dead gateway cannot stall the publish loop.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::app::payload::PublishPayload;
use crate::app::ports::{Ack, GatewayClient};
use crate::error::PublishError;

const API_KEY_HEADER: &str = "x-api-key";

/// `{base}/events`, without doubling a trailing slash.
pub fn events_url(base: &str) -> String {
    format!("{}/events", base.trim_end_matches('/'))
}

pub struct HttpGateway {
    client: Client,
    url: String,
    api_key: String,
}

impl HttpGateway {
    pub fn new(base: &str, api_key: &str, timeout: Duration) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PublishError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: events_url(base),
            api_key: api_key.to_owned(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl GatewayClient for HttpGateway {
    fn publish(&mut self, payload: &PublishPayload) -> Result<Ack, PublishError> {
        let body = serde_json::to_vec(payload).map_err(|e| PublishError::Encode(e.to_string()))?;

        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 200 {
            debug!("gateway: {} states accepted", payload.states.len());
            Ok(Ack { status })
        } else {
            Err(PublishError::Status(status))
        }
    }
}
