/*
Copyright 2024, Zep Software, Inc.

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::errors::TransportError;
use crate::relay::{RelayRequest, RelayResponse};

const RELAY_PATH: &str = "/api/chat";

/// What came back from one relay call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReply {
    pub status: u16,
    pub body: RelayResponse,
}

impl RelayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The widget's only way out: one request per user turn
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send(&self, request: &RelayRequest) -> Result<RelayReply, TransportError>;
}

/// Talks to a relay endpoint over HTTP
pub struct HttpRelayTransport {
    client: Client,
    endpoint: String,
}

impl HttpRelayTransport {
    /// `base_url` is the site root, e.g. `http://localhost:8000`
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), RELAY_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn send(&self, request: &RelayRequest) -> Result<RelayReply, TransportError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status().as_u16();

        let bytes = response.bytes().await?;
        let body = serde_json::from_slice::<RelayResponse>(&bytes)
            .map_err(|e| TransportError::Malformed(e.to_string()))?;

        Ok(RelayReply { status, body })
    }
}
