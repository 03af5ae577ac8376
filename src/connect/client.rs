// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP client for the Kafka Connect REST API.
//!
//! [`ConnectApi`] is the capability set the reconcilers depend on;
//! [`ConnectRestClient`] implements it over reqwest with automatic retry for
//! transient errors (429, 5xx and the 409 Connect returns mid-rebalance).
//! Endpoint selection is the caller's concern: one client addresses one
//! Connect cluster.

use crate::connect::types::{ConnectorConfig, ConnectorStatusDoc};
use crate::errors::ConnectError;
use crate::metrics::record_connect_api_request;
use crate::reconcilers::retry::{http_backoff, is_retryable_http_status};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Capability set of a remote Kafka Connect REST cluster.
///
/// The reconcilers depend only on this trait; tests substitute an in-memory
/// implementation. All operations address the single Connect cluster the
/// implementation was built for.
#[async_trait]
pub trait ConnectApi: Send + Sync {
    /// Names of all connectors currently deployed on the cluster.
    async fn list_connectors(&self) -> Result<Vec<String>, ConnectError>;

    /// The stored configuration of a connector, or `None` if it does not exist.
    async fn connector_config(&self, name: &str)
        -> Result<Option<ConnectorConfig>, ConnectError>;

    /// Create the connector or replace its whole configuration.
    ///
    /// This is a single `PUT /connectors/{name}/config`: the REST layer
    /// accepts or rejects the full config atomically, never a partial merge.
    async fn create_or_update_connector(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> Result<(), ConnectError>;

    /// Delete a connector. Deleting an absent connector is not an error.
    async fn delete_connector(&self, name: &str) -> Result<(), ConnectError>;

    /// The live `/status` document of a connector, or `None` if it does not exist.
    async fn connector_status(
        &self,
        name: &str,
    ) -> Result<Option<ConnectorStatusDoc>, ConnectError>;

    /// Restart a single task of a connector.
    async fn restart_task(&self, name: &str, task_id: i64) -> Result<(), ConnectError>;

    /// Pause a connector and its tasks.
    async fn pause_connector(&self, name: &str) -> Result<(), ConnectError>;

    /// Resume a paused connector and its tasks.
    async fn resume_connector(&self, name: &str) -> Result<(), ConnectError>;
}

/// Build the REST base URL from a Connect endpoint address.
///
/// Converts "my-connect-api.kafka.svc:8083" or "my-connect-api:8083"
/// to `http://my-connect-api.kafka.svc:8083`; an explicit scheme is kept.
pub(crate) fn build_api_url(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", endpoint.trim_end_matches('/'))
    }
}

/// reqwest-based [`ConnectApi`] implementation for one Connect cluster.
#[derive(Clone)]
pub struct ConnectRestClient {
    http: HttpClient,
    base_url: String,
}

impl ConnectRestClient {
    /// Create a client for the given Connect REST endpoint.
    ///
    /// The `http` client is shared across all Connect clusters the operator
    /// drives; connection pooling happens there.
    #[must_use]
    pub fn new(http: HttpClient, endpoint: &str) -> Self {
        Self {
            http,
            base_url: build_api_url(endpoint),
        }
    }

    /// Base URL of the Connect REST API this client addresses.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a request against the Connect REST API with automatic retry.
    ///
    /// # Retry Behavior
    /// - Retries on HTTP 409 (rebalance), 429 and 5xx, and on transport errors
    /// - Fails immediately on other 4xx errors
    /// - Max 2 minutes total retry time
    /// - Initial retry after 50ms, exponentially growing to max 10 seconds
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<String, ConnectError> {
        let mut backoff = http_backoff();
        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = self.request_internal(method.clone(), path, body).await;

            match result {
                Ok(response) => {
                    if attempt > 1 {
                        debug!(
                            method = %method,
                            path = %path,
                            attempt = attempt,
                            elapsed = ?start_time.elapsed(),
                            "Connect REST call succeeded after retries"
                        );
                    }
                    record_connect_api_request(method.as_str(), "success");
                    return Ok(response);
                }
                Err(e) => {
                    let is_retryable = match &e {
                        ConnectError::Api { status, .. } => StatusCode::from_u16(*status)
                            .is_ok_and(is_retryable_http_status),
                        ConnectError::Unreachable { .. } => true,
                        ConnectError::UnexpectedPayload { .. } => false,
                    };

                    if !is_retryable {
                        error!(
                            method = %method,
                            path = %path,
                            error = %e,
                            "Non-retryable Connect REST error, failing immediately"
                        );
                        record_connect_api_request(method.as_str(), "error");
                        return Err(e);
                    }

                    if let Some(max_elapsed) = backoff.max_elapsed_time {
                        if start_time.elapsed() >= max_elapsed {
                            error!(
                                method = %method,
                                path = %path,
                                attempt = attempt,
                                elapsed = ?start_time.elapsed(),
                                error = %e,
                                "Max retry time exceeded, giving up"
                            );
                            record_connect_api_request(method.as_str(), "error");
                            return Err(e);
                        }
                    }

                    if let Some(duration) = backoff.next_backoff() {
                        warn!(
                            method = %method,
                            path = %path,
                            attempt = attempt,
                            retry_after = ?duration,
                            error = %e,
                            "Retryable Connect REST error, will retry"
                        );
                        tokio::time::sleep(duration).await;
                    } else {
                        error!(
                            method = %method,
                            path = %path,
                            attempt = attempt,
                            elapsed = ?start_time.elapsed(),
                            error = %e,
                            "Backoff exhausted, giving up"
                        );
                        record_connect_api_request(method.as_str(), "error");
                        return Err(e);
                    }
                }
            }
        }
    }

    /// Single request attempt without retry logic.
    async fn request_internal(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<String, ConnectError> {
        let url = format!("{}{path}", self.base_url);

        debug!(
            method = %method,
            url = %url,
            has_body = body.is_some(),
            "Connect REST request"
        );

        let mut request = self.http.request(method, &url);
        if let Some(body_data) = body {
            request = request.json(body_data);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ConnectError::Unreachable {
                endpoint: self.base_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ConnectError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        response.text().await.map_err(|e| ConnectError::Unreachable {
            endpoint: self.base_url.clone(),
            reason: format!("Failed to read response body: {e}"),
        })
    }
}

#[async_trait]
impl ConnectApi for ConnectRestClient {
    async fn list_connectors(&self) -> Result<Vec<String>, ConnectError> {
        let text = self.request(Method::GET, "/connectors", None).await?;
        serde_json::from_str(&text).map_err(|e| ConnectError::UnexpectedPayload {
            reason: format!("connector list: {e}"),
        })
    }

    async fn connector_config(
        &self,
        name: &str,
    ) -> Result<Option<ConnectorConfig>, ConnectError> {
        let result = self
            .request(Method::GET, &format!("/connectors/{name}/config"), None)
            .await;

        match result {
            Ok(text) => {
                let config: ConnectorConfig =
                    serde_json::from_str(&text).map_err(|e| ConnectError::UnexpectedPayload {
                        reason: format!("connector config: {e}"),
                    })?;
                Ok(Some(config))
            }
            // Absence is not an error: it means "must create"
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_or_update_connector(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> Result<(), ConnectError> {
        let body = serde_json::to_value(config).map_err(|e| ConnectError::UnexpectedPayload {
            reason: format!("connector config serialization: {e}"),
        })?;

        self.request(
            Method::PUT,
            &format!("/connectors/{name}/config"),
            Some(&body),
        )
        .await?;

        info!(connector = %name, "Applied connector configuration");
        Ok(())
    }

    async fn delete_connector(&self, name: &str) -> Result<(), ConnectError> {
        let result = self
            .request(Method::DELETE, &format!("/connectors/{name}"), None)
            .await;

        match result {
            Ok(_) => {
                info!(connector = %name, "Deleted connector");
                Ok(())
            }
            // Already gone (idempotent)
            Err(e) if e.is_not_found() => {
                debug!(connector = %name, "Connector already deleted");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn connector_status(
        &self,
        name: &str,
    ) -> Result<Option<ConnectorStatusDoc>, ConnectError> {
        let result = self
            .request(Method::GET, &format!("/connectors/{name}/status"), None)
            .await;

        match result {
            Ok(text) => {
                let doc: BTreeMap<String, Value> =
                    serde_json::from_str(&text).map_err(|e| ConnectError::UnexpectedPayload {
                        reason: format!("connector status: {e}"),
                    })?;
                Ok(Some(ConnectorStatusDoc::new(doc)))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn restart_task(&self, name: &str, task_id: i64) -> Result<(), ConnectError> {
        self.request(
            Method::POST,
            &format!("/connectors/{name}/tasks/{task_id}/restart"),
            None,
        )
        .await?;

        info!(connector = %name, task = task_id, "Restarted task");
        Ok(())
    }

    async fn pause_connector(&self, name: &str) -> Result<(), ConnectError> {
        self.request(Method::PUT, &format!("/connectors/{name}/pause"), None)
            .await?;

        info!(connector = %name, "Paused connector");
        Ok(())
    }

    async fn resume_connector(&self, name: &str) -> Result<(), ConnectError> {
        self.request(Method::PUT, &format!("/connectors/{name}/resume"), None)
            .await?;

        info!(connector = %name, "Resumed connector");
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
