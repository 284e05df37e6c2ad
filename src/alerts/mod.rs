// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

//! Remote alerting API client: the wire types, the capability trait the
//! reconcilers program against, and the HTTP implementation.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;

pub use http::{http_client_factory, HttpAlertsClient};

/// Alert policy as the remote API represents it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct AlertPolicy {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub incident_preference: String,
}

/// NRQL alert condition as the remote API represents it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct AlertNrqlCondition {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runbook_url: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub terms: Vec<AlertConditionTerm>,
    pub nrql: Nrql,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Nrql {
    pub query: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct AlertConditionTerm {
    pub duration: String,
    pub operator: String,
    pub priority: String,
    pub threshold: String,
    pub time_function: String,
}

/// Notification channel as the remote API represents it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct AlertChannel {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: String,
    #[serde(default)]
    pub configuration: ChannelConfiguration,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ChannelConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_json_attachment: Option<bool>,
}

/// Capability interface over the remote alerting system. The reconcilers
/// only ever talk to this trait; production wires in [`HttpAlertsClient`],
/// tests wire in a counting mock.
#[async_trait]
pub trait AlertsClient: Send + Sync {
    async fn create_policy(&self, policy: &AlertPolicy) -> Result<AlertPolicy>;
    async fn update_policy(&self, policy: &AlertPolicy) -> Result<AlertPolicy>;
    async fn delete_policy(&self, id: i64) -> Result<()>;
    /// List remote policies, optionally filtered by exact name
    async fn list_policies(&self, name: Option<&str>) -> Result<Vec<AlertPolicy>>;

    async fn create_condition(
        &self,
        policy_id: i64,
        condition: &AlertNrqlCondition,
    ) -> Result<AlertNrqlCondition>;
    async fn update_condition(&self, condition: &AlertNrqlCondition)
        -> Result<AlertNrqlCondition>;
    async fn delete_condition(&self, id: i64) -> Result<()>;

    async fn create_channel(&self, channel: &AlertChannel) -> Result<AlertChannel>;
    async fn update_channel(&self, channel: &AlertChannel) -> Result<AlertChannel>;
    async fn delete_channel(&self, id: i64) -> Result<()>;
    async fn list_channels(&self) -> Result<Vec<AlertChannel>>;
}

pub type SharedAlertsClient = Arc<dyn AlertsClient>;

/// Builds a client bound to the remote system for `(api_key, region)`.
/// Injected at reconciler construction so tests can substitute a double.
pub type AlertsClientFactory =
    Arc<dyn Fn(&str, &str) -> Result<SharedAlertsClient> + Send + Sync>;
