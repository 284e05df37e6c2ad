// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::alerts::{AlertChannel, ChannelConfiguration as ApiChannelConfiguration};
use crate::types::ApiKeySecret;

/// A notification channel. Same lifecycle shape as Policy, without nested
/// children.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "alertsync.dev", version = "v1", kind = "AlertsChannel")]
#[kube(namespaced)]
#[kube(status = "ChannelStatus")]
#[serde(rename_all = "camelCase")]
pub struct ChannelSpec {
    pub name: String,
    /// Channel kind understood by the remote API: email, slack, webhook, ...
    #[serde(rename = "type")]
    pub channel_type: String,
    #[serde(default)]
    pub configuration: ChannelConfiguration,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_secret: Option<ApiKeySecret>,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "US".to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
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

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatus {
    #[serde(default)]
    pub channel_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_spec: Option<ChannelSpec>,
}

impl ChannelSpec {
    /// The remote API representation of this channel
    pub fn api_channel(&self) -> AlertChannel {
        AlertChannel {
            id: 0,
            name: self.name.clone(),
            channel_type: self.channel_type.clone(),
            configuration: ApiChannelConfiguration {
                recipients: self.configuration.recipients.clone(),
                url: self.configuration.url.clone(),
                channel: self.configuration.channel.clone(),
                include_json_attachment: self.configuration.include_json_attachment,
            },
        }
    }
}

impl AlertsChannel {
    pub fn is_deleting(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    pub fn channel_id(&self) -> i64 {
        self.status.as_ref().map_or(0, |s| s.channel_id)
    }

    pub fn applied_spec(&self) -> Option<&ChannelSpec> {
        self.status.as_ref().and_then(|s| s.applied_spec.as_ref())
    }

    pub fn is_converged(&self) -> bool {
        self.applied_spec() == Some(&self.spec)
    }
}
