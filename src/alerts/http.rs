// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

//! reqwest-backed implementation of the alerts API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::alerts::{
    AlertChannel, AlertNrqlCondition, AlertPolicy, AlertsClient, AlertsClientFactory,
    SharedAlertsClient,
};
use crate::config::Config;
use crate::constants::api;
use crate::error::{AlertsyncError, Result};

pub struct HttpAlertsClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
}

fn region_base_url(region: &str) -> &'static str {
    match region.to_ascii_uppercase().as_str() {
        "EU" => api::EU_ENDPOINT,
        _ => api::US_ENDPOINT,
    }
}

impl HttpAlertsClient {
    /// Build a client for the given credentials. `base_override` takes
    /// precedence over the region-derived endpoint.
    pub fn new(api_key: &str, region: &str, base_override: Option<&Url>) -> Result<Self> {
        let base = match base_override {
            Some(url) => url.clone(),
            None => Url::parse(region_base_url(region))?,
        };
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AlertsyncError::ClientBuild(e.to_string()))?;

        Ok(HttpAlertsClient {
            http,
            base,
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_else(|_| String::new());
        Err(AlertsyncError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn post<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self
            .http
            .post(self.url(path)?)
            .header("X-Api-Key", &self.api_key)
            .json(body)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn put<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self
            .http
            .put(self.url(path)?)
            .header("X-Api-Key", &self.api_key)
            .json(body)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(path)?)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct PolicyEnvelope {
    policy: AlertPolicy,
}

#[derive(Deserialize)]
struct PoliciesEnvelope {
    policies: Vec<AlertPolicy>,
}

#[derive(Serialize, Deserialize)]
struct ConditionEnvelope {
    nrql_condition: AlertNrqlCondition,
}

#[derive(Serialize, Deserialize)]
struct ChannelEnvelope {
    channel: AlertChannel,
}

#[derive(Deserialize)]
struct ChannelsEnvelope {
    channels: Vec<AlertChannel>,
}

#[async_trait]
impl AlertsClient for HttpAlertsClient {
    async fn create_policy(&self, policy: &AlertPolicy) -> Result<AlertPolicy> {
        let env: PolicyEnvelope = self
            .post(
                "/v2/alerts_policies.json",
                &PolicyEnvelope {
                    policy: policy.clone(),
                },
            )
            .await?;
        Ok(env.policy)
    }

    async fn update_policy(&self, policy: &AlertPolicy) -> Result<AlertPolicy> {
        let env: PolicyEnvelope = self
            .put(
                &format!("/v2/alerts_policies/{}.json", policy.id),
                &PolicyEnvelope {
                    policy: policy.clone(),
                },
            )
            .await?;
        Ok(env.policy)
    }

    async fn delete_policy(&self, id: i64) -> Result<()> {
        self.delete(&format!("/v2/alerts_policies/{}.json", id)).await
    }

    async fn list_policies(&self, name: Option<&str>) -> Result<Vec<AlertPolicy>> {
        let mut url = self.url("/v2/alerts_policies.json")?;
        if let Some(name) = name {
            url.query_pairs_mut().append_pair("filter[name]", name);
        }
        let resp = self
            .http
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;
        let env: PoliciesEnvelope = Self::check(resp).await?.json().await?;
        Ok(env.policies)
    }

    async fn create_condition(
        &self,
        policy_id: i64,
        condition: &AlertNrqlCondition,
    ) -> Result<AlertNrqlCondition> {
        let env: ConditionEnvelope = self
            .post(
                &format!("/v2/alerts_nrql_conditions/policies/{}.json", policy_id),
                &ConditionEnvelope {
                    nrql_condition: condition.clone(),
                },
            )
            .await?;
        Ok(env.nrql_condition)
    }

    async fn update_condition(
        &self,
        condition: &AlertNrqlCondition,
    ) -> Result<AlertNrqlCondition> {
        let env: ConditionEnvelope = self
            .put(
                &format!("/v2/alerts_nrql_conditions/{}.json", condition.id),
                &ConditionEnvelope {
                    nrql_condition: condition.clone(),
                },
            )
            .await?;
        Ok(env.nrql_condition)
    }

    async fn delete_condition(&self, id: i64) -> Result<()> {
        self.delete(&format!("/v2/alerts_nrql_conditions/{}.json", id))
            .await
    }

    async fn create_channel(&self, channel: &AlertChannel) -> Result<AlertChannel> {
        let env: ChannelEnvelope = self
            .post(
                "/v2/alerts_channels.json",
                &ChannelEnvelope {
                    channel: channel.clone(),
                },
            )
            .await?;
        Ok(env.channel)
    }

    async fn update_channel(&self, channel: &AlertChannel) -> Result<AlertChannel> {
        let env: ChannelEnvelope = self
            .put(
                &format!("/v2/alerts_channels/{}.json", channel.id),
                &ChannelEnvelope {
                    channel: channel.clone(),
                },
            )
            .await?;
        Ok(env.channel)
    }

    async fn delete_channel(&self, id: i64) -> Result<()> {
        self.delete(&format!("/v2/alerts_channels/{}.json", id)).await
    }

    async fn list_channels(&self) -> Result<Vec<AlertChannel>> {
        let resp = self
            .http
            .get(self.url("/v2/alerts_channels.json")?)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;
        let env: ChannelsEnvelope = Self::check(resp).await?.json().await?;
        Ok(env.channels)
    }
}

/// Production client factory: builds an [`HttpAlertsClient`] per
/// invocation. Clients are deliberately not cached across invocations so
/// credential rotation takes effect immediately.
pub fn http_client_factory(config: &Config) -> AlertsClientFactory {
    let base_override = config.api_base_override.clone();
    Arc::new(move |api_key, region| {
        let client = HttpAlertsClient::new(api_key, region, base_override.as_ref())?;
        Ok(Arc::new(client) as SharedAlertsClient)
    })
}
