// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

//! Declarative object store abstraction.
//!
//! Reconcilers talk to the store through this trait so the core lifecycle
//! logic can run against an in-memory double in tests. The production
//! implementation wraps the Kubernetes API. Updates are whole-object
//! replaces: the CRDs are registered without a status subresource, so one
//! replace persists metadata, spec, and status together, and the applied
//! spec is never written separately from the identifier it belongs to.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client, ResourceExt};

use crate::error::Result;
use crate::types::channel::AlertsChannel;
use crate::types::condition::AlertCondition;
use crate::types::policy::Policy;

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_policy(&self, namespace: &str, name: &str) -> Result<Option<Policy>>;
    async fn update_policy(&self, policy: &Policy) -> Result<Policy>;

    async fn get_condition(&self, namespace: &str, name: &str) -> Result<Option<AlertCondition>>;
    async fn create_condition(&self, condition: &AlertCondition) -> Result<AlertCondition>;
    async fn update_condition(&self, condition: &AlertCondition) -> Result<AlertCondition>;
    /// Delete a condition resource. Absence counts as success so retried
    /// policy teardown can pass over children removed by a prior attempt.
    async fn delete_condition(&self, namespace: &str, name: &str) -> Result<()>;

    async fn get_channel(&self, namespace: &str, name: &str) -> Result<Option<AlertsChannel>>;
    async fn update_channel(&self, channel: &AlertsChannel) -> Result<AlertsChannel>;

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>>;
}

/// Store backed by the Kubernetes API
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn policies(&self, namespace: &str) -> Api<Policy> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn conditions(&self, namespace: &str) -> Api<AlertCondition> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn channels(&self, namespace: &str) -> Api<AlertsChannel> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl Store for KubeStore {
    async fn get_policy(&self, namespace: &str, name: &str) -> Result<Option<Policy>> {
        Ok(self.policies(namespace).get_opt(name).await?)
    }

    async fn update_policy(&self, policy: &Policy) -> Result<Policy> {
        let namespace = policy.namespace().unwrap_or_default();
        Ok(self
            .policies(&namespace)
            .replace(&policy.name_any(), &PostParams::default(), policy)
            .await?)
    }

    async fn get_condition(&self, namespace: &str, name: &str) -> Result<Option<AlertCondition>> {
        Ok(self.conditions(namespace).get_opt(name).await?)
    }

    async fn create_condition(&self, condition: &AlertCondition) -> Result<AlertCondition> {
        let namespace = condition.namespace().unwrap_or_default();
        Ok(self
            .conditions(&namespace)
            .create(&PostParams::default(), condition)
            .await?)
    }

    async fn update_condition(&self, condition: &AlertCondition) -> Result<AlertCondition> {
        let namespace = condition.namespace().unwrap_or_default();
        Ok(self
            .conditions(&namespace)
            .replace(&condition.name_any(), &PostParams::default(), condition)
            .await?)
    }

    async fn delete_condition(&self, namespace: &str, name: &str) -> Result<()> {
        match self
            .conditions(namespace)
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(err)) if err.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_channel(&self, namespace: &str, name: &str) -> Result<Option<AlertsChannel>> {
        Ok(self.channels(namespace).get_opt(name).await?)
    }

    async fn update_channel(&self, channel: &AlertsChannel) -> Result<AlertsChannel> {
        let namespace = channel.namespace().unwrap_or_default();
        Ok(self
            .channels(&namespace)
            .replace(&channel.name_any(), &PostParams::default(), channel)
            .await?)
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        Ok(secrets.get_opt(name).await?)
    }
}
