// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

//! Test doubles: an in-memory object store and a counting, stubbable
//! alerts client. Both can share an op log so tests can assert call
//! ordering across the two collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::ResourceExt;

use crate::alerts::{
    AlertChannel, AlertNrqlCondition, AlertPolicy, AlertsClient, AlertsClientFactory,
    SharedAlertsClient,
};
use crate::config::Config;
use crate::error::{AlertsyncError, Result};
use crate::reconcilers::Context;
use crate::store::Store;
use crate::types::channel::AlertsChannel;
use crate::types::condition::AlertCondition;
use crate::types::policy::Policy;

pub type OpLog = Arc<Mutex<Vec<String>>>;

pub fn deletion_timestamp() -> Time {
    Time(k8s_openapi::chrono::Utc::now())
}

fn key(namespace: &str, name: &str) -> (String, String) {
    (namespace.to_string(), name.to_string())
}

#[derive(Default)]
pub struct MemoryStore {
    policies: Mutex<HashMap<(String, String), Policy>>,
    conditions: Mutex<HashMap<(String, String), AlertCondition>>,
    channels: Mutex<HashMap<(String, String), AlertsChannel>>,
    secrets: Mutex<HashMap<(String, String), Secret>>,
    pub ops: OpLog,
}

impl MemoryStore {
    pub fn with_log(ops: OpLog) -> Self {
        MemoryStore {
            ops,
            ..Default::default()
        }
    }

    fn log(&self, entry: String) {
        self.ops.lock().unwrap().push(entry);
    }

    pub fn put_policy(&self, policy: Policy) {
        let k = key(&policy.namespace().unwrap_or_default(), &policy.name_any());
        self.policies.lock().unwrap().insert(k, policy);
    }

    pub fn put_condition(&self, condition: AlertCondition) {
        let k = key(
            &condition.namespace().unwrap_or_default(),
            &condition.name_any(),
        );
        self.conditions.lock().unwrap().insert(k, condition);
    }

    pub fn put_channel(&self, channel: AlertsChannel) {
        let k = key(&channel.namespace().unwrap_or_default(), &channel.name_any());
        self.channels.lock().unwrap().insert(k, channel);
    }

    pub fn put_secret(&self, secret: Secret) {
        let k = key(&secret.namespace().unwrap_or_default(), &secret.name_any());
        self.secrets.lock().unwrap().insert(k, secret);
    }

    pub fn policy(&self, namespace: &str, name: &str) -> Option<Policy> {
        self.policies.lock().unwrap().get(&key(namespace, name)).cloned()
    }

    pub fn condition(&self, namespace: &str, name: &str) -> Option<AlertCondition> {
        self.conditions
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned()
    }

    pub fn channel(&self, namespace: &str, name: &str) -> Option<AlertsChannel> {
        self.channels.lock().unwrap().get(&key(namespace, name)).cloned()
    }

    /// Names of all stored conditions in a namespace, sorted
    pub fn condition_names(&self, namespace: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .conditions
            .lock()
            .unwrap()
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_policy(&self, namespace: &str, name: &str) -> Result<Option<Policy>> {
        Ok(self.policies.lock().unwrap().get(&key(namespace, name)).cloned())
    }

    async fn update_policy(&self, policy: &Policy) -> Result<Policy> {
        self.log(format!("store.update_policy {}", policy.name_any()));
        self.put_policy(policy.clone());
        Ok(policy.clone())
    }

    async fn get_condition(&self, namespace: &str, name: &str) -> Result<Option<AlertCondition>> {
        Ok(self
            .conditions
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned())
    }

    async fn create_condition(&self, condition: &AlertCondition) -> Result<AlertCondition> {
        self.log(format!("store.create_condition {}", condition.name_any()));
        let mut stored = condition.clone();
        stored.metadata.resource_version = Some("1".to_string());
        self.put_condition(stored.clone());
        Ok(stored)
    }

    async fn update_condition(&self, condition: &AlertCondition) -> Result<AlertCondition> {
        self.log(format!("store.update_condition {}", condition.name_any()));
        self.put_condition(condition.clone());
        Ok(condition.clone())
    }

    async fn delete_condition(&self, namespace: &str, name: &str) -> Result<()> {
        self.log(format!("store.delete_condition {}", name));
        self.conditions.lock().unwrap().remove(&key(namespace, name));
        Ok(())
    }

    async fn get_channel(&self, namespace: &str, name: &str) -> Result<Option<AlertsChannel>> {
        Ok(self.channels.lock().unwrap().get(&key(namespace, name)).cloned())
    }

    async fn update_channel(&self, channel: &AlertsChannel) -> Result<AlertsChannel> {
        self.log(format!("store.update_channel {}", channel.name_any()));
        self.put_channel(channel.clone());
        Ok(channel.clone())
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        Ok(self.secrets.lock().unwrap().get(&key(namespace, name)).cloned())
    }
}

/// Deterministic alerts client double. Counts every call, returns
/// sequential identifiers from creates, and can be stubbed to fail
/// individual operations with a chosen HTTP status.
#[derive(Default)]
pub struct MockAlertsClient {
    pub ops: OpLog,
    pub create_policy_calls: AtomicUsize,
    pub update_policy_calls: AtomicUsize,
    pub delete_policy_calls: AtomicUsize,
    pub list_policies_calls: AtomicUsize,
    pub create_condition_calls: AtomicUsize,
    pub update_condition_calls: AtomicUsize,
    pub delete_condition_calls: AtomicUsize,
    pub create_channel_calls: AtomicUsize,
    pub update_channel_calls: AtomicUsize,
    pub delete_channel_calls: AtomicUsize,
    pub list_channels_calls: AtomicUsize,
    next_id: AtomicI64,
    pub update_policy_returns_id: Mutex<Option<i64>>,
    pub list_policies_response: Mutex<Vec<AlertPolicy>>,
    pub list_channels_response: Mutex<Vec<AlertChannel>>,
    failures: Mutex<HashMap<String, u16>>,
}

impl MockAlertsClient {
    pub fn new() -> Self {
        MockAlertsClient {
            next_id: AtomicI64::new(100),
            ..Default::default()
        }
    }

    pub fn with_log(ops: OpLog) -> Self {
        MockAlertsClient {
            ops,
            ..Self::new()
        }
    }

    /// Stub the named operation to fail with the given HTTP status
    pub fn fail(&self, op: &str, status: u16) {
        self.failures.lock().unwrap().insert(op.to_string(), status);
    }

    fn check_fail(&self, op: &str) -> Result<()> {
        if let Some(status) = self.failures.lock().unwrap().get(op) {
            return Err(AlertsyncError::Api {
                status: *status,
                message: format!("stubbed {} failure", op),
            });
        }
        Ok(())
    }

    fn log(&self, entry: String) {
        self.ops.lock().unwrap().push(entry);
    }

    fn next(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Total number of remote calls of any kind
    pub fn total_calls(&self) -> usize {
        [
            &self.create_policy_calls,
            &self.update_policy_calls,
            &self.delete_policy_calls,
            &self.list_policies_calls,
            &self.create_condition_calls,
            &self.update_condition_calls,
            &self.delete_condition_calls,
            &self.create_channel_calls,
            &self.update_channel_calls,
            &self.delete_channel_calls,
            &self.list_channels_calls,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

#[async_trait]
impl AlertsClient for MockAlertsClient {
    async fn create_policy(&self, policy: &AlertPolicy) -> Result<AlertPolicy> {
        self.create_policy_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail("create_policy")?;
        let id = self.next();
        self.log(format!("alerts.create_policy {}", id));
        Ok(AlertPolicy {
            id,
            ..policy.clone()
        })
    }

    async fn update_policy(&self, policy: &AlertPolicy) -> Result<AlertPolicy> {
        self.update_policy_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail("update_policy")?;
        let id = self
            .update_policy_returns_id
            .lock()
            .unwrap()
            .unwrap_or(policy.id);
        self.log(format!("alerts.update_policy {}", id));
        Ok(AlertPolicy {
            id,
            ..policy.clone()
        })
    }

    async fn delete_policy(&self, id: i64) -> Result<()> {
        self.delete_policy_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail("delete_policy")?;
        self.log(format!("alerts.delete_policy {}", id));
        Ok(())
    }

    async fn list_policies(&self, name: Option<&str>) -> Result<Vec<AlertPolicy>> {
        self.list_policies_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail("list_policies")?;
        Ok(self
            .list_policies_response
            .lock()
            .unwrap()
            .iter()
            .filter(|p| name.is_none_or(|n| p.name == n))
            .cloned()
            .collect())
    }

    async fn create_condition(
        &self,
        policy_id: i64,
        condition: &AlertNrqlCondition,
    ) -> Result<AlertNrqlCondition> {
        self.create_condition_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail("create_condition")?;
        let id = self.next();
        self.log(format!("alerts.create_condition {} policy={}", id, policy_id));
        Ok(AlertNrqlCondition {
            id,
            ..condition.clone()
        })
    }

    async fn update_condition(
        &self,
        condition: &AlertNrqlCondition,
    ) -> Result<AlertNrqlCondition> {
        self.update_condition_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail("update_condition")?;
        self.log(format!("alerts.update_condition {}", condition.id));
        Ok(condition.clone())
    }

    async fn delete_condition(&self, id: i64) -> Result<()> {
        self.delete_condition_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail("delete_condition")?;
        self.log(format!("alerts.delete_condition {}", id));
        Ok(())
    }

    async fn create_channel(&self, channel: &AlertChannel) -> Result<AlertChannel> {
        self.create_channel_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail("create_channel")?;
        let id = self.next();
        self.log(format!("alerts.create_channel {}", id));
        Ok(AlertChannel {
            id,
            ..channel.clone()
        })
    }

    async fn update_channel(&self, channel: &AlertChannel) -> Result<AlertChannel> {
        self.update_channel_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail("update_channel")?;
        self.log(format!("alerts.update_channel {}", channel.id));
        Ok(channel.clone())
    }

    async fn delete_channel(&self, id: i64) -> Result<()> {
        self.delete_channel_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail("delete_channel")?;
        self.log(format!("alerts.delete_channel {}", id));
        Ok(())
    }

    async fn list_channels(&self) -> Result<Vec<AlertChannel>> {
        self.list_channels_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail("list_channels")?;
        Ok(self.list_channels_response.lock().unwrap().clone())
    }
}

/// Reconciler context wired to the in-memory store and the mock client
pub fn test_context(store: Arc<MemoryStore>, alerts: Arc<MockAlertsClient>) -> Arc<Context> {
    let factory: AlertsClientFactory = {
        let alerts = alerts.clone();
        Arc::new(move |_api_key, _region| Ok(alerts.clone() as SharedAlertsClient))
    };
    Arc::new(Context {
        store: store as Arc<dyn Store>,
        alerts_factory: factory,
        config: Config::default(),
    })
}
