// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

//! Policy reconciler - converges Policy resources and their declared
//! conditions to the remote alerting system.
//!
//! Lifecycle per invocation: fetch, resolve credentials, build a remote
//! client, then either run the deletion protocol or the create/update path.
//! The applied-spec snapshot in status is the convergence marker: it is
//! only written after every remote mutation and child-store mutation of a
//! pass succeeded, so a failed pass is retried wholesale on the next
//! trigger.

use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::alerts::AlertPolicy;
use crate::constants::finalizers;
use crate::credentials::{partial_api_key, resolve_api_key};
use crate::error::{AlertsyncError, Result};
use crate::hash::condition_resource_name;
use crate::reconcilers::{Context, Session};
use crate::types::condition::{AlertCondition, ConditionSpec, ConditionStatus};
use crate::types::policy::{Policy, PolicyStatus};
use crate::types::{add_finalizer, has_finalizer, remove_finalizer};

pub struct PolicyReconciler {
    client: Client,
    ctx: Arc<Context>,
}

impl PolicyReconciler {
    pub fn new(client: Client, ctx: Arc<Context>) -> Self {
        Self { client, ctx }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let policies: Api<Policy> = Api::all(self.client.clone());

        Controller::new(policies, watcher::Config::default())
            .run(reconcile, error_policy, self.ctx)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled policy: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

pub async fn reconcile(policy: Arc<Policy>, ctx: Arc<Context>) -> Result<Action> {
    let namespace = policy.namespace().unwrap_or_default();
    let name = policy.name_any();

    // Work from a fresh copy; the watch event may be stale
    let Some(mut policy) = ctx.store.get_policy(&namespace, &name).await? else {
        debug!(
            "Policy {}/{} not found after deletion, nothing to do",
            namespace, name
        );
        return Ok(Action::await_change());
    };

    let api_key = resolve_api_key(
        ctx.store.as_ref(),
        &policy.spec.api_key,
        policy.spec.api_key_secret.as_ref(),
    )
    .await;
    if api_key.is_empty() {
        return Err(AlertsyncError::MissingApiKey);
    }

    let alerts = (ctx.alerts_factory)(&api_key, &policy.spec.region)?;
    let session = Session { api_key, alerts };

    if policy.is_deleting() {
        return delete_policy(&policy, &session, &ctx).await;
    }

    if add_finalizer(&mut policy.metadata, finalizers::POLICY) {
        policy = ctx.store.update_policy(&policy).await?;
    }

    if policy.is_converged() {
        debug!("Policy {} matches applied spec, nothing to do", name);
        return Ok(Action::await_change());
    }

    info!("Reconciling policy {}", name);

    let mut policy_id = policy.policy_id();
    if policy_id == 0 {
        policy_id = discover_existing_policy(&policy, &session).await;
    }

    let remote = if policy_id == 0 {
        create_remote_policy(&policy, &session).await?
    } else {
        update_remote_policy(&policy, policy_id, &session).await?
    };

    sync_conditions(&policy, remote.id, &ctx).await?;

    let applied = policy.spec.clone();
    let status = policy.status.get_or_insert_with(PolicyStatus::default);
    status.policy_id = remote.id;
    status.applied_spec = Some(applied);
    ctx.store.update_policy(&policy).await?;

    Ok(Action::await_change())
}

pub fn error_policy(_policy: Arc<Policy>, error: &AlertsyncError, ctx: Arc<Context>) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(ctx.config.error_requeue_secs))
}

/// Recover a remote policy identifier lost to a prior partial failure, or
/// adopt a policy created out-of-band: list remote policies by name and
/// take an exact match. List failures are logged but not fatal; the create
/// path will run instead.
async fn discover_existing_policy(policy: &Policy, session: &Session) -> i64 {
    debug!("Checking for existing remote policy {}", policy.spec.name);
    match session.alerts.list_policies(Some(&policy.spec.name)).await {
        Ok(existing) => match existing.iter().find(|p| p.name == policy.spec.name) {
            Some(found) => {
                info!(
                    "Matched existing remote policy {} for {}",
                    found.id, policy.spec.name
                );
                found.id
            }
            None => 0,
        },
        Err(e) => {
            error!(
                policy = %policy.spec.name,
                region = %policy.spec.region,
                api_key = %partial_api_key(&session.api_key),
                "failed to list remote policies: {}", e
            );
            0
        }
    }
}

async fn create_remote_policy(policy: &Policy, session: &Session) -> Result<AlertPolicy> {
    info!("Creating remote policy {}", policy.spec.name);
    session
        .alerts
        .create_policy(&policy.spec.api_policy())
        .await
        .map_err(|e| {
            error!(
                policy = %policy.spec.name,
                region = %policy.spec.region,
                api_key = %partial_api_key(&session.api_key),
                "failed to create policy via alerts API: {}", e
            );
            e
        })
}

async fn update_remote_policy(
    policy: &Policy,
    policy_id: i64,
    session: &Session,
) -> Result<AlertPolicy> {
    info!("Updating remote policy {} ({})", policy.spec.name, policy_id);
    let mut api_policy = policy.spec.api_policy();
    api_policy.id = policy_id;
    session.alerts.update_policy(&api_policy).await.map_err(|e| {
        error!(
            policy_id,
            region = %policy.spec.region,
            api_key = %partial_api_key(&session.api_key),
            "failed to update policy via alerts API: {}", e
        );
        e
    })
}

fn conditions_by_name(list: &[ConditionSpec]) -> Result<HashMap<String, ConditionSpec>> {
    let mut map = HashMap::new();
    for spec in list {
        if map.insert(spec.name.clone(), spec.clone()).is_some() {
            return Err(AlertsyncError::DuplicateCondition(spec.name.clone()));
        }
    }
    Ok(map)
}

/// Converge the declared conditions to condition resources in the store.
/// Children are matched by their user-supplied logical name, never by list
/// position, so reordering the spec is a no-op. Content changes replace
/// the child: names are content-addressed, so the old resource is deleted
/// and a new one created under the new name.
async fn sync_conditions(policy: &Policy, policy_id: i64, ctx: &Context) -> Result<()> {
    let desired = conditions_by_name(&policy.spec.conditions)?;
    let empty = Vec::new();
    let applied_list = policy.applied_spec().map_or(&empty, |s| &s.conditions);
    // The applied snapshot is reconciler-written and a valid pass never
    // persists duplicates, so a tampered snapshot keys last-wins instead
    // of wedging reconciliation.
    let applied: HashMap<String, ConditionSpec> = applied_list
        .iter()
        .map(|c| (c.name.clone(), c.clone()))
        .collect();

    // removed or replaced children go first
    for (name, old) in &applied {
        let keep = desired.get(name).is_some_and(|new| new == old);
        if !keep {
            delete_child_condition(policy, old, ctx).await?;
        }
    }

    for (name, spec) in &desired {
        if applied.get(name).is_some_and(|old| old == spec) {
            continue;
        }
        ensure_child_condition(policy, policy_id, spec, ctx).await?;
    }

    Ok(())
}

/// Materialize one declared condition as an AlertCondition resource:
/// content-addressed name, parent's labels, and the denormalized fields
/// (region, credentials, remote policy id) the condition controller needs
/// to act on its own.
async fn ensure_child_condition(
    policy: &Policy,
    policy_id: i64,
    spec: &ConditionSpec,
    ctx: &Context,
) -> Result<()> {
    let name = condition_resource_name(&policy.name_any(), spec)?;
    let namespace = policy.namespace().unwrap_or_default();

    let mut child_spec = spec.clone();
    child_spec.region = policy.spec.region.clone();
    child_spec.api_key = policy.spec.api_key.clone();
    child_spec.api_key_secret = policy.spec.api_key_secret.clone();
    child_spec.existing_policy_id = policy_id;

    match ctx.store.get_condition(&namespace, &name).await? {
        // already created by a pass whose status write failed
        Some(existing) if existing.spec == child_spec => Ok(()),
        Some(mut existing) => {
            debug!("Updating condition resource {}/{}", namespace, name);
            existing.spec = child_spec;
            ctx.store.update_condition(&existing).await?;
            Ok(())
        }
        None => {
            info!("Creating condition resource {}/{}", namespace, name);
            let condition = AlertCondition {
                metadata: kube::api::ObjectMeta {
                    name: Some(name),
                    namespace: Some(namespace),
                    labels: policy.metadata.labels.clone(),
                    ..Default::default()
                },
                spec: child_spec,
                status: Some(ConditionStatus::default()),
            };
            ctx.store.create_condition(&condition).await?;
            Ok(())
        }
    }
}

async fn delete_child_condition(
    policy: &Policy,
    spec: &ConditionSpec,
    ctx: &Context,
) -> Result<()> {
    let name = condition_resource_name(&policy.name_any(), spec)?;
    let namespace = policy.namespace().unwrap_or_default();
    info!("Deleting condition resource {}/{}", namespace, name);
    ctx.store.delete_condition(&namespace, &name).await
}

/// Finalizer-driven deletion protocol: children recorded in the applied
/// spec first, then the remote policy, and only then is the finalizer
/// lifted. Any failure leaves the finalizer in place so the whole protocol
/// reruns on the next trigger.
async fn delete_policy(policy: &Policy, session: &Session, ctx: &Context) -> Result<Action> {
    if !has_finalizer(&policy.metadata, finalizers::POLICY) {
        return Ok(Action::await_change());
    }

    let mut policy = policy.clone();
    let name = policy.name_any();

    if policy.policy_id() == 0 {
        info!("No remote policy was created for {}, removing finalizer", name);
        remove_finalizer(&mut policy.metadata, finalizers::POLICY);
        ctx.store.update_policy(&policy).await?;
        return Ok(Action::await_change());
    }

    let children: Vec<ConditionSpec> = policy
        .applied_spec()
        .map(|s| s.conditions.clone())
        .unwrap_or_default();
    for condition in &children {
        delete_child_condition(&policy, condition, ctx)
            .await
            .map_err(|e| {
                error!("error deleting condition resources for policy {}: {}", name, e);
                e
            })?;
    }

    match session.alerts.delete_policy(policy.policy_id()).await {
        Ok(()) => {}
        // deletion is idempotent: a vanished remote policy is success
        Err(e) if e.is_not_found() => {
            info!("Remote policy {} already deleted", policy.policy_id());
        }
        Err(e) => {
            error!(
                policy_id = policy.policy_id(),
                region = %policy.spec.region,
                api_key = %partial_api_key(&session.api_key),
                "failed to delete policy via alerts API: {}", e
            );
            return Err(e);
        }
    }

    info!("Remote policy deleted, removing finalizer from {}", name);
    remove_finalizer(&mut policy.metadata, finalizers::POLICY);
    ctx.store.update_policy(&policy).await?;

    Ok(Action::await_change())
}
