// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

//! Condition reconciler - owns the remote lifecycle of a single NRQL
//! condition. Conditions are usually materialized by the policy
//! reconciler with credentials and the remote policy id denormalized into
//! the spec, but a hand-created resource carrying those fields works the
//! same way.

use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::constants::finalizers;
use crate::credentials::{partial_api_key, resolve_api_key};
use crate::error::{AlertsyncError, Result};
use crate::reconcilers::{Context, Session};
use crate::types::condition::{AlertCondition, ConditionStatus};
use crate::types::{add_finalizer, has_finalizer, remove_finalizer};

pub struct ConditionReconciler {
    client: Client,
    ctx: Arc<Context>,
}

impl ConditionReconciler {
    pub fn new(client: Client, ctx: Arc<Context>) -> Self {
        Self { client, ctx }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let conditions: Api<AlertCondition> = Api::all(self.client.clone());

        Controller::new(conditions, watcher::Config::default())
            .run(reconcile, error_policy, self.ctx)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled condition: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

pub async fn reconcile(condition: Arc<AlertCondition>, ctx: Arc<Context>) -> Result<Action> {
    let namespace = condition.namespace().unwrap_or_default();
    let name = condition.name_any();

    let Some(mut condition) = ctx.store.get_condition(&namespace, &name).await? else {
        debug!(
            "Condition {}/{} not found after deletion, nothing to do",
            namespace, name
        );
        return Ok(Action::await_change());
    };

    let api_key = resolve_api_key(
        ctx.store.as_ref(),
        &condition.spec.api_key,
        condition.spec.api_key_secret.as_ref(),
    )
    .await;
    if api_key.is_empty() {
        return Err(AlertsyncError::MissingApiKey);
    }

    let alerts = (ctx.alerts_factory)(&api_key, &condition.spec.region)?;
    let session = Session { api_key, alerts };

    if condition.is_deleting() {
        return delete_condition(&condition, &session, &ctx).await;
    }

    if add_finalizer(&mut condition.metadata, finalizers::CONDITION) {
        condition = ctx.store.update_condition(&condition).await?;
    }

    if condition.is_converged() {
        debug!("Condition {} matches applied spec, nothing to do", name);
        return Ok(Action::await_change());
    }

    info!("Reconciling condition {} ({})", name, condition.spec.name);

    let remote = if condition.condition_id() == 0 {
        session
            .alerts
            .create_condition(condition.spec.existing_policy_id, &condition.spec.api_condition())
            .await
    } else {
        let mut api_condition = condition.spec.api_condition();
        api_condition.id = condition.condition_id();
        session.alerts.update_condition(&api_condition).await
    }
    .map_err(|e| {
        error!(
            condition = %condition.spec.name,
            policy_id = condition.spec.existing_policy_id,
            region = %condition.spec.region,
            api_key = %partial_api_key(&session.api_key),
            "failed to sync condition via alerts API: {}", e
        );
        e
    })?;

    let applied = condition.spec.clone();
    let status = condition.status.get_or_insert_with(ConditionStatus::default);
    status.condition_id = remote.id;
    status.applied_spec = Some(applied);
    ctx.store.update_condition(&condition).await?;

    Ok(Action::await_change())
}

pub fn error_policy(
    _condition: Arc<AlertCondition>,
    error: &AlertsyncError,
    ctx: Arc<Context>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(ctx.config.error_requeue_secs))
}

async fn delete_condition(
    condition: &AlertCondition,
    session: &Session,
    ctx: &Context,
) -> Result<Action> {
    if !has_finalizer(&condition.metadata, finalizers::CONDITION) {
        return Ok(Action::await_change());
    }

    let mut condition = condition.clone();
    let name = condition.name_any();

    if condition.condition_id() != 0 {
        match session.alerts.delete_condition(condition.condition_id()).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                info!("Remote condition {} already deleted", condition.condition_id());
            }
            Err(e) => {
                error!(
                    condition_id = condition.condition_id(),
                    region = %condition.spec.region,
                    api_key = %partial_api_key(&session.api_key),
                    "failed to delete condition via alerts API: {}", e
                );
                return Err(e);
            }
        }
    }

    info!("Remote condition deleted, removing finalizer from {}", name);
    remove_finalizer(&mut condition.metadata, finalizers::CONDITION);
    ctx.store.update_condition(&condition).await?;

    Ok(Action::await_change())
}
