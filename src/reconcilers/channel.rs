// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

//! Channel reconciler - converges AlertsChannel resources to remote
//! notification channels. Same shape as the policy reconciler minus the
//! child fan-out: discover, create or update, snapshot the applied spec.

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
use crate::types::channel::{AlertsChannel, ChannelStatus};
use crate::types::{add_finalizer, has_finalizer, remove_finalizer};

pub struct ChannelReconciler {
    client: Client,
    ctx: Arc<Context>,
}

impl ChannelReconciler {
    pub fn new(client: Client, ctx: Arc<Context>) -> Self {
        Self { client, ctx }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let channels: Api<AlertsChannel> = Api::all(self.client.clone());

        Controller::new(channels, watcher::Config::default())
            .run(reconcile, error_policy, self.ctx)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled channel: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

pub async fn reconcile(channel: Arc<AlertsChannel>, ctx: Arc<Context>) -> Result<Action> {
    let namespace = channel.namespace().unwrap_or_default();
    let name = channel.name_any();

    let Some(mut channel) = ctx.store.get_channel(&namespace, &name).await? else {
        debug!(
            "Channel {}/{} not found after deletion, nothing to do",
            namespace, name
        );
        return Ok(Action::await_change());
    };

    let api_key = resolve_api_key(
        ctx.store.as_ref(),
        &channel.spec.api_key,
        channel.spec.api_key_secret.as_ref(),
    )
    .await;
    if api_key.is_empty() {
        return Err(AlertsyncError::MissingApiKey);
    }

    let alerts = (ctx.alerts_factory)(&api_key, &channel.spec.region)?;
    let session = Session { api_key, alerts };

    if channel.is_deleting() {
        return delete_channel(&channel, &session, &ctx).await;
    }

    if add_finalizer(&mut channel.metadata, finalizers::CHANNEL) {
        channel = ctx.store.update_channel(&channel).await?;
    }

    if channel.is_converged() {
        debug!("Channel {} matches applied spec, nothing to do", name);
        return Ok(Action::await_change());
    }

    info!("Reconciling channel {} ({})", name, channel.spec.name);

    let mut channel_id = channel.channel_id();
    if channel_id == 0 {
        channel_id = discover_existing_channel(&channel, &session).await;
    }

    let remote = if channel_id == 0 {
        session.alerts.create_channel(&channel.spec.api_channel()).await
    } else {
        let mut api_channel = channel.spec.api_channel();
        api_channel.id = channel_id;
        session.alerts.update_channel(&api_channel).await
    }
    .map_err(|e| {
        error!(
            channel = %channel.spec.name,
            region = %channel.spec.region,
            api_key = %partial_api_key(&session.api_key),
            "failed to sync channel via alerts API: {}", e
        );
        e
    })?;

    let applied = channel.spec.clone();
    let status = channel.status.get_or_insert_with(ChannelStatus::default);
    status.channel_id = remote.id;
    status.applied_spec = Some(applied);
    ctx.store.update_channel(&channel).await?;

    Ok(Action::await_change())
}

pub fn error_policy(
    _channel: Arc<AlertsChannel>,
    error: &AlertsyncError,
    ctx: Arc<Context>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(ctx.config.error_requeue_secs))
}

/// Adopt a matching remote channel instead of creating a duplicate after
/// a lost status write. The channels endpoint has no name filter, so the
/// full list is scanned. List failures are logged but not fatal.
async fn discover_existing_channel(channel: &AlertsChannel, session: &Session) -> i64 {
    debug!("Checking for existing remote channel {}", channel.spec.name);
    match session.alerts.list_channels().await {
        Ok(existing) => match existing.iter().find(|c| c.name == channel.spec.name) {
            Some(found) => {
                info!(
                    "Matched existing remote channel {} for {}",
                    found.id, channel.spec.name
                );
                found.id
            }
            None => 0,
        },
        Err(e) => {
            error!(
                channel = %channel.spec.name,
                region = %channel.spec.region,
                api_key = %partial_api_key(&session.api_key),
                "failed to list remote channels: {}", e
            );
            0
        }
    }
}

async fn delete_channel(
    channel: &AlertsChannel,
    session: &Session,
    ctx: &Context,
) -> Result<Action> {
    if !has_finalizer(&channel.metadata, finalizers::CHANNEL) {
        return Ok(Action::await_change());
    }

    let mut channel = channel.clone();
    let name = channel.name_any();

    if channel.channel_id() != 0 {
        match session.alerts.delete_channel(channel.channel_id()).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                info!("Remote channel {} already deleted", channel.channel_id());
            }
            Err(e) => {
                error!(
                    channel_id = channel.channel_id(),
                    region = %channel.spec.region,
                    api_key = %partial_api_key(&session.api_key),
                    "failed to delete channel via alerts API: {}", e
                );
                return Err(e);
            }
        }
    }

    info!("Remote channel deleted, removing finalizer from {}", name);
    remove_finalizer(&mut channel.metadata, finalizers::CHANNEL);
    ctx.store.update_channel(&channel).await?;

    Ok(Action::await_change())
}
