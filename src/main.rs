// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};

use alertsync::alerts::http_client_factory;
use alertsync::config::Config;
use alertsync::reconcilers::{ChannelReconciler, ConditionReconciler, Context, PolicyReconciler};
use alertsync::store::KubeStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting alertsync operator");

    // Load configuration
    let config = Config::from_env()?;
    if let Some(base) = &config.api_base_override {
        info!("Configuration loaded: alerts API base override={}", base);
    }

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let ctx = Arc::new(Context {
        store: Arc::new(KubeStore::new(client.clone())),
        alerts_factory: http_client_factory(&config),
        config,
    });

    let policy_reconciler = PolicyReconciler::new(client.clone(), ctx.clone());
    let condition_reconciler = ConditionReconciler::new(client.clone(), ctx.clone());
    let channel_reconciler = ChannelReconciler::new(client, ctx);

    info!("Starting reconcilers...");

    // Run all three reconcilers concurrently
    tokio::try_join!(
        policy_reconciler.run(),
        condition_reconciler.run(),
        channel_reconciler.run()
    )?;

    // This should never be reached as reconcilers run forever
    warn!("All reconcilers stopped unexpectedly");
    Ok(())
}
