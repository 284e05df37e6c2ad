// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that converge declared alerting resources to the
//! remote system.

pub mod channel;
pub mod condition;
pub mod policy;

use std::sync::Arc;

use crate::alerts::{AlertsClientFactory, SharedAlertsClient};
use crate::config::Config;
use crate::store::Store;

pub use channel::ChannelReconciler;
pub use condition::ConditionReconciler;
pub use policy::PolicyReconciler;

/// Shared, immutable dependencies of every reconciler
pub struct Context {
    pub store: Arc<dyn Store>,
    pub alerts_factory: AlertsClientFactory,
    pub config: Config,
}

/// Per-invocation state: resolved credentials and the remote client built
/// from them. Constructed fresh inside each reconcile call and threaded by
/// argument, never stored on the reconciler.
pub(crate) struct Session {
    pub api_key: String,
    pub alerts: SharedAlertsClient,
}
